// src/models/heston.rs
//! Heston Stochastic Volatility Model
//!
//! # Mathematical Framework
//!
//! Under the risk-neutral measure the asset price and its instantaneous variance follow:
//! ```text
//! dS_t = r S_t dt + √v_t S_t dW_t^(1)
//! dv_t = κ(θ - v_t) dt + σ√v_t dW_t^(2),    d⟨W^(1), W^(2)⟩_t = ρ dt
//! ```
//!
//! Where:
//! - S_t: Asset price, starting at `spot`
//! - v_t: Instantaneous variance, starting at `v0`
//! - κ: Mean reversion speed of the variance
//! - θ: Long-run variance level
//! - σ: Volatility of variance (vol-of-vol)
//! - ρ: Correlation between the two Brownian motions
//!
//! # Discretisation
//!
//! One Euler–Maruyama step of size Δt, log-Euler for the price:
//! ```text
//! v⁺      = max(v_n, 0)
//! S_{n+1} = S_n · exp((r - v⁺/2)Δt + √v⁺ √Δt Z₁)
//! v_{n+1} = v_n + κ(θ - v⁺)Δt + σ√v⁺ √Δt Z₂
//! ```
//! Two variance policies are provided, see [`DiscretizationScheme`].

use crate::error::{validation::*, PricingResult};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// How the variance is kept usable by the Euler step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscretizationScheme {
    /// Floor the variance only when reading it for the step coefficients.
    ///
    /// The stored `v_{n+1}` is left as computed and may be negative until the next
    /// read floors it again.
    #[default]
    PartialFloor,
    /// Floor the coefficients and also write `max(v_{n+1}, 0)` back after each step.
    FullTruncation,
}

impl DiscretizationScheme {
    pub fn name(&self) -> &'static str {
        match self {
            DiscretizationScheme::PartialFloor => "Partial Floor Euler",
            DiscretizationScheme::FullTruncation => "Full Truncation Euler",
        }
    }
}

/// Heston model parameters together with the initial state `(spot, v0)`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelParameters {
    pub spot: f64,  // Initial asset price S0
    pub v0: f64,    // Initial variance
    pub theta: f64, // Long-run variance
    pub kappa: f64, // Mean reversion speed
    pub sigma: f64, // Volatility of variance (vol-of-vol)
    pub rho: f64,   // Correlation between price and variance
}

impl ModelParameters {
    /// Rejects values that would make the simulation or the Greeks undefined.
    ///
    /// A zero spot is rejected because the spot bump of the finite-difference Greeks
    /// is proportional to it.
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive("spot", self.spot)?;
        validate_non_negative("v0", self.v0)?;
        validate_non_negative("theta", self.theta)?;
        validate_non_negative("kappa", self.kappa)?;
        validate_non_negative("sigma", self.sigma)?;
        validate_correlation("rho", self.rho)?;
        Ok(())
    }

    /// Copy of these parameters with a different initial spot.
    pub fn with_spot(&self, spot: f64) -> Self {
        Self { spot, ..*self }
    }

    /// Feller condition `2κθ > σ²`; when it fails the variance can reach zero.
    pub fn feller_condition_satisfied(&self) -> bool {
        2.0 * self.kappa * self.theta > self.sigma * self.sigma
    }
}

impl Default for ModelParameters {
    fn default() -> Self {
        ModelParameters {
            spot: 100.0,
            v0: 0.04,
            theta: 0.04,
            kappa: 2.0,
            sigma: 0.3,
            rho: -0.5,
        }
    }
}

/// Time increment shared by every step of a simulation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepSize {
    pub dt: f64,
    pub sqrt_dt: f64,
}

impl StepSize {
    /// `maturity / num_steps`; a non-positive maturity gives a zero step.
    pub fn new(maturity: f64, num_steps: usize) -> Self {
        let dt = if maturity > 0.0 {
            maturity / num_steps as f64
        } else {
            0.0
        };
        Self {
            dt,
            sqrt_dt: dt.sqrt(),
        }
    }

    pub fn is_degenerate(&self) -> bool {
        self.dt == 0.0
    }
}

/// Heston dynamics under a fixed risk-free rate and discretisation scheme.
#[derive(Clone, Copy, Debug)]
pub struct Heston {
    pub params: ModelParameters,
    pub r: f64,
    pub scheme: DiscretizationScheme,
}

impl Heston {
    pub fn new(params: ModelParameters, r: f64) -> PricingResult<Self> {
        Self::new_with_scheme(params, r, DiscretizationScheme::default())
    }

    pub fn new_with_scheme(
        params: ModelParameters,
        r: f64,
        scheme: DiscretizationScheme,
    ) -> PricingResult<Self> {
        params.validate()?;
        validate_finite("risk_free_rate", r)?;

        if !params.feller_condition_satisfied() {
            debug!(
                kappa = params.kappa,
                theta = params.theta,
                sigma = params.sigma,
                "Feller condition violated (2κθ ≤ σ²), variance may hit zero"
            );
        }

        Ok(Heston { params, r, scheme })
    }

    /// Advances `(s, v)` by one step using the correlated pair `(z1, z2)`.
    ///
    /// A zero step leaves the state untouched, so `sqrt` is never evaluated on
    /// a zero increment.
    #[inline]
    pub fn step(&self, s: &mut f64, v: &mut f64, step: StepSize, z1: f64, z2: f64) {
        if step.is_degenerate() {
            return;
        }

        let v_pos = v.max(0.0);
        let sqrt_v = v_pos.sqrt();

        *s *= ((self.r - 0.5 * v_pos) * step.dt + sqrt_v * step.sqrt_dt * z1).exp();

        let next_v = *v
            + self.params.kappa * (self.params.theta - v_pos) * step.dt
            + self.params.sigma * sqrt_v * step.sqrt_dt * z2;

        *v = match self.scheme {
            DiscretizationScheme::PartialFloor => next_v,
            DiscretizationScheme::FullTruncation => next_v.max(0.0),
        };
    }

    pub fn scheme_name(&self) -> &'static str {
        self.scheme.name()
    }
}
