// src/mc/mc_engine.rs
use crate::error::{validation::*, PricingError, PricingResult};
use crate::math_utils::{RunningStats, Timer};
use crate::mc::greeks::RandomNumbers;
use crate::mc::paths;
use crate::mc::payoffs::ContractSpec;
use crate::models::heston::{DiscretizationScheme, Heston, ModelParameters};
use crate::rng::RngFactory;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Simulation budget and numerical policy for a pricing call.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub num_paths: usize,
    pub num_steps: usize,
    /// Base seed; `None` draws one from process entropy on every call.
    pub seed: Option<u64>,
    pub scheme: DiscretizationScheme,
    /// Paths per parallel work unit (and per random stream).
    pub batch_size: usize,
    /// Greek legs simulate `num_paths * greeks_path_multiplier` paths each.
    pub greeks_path_multiplier: usize,
    pub random_numbers: RandomNumbers,
}

impl SimulationConfig {
    /// Validate the simulation configuration
    pub fn validate(&self) -> PricingResult<()> {
        validate_paths("num_paths", self.num_paths)?;
        validate_steps("num_steps", self.num_steps)?;

        if self.batch_size == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "batch_size",
                reason: "must be greater than 0".to_string(),
            });
        }
        if self.greeks_path_multiplier == 0 {
            return Err(PricingError::InvalidConfiguration {
                field: "greeks_path_multiplier",
                reason: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Paths used by each finite-difference leg.
    pub fn greeks_paths(&self) -> usize {
        self.num_paths.saturating_mul(self.greeks_path_multiplier)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            num_paths: 10_000,
            num_steps: 100,
            seed: None,
            scheme: DiscretizationScheme::PartialFloor,
            batch_size: 1024,
            greeks_path_multiplier: 2,
            random_numbers: RandomNumbers::Independent,
        }
    }
}

/// Discounted Monte Carlo price.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceEstimate {
    pub price: f64,
    /// Discounted sample standard deviation of payoffs over `√num_paths`
    pub std_error: f64,
    pub num_paths: usize,
}

impl PriceEstimate {
    /// Two-sided 95% normal confidence interval.
    pub fn confidence_interval_95(&self) -> (f64, f64) {
        let half_width = 1.96 * self.std_error;
        (self.price - half_width, self.price + half_width)
    }
}

/// Monte Carlo price of a European option under the Heston model
///
/// # Algorithm
///
/// ```text
/// draw → simulate (Euler–Maruyama, num_steps) → payoff(S_T) → e^(-rT) · mean
/// ```
///
/// Every call builds fresh paths; nothing is cached between calls. With
/// `config.seed = Some(_)` the result is bit-for-bit reproducible.
///
/// # Errors
///
/// Returns `PricingError` for:
/// - Invalid model, contract or configuration values (before any simulation)
/// - A non-finite price estimate
pub fn price(
    params: &ModelParameters,
    contract: &ContractSpec,
    config: &SimulationConfig,
) -> PricingResult<PriceEstimate> {
    params.validate()?;
    contract.validate()?;
    config.validate()?;

    let factory = RngFactory::from_seed(config.seed);
    if config.seed.is_none() {
        debug!(base_seed = factory.base_seed(), "unseeded run");
    }
    price_with_factory(params, contract, config, config.num_paths, &factory)
}

/// Prices with an explicit stream factory and path count; inputs must be validated.
pub(crate) fn price_with_factory(
    params: &ModelParameters,
    contract: &ContractSpec,
    config: &SimulationConfig,
    num_paths: usize,
    factory: &RngFactory,
) -> PricingResult<PriceEstimate> {
    if contract.is_expired() {
        warn!(
            maturity = contract.maturity,
            "non-positive maturity, pricing at intrinsic value"
        );
        return Ok(PriceEstimate {
            price: contract.payoff(params.spot),
            std_error: 0.0,
            num_paths,
        });
    }

    let timer = Timer::new();
    let model = Heston::new_with_scheme(*params, contract.risk_free_rate, config.scheme)?;
    let terminals = paths::simulate_terminal_prices(
        &model,
        contract.maturity,
        config.num_steps,
        num_paths,
        config.batch_size,
        factory,
    );

    // Statistics run on payoffs in units of the strike so squared deviations stay
    // in range at any price scale. Chunks are collected in order so the merge is
    // deterministic.
    let unit = contract.strike;
    let chunk_stats: Vec<RunningStats> = terminals
        .par_chunks(config.batch_size)
        .map(|chunk| chunk.iter().map(|&s| contract.payoff(s) / unit).collect())
        .collect();
    let stats = chunk_stats
        .iter()
        .fold(RunningStats::new(), |acc, s| acc.merge(s));

    let discount = contract.discount_factor();
    let estimate = PriceEstimate {
        price: discount * unit * stats.mean(),
        std_error: discount * unit * stats.std_error(),
        num_paths,
    };

    if !estimate.price.is_finite() {
        return Err(PricingError::NumericalAnomaly {
            method: "Monte Carlo",
            reason: format!("Price estimate is not finite: {}", estimate.price),
        });
    }
    if !estimate.std_error.is_finite() {
        return Err(PricingError::NumericalAnomaly {
            method: "Monte Carlo",
            reason: format!("Standard error is not finite: {}", estimate.std_error),
        });
    }

    debug!(
        paths = num_paths,
        steps = config.num_steps,
        scheme = model.scheme_name(),
        price = estimate.price,
        std_error = estimate.std_error,
        elapsed_ms = timer.elapsed_ms(),
        "Heston Monte Carlo price"
    );

    Ok(estimate)
}
