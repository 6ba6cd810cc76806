//! Upstream inputs to the pricer: model parameters from price history, and the
//! risk-free rate.
//!
//! These are heuristics, not calibration. The variance levels come from
//! historical volatility; `kappa`, `sigma` and `rho` are fixed defaults.

use crate::error::{PricingError, PricingResult};
use crate::models::heston::ModelParameters;
use statrs::statistics::Statistics;
use tracing::{debug, warn};

/// Rate used when no rate source is available (4%).
pub const FALLBACK_RISK_FREE_RATE: f64 = 0.04;

/// Supplies Heston parameters and the current spot for an underlying.
pub trait ParameterEstimator {
    fn estimate(&self, prices: &[f64]) -> PricingResult<ModelParameters>;
}

/// Supplies an annualised risk-free rate as a decimal.
pub trait RateFeed {
    fn risk_free_rate(&self) -> f64;
}

/// Constant rate source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedRate(pub f64);

impl Default for FixedRate {
    fn default() -> Self {
        FixedRate(FALLBACK_RISK_FREE_RATE)
    }
}

impl RateFeed for FixedRate {
    fn risk_free_rate(&self) -> f64 {
        self.0
    }
}

/// Historical-volatility heuristic over a daily price series (oldest first).
///
/// ```text
/// v0    = (std(last `recent_window` daily returns) · √365)²
/// theta = (std(all daily returns) · √365)²
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct HistoricalVolEstimator {
    pub recent_window: usize,
    pub periods_per_year: f64,
    pub kappa: f64,
    pub sigma: f64,
    pub rho: f64,
}

impl Default for HistoricalVolEstimator {
    fn default() -> Self {
        Self {
            recent_window: 30,
            periods_per_year: 365.0,
            kappa: 2.0,
            sigma: 0.5,
            rho: -0.5,
        }
    }
}

impl HistoricalVolEstimator {
    /// Parameters used when the history is too short to estimate anything.
    pub fn fallback() -> ModelParameters {
        ModelParameters {
            spot: 100.0,
            v0: 0.04,
            theta: 0.04,
            kappa: 2.0,
            sigma: 0.3,
            rho: -0.5,
        }
    }

    fn annualised_variance(&self, returns: &[f64]) -> f64 {
        let vol = returns.std_dev() * self.periods_per_year.sqrt();
        vol * vol
    }
}

impl ParameterEstimator for HistoricalVolEstimator {
    fn estimate(&self, prices: &[f64]) -> PricingResult<ModelParameters> {
        if let Some(&bad) = prices.iter().find(|p| !p.is_finite() || **p <= 0.0) {
            return Err(PricingError::InvalidParameter {
                parameter: "prices",
                value: bad,
                constraint: "historical prices must be positive and finite".to_string(),
            });
        }

        if prices.len() < 3 {
            warn!(
                observations = prices.len(),
                "price history too short, using fallback Heston parameters"
            );
            return Ok(Self::fallback());
        }

        let returns: Vec<f64> = prices.windows(2).map(|w| w[1] / w[0] - 1.0).collect();
        let recent = &returns[returns.len().saturating_sub(self.recent_window.max(2))..];

        let params = ModelParameters {
            spot: prices[prices.len() - 1],
            v0: self.annualised_variance(recent),
            theta: self.annualised_variance(&returns),
            kappa: self.kappa,
            sigma: self.sigma,
            rho: self.rho,
        };
        params.validate()?;

        debug!(
            spot = params.spot,
            v0 = params.v0,
            theta = params.theta,
            observations = prices.len(),
            "estimated Heston parameters from price history"
        );
        Ok(params)
    }
}
