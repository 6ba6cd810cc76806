//! Finite-Difference Greeks
//!
//! # Mathematical Framework
//!
//! With `dS = 1% · S₀` and `dT = 1/365` (one calendar day):
//! ```text
//! Δ = [P(S₀ + dS) - P(S₀ - dS)] / (2 dS)
//! Γ = [P(S₀ + dS) - 2 P(S₀) + P(S₀ - dS)] / dS²
//! Θ = [P(T - dT) - P(T)] / dT        if T > dT, else 0
//! ```
//!
//! # Random Numbers
//!
//! By default each of the four prices is an independent resimulation with its own
//! streams, so each Greek carries the full noise of its legs. [`RandomNumbers::Common`]
//! replays the same streams in every leg instead (common random numbers), which
//! cancels most of that noise in the differences.
//!
//! The legs share no mutable state and run concurrently through `rayon::join`.

use crate::error::{validation::*, PricingError, PricingResult};
use crate::mc::mc_engine::{price_with_factory, PriceEstimate, SimulationConfig};
use crate::mc::payoffs::ContractSpec;
use crate::models::heston::ModelParameters;
use crate::rng::RngFactory;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Relative spot bump for Delta and Gamma.
pub const SPOT_BUMP_FRACTION: f64 = 0.01;

/// Maturity bump for Theta, in years.
pub const THETA_BUMP_YEARS: f64 = 1.0 / 365.0;

bitflags! {
    /// Which sensitivities to estimate.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct GreekSet: u32 {
        const DELTA = 1 << 0;
        const GAMMA = 1 << 1;
        const THETA = 1 << 2;
        const ALL = Self::DELTA.bits() | Self::GAMMA.bits() | Self::THETA.bits();
    }
}

/// Random stream policy across finite-difference legs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RandomNumbers {
    /// Every leg draws fresh, independent numbers.
    #[default]
    Independent,
    /// Every leg replays the base leg's numbers.
    Common,
}

#[derive(Clone, Copy, Debug)]
enum Leg {
    Base = 0,
    SpotUp = 1,
    SpotDown = 2,
    Decay = 3,
}

/// Price and finite-difference sensitivities.
///
/// Greeks that were not requested are reported as 0.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GreeksResult {
    pub price: f64,
    pub delta: f64,
    pub gamma: f64,
    /// Price change per year of elapsed time
    pub theta: f64,
    /// Standard error of the base price
    pub std_error: f64,
    /// Paths simulated per leg
    pub num_paths: usize,
}

/// Price, Delta, Gamma and Theta of a European option under the Heston model.
///
/// Each leg uses `config.greeks_paths()` paths.
pub fn greeks(
    params: &ModelParameters,
    contract: &ContractSpec,
    config: &SimulationConfig,
) -> PricingResult<GreeksResult> {
    greeks_with(params, contract, config, GreekSet::ALL)
}

/// Like [`greeks`], simulating only the legs needed for `set`.
pub fn greeks_with(
    params: &ModelParameters,
    contract: &ContractSpec,
    config: &SimulationConfig,
    set: GreekSet,
) -> PricingResult<GreeksResult> {
    params.validate()?;
    contract.validate()?;
    config.validate()?;
    let num_paths = config.greeks_paths();
    validate_paths("greeks_paths", num_paths)?;

    let spot = params.spot;
    let ds = SPOT_BUMP_FRACTION * spot;
    let dt = THETA_BUMP_YEARS;
    let need_spot_legs = set.intersects(GreekSet::DELTA | GreekSet::GAMMA);
    let need_decay_leg = set.contains(GreekSet::THETA) && contract.maturity > dt;

    let factory = RngFactory::from_seed(config.seed);
    let leg_factory = |leg: Leg| match config.random_numbers {
        RandomNumbers::Independent => factory.fork(leg as u64),
        RandomNumbers::Common => factory,
    };
    let run = |leg: Leg, p: &ModelParameters, c: &ContractSpec| -> PricingResult<PriceEstimate> {
        let estimate = price_with_factory(p, c, config, num_paths, &leg_factory(leg))?;
        trace!(?leg, spot = p.spot, maturity = c.maturity, price = estimate.price, "greek leg");
        Ok(estimate)
    };

    let up_params = params.with_spot(spot + ds);
    let down_params = params.with_spot(spot - ds);
    let decayed_contract = contract.with_maturity(contract.maturity - dt);

    let ((base, up), (down, decayed)) = rayon::join(
        || {
            rayon::join(
                || run(Leg::Base, params, contract),
                || {
                    need_spot_legs
                        .then(|| run(Leg::SpotUp, &up_params, contract))
                        .transpose()
                },
            )
        },
        || {
            rayon::join(
                || {
                    need_spot_legs
                        .then(|| run(Leg::SpotDown, &down_params, contract))
                        .transpose()
                },
                || {
                    need_decay_leg
                        .then(|| run(Leg::Decay, params, &decayed_contract))
                        .transpose()
                },
            )
        },
    );
    let base = base?;
    let up = up?;
    let down = down?;
    let decayed = decayed?;

    let (delta, gamma) = match (up, down) {
        (Some(up), Some(down)) => {
            let delta = if set.contains(GreekSet::DELTA) {
                (up.price - down.price) / (2.0 * ds)
            } else {
                0.0
            };
            let gamma = if set.contains(GreekSet::GAMMA) {
                // Difference of one-sided slopes; dividing by ds twice avoids ds² underflow
                ((up.price - base.price) / ds - (base.price - down.price) / ds) / ds
            } else {
                0.0
            };
            (delta, gamma)
        }
        _ => (0.0, 0.0),
    };

    let theta = match decayed {
        Some(decayed) => (decayed.price - base.price) / dt,
        None => 0.0,
    };

    ensure_finite("delta", delta)?;
    ensure_finite("gamma", gamma)?;
    ensure_finite("theta", theta)?;

    debug!(
        price = base.price,
        delta,
        gamma,
        theta,
        paths_per_leg = num_paths,
        random_numbers = ?config.random_numbers,
        "Heston finite-difference Greeks"
    );

    Ok(GreeksResult {
        price: base.price,
        delta,
        gamma,
        theta,
        std_error: base.std_error,
        num_paths,
    })
}

fn ensure_finite(greek: &str, value: f64) -> PricingResult<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(PricingError::NumericalAnomaly {
            method: "finite-difference Greeks",
            reason: format!("{} is not finite: {}", greek, value),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mc::payoffs::OptionType;

    fn config() -> SimulationConfig {
        SimulationConfig {
            num_paths: 2_000,
            num_steps: 20,
            ..Default::default()
        }
        .with_seed(7)
    }

    #[test]
    fn test_theta_is_zero_inside_last_day() {
        let params = ModelParameters::default();
        for maturity in [0.0, 0.5 / 365.0, 1.0 / 365.0] {
            let contract = ContractSpec::new(100.0, maturity, OptionType::Call, 0.05);
            let result = greeks(&params, &contract, &config()).unwrap();
            assert_eq!(result.theta, 0.0, "maturity {}", maturity);
        }
    }

    #[test]
    fn test_unrequested_greeks_are_zero() {
        let params = ModelParameters::default();
        let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, 0.05);

        let only_theta = greeks_with(&params, &contract, &config(), GreekSet::THETA).unwrap();
        assert_eq!(only_theta.delta, 0.0);
        assert_eq!(only_theta.gamma, 0.0);
        assert_ne!(only_theta.theta, 0.0);

        let only_delta = greeks_with(&params, &contract, &config(), GreekSet::DELTA).unwrap();
        assert_ne!(only_delta.delta, 0.0);
        assert_eq!(only_delta.gamma, 0.0);
        assert_eq!(only_delta.theta, 0.0);
    }

    #[test]
    fn test_price_leg_matches_standalone_price_with_common_numbers() {
        let params = ModelParameters::default();
        let contract = ContractSpec::new(100.0, 1.0, OptionType::Put, 0.05);
        let cfg = SimulationConfig {
            random_numbers: RandomNumbers::Common,
            greeks_path_multiplier: 1,
            ..config()
        };

        let result = greeks(&params, &contract, &cfg).unwrap();
        let standalone = crate::mc::mc_engine::price(&params, &contract, &cfg).unwrap();
        assert_eq!(result.price, standalone.price);
        assert_eq!(result.num_paths, 2_000);
    }

    #[test]
    fn test_rejects_path_overflow() {
        let cfg = SimulationConfig {
            num_paths: crate::error::validation::MAX_PATHS,
            ..config()
        };
        let params = ModelParameters::default();
        let contract = ContractSpec::new(100.0, 1.0, OptionType::Call, 0.05);
        let err = greeks(&params, &contract, &cfg).unwrap_err();
        assert_eq!(err.field(), Some("greeks_paths"));
    }

    #[test]
    fn test_non_finite_greek_is_anomaly() {
        assert!(ensure_finite("gamma", 0.02).is_ok());
        for value in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
            let err = ensure_finite("gamma", value).unwrap_err();
            assert!(!err.is_validation());
            assert!(matches!(
                err,
                PricingError::NumericalAnomaly { method: "finite-difference Greeks", .. }
            ));
        }
    }

    #[test]
    fn test_greek_set_flags() {
        assert!(GreekSet::ALL.contains(GreekSet::DELTA | GreekSet::GAMMA | GreekSet::THETA));
        assert!(!GreekSet::THETA.intersects(GreekSet::DELTA | GreekSet::GAMMA));
    }
}
