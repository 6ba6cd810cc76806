//! Pricing requests loaded from TOML.
//!
//! ```toml
//! [model]
//! spot = 100.0
//! v0 = 0.04
//! theta = 0.04
//! kappa = 2.0
//! sigma = 0.3
//! rho = -0.5
//!
//! [contract]
//! strike = 100.0
//! maturity = 1.0
//! option_type = "call"
//! risk_free_rate = 0.05
//!
//! # Optional; missing fields take their defaults
//! [simulation]
//! num_paths = 50000
//! seed = 42
//! scheme = "full_truncation"
//! ```

use crate::error::{PricingError, PricingResult};
use crate::mc::greeks::{greeks, GreeksResult};
use crate::mc::mc_engine::{price, PriceEstimate, SimulationConfig};
use crate::mc::payoffs::ContractSpec;
use crate::models::heston::ModelParameters;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failure to load a [`PricingRequest`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse pricing request: {0}")]
    Parse(#[from] toml::de::Error),

    #[error(transparent)]
    Invalid(#[from] PricingError),
}

/// One complete set of pricing inputs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRequest {
    pub model: ModelParameters,
    pub contract: ContractSpec,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl PricingRequest {
    /// Parses and validates a request.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let request: PricingRequest = toml::from_str(input)?;
        request.validate()?;
        Ok(request)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&input)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    /// Validates every section.
    ///
    /// TOML integers are signed 64-bit, so a seed above `i64::MAX` is rejected here
    /// rather than failing later in [`PricingRequest::to_toml_string`].
    pub fn validate(&self) -> PricingResult<()> {
        self.model.validate()?;
        self.contract.validate()?;
        self.simulation.validate()?;
        if let Some(seed) = self.simulation.seed {
            if i64::try_from(seed).is_err() {
                return Err(PricingError::InvalidConfiguration {
                    field: "seed",
                    reason: format!(
                        "{} does not fit in a TOML integer (max {})",
                        seed,
                        i64::MAX
                    ),
                });
            }
        }
        Ok(())
    }

    pub fn price(&self) -> PricingResult<PriceEstimate> {
        price(&self.model, &self.contract, &self.simulation)
    }

    pub fn greeks(&self) -> PricingResult<GreeksResult> {
        greeks(&self.model, &self.contract, &self.simulation)
    }
}
