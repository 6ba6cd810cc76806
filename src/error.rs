// src/error.rs
use thiserror::Error;

/// Errors raised by the pricing engine.
///
/// `InvalidParameter` and `InvalidConfiguration` are validation failures: they are
/// returned before any path is simulated and name the offending field.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PricingError {
    /// Invalid model or contract value
    #[error("Invalid parameter '{parameter}' = {value}: {constraint}")]
    InvalidParameter {
        parameter: &'static str,
        value: f64,
        constraint: String,
    },

    /// Invalid simulation configuration
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },

    /// Non-finite value produced by the simulation
    #[error("Numerical anomaly in {method}: {reason}")]
    NumericalAnomaly { method: &'static str, reason: String },
}

impl PricingError {
    /// True for errors raised by input validation.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            PricingError::InvalidParameter { .. } | PricingError::InvalidConfiguration { .. }
        )
    }

    /// Name of the rejected field, if this is a validation error.
    pub fn field(&self) -> Option<&'static str> {
        match self {
            PricingError::InvalidParameter { parameter, .. } => Some(parameter),
            PricingError::InvalidConfiguration { field, .. } => Some(field),
            PricingError::NumericalAnomaly { .. } => None,
        }
    }
}

/// Result type alias for pricing operations
pub type PricingResult<T> = Result<T, PricingError>;

/// Validation utilities
pub mod validation {
    use super::{PricingError, PricingResult};

    /// Maximum number of simulated paths per call.
    pub const MAX_PATHS: usize = 100_000_000;

    /// Maximum number of time steps per path.
    pub const MAX_STEPS: usize = 100_000;

    /// Validate that a value is finite and not NaN
    pub fn validate_finite(name: &'static str, value: f64) -> PricingResult<()> {
        if !value.is_finite() {
            Err(PricingError::InvalidParameter {
                parameter: name,
                value,
                constraint: "must be finite (not NaN or infinite)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is positive
    pub fn validate_positive(name: &'static str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value <= 0.0 {
            Err(PricingError::InvalidParameter {
                parameter: name,
                value,
                constraint: "must be positive (> 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is non-negative
    pub fn validate_non_negative(name: &'static str, value: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value < 0.0 {
            Err(PricingError::InvalidParameter {
                parameter: name,
                value,
                constraint: "must be non-negative (≥ 0)".to_string(),
            })
        } else {
            Ok(())
        }
    }

    /// Validate that a parameter is within a closed range
    pub fn validate_range(name: &'static str, value: f64, min: f64, max: f64) -> PricingResult<()> {
        validate_finite(name, value)?;
        if value < min || value > max {
            Err(PricingError::InvalidParameter {
                parameter: name,
                value,
                constraint: format!("must be in range [{}, {}]", min, max),
            })
        } else {
            Ok(())
        }
    }

    /// Validate correlation parameter
    pub fn validate_correlation(name: &'static str, rho: f64) -> PricingResult<()> {
        validate_range(name, rho, -1.0, 1.0)
    }

    /// Validate paths count
    pub fn validate_paths(field: &'static str, paths: usize) -> PricingResult<()> {
        if paths == 0 {
            Err(PricingError::InvalidConfiguration {
                field,
                reason: "must be greater than 0".to_string(),
            })
        } else if paths > MAX_PATHS {
            Err(PricingError::InvalidConfiguration {
                field,
                reason: format!("exceeds maximum allowed ({})", MAX_PATHS),
            })
        } else {
            Ok(())
        }
    }

    /// Validate steps count
    pub fn validate_steps(field: &'static str, steps: usize) -> PricingResult<()> {
        if steps == 0 {
            Err(PricingError::InvalidConfiguration {
                field,
                reason: "must be greater than 0".to_string(),
            })
        } else if steps > MAX_STEPS {
            Err(PricingError::InvalidConfiguration {
                field,
                reason: format!("exceeds maximum allowed ({})", MAX_STEPS),
            })
        } else {
            Ok(())
        }
    }
}
