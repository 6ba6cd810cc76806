//! Option Contracts and Payoff Functions
//!
//! # Mathematical Definitions
//!
//! European options depend on the terminal price S_T only:
//! - **Call**: max(S_T - K, 0) - right to buy at strike K
//! - **Put**: max(K - S_T, 0) - right to sell at strike K

use crate::error::{validation::*, PricingResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Days per year used to convert day counts to year fractions.
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Exercise right of a European option
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    #[default]
    Call,
    Put,
}

impl OptionType {
    /// Terminal payoff for a single price, never negative.
    #[inline]
    pub fn payoff(&self, terminal_price: f64, strike: f64) -> f64 {
        match self {
            OptionType::Call => (terminal_price - strike).max(0.0),
            OptionType::Put => (strike - terminal_price).max(0.0),
        }
    }
}

impl fmt::Display for OptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionType::Call => write!(f, "call"),
            OptionType::Put => write!(f, "put"),
        }
    }
}

impl FromStr for OptionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "call" | "c" => Ok(OptionType::Call),
            "put" | "p" => Ok(OptionType::Put),
            other => Err(format!("unknown option type '{}': expected call or put", other)),
        }
    }
}

/// European option contract plus the rate used to discount it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ContractSpec {
    pub strike: f64,
    /// Time to expiry in years
    pub maturity: f64,
    pub option_type: OptionType,
    /// Annualised continuously-compounded rate, e.g. 0.04 for 4%
    pub risk_free_rate: f64,
}

impl ContractSpec {
    pub fn new(strike: f64, maturity: f64, option_type: OptionType, risk_free_rate: f64) -> Self {
        Self {
            strike,
            maturity,
            option_type,
            risk_free_rate,
        }
    }

    /// Contract expiring `days` calendar days from now.
    pub fn from_days(days: f64, strike: f64, option_type: OptionType, risk_free_rate: f64) -> Self {
        Self::new(strike, days / DAYS_PER_YEAR, option_type, risk_free_rate)
    }

    /// Non-positive maturities are accepted; they price as immediate expiry.
    pub fn validate(&self) -> PricingResult<()> {
        validate_positive("strike", self.strike)?;
        validate_finite("maturity", self.maturity)?;
        validate_finite("risk_free_rate", self.risk_free_rate)?;
        Ok(())
    }

    /// Maturity floored at zero.
    pub fn effective_maturity(&self) -> f64 {
        self.maturity.max(0.0)
    }

    pub fn is_expired(&self) -> bool {
        self.maturity <= 0.0
    }

    pub fn discount_factor(&self) -> f64 {
        (-self.risk_free_rate * self.effective_maturity()).exp()
    }

    #[inline]
    pub fn payoff(&self, terminal_price: f64) -> f64 {
        self.option_type.payoff(terminal_price, self.strike)
    }

    /// Copy of this contract with a different maturity.
    pub fn with_maturity(&self, maturity: f64) -> Self {
        Self { maturity, ..*self }
    }
}

/// Act/365 year fraction between two dates (negative if `expiry` is earlier).
pub fn year_fraction_act365(valuation: NaiveDate, expiry: NaiveDate) -> f64 {
    (expiry - valuation).num_days() as f64 / DAYS_PER_YEAR
}

/// Payoff-at-expiry profile around `spot`.
///
/// Spots run from 80% of `spot` up to, but excluding, 120% in steps of 1%.
pub fn payoff_grid(contract: &ContractSpec, spot: f64) -> Vec<(f64, f64)> {
    let step = 0.01 * spot;
    (0..40)
        .map(|i| {
            let s = 0.8 * spot + i as f64 * step;
            (s, contract.payoff(s))
        })
        .collect()
}
