// src/analytics/bs_analytic.rs
//! Analytical Black-Scholes formulas for European options and Greeks
//!
//! # Mathematical Foundation
//!
//! Under the Black-Scholes model, the underlying asset follows:
//! ```text
//! dS_t = r S_t dt + σ S_t dW_t
//! ```
//!
//! A Heston model with zero vol-of-vol and `v0 = θ` has constant variance θ,
//! so its prices and Greeks reduce to these formulas with `σ = √θ`. They serve
//! as the reference for the Monte Carlo engine in that limit.

use crate::math_utils::norm_cdf;
use crate::mc::payoffs::OptionType;
use std::f64::consts::PI;

/// Standard normal probability density function
///
/// # Formula
/// ```text
/// φ(x) = (1/√(2π)) * exp(-x²/2)
/// ```
fn norm_pdf(x: f64) -> f64 {
    (1.0 / (2.0 * PI).sqrt()) * (-0.5 * x * x).exp()
}

/// ```text
/// d₁ = [ln(S/K) + (r + σ²/2)T] / (σ√T)
/// d₂ = d₁ - σ√T
/// ```
fn d1_d2(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> (f64, f64) {
    let d1 = ((s / k).ln() + (r + 0.5 * sigma * sigma) * t) / (sigma * t.sqrt());
    (d1, d1 - sigma * t.sqrt())
}

/// Black-Scholes European option price
///
/// # Formula
/// ```text
/// C = S*Φ(d₁) - K*e^(-rT)*Φ(d₂)
/// P = K*e^(-rT)*Φ(-d₂) - S*Φ(-d₁)
/// ```
pub fn bs_price(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    let df = (-r * t).exp();
    match option_type {
        OptionType::Call => s * norm_cdf(d1) - k * df * norm_cdf(d2),
        OptionType::Put => k * df * norm_cdf(-d2) - s * norm_cdf(-d1),
    }
}

/// Black-Scholes Delta (∂V/∂S)
///
/// # Formula
/// ```text
/// Δ_call = Φ(d₁)
/// Δ_put  = Φ(d₁) - 1
/// ```
pub fn bs_delta(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, _) = d1_d2(s, k, r, sigma, t);
    match option_type {
        OptionType::Call => norm_cdf(d1),
        OptionType::Put => norm_cdf(d1) - 1.0,
    }
}

/// Black-Scholes Gamma (∂²V/∂S²), identical for calls and puts
///
/// # Formula
/// ```text
/// Γ = φ(d₁) / (S * σ * √T)
/// ```
pub fn bs_gamma(s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, _) = d1_d2(s, k, r, sigma, t);
    norm_pdf(d1) / (s * sigma * t.sqrt())
}

/// Black-Scholes Theta (-∂V/∂T), per year
///
/// # Formula
/// ```text
/// Θ_call = -S*φ(d₁)*σ/(2√T) - r*K*e^(-rT)*Φ(d₂)
/// Θ_put  = -S*φ(d₁)*σ/(2√T) + r*K*e^(-rT)*Φ(-d₂)
/// ```
pub fn bs_theta(option_type: OptionType, s: f64, k: f64, r: f64, sigma: f64, t: f64) -> f64 {
    let (d1, d2) = d1_d2(s, k, r, sigma, t);
    let decay = (-s * norm_pdf(d1) * sigma) / (2.0 * t.sqrt());
    let carry = r * k * (-r * t).exp();
    match option_type {
        OptionType::Call => decay - carry * norm_cdf(d2),
        OptionType::Put => decay + carry * norm_cdf(-d2),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const S: f64 = 100.0;
    const K: f64 = 100.0;
    const R: f64 = 0.05;
    const SIGMA: f64 = 0.2;
    const T: f64 = 1.0;

    #[test]
    fn test_prices() {
        assert_relative_eq!(
            bs_price(OptionType::Call, S, K, R, SIGMA, T),
            10.450583572185565,
            epsilon = 1e-8
        );
        assert_relative_eq!(
            bs_price(OptionType::Put, S, K, R, SIGMA, T),
            5.573526022256971,
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_put_call_parity() {
        let call = bs_price(OptionType::Call, 110.0, K, R, 0.3, 0.5);
        let put = bs_price(OptionType::Put, 110.0, K, R, 0.3, 0.5);
        assert_relative_eq!(call - put, 110.0 - K * (-R * 0.5f64).exp(), epsilon = 1e-10);
    }

    #[test]
    fn test_greeks() {
        assert_relative_eq!(
            bs_delta(OptionType::Call, S, K, R, SIGMA, T),
            0.6368306511756191,
            epsilon = 1e-8
        );
        assert_relative_eq!(
            bs_delta(OptionType::Put, S, K, R, SIGMA, T),
            0.6368306511756191 - 1.0,
            epsilon = 1e-8
        );
        assert_relative_eq!(bs_gamma(S, K, R, SIGMA, T), 0.018762017345847, epsilon = 1e-8);
        assert_relative_eq!(
            bs_theta(OptionType::Call, S, K, R, SIGMA, T),
            -6.414027546438197,
            epsilon = 1e-8
        );
    }

    #[test]
    fn test_put_theta_parity() {
        // Θ_call - Θ_put = -r K e^(-rT)
        let diff = bs_theta(OptionType::Call, S, K, R, SIGMA, T)
            - bs_theta(OptionType::Put, S, K, R, SIGMA, T);
        assert_relative_eq!(diff, -R * K * (-R * T).exp(), epsilon = 1e-10);
    }
}
