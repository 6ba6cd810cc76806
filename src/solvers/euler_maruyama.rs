// src/solvers/euler_maruyama.rs
//! Euler-Maruyama Path Evolution for the Heston Model
//!
//! # Mathematical Framework
//!
//! For the two-factor system `X = (S, v)` the scheme applies
//! ```text
//! X_{n+1} = X_n + a(X_n) Δt + b(X_n) ΔW_n,    ΔW_n = √Δt (Z₁, Z₂)
//! ```
//! over `num_steps` equal increments `Δt = T / num_steps`, with the price advanced
//! in log space (see [`Heston::step`]).
//!
//! # Convergence Properties
//!
//! - **Strong convergence**: Order 0.5 in step size
//! - **Weak convergence**: Order 1.0 in step size (for smooth coefficients)
//!
//! Two entry points share the same draw order, one correlated pair per step:
//! - [`EulerMaruyama::simulate_terminal`] keeps only the current state (O(1) memory)
//! - [`EulerMaruyama::simulate_path`] writes every intermediate state

use crate::models::heston::{Heston, StepSize};
use crate::rng::CorrelatedDriver;
use ndarray::{ArrayView1, ArrayViewMut1};
use rand::Rng;

/// Euler-Maruyama integrator for the joint price/variance process
pub struct EulerMaruyama;

impl EulerMaruyama {
    /// Simulates one path and returns its terminal price.
    ///
    /// With a zero step the path never moves, so no draws are consumed.
    pub fn simulate_terminal<R: Rng + ?Sized>(
        model: &Heston,
        driver: &CorrelatedDriver,
        step: StepSize,
        num_steps: usize,
        rng: &mut R,
    ) -> f64 {
        let mut s = model.params.spot;
        if step.is_degenerate() {
            return s;
        }

        let mut v = model.params.v0;
        for _ in 0..num_steps {
            let (z1, z2) = driver.draw(rng);
            model.step(&mut s, &mut v, step, z1, z2);
        }
        s
    }

    /// Simulates one path from pre-drawn correlated increments, recording all states.
    ///
    /// `prices` and `variances` must hold `z1.len() + 1` entries; index 0 receives the
    /// initial state.
    pub fn simulate_path(
        model: &Heston,
        step: StepSize,
        z1: ArrayView1<f64>,
        z2: ArrayView1<f64>,
        mut prices: ArrayViewMut1<f64>,
        mut variances: ArrayViewMut1<f64>,
    ) {
        debug_assert_eq!(prices.len(), z1.len() + 1);
        debug_assert_eq!(variances.len(), z1.len() + 1);

        let mut s = model.params.spot;
        let mut v = model.params.v0;
        prices[0] = s;
        variances[0] = v;

        for (n, (&a, &b)) in z1.iter().zip(z2.iter()).enumerate() {
            model.step(&mut s, &mut v, step, a, b);
            prices[n + 1] = s;
            variances[n + 1] = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::heston::ModelParameters;
    use crate::rng::RngFactory;
    use ndarray::Array1;

    #[test]
    fn test_terminal_matches_recorded_path() {
        let model = Heston::new(ModelParameters::default(), 0.05).expect("Valid parameters");
        let driver = CorrelatedDriver::new(model.params.rho);
        let step = StepSize::new(1.0, 50);

        let mut rng = RngFactory::new(11).stream(0);
        let terminal = EulerMaruyama::simulate_terminal(&model, &driver, step, 50, &mut rng);

        let mut rng = RngFactory::new(11).stream(0);
        let draws = driver.draw_matrix(1, 50, &mut rng);
        let mut prices = Array1::zeros(51);
        let mut variances = Array1::zeros(51);
        EulerMaruyama::simulate_path(
            &model,
            step,
            draws.z1.row(0),
            draws.z2.row(0),
            prices.view_mut(),
            variances.view_mut(),
        );

        assert_eq!(prices[0], 100.0);
        assert_eq!(variances[0], 0.04);
        assert_eq!(prices[50], terminal);
        assert!(prices.iter().all(|p| *p > 0.0));
    }

    #[test]
    fn test_degenerate_step_returns_spot() {
        let model = Heston::new(ModelParameters::default(), 0.05).expect("Valid parameters");
        let driver = CorrelatedDriver::new(model.params.rho);
        let step = StepSize::new(0.0, 10);

        let mut rng = RngFactory::new(1).stream(0);
        let terminal = EulerMaruyama::simulate_terminal(&model, &driver, step, 10, &mut rng);
        assert_eq!(terminal, 100.0);
    }
}
