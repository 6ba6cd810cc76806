// src/rng.rs
//! Random Number Generation for Heston Monte Carlo
//!
//! # Design
//!
//! Every parallel unit of work (a chunk of paths, a finite-difference leg) owns its
//! own generator. Generators are never shared between threads:
//! 1. **Reproducibility**: an explicit base seed fixes every stream
//! 2. **Parallel safety**: a stream is a pure function of `(base_seed, stream_id)`,
//!    so results do not depend on the number of worker threads
//! 3. **Production variability**: without a seed, the base seed is drawn from
//!    process entropy once per call
//!
//! # Stream Derivation
//!
//! Stream seeds are produced with the splitmix64 finaliser:
//! ```text
//! z = (z ⊕ (z >> 30)) * 0xbf58476d1ce4e5b9
//! z = (z ⊕ (z >> 27)) * 0x94d049bb133111eb
//! output = z ⊕ (z >> 31)
//! ```
//! and each stream is a ChaCha-based `StdRng` keyed by that seed.
//!
//! # Correlated Draws
//!
//! The Heston model needs two standard normals with correlation ρ per step.
//! With the Cholesky factor of the 2×2 correlation matrix:
//! ```text
//! L = | 1   0        |      Z₁ = Z₁
//!     | ρ   √(1-ρ²)  |      Z₂ = ρ·Z₁ + √(1-ρ²)·Z₂ʳᵃʷ
//! ```
//! so that corr(Z₁, Z₂) = ρ by construction.

use nalgebra::{Matrix2, Vector2};
use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::{Distribution, StandardNormal};

const GOLDEN_GAMMA: u64 = 0x9e37_79b9_7f4a_7c15;
const FORK_SALT: u64 = 0x6a09_e667_f3bc_c909;

fn splitmix64(seed: u64) -> u64 {
    let mut z = seed.wrapping_add(GOLDEN_GAMMA);
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58476d1ce4e5b9u64);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d049bb133111ebu64);
    z ^ (z >> 31)
}

/// Factory of independent random streams for one pricing call.
///
/// # Thread Safety
///
/// The factory itself is an immutable `Copy` value. Workers call
/// [`RngFactory::stream`] with their own id and get a generator nobody else holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RngFactory {
    base_seed: u64,
}

impl RngFactory {
    pub fn new(base_seed: u64) -> Self {
        Self { base_seed }
    }

    /// Factory seeded from the process entropy source.
    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    /// Seeded factory when `seed` is given, entropy-seeded otherwise.
    pub fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::new(seed),
            None => Self::from_entropy(),
        }
    }

    pub fn base_seed(&self) -> u64 {
        self.base_seed
    }

    /// Generator for a specific parallel unit (e.g. a chunk of paths).
    pub fn stream(&self, stream_id: u64) -> StdRng {
        StdRng::seed_from_u64(splitmix64(self.base_seed ^ splitmix64(stream_id)))
    }

    /// Child factory for an independent sub-computation such as a Greek leg.
    pub fn fork(&self, child_id: u64) -> RngFactory {
        RngFactory::new(splitmix64(
            self.base_seed.wrapping_add(splitmix64(child_id ^ FORK_SALT)),
        ))
    }
}

pub fn get_normal_draw<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    StandardNormal.sample(rng)
}

/// Produces pairs of correlated standard normal increments.
///
/// Every pair goes through the Cholesky factor `L`, so the matrix is the single
/// source of the correlation structure.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelatedDriver {
    factor: Matrix2<f64>,
}

impl CorrelatedDriver {
    /// `rho` is expected to be validated to [-1, 1].
    pub fn new(rho: f64) -> Self {
        let rho_bar = (1.0 - rho * rho).max(0.0).sqrt();
        Self {
            factor: Matrix2::new(1.0, 0.0, rho, rho_bar),
        }
    }

    pub fn rho(&self) -> f64 {
        self.factor[(1, 0)]
    }

    /// Lower-triangular Cholesky factor of the correlation matrix.
    pub fn cholesky_factor(&self) -> &Matrix2<f64> {
        &self.factor
    }

    /// Maps an independent pair `(z1, z2_raw)` to a correlated pair `L·z`.
    #[inline]
    pub fn correlate(&self, z1: f64, z2_raw: f64) -> (f64, f64) {
        let z = self.correlate_vector(Vector2::new(z1, z2_raw));
        (z[0], z[1])
    }

    #[inline]
    pub fn correlate_vector(&self, z: Vector2<f64>) -> Vector2<f64> {
        self.factor * z
    }

    /// Draws one correlated pair. `Z1` is drawn before `Z2raw`.
    #[inline]
    pub fn draw<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        let z1 = get_normal_draw(rng);
        let z2_raw = get_normal_draw(rng);
        self.correlate(z1, z2_raw)
    }

    /// Draws a full `num_paths × num_steps` grid of correlated pairs.
    ///
    /// Draws are taken path by path, step by step, in the same order as repeated
    /// calls to [`CorrelatedDriver::draw`].
    pub fn draw_matrix<R: Rng + ?Sized>(
        &self,
        num_paths: usize,
        num_steps: usize,
        rng: &mut R,
    ) -> CorrelatedDraws {
        let mut z1 = Array2::zeros((num_paths, num_steps));
        let mut z2 = Array2::zeros((num_paths, num_steps));
        for path in 0..num_paths {
            for step in 0..num_steps {
                let (a, b) = self.draw(rng);
                z1[[path, step]] = a;
                z2[[path, step]] = b;
            }
        }
        CorrelatedDraws { z1, z2 }
    }
}

/// Correlated normal draws, one row per path and one column per step.
#[derive(Debug, Clone)]
pub struct CorrelatedDraws {
    pub z1: Array2<f64>,
    pub z2: Array2<f64>,
}

impl CorrelatedDraws {
    /// `(num_paths, num_steps)`
    pub fn shape(&self) -> (usize, usize) {
        self.z1.dim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_stream_reproducibility() {
        let factory = RngFactory::new(42);

        let mut rng1 = factory.stream(0);
        let mut rng2 = factory.stream(0);

        for _ in 0..100 {
            assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
        }
    }

    #[test]
    fn test_different_streams_differ() {
        let factory = RngFactory::new(42);

        let mut rng1 = factory.stream(0);
        let mut rng2 = factory.stream(1);

        let vals1: Vec<u64> = (0..10).map(|_| rng1.gen()).collect();
        let vals2: Vec<u64> = (0..10).map(|_| rng2.gen()).collect();

        assert_ne!(vals1, vals2);
    }

    #[test]
    fn test_fork_is_deterministic_and_distinct() {
        let factory = RngFactory::new(7);
        assert_eq!(factory.fork(1), factory.fork(1));
        assert_ne!(factory.fork(1), factory.fork(2));
        assert_ne!(factory.fork(0), factory);
    }

    #[test]
    fn test_normal_distribution() {
        let mut rng = RngFactory::new(42).stream(0);

        let samples: Vec<f64> = (0..20_000).map(|_| get_normal_draw(&mut rng)).collect();

        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;

        assert!(mean.abs() < 0.05, "Mean should be close to 0, got {}", mean);
        assert!(
            (variance - 1.0).abs() < 0.05,
            "Variance should be close to 1, got {}",
            variance
        );
    }

    #[test]
    fn test_cholesky_factor_reproduces_correlation() {
        let driver = CorrelatedDriver::new(-0.5);
        let l = driver.cholesky_factor();
        let corr = l * l.transpose();

        assert_abs_diff_eq!(corr[(0, 0)], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[(1, 1)], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(corr[(0, 1)], -0.5, epsilon = 1e-12);

        let (a, b) = driver.correlate(0.3, -1.2);
        assert_abs_diff_eq!(a, 0.3, epsilon = 1e-15);
        assert_abs_diff_eq!(b, -0.5 * 0.3 + 0.75f64.sqrt() * -1.2, epsilon = 1e-15);
        assert_eq!(driver.rho(), -0.5);
    }

    #[test]
    fn test_draw_applies_cholesky_factor_to_raw_pair() {
        let driver = CorrelatedDriver::new(0.6);
        let mut rng_a = RngFactory::new(11).stream(2);
        let mut rng_b = RngFactory::new(11).stream(2);

        for _ in 0..50 {
            let (a, b) = driver.draw(&mut rng_a);
            let raw = Vector2::new(get_normal_draw(&mut rng_b), get_normal_draw(&mut rng_b));
            let expected = driver.cholesky_factor() * raw;
            assert_eq!(a, expected[0]);
            assert_eq!(b, expected[1]);
        }
    }

    #[test]
    fn test_perfect_correlation_has_no_idiosyncratic_part() {
        let driver = CorrelatedDriver::new(1.0);
        assert_eq!(driver.correlate(0.7, 5.0), (0.7, 0.7));

        let driver = CorrelatedDriver::new(-1.0);
        assert_eq!(driver.correlate(0.7, 5.0), (0.7, -0.7));
    }

    #[test]
    fn test_empirical_correlation() {
        let driver = CorrelatedDriver::new(-0.5);
        let mut rng = RngFactory::new(2024).stream(0);
        let draws = driver.draw_matrix(200, 100, &mut rng);
        assert_eq!(draws.shape(), (200, 100));

        let n = draws.z1.len() as f64;
        let mean1 = draws.z1.sum() / n;
        let mean2 = draws.z2.sum() / n;
        let cov = draws
            .z1
            .iter()
            .zip(draws.z2.iter())
            .map(|(a, b)| (a - mean1) * (b - mean2))
            .sum::<f64>()
            / n;
        let var1 = draws.z1.iter().map(|a| (a - mean1).powi(2)).sum::<f64>() / n;
        let var2 = draws.z2.iter().map(|b| (b - mean2).powi(2)).sum::<f64>() / n;
        let corr = cov / (var1 * var2).sqrt();

        assert!((corr + 0.5).abs() < 0.03, "Correlation should be near -0.5, got {}", corr);
    }

    #[test]
    fn test_draw_matrix_matches_sequential_draws() {
        let driver = CorrelatedDriver::new(0.3);
        let mut rng_a = RngFactory::new(5).stream(3);
        let mut rng_b = RngFactory::new(5).stream(3);

        let draws = driver.draw_matrix(3, 4, &mut rng_a);
        for path in 0..3 {
            for step in 0..4 {
                let (a, b) = driver.draw(&mut rng_b);
                assert_eq!(draws.z1[[path, step]], a);
                assert_eq!(draws.z2[[path, step]], b);
            }
        }
    }
}
