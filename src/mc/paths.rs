//! Path Simulation
//!
//! Paths are partitioned into fixed-size chunks. Chunk `c` draws from stream `c` of
//! the [`RngFactory`], so a seeded simulation is bit-for-bit identical whatever the
//! number of rayon workers, and no generator is shared across threads.
//!
//! - [`simulate_terminal_prices`]: streaming, O(num_paths) memory, used for pricing
//! - [`simulate_path_batch`]: keeps every intermediate state, O(num_paths × num_steps)

use crate::models::heston::{Heston, StepSize};
use crate::rng::{CorrelatedDriver, RngFactory};
use crate::solvers::euler_maruyama::EulerMaruyama;
use ndarray::{Array1, Array2, ArrayView1, Axis};
use rayon::prelude::*;

/// Full simulated history: one row per path, `num_steps + 1` columns.
///
/// Column 0 holds the initial state `(spot, v0)`. Variances are stored as computed by
/// the scheme and may be negative under the partial-floor policy.
#[derive(Debug, Clone)]
pub struct PathBatch {
    prices: Array2<f64>,
    variances: Array2<f64>,
}

impl PathBatch {
    pub fn num_paths(&self) -> usize {
        self.prices.nrows()
    }

    pub fn num_steps(&self) -> usize {
        self.prices.ncols() - 1
    }

    pub fn prices(&self) -> &Array2<f64> {
        &self.prices
    }

    pub fn variances(&self) -> &Array2<f64> {
        &self.variances
    }

    pub fn price_path(&self, path: usize) -> ArrayView1<'_, f64> {
        self.prices.row(path)
    }

    pub fn variance_path(&self, path: usize) -> ArrayView1<'_, f64> {
        self.variances.row(path)
    }

    pub fn terminal_prices(&self) -> Array1<f64> {
        self.prices.column(self.num_steps()).to_owned()
    }
}

/// Simulates `num_paths` paths and returns only their terminal prices.
pub fn simulate_terminal_prices(
    model: &Heston,
    maturity: f64,
    num_steps: usize,
    num_paths: usize,
    batch_size: usize,
    factory: &RngFactory,
) -> Vec<f64> {
    let driver = CorrelatedDriver::new(model.params.rho);
    let step = StepSize::new(maturity, num_steps);

    let mut terminals = vec![0.0; num_paths];
    terminals
        .par_chunks_mut(batch_size.max(1))
        .enumerate()
        .for_each(|(chunk, out)| {
            let mut rng = factory.stream(chunk as u64);
            for terminal in out.iter_mut() {
                *terminal =
                    EulerMaruyama::simulate_terminal(model, &driver, step, num_steps, &mut rng);
            }
        });
    terminals
}

/// Simulates `num_paths` paths and keeps the full price and variance history.
///
/// Uses the same streams and draw order as [`simulate_terminal_prices`], so the
/// terminal column equals its output for the same factory.
pub fn simulate_path_batch(
    model: &Heston,
    maturity: f64,
    num_steps: usize,
    num_paths: usize,
    batch_size: usize,
    factory: &RngFactory,
) -> PathBatch {
    let driver = CorrelatedDriver::new(model.params.rho);
    let step = StepSize::new(maturity, num_steps);
    let batch_size = batch_size.max(1);

    // Both grids are allocated at full size up front; chunk `c` owns rows
    // `c * batch_size ..` of each, so the shape holds for any num_paths.
    let mut prices = Array2::<f64>::zeros((num_paths, num_steps + 1));
    let mut variances = Array2::<f64>::zeros((num_paths, num_steps + 1));

    prices
        .axis_chunks_iter_mut(Axis(0), batch_size)
        .into_par_iter()
        .zip(variances.axis_chunks_iter_mut(Axis(0), batch_size).into_par_iter())
        .enumerate()
        .for_each(|(chunk, (mut chunk_prices, mut chunk_variances))| {
            let len = chunk_prices.nrows();
            let mut rng = factory.stream(chunk as u64);
            let draws = driver.draw_matrix(len, num_steps, &mut rng);
            for i in 0..len {
                EulerMaruyama::simulate_path(
                    model,
                    step,
                    draws.z1.row(i),
                    draws.z2.row(i),
                    chunk_prices.row_mut(i),
                    chunk_variances.row_mut(i),
                );
            }
        });

    PathBatch { prices, variances }
}
