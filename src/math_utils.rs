// src/math_utils.rs
use serde::{Deserialize, Serialize};
use statrs::function::erf;
use std::f64::consts::SQRT_2;

pub fn norm_cdf(x: f64) -> f64 {
    0.5 * (1.0 + erf::erf(x / SQRT_2))
}

/// Running mean and sum of squared deviations (Welford).
///
/// Partial results from independent chunks are combined with [`RunningStats::merge`]
/// (Chan et al. pairwise update), which keeps the reduction numerically stable and
/// needs no synchronisation beyond the final merge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
}

impl RunningStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, x: f64) {
        self.count += 1;
        let delta = x - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (x - self.mean);
    }

    pub fn merge(&self, other: &RunningStats) -> RunningStats {
        if other.count == 0 {
            return *self;
        }
        if self.count == 0 {
            return *other;
        }
        let count = self.count + other.count;
        let delta = other.mean - self.mean;
        let weight = other.count as f64 / count as f64;
        RunningStats {
            count,
            mean: self.mean + delta * weight,
            m2: self.m2 + other.m2 + delta * delta * self.count as f64 * weight,
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// Unbiased sample variance; 0 with fewer than two observations.
    pub fn sample_variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            (self.m2 / (self.count - 1) as f64).max(0.0)
        }
    }

    /// Standard error of the mean.
    pub fn std_error(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            (self.sample_variance() / self.count as f64).sqrt()
        }
    }
}

impl FromIterator<f64> for RunningStats {
    fn from_iter<I: IntoIterator<Item = f64>>(iter: I) -> Self {
        let mut stats = RunningStats::new();
        for x in iter {
            stats.push(x);
        }
        stats
    }
}

pub struct Timer {
    start_time: std::time::Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    pub fn new() -> Timer {
        Timer {
            start_time: std::time::Instant::now(),
        }
    }

    pub fn start(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start_time.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_norm_cdf() {
        assert_relative_eq!(norm_cdf(0.0), 0.5, epsilon = 1e-12);
        assert_relative_eq!(norm_cdf(1.96), 0.975_002_104_851_780, epsilon = 1e-9);
        assert_relative_eq!(norm_cdf(-1.0) + norm_cdf(1.0), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_running_stats_matches_direct_computation() {
        let data = [1.0, 4.0, 2.5, 7.0, 3.25, 0.5];
        let stats: RunningStats = data.iter().copied().collect();

        let mean = data.iter().sum::<f64>() / data.len() as f64;
        let var = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (data.len() - 1) as f64;

        assert_eq!(stats.count(), 6);
        assert_relative_eq!(stats.mean(), mean, epsilon = 1e-12);
        assert_relative_eq!(stats.sample_variance(), var, epsilon = 1e-12);
        assert_relative_eq!(stats.std_error(), (var / 6.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_merge_equals_single_pass() {
        let left: RunningStats = [1.0, 2.0, 3.0].into_iter().collect();
        let right: RunningStats = [10.0, 20.0].into_iter().collect();
        let all: RunningStats = [1.0, 2.0, 3.0, 10.0, 20.0].into_iter().collect();

        let merged = left.merge(&right);
        assert_eq!(merged.count(), 5);
        assert_relative_eq!(merged.mean(), all.mean(), epsilon = 1e-12);
        assert_relative_eq!(merged.sample_variance(), all.sample_variance(), epsilon = 1e-10);

        assert_eq!(RunningStats::new().merge(&left), left);
        assert_eq!(left.merge(&RunningStats::new()), left);
    }

    #[test]
    fn test_constant_series_is_exact() {
        let stats: RunningStats = std::iter::repeat(10.0).take(1000).collect();
        let merged = stats.merge(&stats);
        assert_eq!(merged.mean(), 10.0);
        assert_eq!(merged.sample_variance(), 0.0);
    }
}
