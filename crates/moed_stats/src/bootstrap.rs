//! Percentile bootstrap over resampled means.
//!
//! Each resample draws from its own ChaCha stream of one seed, so the
//! resamples can run on the rayon pool and still reproduce exactly.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::stats_types::ConfidenceInterval;

/// Sorted means of `iterations` resamples (with replacement) of `sample`.
///
/// Empty when the sample or iteration count is zero.
pub fn bootstrap_means(sample: &[f64], iterations: usize, seed: u64) -> Vec<f64> {
    let n = sample.len();
    if n == 0 || iterations == 0 {
        return Vec::new();
    }
    let mut means: Vec<f64> = (0..iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = ChaCha8Rng::seed_from_u64(seed);
            rng.set_stream(i as u64);
            let sum: f64 = (0..n).map(|_| sample[rng.gen_range(0..n)]).sum();
            sum / n as f64
        })
        .collect();
    means.sort_by(f64::total_cmp);
    means
}

/// Linear-interpolated quantile `q` of an ascending slice.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    match sorted {
        [] => 0.0,
        [only] => *only,
        _ => {
            let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// `(α/2, 1 − α/2)` interval of sorted bootstrap means; (0, 0) when empty.
pub fn percentile_interval(sorted_means: &[f64], alpha: f64) -> ConfidenceInterval {
    if sorted_means.is_empty() {
        return ConfidenceInterval::default();
    }
    ConfidenceInterval::new(
        percentile(sorted_means, alpha / 2.0),
        percentile(sorted_means, 1.0 - alpha / 2.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic_for_seed() {
        let sample = [1.0, 4.0, 2.0, 8.0, 5.0, 7.0];
        assert_eq!(
            bootstrap_means(&sample, 200, 7),
            bootstrap_means(&sample, 200, 7)
        );
        assert_ne!(
            bootstrap_means(&sample, 200, 7),
            bootstrap_means(&sample, 200, 8)
        );
    }

    #[test]
    fn constant_sample_collapses() {
        let means = bootstrap_means(&[3.0; 5], 100, 1);
        let ci = percentile_interval(&means, 0.05);
        assert_eq!(ci, ConfidenceInterval::new(3.0, 3.0));
    }

    #[test]
    fn empty_sample() {
        assert!(bootstrap_means(&[], 100, 1).is_empty());
        assert_eq!(percentile_interval(&[], 0.05), ConfidenceInterval::default());
    }

    #[test]
    fn interpolated_percentile() {
        let sorted = [0.0, 10.0, 20.0, 30.0, 40.0];
        assert_eq!(percentile(&sorted, 0.0), 0.0);
        assert_eq!(percentile(&sorted, 0.5), 20.0);
        assert_eq!(percentile(&sorted, 0.125), 5.0);
        assert_eq!(percentile(&sorted, 1.0), 40.0);
    }

    #[test]
    fn ninety_nine_is_wider() {
        let sample: Vec<f64> = (0..40).map(|i| f64::from(i % 7) * 1.5).collect();
        let means = bootstrap_means(&sample, 1000, 42);
        let ci95 = percentile_interval(&means, 0.05);
        let ci99 = percentile_interval(&means, 0.01);
        assert!(ci99.lower <= ci95.lower && ci95.upper <= ci99.upper);
    }
}
