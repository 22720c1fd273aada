//! Isolation forest anomaly scoring.
//!
//! Trees split on a random feature at a uniform threshold between that
//! feature's min and max until a point is isolated or the depth limit
//! ⌈log2 ψ⌉ is reached. The score of a point is `2^(−E[h(x)] / c(ψ))`,
//! where `h` is the path length and `c` the expected path length of an
//! unsuccessful BST search; scores near 1 are anomalous.

use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::error::StatsError;

pub const DEFAULT_TREES: usize = 100;
pub const DEFAULT_SUBSAMPLE: usize = 256;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Average path length of an unsuccessful search in a BST of `n` nodes.
pub fn c_factor(n: usize) -> f64 {
    if n <= 1 {
        return 0.0;
    }
    let n = n as f64;
    2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn path_length(&self, point: &[f64], depth: usize) -> f64 {
        match self {
            Self::Leaf { size } => depth as f64 + c_factor(*size),
            Self::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                let next = match point.get(*feature) {
                    Some(v) if v < threshold => left,
                    _ => right,
                };
                next.path_length(point, depth + 1)
            }
        }
    }
}

/// A fitted forest over rows of equal width.
#[derive(Debug, Clone)]
pub struct IsolationForest {
    trees: Vec<Node>,
    subsample: usize,
}

impl IsolationForest {
    /// Fit `n_trees` trees on subsamples of at most `max_samples` rows.
    ///
    /// Rows must be equally wide and finite; see
    /// [`check_features`].
    pub fn fit(rows: &[Vec<f64>], n_trees: usize, max_samples: usize, seed: u64) -> Self {
        let subsample = max_samples.min(rows.len());
        let max_depth = (subsample.max(1) as f64).log2().ceil() as usize;
        let trees = (0..n_trees)
            .into_par_iter()
            .map(|i| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                rng.set_stream(i as u64);
                let indices = sample(&mut rng, rows.len(), subsample).into_vec();
                build(rows, indices, 0, max_depth, &mut rng)
            })
            .collect();
        Self { trees, subsample }
    }

    /// Anomaly score in (0, 1]; 0.5 when the forest cannot discriminate.
    pub fn score(&self, point: &[f64]) -> f64 {
        let c = c_factor(self.subsample);
        if self.trees.is_empty() || c == 0.0 {
            return 0.5;
        }
        let avg = self
            .trees
            .iter()
            .map(|t| t.path_length(point, 0))
            .sum::<f64>()
            / self.trees.len() as f64;
        2f64.powf(-avg / c)
    }
}

fn build(
    rows: &[Vec<f64>],
    indices: Vec<usize>,
    depth: usize,
    max_depth: usize,
    rng: &mut ChaCha8Rng,
) -> Node {
    if depth >= max_depth || indices.len() <= 1 {
        return Node::Leaf { size: indices.len() };
    }
    let width = rows[indices[0]].len();
    if width == 0 {
        return Node::Leaf { size: indices.len() };
    }
    let feature = rng.gen_range(0..width);
    let (min, max) = indices
        .iter()
        .map(|&i| rows[i][feature])
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let spread = max - min;
    if !spread.is_finite() || spread <= f64::EPSILON * max.abs().max(1.0) {
        return Node::Leaf { size: indices.len() };
    }
    let threshold = rng.gen_range(min..max);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .into_iter()
        .partition(|&i| rows[i][feature] < threshold);
    Node::Split {
        feature,
        threshold,
        left: Box::new(build(rows, left, depth + 1, max_depth, rng)),
        right: Box::new(build(rows, right, depth + 1, max_depth, rng)),
    }
}

/// Reject ragged or non-finite feature matrices.
pub fn check_features(rows: &[Vec<f64>]) -> Result<(), StatsError> {
    let Some(first) = rows.first() else {
        return Ok(());
    };
    let expected = first.len();
    for (row, values) in rows.iter().enumerate() {
        if values.len() != expected {
            return Err(StatsError::DimensionMismatch {
                row,
                expected,
                found: values.len(),
            });
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(StatsError::NonFinite(row));
        }
    }
    Ok(())
}
