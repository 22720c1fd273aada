//! Error types for the correlation engine.

use thiserror::Error;

/// Errors from statistical analysis. Sparse data never errors; it yields
/// degenerate results instead.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum StatsError {
    /// Paired samples have different lengths.
    #[error("sample lengths differ: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
    /// A feature row does not have the width of the first row.
    #[error("feature row {row} has {found} columns, expected {expected}")]
    DimensionMismatch {
        row: usize,
        expected: usize,
        found: usize,
    },
    /// NaN or infinity at the given position of an input.
    #[error("non-finite value at position {0}")]
    NonFinite(usize),
    /// Historical correlation outside [0, 1].
    #[error("correlation must be within [0, 1], got {0}")]
    InvalidCorrelation(f64),
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
}
