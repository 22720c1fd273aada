//! Validation errors for boundary event records.

use thiserror::Error;

/// Errors raised when an incoming event record fails validation.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EventError {
    #[error("event id must not be empty")]
    EmptyId,
    #[error("magnitude must be finite and non-negative, got {0}")]
    InvalidMagnitude(f64),
    #[error("latitude must be within [-90, 90], got {0}")]
    InvalidLatitude(f64),
    #[error("longitude must be within [-180, 180], got {0}")]
    InvalidLongitude(f64),
    #[error("distance must be finite and non-negative, got {0}")]
    InvalidDistance(f64),
}
