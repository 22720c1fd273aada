//! Error types for temporal matching.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum MatchError {
    #[error("invalid scoring configuration: {0}")]
    InvalidConfig(&'static str),
}
