//! Error types for eclipse queries.

use chrono::NaiveDate;
use moed_calendar::CalendarError;
use thiserror::Error;

/// Errors from eclipse queries and their collaborators.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum EclipseError {
    /// Start date is after end date.
    #[error("invalid date range: {start} is after {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    /// Engine configuration is unusable.
    #[error("invalid eclipse configuration: {0}")]
    InvalidConfig(&'static str),
    /// The eclipse contact source failed for the whole range.
    #[error("eclipse source error: {0}")]
    Source(String),
    /// The altitude source could not evaluate one instant.
    #[error("altitude source error: {0}")]
    Altitude(String),
    /// Feast computation failed during an alignment query.
    #[error(transparent)]
    Calendar(#[from] CalendarError),
}
