//! Error types for calendar conversion and feast generation.

use thiserror::Error;

/// Errors from Hebrew/Gregorian conversion or feast computation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CalendarError {
    /// Start year is after end year.
    #[error("invalid year range: start {start} is after end {end}")]
    InvalidRange { start: i32, end: i32 },
    /// Hebrew date does not exist (day past month end, Adar II in a common year).
    #[error("invalid Hebrew date: {0}")]
    InvalidDate(String),
    /// Fixed day number cannot be represented as a Gregorian date.
    #[error("date outside the representable range")]
    OutOfRange,
    /// Year-boundary correction could not place the feast in the requested year.
    #[error("could not place {feast} inside Gregorian year {year}")]
    Unresolvable { feast: &'static str, year: i32 },
}
