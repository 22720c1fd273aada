//! Hebrew lunisolar calendar and annual feast dates.
//!
//! This crate provides:
//! - The fixed-arithmetic Hebrew calendar ([`ArithmeticCalendar`]) behind the
//!   [`HebrewCalendar`] conversion trait
//! - [`CalendarEngine`], which places the six annual feasts in Gregorian
//!   years, with year-boundary correction and day-offset range feasts

pub mod error;
pub mod feast;
pub mod feast_types;
pub mod hebrew;

pub use error::CalendarError;
pub use feast::CalendarEngine;
pub use feast_types::{ALL_FEASTS, FeastAnchor, FeastDay, FeastKind, FeastSeason};
pub use hebrew::{
    ALL_MONTHS, ArithmeticCalendar, HebrewCalendar, HebrewDate, HebrewMonth, date_from_fixed,
    days_in_month, days_in_year, fixed_from_hebrew, hebrew_from_fixed, is_leap_year, new_year,
};
