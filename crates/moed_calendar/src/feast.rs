//! Annual feast calendar.
//!
//! Each lunisolar anchor is converted from its Hebrew date through the
//! injected [`HebrewCalendar`]. The Hebrew year is first guessed from the
//! Gregorian year and the anchor's season, then corrected if the converted
//! date lands outside the expected Gregorian year or season. Range feasts
//! are fixed day offsets from their anchor and are never converted
//! independently.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, Duration, NaiveDate};
use tracing::debug;

use crate::error::CalendarError;
use crate::feast_types::{ALL_FEASTS, FeastAnchor, FeastDay, FeastKind, FeastSeason};
use crate::hebrew::{ArithmeticCalendar, HebrewCalendar, HebrewDate, HebrewMonth};

/// Conversions attempted per anchor before giving up.
const MAX_YEAR_CORRECTIONS: u32 = 3;

/// Spring anchors converted before this Gregorian month belong to the
/// previous Hebrew year.
const EARLIEST_SPRING_MONTH: u32 = 3;

/// Computes feast dates for Gregorian years.
#[derive(Debug, Clone, Default)]
pub struct CalendarEngine<C = ArithmeticCalendar> {
    calendar: C,
}

impl CalendarEngine<ArithmeticCalendar> {
    /// Engine backed by the built-in arithmetic calendar.
    pub fn arithmetic() -> Self {
        Self::new(ArithmeticCalendar)
    }
}

impl<C: HebrewCalendar> CalendarEngine<C> {
    pub fn new(calendar: C) -> Self {
        Self { calendar }
    }

    /// The calendar primitive this engine converts through.
    pub fn calendar(&self) -> &C {
        &self.calendar
    }

    /// All six feasts for Gregorian `year`, keyed by kind.
    pub fn feasts_for_year(
        &self,
        year: i32,
    ) -> Result<BTreeMap<FeastKind, FeastDay>, CalendarError> {
        check_year(year)?;
        let mut feasts = BTreeMap::new();
        for kind in ALL_FEASTS {
            if let FeastAnchor::Lunisolar { month, day, season } = kind.anchor() {
                let date = self.anchor_date(kind, month, day, season, year)?;
                feasts.insert(kind, FeastDay::single(kind, date, year));
            }
        }
        for kind in ALL_FEASTS {
            if let FeastAnchor::Offset {
                from,
                first_day,
                last_day,
            } = kind.anchor()
            {
                let anchor = feasts
                    .get(&from)
                    .map(|f| f.start_date)
                    .ok_or(CalendarError::Unresolvable {
                        feast: kind.name(),
                        year,
                    })?;
                let start = offset_date(anchor, first_day)?;
                let end = offset_date(anchor, last_day)?;
                feasts.insert(kind, FeastDay::range(kind, start, end, year));
            }
        }
        Ok(feasts)
    }

    /// Feasts for every year in `start_year..=end_year`, sorted by date.
    pub fn feasts_for_range(
        &self,
        start_year: i32,
        end_year: i32,
    ) -> Result<Vec<FeastDay>, CalendarError> {
        if start_year > end_year {
            return Err(CalendarError::InvalidRange {
                start: start_year,
                end: end_year,
            });
        }
        check_year(start_year)?;
        check_year(end_year)?;
        let mut out = Vec::new();
        for year in start_year..=end_year {
            out.extend(self.feasts_for_year(year)?.into_values());
        }
        out.sort_by(|a, b| {
            (a.year, a.start_date, a.kind).cmp(&(b.year, b.start_date, b.kind))
        });
        debug!(start_year, end_year, count = out.len(), "feasts computed");
        Ok(out)
    }

    /// Feasts starting within `[from, from + horizon_days]`, sorted by date.
    pub fn upcoming_feasts(
        &self,
        from: NaiveDate,
        horizon_days: u32,
    ) -> Result<Vec<FeastDay>, CalendarError> {
        let until = from
            .checked_add_days(Days::new(u64::from(horizon_days)))
            .ok_or(CalendarError::OutOfRange)?;
        let mut out: Vec<FeastDay> = self
            .feasts_for_range(from.year(), until.year())?
            .into_iter()
            .filter(|f| from <= f.start_date && f.start_date <= until)
            .collect();
        out.sort_by_key(|f| (f.start_date, f.kind));
        Ok(out)
    }

    /// The feast covering `date`, if any. Single-day feasts that fall inside
    /// a range feast (Passover never does) take precedence.
    pub fn feast_on(&self, date: NaiveDate) -> Result<Option<FeastDay>, CalendarError> {
        let feasts = self.feasts_for_year(date.year())?;
        let mut covering: Vec<FeastDay> =
            feasts.into_values().filter(|f| f.contains(date)).collect();
        covering.sort_by_key(|f| f.is_range);
        Ok(covering.into_iter().next())
    }

    /// Gregorian date of a lunisolar anchor inside `year`.
    fn anchor_date(
        &self,
        kind: FeastKind,
        month: HebrewMonth,
        day: u8,
        season: FeastSeason,
        year: i32,
    ) -> Result<NaiveDate, CalendarError> {
        let mut hebrew_year = season
            .hebrew_year_for(year)
            .ok_or(CalendarError::OutOfRange)?;
        for _ in 0..MAX_YEAR_CORRECTIONS {
            let date = self
                .calendar
                .to_gregorian(HebrewDate::new(hebrew_year, month, day))?;
            let shift = year_shift(season, date, year);
            if shift == 0 {
                return Ok(date);
            }
            debug!(
                feast = kind.name(),
                year,
                hebrew_year,
                converted = %date,
                shift,
                "year-boundary correction"
            );
            hebrew_year = hebrew_year
                .checked_add(shift)
                .ok_or(CalendarError::OutOfRange)?;
        }
        Err(CalendarError::Unresolvable {
            feast: kind.name(),
            year,
        })
    }
}

/// Years whose feasts chrono cannot represent are rejected up front.
fn check_year(year: i32) -> Result<(), CalendarError> {
    if (NaiveDate::MIN.year()..=NaiveDate::MAX.year()).contains(&year) {
        Ok(())
    } else {
        Err(CalendarError::OutOfRange)
    }
}

fn offset_date(anchor: NaiveDate, days: i64) -> Result<NaiveDate, CalendarError> {
    anchor
        .checked_add_signed(Duration::days(days))
        .ok_or(CalendarError::OutOfRange)
}

/// Hebrew-year adjustment needed to bring `date` into Gregorian `year`.
fn year_shift(season: FeastSeason, date: NaiveDate, year: i32) -> i32 {
    if date.year() < year {
        1
    } else if date.year() > year {
        -1
    } else if season == FeastSeason::Spring && date.month() < EARLIEST_SPRING_MONTH {
        1
    } else {
        0
    }
}
