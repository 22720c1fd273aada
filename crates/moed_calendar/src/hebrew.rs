//! Fixed-arithmetic Hebrew calendar.
//!
//! The calendar is computed from the molad of Tishrei with the four
//! postponement rules (dehiyyot) and the 19-year Metonic leap cycle.
//! Day counts are fixed day numbers (R.D.), where R.D. 1 is 0001-01-01 in
//! the proleptic Gregorian calendar. This matches chrono's
//! `num_days_from_ce`, so conversion to [`NaiveDate`] is direct.
//!
//! Clean-room implementation from the published arithmetic rules
//! (molad interval 29d 12h 793p, 1080 parts per hour).

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::CalendarError;

/// Fixed day number of the day before 1 Tishrei AM 1 (Julian -3761 Oct 7).
const HEBREW_EPOCH: i64 = -1_373_427;

/// Mean Hebrew year length in days (235 lunations / 19 years).
const MEAN_YEAR_DAYS: f64 = 35_975_351.0 / 98_496.0;

/// Offset from Gregorian year to the Hebrew year whose Nisan falls in it.
pub const SPRING_YEAR_OFFSET: i32 = 3760;

/// Offset from Gregorian year to the Hebrew year whose Tishrei falls in it.
pub const FALL_YEAR_OFFSET: i32 = 3761;

/// Hebrew months, numbered from Nisan as in the biblical reckoning.
///
/// The civil year starts at Tishrei (7); `AdarII` (13) exists only in leap
/// years, where `Adar` (12) is Adar I.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum HebrewMonth {
    Nisan,
    Iyyar,
    Sivan,
    Tammuz,
    Av,
    Elul,
    Tishrei,
    Marheshvan,
    Kislev,
    Tevet,
    Shevat,
    Adar,
    AdarII,
}

/// All 13 month slots in numeric order (index 0 = Nisan).
pub const ALL_MONTHS: [HebrewMonth; 13] = [
    HebrewMonth::Nisan,
    HebrewMonth::Iyyar,
    HebrewMonth::Sivan,
    HebrewMonth::Tammuz,
    HebrewMonth::Av,
    HebrewMonth::Elul,
    HebrewMonth::Tishrei,
    HebrewMonth::Marheshvan,
    HebrewMonth::Kislev,
    HebrewMonth::Tevet,
    HebrewMonth::Shevat,
    HebrewMonth::Adar,
    HebrewMonth::AdarII,
];

impl HebrewMonth {
    /// 1-based month number (Nisan = 1, Adar II = 13).
    pub const fn number(self) -> u8 {
        match self {
            Self::Nisan => 1,
            Self::Iyyar => 2,
            Self::Sivan => 3,
            Self::Tammuz => 4,
            Self::Av => 5,
            Self::Elul => 6,
            Self::Tishrei => 7,
            Self::Marheshvan => 8,
            Self::Kislev => 9,
            Self::Tevet => 10,
            Self::Shevat => 11,
            Self::Adar => 12,
            Self::AdarII => 13,
        }
    }

    /// Month from its 1-based number.
    pub const fn from_number(n: u8) -> Option<Self> {
        if n >= 1 && n <= 13 {
            Some(ALL_MONTHS[(n - 1) as usize])
        } else {
            None
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Self::Nisan => "Nisan",
            Self::Iyyar => "Iyyar",
            Self::Sivan => "Sivan",
            Self::Tammuz => "Tammuz",
            Self::Av => "Av",
            Self::Elul => "Elul",
            Self::Tishrei => "Tishrei",
            Self::Marheshvan => "Marheshvan",
            Self::Kislev => "Kislev",
            Self::Tevet => "Tevet",
            Self::Shevat => "Shevat",
            Self::Adar => "Adar",
            Self::AdarII => "Adar II",
        }
    }
}

/// A date in the Hebrew calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HebrewDate {
    /// Year Anno Mundi.
    pub year: i32,
    pub month: HebrewMonth,
    /// 1-based day of month.
    pub day: u8,
}

impl HebrewDate {
    pub fn new(year: i32, month: HebrewMonth, day: u8) -> Self {
        Self { year, month, day }
    }
}

impl std::fmt::Display for HebrewDate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.day, self.month.name(), self.year)
    }
}

/// Hebrew ↔ Gregorian conversion primitive.
///
/// The feast and eclipse engines only talk to the calendar through this
/// trait, so a table-driven or observational calendar can be injected in
/// place of [`ArithmeticCalendar`].
pub trait HebrewCalendar {
    fn to_gregorian(&self, date: HebrewDate) -> Result<NaiveDate, CalendarError>;
    fn from_gregorian(&self, date: NaiveDate) -> Result<HebrewDate, CalendarError>;
}

impl<T: HebrewCalendar + ?Sized> HebrewCalendar for &T {
    fn to_gregorian(&self, date: HebrewDate) -> Result<NaiveDate, CalendarError> {
        (**self).to_gregorian(date)
    }

    fn from_gregorian(&self, date: NaiveDate) -> Result<HebrewDate, CalendarError> {
        (**self).from_gregorian(date)
    }
}

/// The standard fixed-arithmetic Hebrew calendar.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArithmeticCalendar;

impl HebrewCalendar for ArithmeticCalendar {
    fn to_gregorian(&self, date: HebrewDate) -> Result<NaiveDate, CalendarError> {
        validate(date)?;
        date_from_fixed(fixed_from_hebrew(date))
    }

    fn from_gregorian(&self, date: NaiveDate) -> Result<HebrewDate, CalendarError> {
        Ok(hebrew_from_fixed(i64::from(date.num_days_from_ce())))
    }
}

/// Whether `year` (AM) has 13 months.
pub fn is_leap_year(year: i32) -> bool {
    (7 * i64::from(year) + 1).rem_euclid(19) < 7
}

/// Last month number of `year`: 13 in leap years, 12 otherwise.
fn last_month_of_year(year: i32) -> u8 {
    if is_leap_year(year) { 13 } else { 12 }
}

/// Days from the epoch to the molad-derived 1 Tishrei, before the
/// year-length postponements.
fn elapsed_days(y: i64) -> i64 {
    let months_elapsed = (235 * y - 234).div_euclid(19);
    let parts_elapsed = 12_084 + 13_753 * months_elapsed;
    let days = 29 * months_elapsed + parts_elapsed.div_euclid(25_920);
    // Rosh Hashanah never falls on Sunday, Wednesday or Friday.
    if (3 * (days + 1)).rem_euclid(7) < 3 {
        days + 1
    } else {
        days
    }
}

/// Postponement that keeps every year within 353..=355 or 383..=385 days.
fn year_length_correction(y: i64) -> i64 {
    let ny0 = elapsed_days(y - 1);
    let ny1 = elapsed_days(y);
    let ny2 = elapsed_days(y + 1);
    if ny2 - ny1 == 356 {
        2
    } else if ny1 - ny0 == 382 {
        1
    } else {
        0
    }
}

/// Fixed day number of 1 Tishrei of `year`.
pub fn new_year(year: i32) -> i64 {
    new_year_of(i64::from(year))
}

/// Year arithmetic is done in `i64` so neighbouring years of `i32::MAX`
/// stay representable.
fn new_year_of(y: i64) -> i64 {
    HEBREW_EPOCH + elapsed_days(y) + year_length_correction(y)
}

/// Number of days in Hebrew `year` (353, 354, 355, 383, 384 or 385).
pub fn days_in_year(year: i32) -> i64 {
    let y = i64::from(year);
    new_year_of(y + 1) - new_year_of(y)
}

fn long_marheshvan(year: i32) -> bool {
    days_in_year(year).rem_euclid(10) == 5
}

fn short_kislev(year: i32) -> bool {
    days_in_year(year).rem_euclid(10) == 3
}

fn days_in_month_number(month: u8, year: i32) -> u8 {
    let short = matches!(month, 2 | 4 | 6 | 10 | 13)
        || (month == 12 && !is_leap_year(year))
        || (month == 8 && !long_marheshvan(year))
        || (month == 9 && short_kislev(year));
    if short { 29 } else { 30 }
}

/// Number of days in `month` of `year` (29 or 30).
pub fn days_in_month(month: HebrewMonth, year: i32) -> u8 {
    days_in_month_number(month.number(), year)
}

fn validate(date: HebrewDate) -> Result<(), CalendarError> {
    if date.month == HebrewMonth::AdarII && !is_leap_year(date.year) {
        return Err(CalendarError::InvalidDate(format!(
            "{date}: Adar II only exists in leap years"
        )));
    }
    let last = days_in_month(date.month, date.year);
    if date.day == 0 || date.day > last {
        return Err(CalendarError::InvalidDate(format!(
            "{date}: day must be within 1..={last}"
        )));
    }
    Ok(())
}

/// Fixed day number of a Hebrew date. Does not validate the day.
pub fn fixed_from_hebrew(date: HebrewDate) -> i64 {
    let year = date.year;
    let month = date.month.number();
    let mut fixed = new_year(year) + i64::from(date.day) - 1;
    let month_days = |range: std::ops::Range<u8>| -> i64 {
        range.map(|m| i64::from(days_in_month_number(m, year))).sum()
    };
    if month < 7 {
        // Months of the civil year before Nisan, then Nisan up to `month`.
        fixed += month_days(7..last_month_of_year(year) + 1);
        fixed += month_days(1..month);
    } else {
        fixed += month_days(7..month);
    }
    fixed
}

/// Hebrew date of a fixed day number.
pub fn hebrew_from_fixed(fixed: i64) -> HebrewDate {
    let approx = (fixed.saturating_sub(HEBREW_EPOCH) as f64 / MEAN_YEAR_DAYS).floor() as i32;
    let mut year = approx;
    while year < i32::MAX && new_year_of(i64::from(year) + 1) <= fixed {
        year += 1;
    }

    let nisan_first = fixed_from_hebrew(HebrewDate::new(year, HebrewMonth::Nisan, 1));
    let mut month = if fixed < nisan_first { 7 } else { 1 };
    loop {
        let last = days_in_month_number(month, year);
        let month_end = fixed_from_hebrew(HebrewDate::new(year, month_of(month), last));
        if fixed <= month_end {
            break;
        }
        month += 1;
    }

    let month = month_of(month);
    let first = fixed_from_hebrew(HebrewDate::new(year, month, 1));
    HebrewDate::new(year, month, (fixed - first + 1) as u8)
}

fn month_of(n: u8) -> HebrewMonth {
    ALL_MONTHS[usize::from(n - 1)]
}

/// Gregorian date of a fixed day number.
pub fn date_from_fixed(fixed: i64) -> Result<NaiveDate, CalendarError> {
    i32::try_from(fixed)
        .ok()
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .ok_or(CalendarError::OutOfRange)
}
