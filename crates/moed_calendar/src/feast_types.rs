//! Types for annual feast computation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::hebrew::{FALL_YEAR_OFFSET, HebrewMonth, SPRING_YEAR_OFFSET};

/// The six canonical annual feasts, in calendar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeastKind {
    Passover,
    UnleavenedBread,
    Pentecost,
    Trumpets,
    Atonement,
    Tabernacles,
}

/// All feast kinds in calendar order.
pub const ALL_FEASTS: [FeastKind; 6] = [
    FeastKind::Passover,
    FeastKind::UnleavenedBread,
    FeastKind::Pentecost,
    FeastKind::Trumpets,
    FeastKind::Atonement,
    FeastKind::Tabernacles,
];

/// Half of the year a lunisolar anchor belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeastSeason {
    /// Nisan–Sivan anchors (Gregorian March–June).
    Spring,
    /// Tishrei anchors (Gregorian September–October).
    Fall,
}

impl FeastSeason {
    /// Initial guess for the Hebrew year whose anchor falls in Gregorian `year`,
    /// or `None` past the end of `i32`.
    pub const fn hebrew_year_for(self, year: i32) -> Option<i32> {
        match self {
            Self::Spring => year.checked_add(SPRING_YEAR_OFFSET),
            Self::Fall => year.checked_add(FALL_YEAR_OFFSET),
        }
    }
}

/// How a feast date is obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeastAnchor {
    /// Fixed Hebrew month/day converted through the calendar primitive.
    Lunisolar {
        month: HebrewMonth,
        day: u8,
        season: FeastSeason,
    },
    /// Inclusive day span offset from another feast's start date.
    Offset {
        from: FeastKind,
        first_day: i64,
        last_day: i64,
    },
}

impl FeastKind {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Passover => "Passover",
            Self::UnleavenedBread => "Feast of Unleavened Bread",
            Self::Pentecost => "Pentecost",
            Self::Trumpets => "Feast of Trumpets",
            Self::Atonement => "Day of Atonement",
            Self::Tabernacles => "Feast of Tabernacles",
        }
    }

    /// Hebrew name of the feast.
    pub const fn hebrew_name(self) -> &'static str {
        match self {
            Self::Passover => "Pesach",
            Self::UnleavenedBread => "Chag HaMatzot",
            Self::Pentecost => "Shavuot",
            Self::Trumpets => "Yom Teruah",
            Self::Atonement => "Yom Kippur",
            Self::Tabernacles => "Sukkot",
        }
    }

    pub const fn significance(self) -> &'static str {
        match self {
            Self::Passover => "Deliverance from Egypt; the lamb slain on 14 Nisan",
            Self::UnleavenedBread => "Seven days without leaven following Passover",
            Self::Pentecost => "Feast of Weeks; firstfruits of the wheat harvest",
            Self::Trumpets => "Day of blowing the shofar; head of the civil year",
            Self::Atonement => "Day of fasting and national atonement",
            Self::Tabernacles => "Seven days dwelling in booths; ingathering",
        }
    }

    pub const fn anchor(self) -> FeastAnchor {
        match self {
            Self::Passover => FeastAnchor::Lunisolar {
                month: HebrewMonth::Nisan,
                day: 14,
                season: FeastSeason::Spring,
            },
            Self::UnleavenedBread => FeastAnchor::Offset {
                from: Self::Passover,
                first_day: 1,
                last_day: 7,
            },
            Self::Pentecost => FeastAnchor::Lunisolar {
                month: HebrewMonth::Sivan,
                day: 6,
                season: FeastSeason::Spring,
            },
            Self::Trumpets => FeastAnchor::Lunisolar {
                month: HebrewMonth::Tishrei,
                day: 1,
                season: FeastSeason::Fall,
            },
            Self::Atonement => FeastAnchor::Lunisolar {
                month: HebrewMonth::Tishrei,
                day: 10,
                season: FeastSeason::Fall,
            },
            Self::Tabernacles => FeastAnchor::Offset {
                from: Self::Trumpets,
                first_day: 14,
                last_day: 20,
            },
        }
    }

    /// Whether the feast spans several days.
    pub const fn is_range(self) -> bool {
        matches!(self.anchor(), FeastAnchor::Offset { .. })
    }
}

impl std::fmt::Display for FeastKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A feast expressed in Gregorian dates for one year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeastDay {
    pub kind: FeastKind,
    pub name: String,
    /// First (or only) day of the feast.
    pub start_date: NaiveDate,
    /// Last day for range feasts; `None` for single-day feasts.
    pub end_date: Option<NaiveDate>,
    pub is_range: bool,
    pub significance: String,
    /// Gregorian year the feast was computed for.
    pub year: i32,
}

impl FeastDay {
    pub fn single(kind: FeastKind, date: NaiveDate, year: i32) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            start_date: date,
            end_date: None,
            is_range: false,
            significance: kind.significance().to_string(),
            year,
        }
    }

    pub fn range(kind: FeastKind, start: NaiveDate, end: NaiveDate, year: i32) -> Self {
        Self {
            kind,
            name: kind.name().to_string(),
            start_date: start,
            end_date: Some(end),
            is_range: true,
            significance: kind.significance().to_string(),
            year,
        }
    }

    /// Last day covered by the feast.
    pub fn last_date(&self) -> NaiveDate {
        self.end_date.unwrap_or(self.start_date)
    }

    /// Whether `date` lies within the feast (inclusive).
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.last_date()
    }

    /// Number of days covered (1 for single-day feasts).
    pub fn duration_days(&self) -> i64 {
        (self.last_date() - self.start_date).num_days() + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_feasts_are_offset_anchored() {
        let ranges: Vec<_> = ALL_FEASTS.iter().filter(|k| k.is_range()).collect();
        assert_eq!(
            ranges,
            vec![&FeastKind::UnleavenedBread, &FeastKind::Tabernacles]
        );
    }

    #[test]
    fn feast_day_contains_is_inclusive() {
        let start = NaiveDate::from_ymd_opt(2025, 4, 13).unwrap();
        let end = NaiveDate::from_ymd_opt(2025, 4, 19).unwrap();
        let feast = FeastDay::range(FeastKind::UnleavenedBread, start, end, 2025);
        assert!(feast.contains(start));
        assert!(feast.contains(end));
        assert!(!feast.contains(end.succ_opt().unwrap()));
        assert_eq!(feast.duration_days(), 7);
    }

    #[test]
    fn hebrew_year_guess_stops_at_i32_limit() {
        assert_eq!(FeastSeason::Spring.hebrew_year_for(2025), Some(5785));
        assert_eq!(FeastSeason::Fall.hebrew_year_for(2024), Some(5785));
        assert_eq!(FeastSeason::Spring.hebrew_year_for(i32::MAX), None);
        assert_eq!(FeastSeason::Fall.hebrew_year_for(i32::MAX - 3760), None);
    }

    #[test]
    fn feast_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FeastKind::UnleavenedBread).unwrap();
        assert_eq!(json, "\"unleavened_bread\"");
    }
}
