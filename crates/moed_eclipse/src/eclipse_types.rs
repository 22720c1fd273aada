//! Types for eclipse classification, tetrads and feast alignment.

use chrono::{DateTime, NaiveDate, Utc};
use moed_calendar::FeastDay;
use moed_events::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::error::EclipseError;

/// Which luminary is eclipsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EclipseKind {
    Lunar,
    Solar,
}

impl EclipseKind {
    /// Body whose altitude decides visibility: the Moon for lunar eclipses,
    /// the Sun for solar eclipses.
    pub const fn eclipsed_body(self) -> CelestialBody {
        match self {
            Self::Lunar => CelestialBody::Moon,
            Self::Solar => CelestialBody::Sun,
        }
    }
}

/// Bodies the altitude source must be able to evaluate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CelestialBody {
    Sun,
    Moon,
}

/// Eclipse classification at greatest eclipse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EclipseClass {
    Penumbral,
    Partial,
    Total,
    Annular,
}

/// Discrete contact markers reported by the eclipse source.
///
/// For lunar eclipses the partial markers are the umbral contacts (U1/U4)
/// and the total markers are U2/U3. For solar eclipses they are the
/// contacts of the partial, total or annular phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPhase {
    PenumbralBegin,
    PartialBegin,
    TotalBegin,
    AnnularBegin,
    Maximum,
    AnnularEnd,
    TotalEnd,
    PartialEnd,
    PenumbralEnd,
}

impl ContactPhase {
    pub const fn is_total(self) -> bool {
        matches!(self, Self::TotalBegin | Self::TotalEnd)
    }

    pub const fn is_annular(self) -> bool {
        matches!(self, Self::AnnularBegin | Self::AnnularEnd)
    }

    pub const fn is_partial(self) -> bool {
        matches!(self, Self::PartialBegin | Self::PartialEnd)
    }
}

/// One contact marker at a UTC instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EclipseContact {
    pub instant: DateTime<Utc>,
    pub phase: ContactPhase,
}

impl EclipseContact {
    pub fn new(instant: DateTime<Utc>, phase: ContactPhase) -> Self {
        Self { instant, phase }
    }
}

/// A classified eclipse as seen from the configured observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EclipseEvent {
    /// Instant of greatest eclipse (UTC).
    pub date: DateTime<Utc>,
    pub kind: EclipseKind,
    pub classification: EclipseClass,
    /// True iff lunar and total.
    pub is_blood_moon: bool,
    /// Eclipsed body above the horizon at greatest eclipse.
    pub visible_from_observer: bool,
    /// Altitude of the eclipsed body at greatest eclipse, degrees.
    pub altitude_deg: f64,
    pub observer_lat: f64,
    pub observer_lon: f64,
}

impl EclipseEvent {
    pub fn new(
        date: DateTime<Utc>,
        kind: EclipseKind,
        classification: EclipseClass,
        altitude_deg: f64,
        observer: &GeoPoint,
    ) -> Self {
        Self {
            date,
            kind,
            classification,
            is_blood_moon: kind == EclipseKind::Lunar && classification == EclipseClass::Total,
            visible_from_observer: altitude_deg > 0.0,
            altitude_deg,
            observer_lat: observer.latitude_deg,
            observer_lon: observer.longitude_deg,
        }
    }

    /// UTC calendar day of greatest eclipse.
    pub fn day(&self) -> NaiveDate {
        self.date.date_naive()
    }
}

/// Four consecutive blood moons with six-month spacing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TetradSequence {
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub members: [EclipseEvent; 4],
    /// Gaps between consecutive members, days.
    pub gaps_days: [f64; 3],
    pub visible_count: usize,
    pub visible_fraction: f64,
}

impl TetradSequence {
    pub fn new(members: [EclipseEvent; 4]) -> Self {
        let gaps_days = [
            days_between(members[0].date, members[1].date),
            days_between(members[1].date, members[2].date),
            days_between(members[2].date, members[3].date),
        ];
        let visible_count = members.iter().filter(|e| e.visible_from_observer).count();
        Self {
            start_date: members[0].date,
            end_date: members[3].date,
            gaps_days,
            visible_count,
            visible_fraction: visible_count as f64 / members.len() as f64,
            members,
        }
    }
}

/// Fractional days from `a` to `b`.
pub fn days_between(a: DateTime<Utc>, b: DateTime<Utc>) -> f64 {
    (b - a).num_seconds() as f64 / 86_400.0
}

/// Tetrad detection settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TetradConfig {
    /// Exclusive lower bound on the gap between consecutive blood moons, days.
    pub min_gap_days: f64,
    /// Exclusive upper bound on the gap between consecutive blood moons, days.
    pub max_gap_days: f64,
    /// Reject windows with an intervening non-total lunar eclipse.
    pub require_consecutive: bool,
}

impl Default for TetradConfig {
    fn default() -> Self {
        Self {
            min_gap_days: 150.0,
            max_gap_days: 210.0,
            require_consecutive: false,
        }
    }
}

impl TetradConfig {
    pub fn validate(&self) -> Result<(), EclipseError> {
        if !self.min_gap_days.is_finite() || !self.max_gap_days.is_finite() {
            return Err(EclipseError::InvalidConfig("tetrad gap bounds must be finite"));
        }
        if self.min_gap_days < 0.0 {
            return Err(EclipseError::InvalidConfig(
                "min_gap_days must not be negative",
            ));
        }
        if self.min_gap_days >= self.max_gap_days {
            return Err(EclipseError::InvalidConfig(
                "min_gap_days must be less than max_gap_days",
            ));
        }
        Ok(())
    }

    /// Whether a gap lies strictly inside the configured bounds.
    pub fn accepts_gap(&self, gap_days: f64) -> bool {
        self.min_gap_days < gap_days && gap_days < self.max_gap_days
    }
}

/// An eclipse that falls on (or next to) a feast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeastAlignment {
    pub eclipse: EclipseEvent,
    pub feast: FeastDay,
    /// Eclipse day minus feast start day.
    pub offset_days: i64,
}
