//! Collaborator traits for eclipse contacts and body altitudes, plus
//! recorded (table-backed) implementations.
//!
//! The engine never computes ephemerides itself. An ephemeris service
//! implements [`EclipseSource`] and [`AltitudeSource`]; the recorded
//! variants replay previously exported data.

use chrono::{DateTime, Duration, Utc};
use moed_events::GeoPoint;
use serde::{Deserialize, Serialize};

use crate::eclipse_types::{CelestialBody, ContactPhase, EclipseContact, EclipseKind};
use crate::error::EclipseError;

/// Supplies discrete eclipse contact markers for a time range.
pub trait EclipseSource {
    /// Contacts of `kind` eclipses near `[start, end)`. Contacts of an
    /// eclipse straddling a bound may be included; the engine filters on
    /// the instant of greatest eclipse.
    fn contacts(
        &self,
        kind: EclipseKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EclipseContact>, EclipseError>;
}

impl<T: EclipseSource + ?Sized> EclipseSource for &T {
    fn contacts(
        &self,
        kind: EclipseKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EclipseContact>, EclipseError> {
        (**self).contacts(kind, start, end)
    }
}

/// Topocentric altitude of a body, degrees above the horizon.
pub trait AltitudeSource {
    fn altitude_deg(
        &self,
        body: CelestialBody,
        instant: DateTime<Utc>,
        observer: &GeoPoint,
    ) -> Result<f64, EclipseError>;
}

impl<F> AltitudeSource for F
where
    F: Fn(CelestialBody, DateTime<Utc>, &GeoPoint) -> Result<f64, EclipseError>,
{
    fn altitude_deg(
        &self,
        body: CelestialBody,
        instant: DateTime<Utc>,
        observer: &GeoPoint,
    ) -> Result<f64, EclipseError> {
        self(body, instant, observer)
    }
}

/// Contacts are searched this far outside the requested range so eclipses
/// straddling a bound keep all their markers.
const CONTACT_MARGIN_HOURS: i64 = 12;

/// One recorded contact marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedContact {
    pub kind: EclipseKind,
    pub instant: DateTime<Utc>,
    pub phase: ContactPhase,
}

/// Eclipse source replaying a recorded contact table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedEclipses {
    contacts: Vec<RecordedContact>,
}

impl RecordedEclipses {
    pub fn new(contacts: Vec<RecordedContact>) -> Self {
        Self { contacts }
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

impl EclipseSource for RecordedEclipses {
    fn contacts(
        &self,
        kind: EclipseKind,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<EclipseContact>, EclipseError> {
        let margin = Duration::hours(CONTACT_MARGIN_HOURS);
        let from = start
            .checked_sub_signed(margin)
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let until = end
            .checked_add_signed(margin)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Ok(self
            .contacts
            .iter()
            .filter(|c| c.kind == kind && from <= c.instant && c.instant < until)
            .map(|c| EclipseContact::new(c.instant, c.phase))
            .collect())
    }
}

/// One recorded altitude sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecordedAltitude {
    pub body: CelestialBody,
    pub instant: DateTime<Utc>,
    pub altitude_deg: f64,
}

/// Maximum distance between a query instant and a recorded sample.
const ALTITUDE_TOLERANCE_MINUTES: i64 = 5;

/// Altitude source replaying recorded samples for one observer.
///
/// Lookups match the nearest sample for the body within five minutes;
/// anything else is an [`EclipseError::Altitude`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordedAltitudes {
    samples: Vec<RecordedAltitude>,
}

impl RecordedAltitudes {
    pub fn new(samples: Vec<RecordedAltitude>) -> Self {
        Self { samples }
    }
}

impl AltitudeSource for RecordedAltitudes {
    fn altitude_deg(
        &self,
        body: CelestialBody,
        instant: DateTime<Utc>,
        _observer: &GeoPoint,
    ) -> Result<f64, EclipseError> {
        let tolerance = Duration::minutes(ALTITUDE_TOLERANCE_MINUTES);
        self.samples
            .iter()
            .filter(|s| s.body == body)
            .map(|s| ((s.instant - instant).abs(), s.altitude_deg))
            .filter(|(delta, _)| *delta <= tolerance)
            .min_by_key(|(delta, _)| *delta)
            .map(|(_, altitude)| altitude)
            .ok_or_else(|| {
                EclipseError::Altitude(format!("no recorded {body:?} altitude near {instant}"))
            })
    }
}
