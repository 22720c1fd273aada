//! Eclipse engine: classification and observer visibility over date ranges.
//!
//! Algorithm:
//!   1. Fetch contact markers for the range from the [`EclipseSource`]
//!   2. Sort and cluster markers into eclipses (markers ≤ 1 day apart)
//!   3. Keep the single `Maximum` of each cluster as the eclipse instant;
//!      clusters without exactly one maximum are skipped as malformed
//!   4. Classify from the cluster's phase set
//!   5. Query the eclipsed body's altitude at maximum; above 0° is visible

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};
use moed_calendar::{CalendarEngine, HebrewCalendar};
use moed_events::GeoPoint;
use tracing::{debug, warn};

use crate::alignment::feast_alignments;
use crate::eclipse_types::{
    ContactPhase, EclipseClass, EclipseContact, EclipseEvent, EclipseKind, FeastAlignment,
    TetradConfig, TetradSequence,
};
use crate::error::EclipseError;
use crate::source::{AltitudeSource, EclipseSource};
use crate::tetrad::find_tetrads;

/// Markers further apart than this belong to different eclipses.
const CLUSTER_GAP_HOURS: i64 = 24;

/// Eclipse queries for one fixed observer.
#[derive(Debug, Clone)]
pub struct EclipseEngine<S, A> {
    source: S,
    altitude: A,
    observer: GeoPoint,
    tetrad: TetradConfig,
}

impl<S: EclipseSource, A: AltitudeSource> EclipseEngine<S, A> {
    pub fn new(source: S, altitude: A, observer: GeoPoint) -> Self {
        Self {
            source,
            altitude,
            observer,
            tetrad: TetradConfig::default(),
        }
    }

    /// Replace the tetrad settings after validating them.
    pub fn with_tetrad_config(mut self, tetrad: TetradConfig) -> Result<Self, EclipseError> {
        tetrad.validate()?;
        self.tetrad = tetrad;
        Ok(self)
    }

    pub fn observer(&self) -> &GeoPoint {
        &self.observer
    }

    pub fn tetrad_config(&self) -> &TetradConfig {
        &self.tetrad
    }

    /// Lunar eclipses with greatest eclipse in `[start, end]`, date-sorted.
    pub fn lunar_eclipses(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EclipseEvent>, EclipseError> {
        self.eclipses_of_kind(EclipseKind::Lunar, start, end)
    }

    /// Solar eclipses with greatest eclipse in `[start, end]`, date-sorted.
    pub fn solar_eclipses(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EclipseEvent>, EclipseError> {
        self.eclipses_of_kind(EclipseKind::Solar, start, end)
    }

    /// Lunar and solar eclipses merged by date (lunar first on ties).
    pub fn all_eclipses(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EclipseEvent>, EclipseError> {
        let lunar = self.lunar_eclipses(start, end)?;
        let solar = self.solar_eclipses(start, end)?;
        Ok(merge_by_date(lunar, solar))
    }

    /// Blood-moon tetrads whose members all fall in `[start, end]`.
    pub fn blood_moon_tetrads(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TetradSequence>, EclipseError> {
        let lunar = self.lunar_eclipses(start, end)?;
        let tetrads = find_tetrads(&lunar, &self.tetrad);
        debug!(%start, %end, lunar = lunar.len(), tetrads = tetrads.len(), "tetrad scan");
        Ok(tetrads)
    }

    /// Eclipses in `[start, end]` that align with a feast of their year.
    pub fn aligned_eclipses<C: HebrewCalendar>(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        calendar: &CalendarEngine<C>,
    ) -> Result<Vec<FeastAlignment>, EclipseError> {
        let eclipses = self.all_eclipses(start, end)?;
        let feasts = calendar.feasts_for_range(start.year(), end.year())?;
        Ok(feast_alignments(&eclipses, &feasts))
    }

    fn eclipses_of_kind(
        &self,
        kind: EclipseKind,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<EclipseEvent>, EclipseError> {
        let (from, until) = range_bounds(start, end)?;
        let mut contacts = self.source.contacts(kind, from, until)?;
        contacts.sort_by_key(|c| c.instant);

        let max_gap = Duration::hours(CLUSTER_GAP_HOURS);
        let mut events = Vec::new();
        for cluster in contacts.chunk_by(|a, b| b.instant - a.instant <= max_gap) {
            let Some(maximum) = single_maximum(cluster) else {
                warn!(
                    ?kind,
                    first = %cluster[0].instant,
                    markers = cluster.len(),
                    "skipping eclipse without exactly one maximum"
                );
                continue;
            };
            if maximum < from || maximum >= until {
                continue;
            }
            let body = kind.eclipsed_body();
            let altitude = match self.altitude.altitude_deg(body, maximum, &self.observer) {
                Ok(alt) if alt.is_finite() => alt,
                Ok(alt) => {
                    warn!(?kind, %maximum, alt, "skipping eclipse with non-finite altitude");
                    continue;
                }
                Err(e) => {
                    warn!(?kind, %maximum, error = %e, "skipping eclipse without altitude");
                    continue;
                }
            };
            let class = classify(kind, cluster);
            events.push(EclipseEvent::new(maximum, kind, class, altitude, &self.observer));
        }
        debug!(?kind, %start, %end, count = events.len(), "eclipses classified");
        Ok(events)
    }
}

/// UTC instants bounding the inclusive day range `[start, end]` as `[from, until)`.
/// An `end` on chrono's last day saturates to the last representable instant.
fn range_bounds(
    start: NaiveDate,
    end: NaiveDate,
) -> Result<(DateTime<Utc>, DateTime<Utc>), EclipseError> {
    if start > end {
        return Err(EclipseError::InvalidRange { start, end });
    }
    let from = start.and_time(NaiveTime::MIN).and_utc();
    let until = end
        .and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_signed(Duration::days(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    Ok((from, until))
}

fn single_maximum(cluster: &[EclipseContact]) -> Option<DateTime<Utc>> {
    let mut maxima = cluster.iter().filter(|c| c.phase == ContactPhase::Maximum);
    match (maxima.next(), maxima.next()) {
        (Some(max), None) => Some(max.instant),
        _ => None,
    }
}

/// Classification from the set of phases observed for one eclipse.
pub fn classify(kind: EclipseKind, contacts: &[EclipseContact]) -> EclipseClass {
    let any = |pred: fn(ContactPhase) -> bool| contacts.iter().any(|c| pred(c.phase));
    match kind {
        EclipseKind::Lunar => {
            if any(ContactPhase::is_total) {
                EclipseClass::Total
            } else if any(ContactPhase::is_partial) {
                EclipseClass::Partial
            } else {
                EclipseClass::Penumbral
            }
        }
        EclipseKind::Solar => {
            if any(ContactPhase::is_total) {
                EclipseClass::Total
            } else if any(ContactPhase::is_annular) {
                EclipseClass::Annular
            } else {
                EclipseClass::Partial
            }
        }
    }
}

/// Merge two date-sorted lists, keeping `first` ahead on equal dates.
fn merge_by_date(first: Vec<EclipseEvent>, second: Vec<EclipseEvent>) -> Vec<EclipseEvent> {
    let mut merged = Vec::with_capacity(first.len() + second.len());
    let mut a = first.into_iter().peekable();
    let mut b = second.into_iter().peekable();
    loop {
        let take_a = match (a.peek(), b.peek()) {
            (Some(x), Some(y)) => x.date <= y.date,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => break,
        };
        let next = if take_a { a.next() } else { b.next() };
        merged.extend(next);
    }
    merged
}
