//! Pairwise temporal matcher.
//!
//! Every (primary, secondary) pair within the window is scored from three
//! factors in [0, 1]:
//!   - distance:  max(0, 1 − proximity / proximity_threshold)
//!   - magnitude: magnitude / magnitude_scale, clamped
//!   - temporal:  1 − |Δt| / window
//!
//! The weighted sum is emitted when it reaches `min_score`. The scan is
//! parallel over the primary stream; output keeps primary-major,
//! secondary-minor input order.

use rayon::prelude::*;
use tracing::debug;

use crate::error::MatchError;
use crate::ledger::CorrelationLedger;
use crate::match_types::{
    ConfidenceLabel, CorrelationRecord, PrimaryEvent, ScoringConfig, SecondaryEvent,
};

const SECONDS_PER_DAY: f64 = 86_400.0;
const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Score one pair, or `None` when outside the window or below `min_score`.
pub fn score_pair<P, S>(
    primary: &P,
    secondary: &S,
    config: &ScoringConfig,
) -> Option<CorrelationRecord>
where
    P: PrimaryEvent + ?Sized,
    S: SecondaryEvent + ?Sized,
{
    let delta = secondary.timestamp() - primary.timestamp();
    let delta_ms = delta.num_milliseconds() as f64;
    let days = delta_ms.abs() / 1000.0 / SECONDS_PER_DAY;
    if days > config.window_days {
        return None;
    }

    let distance = (1.0 - secondary.proximity() / config.proximity_threshold).max(0.0);
    let magnitude = (primary.magnitude() / config.magnitude_scale).clamp(0.0, 1.0);
    let temporal = 1.0 - days / config.window_days;

    let w = config.weights;
    let score =
        (w.distance * distance + w.magnitude * magnitude + w.temporal * temporal).clamp(0.0, 1.0);
    if score < config.min_score {
        return None;
    }

    let confidence = if score >= config.high_confidence {
        ConfidenceLabel::High
    } else {
        ConfidenceLabel::Medium
    };
    let spatial_distance_km = primary
        .location()
        .zip(secondary.location())
        .map(|(a, b)| a.distance_km(b));

    Some(CorrelationRecord {
        primary_ref: primary.event_id().to_string(),
        secondary_ref: secondary.event_id().to_string(),
        time_delta_hours: delta_ms / MILLIS_PER_HOUR,
        confidence_score: score,
        confidence,
        spatial_distance_km,
    })
}

/// Score every pair and add new ones to `ledger`. Returns how many records
/// were added; pairs already in the ledger are skipped.
pub fn match_into<P, S>(
    ledger: &mut CorrelationLedger,
    primary: &[P],
    secondary: &[S],
    config: &ScoringConfig,
) -> Result<usize, MatchError>
where
    P: PrimaryEvent + Sync,
    S: SecondaryEvent + Sync,
{
    config.validate()?;
    let candidates: Vec<Vec<CorrelationRecord>> = primary
        .par_iter()
        .map(|a| {
            secondary
                .iter()
                .filter_map(|b| score_pair(a, b, config))
                .collect()
        })
        .collect();

    let scored: usize = candidates.iter().map(Vec::len).sum();
    let added = candidates
        .into_iter()
        .flatten()
        .map(|record| ledger.insert(record))
        .filter(|&inserted| inserted)
        .count();
    debug!(
        primary = primary.len(),
        secondary = secondary.len(),
        scored,
        added,
        "temporal match"
    );
    Ok(added)
}

/// Scored records for every qualifying pair, each pair at most once.
pub fn match_events<P, S>(
    primary: &[P],
    secondary: &[S],
    config: &ScoringConfig,
) -> Result<Vec<CorrelationRecord>, MatchError>
where
    P: PrimaryEvent + Sync,
    S: SecondaryEvent + Sync,
{
    let mut ledger = CorrelationLedger::new();
    match_into(&mut ledger, primary, secondary, config)?;
    Ok(ledger.into_records())
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use moed_events::{CloseApproach, DisasterEvent, EventType, GeoPoint};

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 8, 18, 0, 0).unwrap()
    }

    fn quake(id: &str, magnitude: f64, offset: Duration) -> DisasterEvent {
        DisasterEvent::new(id, EventType::Earthquake, t0() + offset, magnitude).unwrap()
    }

    fn approach(id: &str, au: f64) -> CloseApproach {
        CloseApproach::new(id, "2024 GJ2", t0(), au).unwrap()
    }

    fn config() -> ScoringConfig {
        ScoringConfig {
            proximity_threshold: 0.1,
            ..ScoringConfig::default()
        }
    }

    #[test]
    fn reference_pair_scores_high() {
        let record = score_pair(
            &quake("eq-1", 7.5, Duration::days(3)),
            &approach("neo-1", 0.02),
            &config(),
        )
        .unwrap();
        let expected = 0.4 * 0.8 + 0.4 * 0.75 + 0.2 * (1.0 - 3.0 / 7.0);
        assert!((record.confidence_score - expected).abs() < 1e-9);
        assert!((record.confidence_score - 0.734).abs() < 1e-3);
        assert_eq!(record.confidence, ConfidenceLabel::High);
        assert_eq!(record.time_delta_hours, -72.0);
        assert_eq!(record.spatial_distance_km, None);
    }

    #[test]
    fn outside_window_is_skipped() {
        let pair = score_pair(
            &quake("eq-1", 9.0, Duration::days(8)),
            &approach("neo-1", 0.0),
            &config(),
        );
        assert!(pair.is_none());
    }

    #[test]
    fn window_edge_is_inclusive() {
        // Full distance and magnitude factors, zero temporal factor.
        let record = score_pair(
            &quake("eq-1", 10.0, Duration::days(7)),
            &approach("neo-1", 0.0),
            &config(),
        )
        .unwrap();
        assert!((record.confidence_score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn medium_band() {
        // 0.4·0.5 + 0.4·0.6 + 0.2·1 = 0.64
        let record = score_pair(
            &quake("eq-1", 6.0, Duration::zero()),
            &approach("neo-1", 0.05),
            &config(),
        )
        .unwrap();
        assert!((record.confidence_score - 0.64).abs() < 1e-12);
        assert_eq!(record.confidence, ConfidenceLabel::Medium);
    }

    #[test]
    fn below_min_score_is_dropped() {
        let pair = score_pair(
            &quake("eq-1", 2.0, Duration::days(5)),
            &approach("neo-1", 0.3),
            &config(),
        );
        assert!(pair.is_none());
    }

    #[test]
    fn magnitude_factor_is_capped() {
        let record = score_pair(
            &quake("eq-1", 25.0, Duration::zero()),
            &approach("neo-1", 0.1),
            &config(),
        )
        .unwrap();
        assert!((record.confidence_score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn located_secondary_reports_distance() {
        struct Fireball {
            at: DateTime<Utc>,
            location: GeoPoint,
        }
        impl crate::TimedEvent for Fireball {
            fn event_id(&self) -> &str {
                "fb-1"
            }
            fn timestamp(&self) -> DateTime<Utc> {
                self.at
            }
            fn location(&self) -> Option<&GeoPoint> {
                Some(&self.location)
            }
        }
        impl SecondaryEvent for Fireball {
            fn proximity(&self) -> f64 {
                0.0
            }
        }

        let here = GeoPoint::new(35.0, 139.0).unwrap();
        let primary = quake("eq-1", 8.0, Duration::hours(6)).with_location(here);
        let secondary = Fireball {
            at: t0(),
            location: here,
        };
        let record = score_pair(&primary, &secondary, &config()).unwrap();
        assert_eq!(record.spatial_distance_km, Some(0.0));
    }

    #[test]
    fn duplicates_emitted_once_in_input_order() {
        let primary = vec![
            quake("eq-1", 8.0, Duration::days(1)),
            quake("eq-2", 7.0, Duration::hours(-12)),
            quake("eq-1", 8.0, Duration::days(1)),
        ];
        let secondary = vec![approach("neo-1", 0.01), approach("neo-2", 0.02)];
        let records = match_events(&primary, &secondary, &config()).unwrap();
        let pairs: Vec<_> = records
            .iter()
            .map(|r| (r.primary_ref.as_str(), r.secondary_ref.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("eq-1", "neo-1"),
                ("eq-1", "neo-2"),
                ("eq-2", "neo-1"),
                ("eq-2", "neo-2"),
            ]
        );
    }

    #[test]
    fn incremental_batches_skip_known_pairs() {
        let primary = vec![quake("eq-1", 8.0, Duration::days(1))];
        let secondary = vec![approach("neo-1", 0.01)];
        let mut ledger = CorrelationLedger::new();
        assert_eq!(match_into(&mut ledger, &primary, &secondary, &config()), Ok(1));
        assert_eq!(match_into(&mut ledger, &primary, &secondary, &config()), Ok(0));
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn invalid_config_fails() {
        let bad = ScoringConfig {
            proximity_threshold: 0.0,
            ..ScoringConfig::default()
        };
        let result = match_events::<DisasterEvent, CloseApproach>(&[], &[], &bad);
        assert!(matches!(result, Err(MatchError::InvalidConfig(_))));
    }
}
