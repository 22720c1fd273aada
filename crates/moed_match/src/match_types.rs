//! Types for pairwise event matching.

use chrono::{DateTime, Utc};
use moed_events::{CloseApproach, DisasterEvent, GeoPoint};
use serde::{Deserialize, Serialize};

use crate::error::MatchError;

/// Identity, time and optional position shared by both event streams.
pub trait TimedEvent {
    fn event_id(&self) -> &str;
    fn timestamp(&self) -> DateTime<Utc>;
    fn location(&self) -> Option<&GeoPoint> {
        None
    }
}

/// Event of the first stream; larger magnitudes score higher.
pub trait PrimaryEvent: TimedEvent {
    fn magnitude(&self) -> f64;
}

/// Event of the second stream; smaller proximities score higher.
pub trait SecondaryEvent: TimedEvent {
    fn proximity(&self) -> f64;
}

impl TimedEvent for DisasterEvent {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    fn location(&self) -> Option<&GeoPoint> {
        self.location.as_ref()
    }
}

impl PrimaryEvent for DisasterEvent {
    fn magnitude(&self) -> f64 {
        self.magnitude
    }
}

impl TimedEvent for CloseApproach {
    fn event_id(&self) -> &str {
        &self.id
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

impl SecondaryEvent for CloseApproach {
    /// Miss distance in AU.
    fn proximity(&self) -> f64 {
        self.miss_distance_au
    }
}

/// Relative weights of the three score factors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub distance: f64,
    pub magnitude: f64,
    pub temporal: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            distance: 0.4,
            magnitude: 0.4,
            temporal: 0.2,
        }
    }
}

/// Matching window, factor scales, weights and emission thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Pairs further apart than this are never scored.
    pub window_days: f64,
    /// Proximity at which the distance factor reaches zero.
    pub proximity_threshold: f64,
    /// Minimum score for a record to be emitted.
    pub min_score: f64,
    /// Minimum score for a HIGH label.
    pub high_confidence: f64,
    /// Magnitude giving a full magnitude factor.
    pub magnitude_scale: f64,
    pub weights: ScoreWeights,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            window_days: 7.0,
            proximity_threshold: 0.05,
            min_score: 0.5,
            high_confidence: 0.7,
            magnitude_scale: 10.0,
            weights: ScoreWeights::default(),
        }
    }
}

fn positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

impl ScoringConfig {
    pub fn validate(&self) -> Result<(), MatchError> {
        if !positive(self.window_days) {
            return Err(MatchError::InvalidConfig("window_days must be positive"));
        }
        if !positive(self.proximity_threshold) {
            return Err(MatchError::InvalidConfig(
                "proximity_threshold must be positive",
            ));
        }
        if !positive(self.magnitude_scale) {
            return Err(MatchError::InvalidConfig("magnitude_scale must be positive"));
        }
        if !(0.0..=1.0).contains(&self.min_score) {
            return Err(MatchError::InvalidConfig("min_score must be within [0, 1]"));
        }
        if !(self.min_score..=1.0).contains(&self.high_confidence) {
            return Err(MatchError::InvalidConfig(
                "high_confidence must be within [min_score, 1]",
            ));
        }
        let w = self.weights;
        if [w.distance, w.magnitude, w.temporal]
            .iter()
            .any(|v| !v.is_finite() || *v < 0.0)
        {
            return Err(MatchError::InvalidConfig(
                "weights must be finite and non-negative",
            ));
        }
        Ok(())
    }
}

/// Confidence band of an emitted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfidenceLabel {
    High,
    Medium,
}

/// One scored pair of a primary and a secondary event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationRecord {
    pub primary_ref: String,
    pub secondary_ref: String,
    /// Secondary minus primary timestamp, hours.
    pub time_delta_hours: f64,
    pub confidence_score: f64,
    pub confidence: ConfidenceLabel,
    /// Great-circle distance when both events carry a location.
    pub spatial_distance_km: Option<f64>,
}
