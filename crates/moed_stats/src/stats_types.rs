//! Types for correlation analysis.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use moed_calendar::FeastKind;
use moed_events::EventType;
use serde::{Deserialize, Serialize};

use crate::error::StatsError;

/// Two-sided interval estimate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceInterval {
    pub lower: f64,
    pub upper: f64,
}

impl ConfidenceInterval {
    pub const fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Whether `value` lies within the interval (inclusive).
    pub fn contains(&self, value: f64) -> bool {
        self.lower <= value && value <= self.upper
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Result of a paired significance test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatisticalAnalysis {
    pub pearson_r: f64,
    pub spearman_r: f64,
    pub pearson_p: f64,
    pub spearman_p: f64,
    /// Smaller of the two p-values.
    pub p_value: f64,
    /// Bootstrap interval for the mean of the first series.
    pub ci_95: ConfidenceInterval,
    pub ci_99: ConfidenceInterval,
    pub sample_size: usize,
    pub is_significant: bool,
}

impl StatisticalAnalysis {
    /// Neutral result for samples too small to test.
    pub fn degenerate(sample_size: usize) -> Self {
        Self {
            pearson_r: 0.0,
            spearman_r: 0.0,
            pearson_p: 1.0,
            spearman_p: 1.0,
            p_value: 1.0,
            ci_95: ConfidenceInterval::default(),
            ci_99: ConfidenceInterval::default(),
            sample_size,
            is_significant: false,
        }
    }
}

/// One historical observation: how strongly an event type co-occurred with
/// a feast on a given date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawHistoricalPattern")]
pub struct HistoricalPattern {
    pub feast: FeastKind,
    pub feast_date: NaiveDate,
    pub event_type: EventType,
    /// Correlation strength in [0, 1].
    pub correlation: f64,
}

#[derive(Deserialize)]
struct RawHistoricalPattern {
    feast: FeastKind,
    feast_date: NaiveDate,
    event_type: EventType,
    correlation: f64,
}

impl TryFrom<RawHistoricalPattern> for HistoricalPattern {
    type Error = StatsError;

    fn try_from(raw: RawHistoricalPattern) -> Result<Self, Self::Error> {
        Self::new(raw.feast, raw.feast_date, raw.event_type, raw.correlation)
    }
}

impl HistoricalPattern {
    pub fn new(
        feast: FeastKind,
        feast_date: NaiveDate,
        event_type: EventType,
        correlation: f64,
    ) -> Result<Self, StatsError> {
        if !(0.0..=1.0).contains(&correlation) {
            return Err(StatsError::InvalidCorrelation(correlation));
        }
        Ok(Self {
            feast,
            feast_date,
            event_type,
            correlation,
        })
    }
}

/// Risk outlook for one upcoming feast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternPrediction {
    pub feast_name: String,
    pub feast_kind: FeastKind,
    pub feast_date: NaiveDate,
    pub risk_score: f64,
    pub confidence: f64,
    /// Event types at or above the prediction threshold, most likely first.
    pub predicted_event_types: Vec<EventType>,
    pub probability_by_type: BTreeMap<EventType, f64>,
    pub historical_correlation: f64,
    pub anomaly_score: f64,
}

/// Meteorological season (northern hemisphere).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Spring,
    Summer,
    Fall,
    Winter,
}

pub const ALL_SEASONS: [Season; 4] = [Season::Spring, Season::Summer, Season::Fall, Season::Winter];

impl Season {
    /// Season of a month number (1 = January); `None` outside 1..=12.
    pub const fn from_month(month: u32) -> Option<Self> {
        match month {
            3..=5 => Some(Self::Spring),
            6..=8 => Some(Self::Summer),
            9..=11 => Some(Self::Fall),
            12 | 1 | 2 => Some(Self::Winter),
            _ => None,
        }
    }

    pub fn of(date: NaiveDate) -> Self {
        Self::from_month(date.month()).unwrap_or(Self::Winter)
    }
}

/// Count and mean correlation of the patterns in one season.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SeasonalAggregate {
    pub count: usize,
    pub avg_correlation: f64,
}

/// Tunables for [`CorrelationEngine`](crate::CorrelationEngine).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// Fraction of points flagged by anomaly detection.
    pub anomaly_contamination: f64,
    pub bootstrap_iterations: usize,
    /// Seed for bootstrap resampling and isolation trees; random when unset.
    pub bootstrap_seed: Option<u64>,
    pub significance_level: f64,
    /// Minimum conditional probability for an event type to be predicted.
    pub prediction_threshold: f64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            anomaly_contamination: 0.10,
            bootstrap_iterations: 1000,
            bootstrap_seed: None,
            significance_level: 0.05,
            prediction_threshold: 0.3,
        }
    }
}

impl StatsConfig {
    pub fn validate(&self) -> Result<(), StatsError> {
        if !(0.0..=0.5).contains(&self.anomaly_contamination) {
            return Err(StatsError::InvalidConfig(
                "anomaly_contamination must be within [0, 0.5]",
            ));
        }
        if self.bootstrap_iterations == 0 {
            return Err(StatsError::InvalidConfig(
                "bootstrap_iterations must be positive",
            ));
        }
        if !(self.significance_level > 0.0 && self.significance_level < 1.0) {
            return Err(StatsError::InvalidConfig(
                "significance_level must be within (0, 1)",
            ));
        }
        if !(0.0..=1.0).contains(&self.prediction_threshold) {
            return Err(StatsError::InvalidConfig(
                "prediction_threshold must be within [0, 1]",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seasons_partition_the_year() {
        let mut counts = BTreeMap::new();
        for month in 1..=12 {
            let season = Season::from_month(month).unwrap();
            *counts.entry(season).or_insert(0) += 1;
        }
        assert_eq!(counts.len(), 4);
        assert!(counts.values().all(|&n| n == 3));
        assert_eq!(Season::from_month(0), None);
        assert_eq!(Season::from_month(13), None);
    }

    #[test]
    fn december_is_winter() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 25).unwrap();
        assert_eq!(Season::of(date), Season::Winter);
    }

    #[test]
    fn pattern_rejects_out_of_range_correlation() {
        let date = NaiveDate::from_ymd_opt(2024, 4, 22).unwrap();
        let err = HistoricalPattern::new(FeastKind::Passover, date, EventType::Earthquake, 1.5)
            .unwrap_err();
        assert_eq!(err, StatsError::InvalidCorrelation(1.5));
        assert!(
            HistoricalPattern::new(FeastKind::Passover, date, EventType::Earthquake, f64::NAN)
                .is_err()
        );
    }

    #[test]
    fn pattern_validates_when_deserialized() {
        let ok = r#"{"feast":"passover","feast_date":"2024-04-22",
            "event_type":"flood","correlation":0.4}"#;
        let pattern: HistoricalPattern = serde_json::from_str(ok).unwrap();
        assert_eq!(pattern.event_type, EventType::Flood);
        let bad = r#"{"feast":"passover","feast_date":"2024-04-22",
            "event_type":"flood","correlation":-0.1}"#;
        assert!(serde_json::from_str::<HistoricalPattern>(bad).is_err());
    }

    #[test]
    fn config_defaults_validate() {
        assert!(StatsConfig::default().validate().is_ok());
        let config = StatsConfig {
            bootstrap_iterations: 0,
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());
        let config = StatsConfig {
            anomaly_contamination: 0.6,
            ..StatsConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
