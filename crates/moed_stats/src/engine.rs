//! Correlation engine over historical feast/event patterns.

use std::collections::{BTreeMap, BTreeSet};

use moed_calendar::{ALL_FEASTS, FeastDay, FeastKind};
use moed_events::{ALL_EVENT_TYPES, EventType};
use tracing::debug;

use crate::bayes::bayesian_probability;
use crate::bootstrap::{bootstrap_means, percentile_interval};
use crate::correlation::{correlation_p_value, mean, pearson, population_std, spearman};
use crate::error::StatsError;
use crate::isolation::{DEFAULT_SUBSAMPLE, DEFAULT_TREES, IsolationForest, check_features};
use crate::stats_types::{
    ALL_SEASONS, ConfidenceInterval, HistoricalPattern, PatternPrediction, Season,
    SeasonalAggregate, StatisticalAnalysis, StatsConfig,
};

/// Weight of the average historical correlation in a risk score.
const RISK_CORRELATION_WEIGHT: f64 = 0.4;
/// Weight of the most likely event type in a risk score.
const RISK_PROBABILITY_WEIGHT: f64 = 0.6;
/// Patterns needed for full prediction confidence.
const FULL_CONFIDENCE_SAMPLES: f64 = 10.0;

/// Statistical analysis with a fixed configuration.
#[derive(Debug, Clone, Default)]
pub struct CorrelationEngine {
    config: StatsConfig,
}

impl CorrelationEngine {
    pub fn new(config: StatsConfig) -> Result<Self, StatsError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &StatsConfig {
        &self.config
    }

    fn seed(&self) -> u64 {
        self.config.bootstrap_seed.unwrap_or_else(rand::random)
    }

    /// Pearson and Spearman correlation of paired samples, their p-values,
    /// and bootstrap intervals for the mean of `a`.
    pub fn statistical_significance(
        &self,
        a: &[f64],
        b: &[f64],
    ) -> Result<StatisticalAnalysis, StatsError> {
        if a.len() != b.len() {
            return Err(StatsError::LengthMismatch {
                left: a.len(),
                right: b.len(),
            });
        }
        check_finite(a)?;
        check_finite(b)?;
        let n = a.len();
        if n < 2 {
            return Ok(StatisticalAnalysis::degenerate(n));
        }

        let pearson_r = pearson(a, b);
        let spearman_r = spearman(a, b);
        let pearson_p = correlation_p_value(pearson_r, n);
        let spearman_p = correlation_p_value(spearman_r, n);
        let p_value = pearson_p.min(spearman_p);

        let means = bootstrap_means(a, self.config.bootstrap_iterations, self.seed());
        let analysis = StatisticalAnalysis {
            pearson_r,
            spearman_r,
            pearson_p,
            spearman_p,
            p_value,
            ci_95: percentile_interval(&means, 0.05),
            ci_99: percentile_interval(&means, 0.01),
            sample_size: n,
            is_significant: p_value < self.config.significance_level,
        };
        debug!(n, pearson_r, spearman_r, p_value, "significance test");
        Ok(analysis)
    }

    /// Percentile bootstrap interval for the mean of `sample` at level
    /// `1 − alpha`; (0, 0) for an empty sample.
    pub fn bootstrap_ci(
        &self,
        sample: &[f64],
        alpha: f64,
    ) -> Result<ConfidenceInterval, StatsError> {
        if !(alpha > 0.0 && alpha < 1.0) {
            return Err(StatsError::InvalidConfig("alpha must be within (0, 1)"));
        }
        check_finite(sample)?;
        let means = bootstrap_means(sample, self.config.bootstrap_iterations, self.seed());
        Ok(percentile_interval(&means, alpha))
    }

    /// P(event_type | feast) over the supplied history.
    pub fn bayesian_probability(
        &self,
        feast: FeastKind,
        event_type: EventType,
        patterns: &[HistoricalPattern],
    ) -> f64 {
        bayesian_probability(feast, event_type, patterns)
    }

    /// Isolation scores of each row, aligned to input order.
    pub fn anomaly_scores(&self, features: &[Vec<f64>]) -> Result<Vec<f64>, StatsError> {
        check_features(features)?;
        if features.is_empty() {
            return Ok(Vec::new());
        }
        let forest = IsolationForest::fit(features, DEFAULT_TREES, DEFAULT_SUBSAMPLE, self.seed());
        Ok(features.iter().map(|row| forest.score(row)).collect())
    }

    /// Flag the `round(contamination · n)` most isolated rows.
    pub fn detect_anomalies(&self, features: &[Vec<f64>]) -> Result<Vec<bool>, StatsError> {
        let scores = self.anomaly_scores(features)?;
        Ok(self.flag_anomalies(&scores))
    }

    /// Mask of the `round(contamination · n)` highest `scores`; ties keep
    /// the earlier row.
    pub fn flag_anomalies(&self, scores: &[f64]) -> Vec<bool> {
        let flagged = (self.config.anomaly_contamination * scores.len() as f64).round() as usize;

        let mut order: Vec<usize> = (0..scores.len()).collect();
        order.sort_by(|&i, &j| scores[j].total_cmp(&scores[i]).then(i.cmp(&j)));

        let mut mask = vec![false; scores.len()];
        for &i in order.iter().take(flagged) {
            mask[i] = true;
        }
        debug!(rows = scores.len(), flagged, "anomaly detection");
        mask
    }

    /// Risk outlook for each upcoming feast, highest risk first.
    pub fn predict_future_patterns(
        &self,
        upcoming: &[FeastDay],
        patterns: &[HistoricalPattern],
    ) -> Vec<PatternPrediction> {
        let all: Vec<f64> = patterns.iter().map(|p| p.correlation).collect();
        let (overall_mean, overall_std) = (mean(&all), population_std(&all));

        let mut predictions: Vec<PatternPrediction> = upcoming
            .iter()
            .map(|feast| {
                let related: Vec<&HistoricalPattern> =
                    patterns.iter().filter(|p| p.feast == feast.kind).collect();
                let correlations: Vec<f64> = related.iter().map(|p| p.correlation).collect();
                let avg = mean(&correlations);

                let types: BTreeSet<EventType> = related.iter().map(|p| p.event_type).collect();
                let probability_by_type: BTreeMap<EventType, f64> = types
                    .into_iter()
                    .map(|t| (t, bayesian_probability(feast.kind, t, patterns)))
                    .collect();
                let max_prob = probability_by_type.values().copied().fold(0.0, f64::max);

                let mut predicted: Vec<(EventType, f64)> = probability_by_type
                    .iter()
                    .filter(|&(_, &p)| p >= self.config.prediction_threshold)
                    .map(|(&t, &p)| (t, p))
                    .collect();
                predicted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));

                let anomaly_score = if related.is_empty() || overall_std == 0.0 {
                    0.0
                } else {
                    ((avg - overall_mean).abs() / overall_std).clamp(0.0, 1.0)
                };

                PatternPrediction {
                    feast_name: feast.name.clone(),
                    feast_kind: feast.kind,
                    feast_date: feast.start_date,
                    risk_score: (RISK_CORRELATION_WEIGHT * avg + RISK_PROBABILITY_WEIGHT * max_prob)
                        .clamp(0.0, 1.0),
                    confidence: (related.len() as f64 / FULL_CONFIDENCE_SAMPLES).min(1.0),
                    predicted_event_types: predicted.into_iter().map(|(t, _)| t).collect(),
                    probability_by_type,
                    historical_correlation: avg,
                    anomaly_score,
                }
            })
            .collect();

        predictions.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score));
        debug!(
            feasts = upcoming.len(),
            patterns = patterns.len(),
            "predictions computed"
        );
        predictions
    }

    /// Mean correlation for every feast × event type cell (0 when unseen).
    pub fn correlation_matrix(
        &self,
        patterns: &[HistoricalPattern],
    ) -> BTreeMap<FeastKind, BTreeMap<EventType, f64>> {
        let mut sums: BTreeMap<(FeastKind, EventType), (f64, usize)> = BTreeMap::new();
        for p in patterns {
            let cell = sums.entry((p.feast, p.event_type)).or_insert((0.0, 0));
            cell.0 += p.correlation;
            cell.1 += 1;
        }
        ALL_FEASTS
            .iter()
            .map(|&feast| {
                let row = ALL_EVENT_TYPES
                    .iter()
                    .map(|&t| {
                        let value = match sums.get(&(feast, t)) {
                            Some(&(sum, count)) if count > 0 => {
                                (sum / count as f64).clamp(0.0, 1.0)
                            }
                            _ => 0.0,
                        };
                        (t, value)
                    })
                    .collect();
                (feast, row)
            })
            .collect()
    }

    /// Count and mean correlation per season of the feast date.
    pub fn seasonal_patterns(
        &self,
        patterns: &[HistoricalPattern],
    ) -> BTreeMap<Season, SeasonalAggregate> {
        let mut buckets: BTreeMap<Season, Vec<f64>> =
            ALL_SEASONS.iter().map(|&s| (s, Vec::new())).collect();
        for p in patterns {
            buckets
                .entry(Season::of(p.feast_date))
                .or_default()
                .push(p.correlation);
        }
        buckets
            .into_iter()
            .map(|(season, values)| {
                let aggregate = SeasonalAggregate {
                    count: values.len(),
                    avg_correlation: mean(&values),
                };
                (season, aggregate)
            })
            .collect()
    }
}

fn check_finite(values: &[f64]) -> Result<(), StatsError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(i) => Err(StatsError::NonFinite(i)),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use moed_calendar::CalendarEngine;

    use super::*;

    const _: () = {
        const fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CorrelationEngine>();
    };

    fn seeded() -> CorrelationEngine {
        CorrelationEngine::new(StatsConfig {
            bootstrap_seed: Some(42),
            ..StatsConfig::default()
        })
        .unwrap()
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn pattern(feast: FeastKind, date: NaiveDate, t: EventType, c: f64) -> HistoricalPattern {
        HistoricalPattern::new(feast, date, t, c).unwrap()
    }

    fn history() -> Vec<HistoricalPattern> {
        use EventType::*;
        use FeastKind::*;
        vec![
            pattern(Passover, ymd(2014, 4, 14), Earthquake, 0.8),
            pattern(Passover, ymd(2015, 4, 3), Earthquake, 0.6),
            pattern(Passover, ymd(2016, 4, 22), Flood, 0.4),
            pattern(Trumpets, ymd(2015, 9, 14), Volcano, 0.2),
            pattern(Trumpets, ymd(2016, 10, 3), Earthquake, 0.1),
        ]
    }

    #[test]
    fn significance_strong_relationship() {
        let a: Vec<f64> = (0..30).map(f64::from).collect();
        let b: Vec<f64> = a.iter().map(|x| 3.0 * x - 2.0).collect();
        let result = seeded().statistical_significance(&a, &b).unwrap();
        assert!((result.pearson_r - 1.0).abs() < 1e-12);
        assert!(result.is_significant);
        assert_eq!(result.p_value, result.pearson_p.min(result.spearman_p));
        assert!(result.ci_95.contains(mean(&a)));
        assert_eq!(result.sample_size, 30);
    }

    #[test]
    fn significance_degenerate_inputs() {
        let engine = seeded();
        let one = engine.statistical_significance(&[1.0], &[2.0]).unwrap();
        assert_eq!(one, StatisticalAnalysis::degenerate(1));
        let empty = engine.statistical_significance(&[], &[]).unwrap();
        assert_eq!(empty.p_value, 1.0);
        assert_eq!(empty.ci_95, ConfidenceInterval::default());

        let flat = engine
            .statistical_significance(&[2.0, 2.0, 2.0], &[1.0, 5.0, 3.0])
            .unwrap();
        assert_eq!(flat.pearson_r, 0.0);
        assert_eq!(flat.pearson_p, 1.0);
        assert!(!flat.is_significant);
    }

    #[test]
    fn two_points_are_never_significant() {
        let result = seeded()
            .statistical_significance(&[1.0, 2.0], &[3.0, 5.0])
            .unwrap();
        assert_eq!(result.p_value, 1.0);
        assert!(!result.is_significant);
    }

    #[test]
    fn significance_rejects_unequal_lengths() {
        assert_eq!(
            seeded().statistical_significance(&[1.0, 2.0], &[1.0]),
            Err(StatsError::LengthMismatch { left: 2, right: 1 })
        );
    }

    #[test]
    fn bootstrap_ci_validates_alpha() {
        let engine = seeded();
        assert!(engine.bootstrap_ci(&[1.0, 2.0], 0.0).is_err());
        assert_eq!(
            engine.bootstrap_ci(&[], 0.05).unwrap(),
            ConfidenceInterval::default()
        );
    }

    #[test]
    fn detect_flags_contamination_fraction() {
        let mut rows: Vec<Vec<f64>> = (0..19)
            .map(|i| {
                let t = f64::from(i);
                vec![(t * 0.7).sin(), (t * 1.3).cos()]
            })
            .collect();
        rows.insert(7, vec![40.0, 40.0]);
        let mask = seeded().detect_anomalies(&rows).unwrap();
        assert_eq!(mask.len(), 20);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 2);
        assert!(mask[7]);
    }

    #[test]
    fn detect_empty_and_ragged() {
        let engine = seeded();
        assert!(engine.detect_anomalies(&[]).unwrap().is_empty());
        assert!(matches!(
            engine.detect_anomalies(&[vec![1.0], vec![1.0, 2.0]]),
            Err(StatsError::DimensionMismatch { row: 1, .. })
        ));
    }

    #[test]
    fn predictions_sorted_and_scored() {
        let calendar = CalendarEngine::arithmetic();
        let upcoming: Vec<FeastDay> = calendar
            .feasts_for_year(2026)
            .unwrap()
            .into_values()
            .collect();
        let predictions = seeded().predict_future_patterns(&upcoming, &history());
        assert_eq!(predictions.len(), 6);
        assert!(
            predictions
                .windows(2)
                .all(|w| w[0].risk_score >= w[1].risk_score)
        );

        let passover = predictions
            .iter()
            .find(|p| p.feast_kind == FeastKind::Passover)
            .unwrap();
        // avg 0.6; P(earthquake | passover) = 2/3.
        assert!((passover.historical_correlation - 0.6).abs() < 1e-12);
        let quake = passover.probability_by_type[&EventType::Earthquake];
        assert!((quake - 2.0 / 3.0).abs() < 1e-12);
        assert!((passover.risk_score - (0.4 * 0.6 + 0.6 * 2.0 / 3.0)).abs() < 1e-12);
        assert!((passover.confidence - 0.3).abs() < 1e-12);
        assert_eq!(
            passover.predicted_event_types,
            vec![EventType::Earthquake, EventType::Flood]
        );
        assert!((0.0..=1.0).contains(&passover.anomaly_score));

        let atonement = predictions
            .iter()
            .find(|p| p.feast_kind == FeastKind::Atonement)
            .unwrap();
        assert_eq!(atonement.risk_score, 0.0);
        assert_eq!(atonement.confidence, 0.0);
        assert!(atonement.predicted_event_types.is_empty());
        assert_eq!(atonement.anomaly_score, 0.0);
    }

    #[test]
    fn matrix_has_full_grid() {
        let matrix = seeded().correlation_matrix(&history());
        assert_eq!(matrix.len(), 6);
        assert!(matrix.values().all(|row| row.len() == 8));
        let cell = matrix[&FeastKind::Passover][&EventType::Earthquake];
        assert!((cell - 0.7).abs() < 1e-12);
        assert_eq!(matrix[&FeastKind::Atonement][&EventType::Tsunami], 0.0);
    }

    #[test]
    fn seasonal_buckets() {
        let seasons = seeded().seasonal_patterns(&history());
        assert_eq!(seasons.len(), 4);
        assert_eq!(seasons[&Season::Spring].count, 3);
        assert_eq!(seasons[&Season::Fall].count, 2);
        assert_eq!(seasons[&Season::Winter], SeasonalAggregate::default());
        assert!((seasons[&Season::Fall].avg_correlation - 0.15).abs() < 1e-12);

        let empty = seeded().seasonal_patterns(&[]);
        assert_eq!(empty.len(), 4);
    }

    #[test]
    fn invalid_config_rejected() {
        let config = StatsConfig {
            significance_level: 1.5,
            ..StatsConfig::default()
        };
        assert!(matches!(
            CorrelationEngine::new(config),
            Err(StatsError::InvalidConfig(_))
        ));
    }
}
