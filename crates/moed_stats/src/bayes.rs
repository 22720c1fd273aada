//! Empirical Bayesian conditional probability.

use moed_calendar::FeastKind;
use moed_events::EventType;

use crate::stats_types::HistoricalPattern;

/// P(event_type | feast) by Bayes' rule over empirical frequencies:
/// `P(feast | event) · P(event) / P(feast)`.
///
/// Returns 0 when `patterns` is empty or either marginal count is zero;
/// the result is capped at 1.
pub fn bayesian_probability(
    feast: FeastKind,
    event_type: EventType,
    patterns: &[HistoricalPattern],
) -> f64 {
    let total = patterns.len();
    let mut feast_count = 0usize;
    let mut event_count = 0usize;
    let mut joint = 0usize;
    for p in patterns {
        let is_feast = p.feast == feast;
        let is_event = p.event_type == event_type;
        feast_count += usize::from(is_feast);
        event_count += usize::from(is_event);
        joint += usize::from(is_feast && is_event);
    }
    if total == 0 || feast_count == 0 || event_count == 0 {
        return 0.0;
    }
    let total = total as f64;
    let p_feast_given_event = joint as f64 / event_count as f64;
    let p_event = event_count as f64 / total;
    let p_feast = feast_count as f64 / total;
    (p_feast_given_event * p_event / p_feast).clamp(0.0, 1.0)
}
