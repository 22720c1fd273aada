//! Statistical correlation engine for feast/event histories.
//!
//! This crate provides:
//! - Pearson/Spearman significance testing with Student's t p-values
//! - Percentile bootstrap intervals computed in parallel with seeded
//!   ChaCha streams
//! - Empirical Bayesian conditional probabilities
//! - Isolation-forest anomaly scoring and detection
//! - [`CorrelationEngine`], which combines these into feast risk
//!   predictions, correlation matrices and seasonal aggregates

pub mod bayes;
pub mod bootstrap;
pub mod correlation;
pub mod engine;
pub mod error;
pub mod isolation;
pub mod stats_types;

pub use bayes::bayesian_probability;
pub use bootstrap::{bootstrap_means, percentile, percentile_interval};
pub use correlation::{average_ranks, correlation_p_value, mean, pearson, population_std, spearman};
pub use engine::CorrelationEngine;
pub use error::StatsError;
pub use isolation::{IsolationForest, c_factor, check_features};
pub use stats_types::{
    ALL_SEASONS, ConfidenceInterval, HistoricalPattern, PatternPrediction, Season,
    SeasonalAggregate, StatisticalAnalysis, StatsConfig,
};
