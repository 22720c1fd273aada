//! Temporal matching between two event streams.
//!
//! This crate provides:
//! - [`PrimaryEvent`] / [`SecondaryEvent`] traits, implemented for
//!   disaster events and near-Earth-object close approaches
//! - Weighted pair scoring with configurable window, scales and thresholds
//! - [`CorrelationLedger`], which keeps at most one record per event pair
//!   across incremental batches

pub mod error;
pub mod ledger;
pub mod match_types;
pub mod matcher;

pub use error::MatchError;
pub use ledger::CorrelationLedger;
pub use match_types::{
    ConfidenceLabel, CorrelationRecord, PrimaryEvent, ScoreWeights, ScoringConfig, SecondaryEvent,
    TimedEvent,
};
pub use matcher::{match_events, match_into, score_pair};
