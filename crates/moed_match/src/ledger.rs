//! Accumulated correlation records, at most one per event pair.

use std::collections::HashSet;

use serde::Serialize;

use crate::match_types::CorrelationRecord;

/// Insertion-ordered records keyed by (primary, secondary) id pair.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CorrelationLedger {
    records: Vec<CorrelationRecord>,
    #[serde(skip)]
    seen: HashSet<(String, String)>,
}

impl CorrelationLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `record` unless its pair is already present.
    /// Returns whether the record was added.
    pub fn insert(&mut self, record: CorrelationRecord) -> bool {
        let key = (record.primary_ref.clone(), record.secondary_ref.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.records.push(record);
        true
    }

    pub fn contains(&self, primary_ref: &str, secondary_ref: &str) -> bool {
        self.seen
            .contains(&(primary_ref.to_string(), secondary_ref.to_string()))
    }

    pub fn records(&self) -> &[CorrelationRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn into_records(self) -> Vec<CorrelationRecord> {
        self.records
    }
}
