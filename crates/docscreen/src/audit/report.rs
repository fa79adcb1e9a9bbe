//! Aggregation of audit records into a run report.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::policy::Decision;

use super::record::AuditRecord;

/// Report for one run, as exported to compliance tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub generated_at: DateTime<Utc>,
    pub total_evaluated: usize,
    /// Count per decision; every decision is present, zero included.
    pub counts: IndexMap<Decision, usize>,
    pub records: Vec<AuditRecord>,
}

impl AuditReport {
    /// Build a report from a finished set of records.
    pub fn from_records(records: Vec<AuditRecord>) -> Self {
        let mut counts: IndexMap<Decision, usize> =
            Decision::ALL.iter().map(|d| (*d, 0)).collect();
        for record in &records {
            *counts.entry(record.decision()).or_insert(0) += 1;
        }

        Self {
            generated_at: Utc::now(),
            total_evaluated: records.len(),
            counts,
            records,
        }
    }

    /// Number of records with a given decision.
    pub fn count(&self, decision: Decision) -> usize {
        self.counts.get(&decision).copied().unwrap_or(0)
    }

    /// Records that were accepted.
    pub fn accepted(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter().filter(|r| r.decision().is_accepted())
    }

    /// Records that were rejected for any reason.
    pub fn rejected(&self) -> impl Iterator<Item = &AuditRecord> {
        self.records.iter().filter(|r| r.decision().is_rejected())
    }

    /// Fraction of evaluated documents that were accepted.
    pub fn acceptance_rate(&self) -> f64 {
        if self.total_evaluated == 0 {
            return 0.0;
        }
        self.count(Decision::Accepted) as f64 / self.total_evaluated as f64
    }
}

/// Collects audit records for a run. Holds no decision logic.
#[derive(Debug, Clone, Default)]
pub struct AuditRecorder {
    records: Vec<AuditRecord>,
}

impl AuditRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one record.
    pub fn record(&mut self, record: AuditRecord) {
        self.records.push(record);
    }

    /// Add many records, preserving order.
    pub fn extend(&mut self, records: impl IntoIterator<Item = AuditRecord>) {
        self.records.extend(records);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[AuditRecord] {
        &self.records
    }

    /// Build the report from everything recorded so far.
    pub fn report(&self) -> AuditReport {
        AuditReport::from_records(self.records.clone())
    }

    /// Consume the recorder and build the report.
    pub fn into_report(self) -> AuditReport {
        AuditReport::from_records(self.records)
    }
}
