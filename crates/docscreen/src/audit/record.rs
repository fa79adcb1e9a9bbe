//! The timestamped, reasoned outcome of evaluating one document.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metadata::DocumentMetadata;
use crate::policy::Decision;

/// Audit record for a single evaluated document.
///
/// Fields are private so a record cannot be edited after creation; the only
/// transition is [`AuditRecord::superseded_by`], which yields a new record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    processed_at: DateTime<Utc>,
    decision: Decision,
    reason: String,
    metadata: DocumentMetadata,
}

impl AuditRecord {
    /// Create a record stamped with the given processing time.
    pub fn new(
        processed_at: DateTime<Utc>,
        decision: Decision,
        reason: impl Into<String>,
        metadata: DocumentMetadata,
    ) -> Self {
        Self {
            processed_at,
            decision,
            reason: reason.into(),
            metadata,
        }
    }

    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    pub fn decision(&self) -> Decision {
        self.decision
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    /// Consume the record and return its metadata snapshot.
    pub fn into_metadata(self) -> DocumentMetadata {
        self.metadata
    }

    /// Derive the record of a version that lost to `winner`.
    pub fn superseded_by(&self, winner: &str) -> Self {
        Self {
            processed_at: self.processed_at,
            decision: Decision::RejectedSuperseded,
            reason: format!("Skipped because a newer version of this document was selected: {winner}."),
            metadata: self.metadata.clone(),
        }
    }
}
