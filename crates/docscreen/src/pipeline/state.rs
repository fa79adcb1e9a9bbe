//! Run-scoped state shared between pipeline stages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::AuditReport;
use crate::metadata::DocumentMetadata;
use crate::screening::{JudgmentOverride, ScreenedFile};

/// A source that could not be ingested during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFailure {
    pub source_id: String,
    pub message: String,
}

/// Typed slots handed from stage to stage.
///
/// Owned by the orchestrator for one run. Each stage writes only its own
/// slots, and only once it has finished successfully.
#[derive(Debug, Clone, Default)]
pub struct PipelineState {
    /// Candidate list written by the ingestion stage.
    pub file_list: Option<Vec<DocumentMetadata>>,
    /// Sources that failed during ingestion.
    pub source_failures: Vec<SourceFailure>,
    /// Optional free-form rules forwarded to judgment providers.
    pub screening_rules: Option<Value>,
    /// Screened list written by the screening stage.
    pub screened_list: Option<Vec<ScreenedFile>>,
    /// Audit report written by the screening stage.
    pub audit_report: Option<AuditReport>,
    /// Rejections added on top of the rule engine.
    pub judgment_overrides: Vec<JudgmentOverride>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the run with screening rules.
    pub fn with_screening_rules(mut self, rules: Value) -> Self {
        self.screening_rules = Some(rules);
        self
    }

    /// Seed the run with a candidate list, skipping ingestion.
    pub fn with_file_list(mut self, files: Vec<DocumentMetadata>) -> Self {
        self.file_list = Some(files);
        self
    }

    /// Candidates written so far, or an empty slice.
    pub fn candidates(&self) -> &[DocumentMetadata] {
        self.file_list.as_deref().unwrap_or(&[])
    }
}
