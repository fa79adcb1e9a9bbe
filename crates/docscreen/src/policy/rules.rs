//! Rule-based accept/reject policy over document metadata.
//!
//! Checks run in a fixed order and the first match wins:
//!
//! 1. extension allow-list → `rejected_non_document`
//! 2. draft hint in file name or tags → `rejected_draft`
//! 3. no final folder hint and no released status → `rejected_missing_final_signal`
//! 4. otherwise → `accepted`

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::AuditRecord;
use crate::metadata::{infer_path_parts, DocumentMetadata};

use super::decision::Decision;

/// Extensions accepted as documents.
pub const ALLOWED_EXTENSIONS: [&str; 5] = [".md", ".txt", ".docx", ".pdf", ".html"];

/// Hints that mark a file as a draft.
pub const DRAFT_HINTS: [&str; 3] = ["draft", "wip", "work in progress"];

/// Path fragments that mark a file as final.
pub const FINAL_FOLDER_HINTS: [&str; 2] = ["/final/", "/approved/"];

/// Status values that mark a file as released.
pub const RELEASED_STATUS_HINTS: [&str; 2] = ["released", "frozen"];

pub const REASON_NON_DOCUMENT: &str =
    "Skipped because extension is not in the allowed document list.";
pub const REASON_DRAFT: &str =
    "Skipped because file name or tags indicate a draft/work-in-progress state.";
pub const REASON_MISSING_FINAL_SIGNAL: &str =
    "Skipped because no final/approved folder hint or released/frozen status was detected.";
pub const REASON_ACCEPTED: &str = "Accepted for downstream standardization and vectorization.";

/// Hint lists used by the policy engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub allowed_extensions: Vec<String>,
    pub draft_hints: Vec<String>,
    pub final_folder_hints: Vec<String>,
    pub released_status_hints: Vec<String>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: owned_list(&ALLOWED_EXTENSIONS),
            draft_hints: owned_list(&DRAFT_HINTS),
            final_folder_hints: owned_list(&FINAL_FOLDER_HINTS),
            released_status_hints: owned_list(&RELEASED_STATUS_HINTS),
        }
    }
}

impl PolicyConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the extension allow-list. Entries are stored lower-cased.
    pub fn with_allowed_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.allowed_extensions = extensions
            .into_iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .collect();
        self
    }

    /// Add a draft hint on top of the current ones.
    pub fn with_draft_hint(mut self, hint: impl AsRef<str>) -> Self {
        self.draft_hints.push(hint.as_ref().trim().to_lowercase());
        self
    }

    pub fn with_final_folder_hint(mut self, hint: impl AsRef<str>) -> Self {
        self.final_folder_hints.push(hint.as_ref().trim().to_lowercase());
        self
    }

    pub fn with_released_status_hint(mut self, hint: impl AsRef<str>) -> Self {
        self.released_status_hints
            .push(hint.as_ref().trim().to_lowercase());
        self
    }
}

fn owned_list(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Pure, deterministic policy evaluator.
#[derive(Debug, Clone, Default)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl PolicyEngine {
    /// Engine with the default rule set.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide on a document without building an audit record.
    pub fn decide(&self, meta: &DocumentMetadata) -> (Decision, &'static str) {
        if !self.has_allowed_extension(meta) {
            return (Decision::RejectedNonDocument, REASON_NON_DOCUMENT);
        }
        if self.is_draft(meta) {
            return (Decision::RejectedDraft, REASON_DRAFT);
        }
        if !self.has_final_signal(meta) {
            return (
                Decision::RejectedMissingFinalSignal,
                REASON_MISSING_FINAL_SIGNAL,
            );
        }
        (Decision::Accepted, REASON_ACCEPTED)
    }

    /// Evaluate a document, stamping the record with the current time.
    pub fn evaluate(&self, meta: DocumentMetadata) -> AuditRecord {
        self.evaluate_at(meta, Utc::now())
    }

    /// Evaluate a document with an explicit processing time.
    pub fn evaluate_at(&self, meta: DocumentMetadata, processed_at: DateTime<Utc>) -> AuditRecord {
        let (decision, reason) = self.decide(&meta);
        AuditRecord::new(processed_at, decision, reason, meta)
    }

    // Both the recorded extension and the file name suffix must be allowed,
    // so an inconsistent record is rejected rather than trusted.
    fn has_allowed_extension(&self, meta: &DocumentMetadata) -> bool {
        let recorded = normalize(&meta.extension);
        let from_name = infer_path_parts(&meta.file_name).extension;
        !recorded.is_empty()
            && self.extension_allowed(&recorded)
            && self.extension_allowed(&from_name)
    }

    fn extension_allowed(&self, extension: &str) -> bool {
        self.config
            .allowed_extensions
            .iter()
            .any(|allowed| normalize(allowed) == extension)
    }

    fn is_draft(&self, meta: &DocumentMetadata) -> bool {
        includes_any(&meta.file_name, &self.config.draft_hints)
            || meta
                .tags
                .iter()
                .any(|tag| includes_any(tag, &self.config.draft_hints))
    }

    fn has_final_signal(&self, meta: &DocumentMetadata) -> bool {
        let path = meta.source_path.replace('\\', "/");
        let path_hint = includes_any(&path, &self.config.final_folder_hints);
        let status_hint = meta
            .status
            .as_deref()
            .is_some_and(|status| includes_any(status, &self.config.released_status_hints));
        path_hint || status_hint
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

fn includes_any(source: &str, hints: &[String]) -> bool {
    let source = normalize(source);
    hints
        .iter()
        .map(|hint| normalize(hint))
        .any(|hint| !hint.is_empty() && source.contains(&hint))
}

/// Evaluate a document with the default rule set.
pub fn evaluate(meta: DocumentMetadata) -> AuditRecord {
    PolicyEngine::new().evaluate(meta)
}

/// Evaluate a document with a custom rule set.
pub fn evaluate_with(config: &PolicyConfig, meta: DocumentMetadata) -> AuditRecord {
    PolicyEngine::with_config(config.clone()).evaluate(meta)
}
