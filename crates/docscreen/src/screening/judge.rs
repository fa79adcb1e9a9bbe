//! External screening judgments.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::audit::AuditRecord;
use crate::error::Result;

/// One file in a screened list.
///
/// This is both the screening stage's output format and the shape an
/// external judgment provider returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenedFile {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub modified_at: Option<DateTime<Utc>>,
    pub is_selected: bool,
    #[serde(default)]
    pub rejection_reason: Option<String>,
}

impl ScreenedFile {
    /// Project an audit record onto the screened-list format.
    pub fn from_record(record: &AuditRecord) -> Self {
        let meta = record.metadata();
        let selected = record.decision().is_accepted();
        Self {
            path: meta.source_path.clone(),
            name: meta.file_name.clone(),
            created_at: meta.created_at,
            modified_at: meta.updated_at,
            is_selected: selected,
            rejection_reason: (!selected).then(|| record.reason().to_string()),
        }
    }
}

/// Independent per-file judgments, e.g. from a reviewer model.
pub trait JudgmentProvider: Send + Sync {
    /// Get the name of this provider (for logging/debugging).
    fn name(&self) -> &str;

    /// Judge every file; files left out keep their deterministic outcome.
    ///
    /// `rules` carries optional free-form screening rules from the run state.
    fn judge(&self, files: &[ScreenedFile], rules: Option<&Value>) -> Result<Vec<ScreenedFile>>;
}

impl<P: JudgmentProvider + ?Sized> JudgmentProvider for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn judge(&self, files: &[ScreenedFile], rules: Option<&Value>) -> Result<Vec<ScreenedFile>> {
        (**self).judge(files, rules)
    }
}

/// Name hints for temporary or unfinished files.
pub const TEMPORARY_HINTS: [&str; 3] = ["draft", "wip", "tmp"];

/// Name hints for confidential files.
pub const CONFIDENTIAL_HINTS: [&str; 3] = ["confidential", "secret", "internal-only"];

/// Provider that judges by name patterns.
///
/// Rejects temporary and confidential files. Extra patterns can be passed
/// through the run's screening rules as `{"rejectPatterns": ["..."]}`.
#[derive(Debug, Clone, Default)]
pub struct MockJudge {
    extra_patterns: Vec<String>,
}

impl MockJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pattern that always leads to rejection.
    pub fn with_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.extra_patterns.push(pattern.into().to_lowercase());
        self
    }

    fn rule_patterns(rules: Option<&Value>) -> Vec<String> {
        rules
            .and_then(|r| r.get("rejectPatterns"))
            .and_then(Value::as_array)
            .map(|patterns| {
                patterns
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_lowercase)
                    .collect()
            })
            .unwrap_or_default()
    }

    fn verdict(&self, file: &ScreenedFile, rule_patterns: &[String]) -> Option<String> {
        let haystack = format!("{} {}", file.path, file.name).to_lowercase();

        if let Some(hint) = TEMPORARY_HINTS.iter().find(|h| haystack.contains(*h)) {
            return Some(format!("Rejected as draft/temporary (matched '{}').", hint));
        }
        if let Some(hint) = CONFIDENTIAL_HINTS.iter().find(|h| haystack.contains(*h)) {
            return Some(format!("Rejected as confidential (matched '{}').", hint));
        }
        self.extra_patterns
            .iter()
            .chain(rule_patterns)
            .find(|p| !p.is_empty() && haystack.contains(p.as_str()))
            .map(|p| format!("Rejected by screening rule (matched '{}').", p))
    }
}

impl JudgmentProvider for MockJudge {
    fn name(&self) -> &str {
        "mock-judge"
    }

    fn judge(&self, files: &[ScreenedFile], rules: Option<&Value>) -> Result<Vec<ScreenedFile>> {
        let rule_patterns = Self::rule_patterns(rules);

        Ok(files
            .iter()
            .map(|file| {
                let mut judged = file.clone();
                match self.verdict(file, &rule_patterns) {
                    Some(reason) => {
                        judged.is_selected = false;
                        judged.rejection_reason = Some(reason);
                    }
                    None => {
                        judged.is_selected = true;
                        judged.rejection_reason = None;
                    }
                }
                judged
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn file(path: &str) -> ScreenedFile {
        let name = path.rsplit('/').next().unwrap_or(path).to_string();
        ScreenedFile {
            path: path.to_string(),
            name,
            created_at: None,
            modified_at: None,
            is_selected: true,
            rejection_reason: None,
        }
    }

    #[test]
    fn test_mock_judge_rejects_confidential() {
        let judged = MockJudge::new()
            .judge(
                &[
                    file("/final/employee_salaries_confidential.pdf"),
                    file("/final/handbook.pdf"),
                    file("/final/tmp/scratch.md"),
                ],
                None,
            )
            .unwrap();

        assert!(!judged[0].is_selected);
        assert!(judged[0].rejection_reason.as_deref().unwrap().contains("confidential"));
        assert!(judged[1].is_selected);
        assert!(!judged[2].is_selected);
    }

    #[test]
    fn test_mock_judge_uses_rule_patterns() {
        let rules = json!({"rejectPatterns": ["Legacy"]});
        let judged = MockJudge::new()
            .judge(&[file("/final/legacy_policy.md")], Some(&rules))
            .unwrap();
        assert!(!judged[0].is_selected);
    }

    #[test]
    fn test_screened_file_wire_format() {
        let value = serde_json::to_value(file("/final/a.md")).unwrap();
        assert_eq!(value["isSelected"], true);
        assert!(value["rejectionReason"].is_null());
        assert!(value.get("modifiedAt").is_some());
    }
}
