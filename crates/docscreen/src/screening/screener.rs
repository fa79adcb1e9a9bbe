//! Screeners: the deterministic rule engine and the judgment layer on top.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::audit::{AuditRecord, AuditReport};
use crate::error::Result;
use crate::metadata::DocumentMetadata;
use crate::policy::{deduplicate, PolicyConfig, PolicyEngine};

use super::judge::{JudgmentProvider, ScreenedFile};

/// A file the judgment layer rejected after the rule engine accepted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgmentOverride {
    pub path: String,
    pub provider: String,
    pub reason: String,
}

/// Result of screening one candidate list.
#[derive(Debug, Clone, Default)]
pub struct Screening {
    /// One audit record per candidate, in candidate order.
    pub records: Vec<AuditRecord>,
    /// The screened list, in candidate order.
    pub files: Vec<ScreenedFile>,
    /// Rejections added by a judgment provider.
    pub overrides: Vec<JudgmentOverride>,
}

impl Screening {
    /// Audit report over this screening's records.
    pub fn report(&self) -> AuditReport {
        AuditReport::from_records(self.records.clone())
    }

    /// Files that survived screening.
    pub fn selected(&self) -> impl Iterator<Item = &ScreenedFile> {
        self.files.iter().filter(|f| f.is_selected)
    }
}

/// A screening pass over normalized candidates.
pub trait Screener: Send + Sync {
    /// Get the name of this screener (for logging/debugging).
    fn name(&self) -> &str;

    /// Screen the full candidate set of a run.
    ///
    /// Deduplication needs every sibling version, so callers pass the whole
    /// list at once rather than streaming it.
    fn screen(&self, candidates: &[DocumentMetadata], rules: Option<&Value>) -> Result<Screening>;
}

/// Rule engine plus version deduplication. Never fails.
#[derive(Debug, Clone, Default)]
pub struct DeterministicScreener {
    engine: PolicyEngine,
}

impl DeterministicScreener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(config: PolicyConfig) -> Self {
        Self {
            engine: PolicyEngine::with_config(config),
        }
    }

    /// Evaluate and deduplicate without the `Result` wrapper.
    pub fn screen_all(&self, candidates: &[DocumentMetadata]) -> Screening {
        let evaluated: Vec<AuditRecord> = candidates
            .iter()
            .cloned()
            .map(|meta| self.engine.evaluate(meta))
            .collect();
        let records = deduplicate(evaluated);
        let files = records.iter().map(ScreenedFile::from_record).collect();

        Screening {
            records,
            files,
            overrides: Vec::new(),
        }
    }
}

impl Screener for DeterministicScreener {
    fn name(&self) -> &str {
        "deterministic"
    }

    fn screen(&self, candidates: &[DocumentMetadata], _rules: Option<&Value>) -> Result<Screening> {
        Ok(self.screen_all(candidates))
    }
}

/// Deterministic screening refined by an external judgment provider.
///
/// A judgment can only remove a file from the selection; it never restores
/// one the rule engine rejected. If the provider fails, the deterministic
/// result is returned unchanged.
pub struct JudgmentScreener<P: JudgmentProvider> {
    base: DeterministicScreener,
    provider: P,
}

impl<P: JudgmentProvider> JudgmentScreener<P> {
    pub fn new(provider: P) -> Self {
        Self {
            base: DeterministicScreener::new(),
            provider,
        }
    }

    pub fn with_base(mut self, base: DeterministicScreener) -> Self {
        self.base = base;
        self
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: JudgmentProvider> Screener for JudgmentScreener<P> {
    fn name(&self) -> &str {
        self.provider.name()
    }

    fn screen(&self, candidates: &[DocumentMetadata], rules: Option<&Value>) -> Result<Screening> {
        let mut screening = self.base.screen_all(candidates);

        let judged = match self.provider.judge(&screening.files, rules) {
            Ok(judged) => judged,
            Err(e) => {
                warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Judgment provider failed; keeping deterministic screening"
                );
                return Ok(screening);
            }
        };

        // Several sources may list the same path; the n-th verdict for a path
        // belongs to the n-th file with that path.
        let mut verdicts: HashMap<&str, VecDeque<&ScreenedFile>> = HashMap::new();
        for verdict in &judged {
            verdicts.entry(verdict.path.as_str()).or_default().push_back(verdict);
        }

        let mut overrides = Vec::new();
        for file in screening.files.iter_mut() {
            let Some(verdict) = verdicts
                .get_mut(file.path.as_str())
                .and_then(VecDeque::pop_front)
            else {
                continue;
            };
            if !file.is_selected || verdict.is_selected {
                continue;
            }
            let reason = verdict
                .rejection_reason
                .clone()
                .unwrap_or_else(|| format!("Rejected by {}.", self.provider.name()));
            file.is_selected = false;
            file.rejection_reason = Some(reason.clone());
            overrides.push(JudgmentOverride {
                path: file.path.clone(),
                provider: self.provider.name().to_string(),
                reason,
            });
        }

        debug!(
            provider = self.provider.name(),
            overrides = overrides.len(),
            "Applied screening judgments"
        );
        screening.overrides = overrides;
        Ok(screening)
    }
}
