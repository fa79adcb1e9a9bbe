//! Main Docscreen struct and public API.

use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use crate::audit::audit_path;
use crate::error::Result;
use crate::pipeline::{
    CancellationToken, FileSink, IngestionStage, IngestionWindow, Pipeline, PipelineState,
    RunSummary, ScreeningStage, StageEvent, DEFAULT_OUTPUT_PATH,
};
use crate::policy::PolicyConfig;
use crate::screening::{DeterministicScreener, JudgmentProvider, JudgmentScreener};
use crate::source::SourceRegistry;

/// Configuration for a screening run.
#[derive(Debug, Clone)]
pub struct DocscreenConfig {
    /// File the final payload is written to.
    pub output_path: PathBuf,
    /// Rule set used by the deterministic screener.
    pub policy: PolicyConfig,
    /// Optional incremental ingestion window.
    pub window: IngestionWindow,
    /// Free-form rules forwarded to a judgment provider.
    pub screening_rules: Option<Value>,
    /// Also write the audit report next to the output file.
    pub write_audit: bool,
}

impl Default for DocscreenConfig {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            policy: PolicyConfig::default(),
            window: IngestionWindow::default(),
            screening_rules: None,
            write_audit: true,
        }
    }
}

/// Ingest every enabled source, screen the candidates, and persist the
/// screened list.
pub struct Docscreen {
    registry: Arc<SourceRegistry>,
    config: DocscreenConfig,
    judge: Option<Arc<dyn JudgmentProvider>>,
}

impl Docscreen {
    /// Create an instance over a registry with default configuration.
    pub fn new(registry: SourceRegistry) -> Self {
        Self::with_config(registry, DocscreenConfig::default())
    }

    pub fn with_config(registry: SourceRegistry, config: DocscreenConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
            judge: None,
        }
    }

    /// Layer an external judgment provider on top of the rule engine.
    pub fn with_judge(mut self, provider: impl JudgmentProvider + 'static) -> Self {
        self.judge = Some(Arc::new(provider));
        self
    }

    pub fn with_output(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.output_path = path.into();
        self
    }

    pub fn with_window(mut self, window: IngestionWindow) -> Self {
        self.config.window = window;
        self
    }

    pub fn with_screening_rules(mut self, rules: Value) -> Self {
        self.config.screening_rules = Some(rules);
        self
    }

    pub fn config(&self) -> &DocscreenConfig {
        &self.config
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Build the two-stage pipeline for one run.
    pub fn pipeline(&self) -> Pipeline<FileSink> {
        let base = DeterministicScreener::with_policy(self.config.policy.clone());
        let screening = match self.judge {
            Some(ref judge) => {
                ScreeningStage::new(JudgmentScreener::new(Arc::clone(judge)).with_base(base))
            }
            None => ScreeningStage::new(base),
        };

        Pipeline::new("docscreen", FileSink::new(&self.config.output_path))
            .with_stage(IngestionStage::new(Arc::clone(&self.registry)).with_window(self.config.window))
            .with_stage(screening)
    }

    /// Run once, discarding intermediate events.
    pub fn run(&self) -> Result<RunSummary> {
        self.run_with(|_| {}, &CancellationToken::new())
    }

    /// Run once, forwarding events and honoring cancellation.
    pub fn run_with<F>(&self, on_event: F, cancel: &CancellationToken) -> Result<RunSummary>
    where
        F: FnMut(&StageEvent),
    {
        let mut state = PipelineState::new();
        if let Some(ref rules) = self.config.screening_rules {
            state = state.with_screening_rules(rules.clone());
        }

        let summary = self.pipeline().run_with(state, on_event, cancel)?;

        if self.config.write_audit {
            if let Some(ref report) = summary.audit_report {
                let path = audit_path(&self.config.output_path);
                report.save(&path)?;
                info!(path = %path.display(), records = report.total_evaluated, "Saved audit report");
            }
        }

        Ok(summary)
    }
}
