//! Sequential stage runner with exactly-once output persistence.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::audit::AuditReport;
use crate::error::{DocscreenError, Result};

use super::cancel::CancellationToken;
use super::sink::OutputSink;
use super::stage::{Stage, StageEvent};
use super::state::{PipelineState, SourceFailure};

/// Where the orchestrator is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "phase", content = "stage")]
pub enum PipelinePhase {
    Idle,
    /// Index of the active stage.
    Running(usize),
    Completed,
    Failed,
    Cancelled,
}

impl PipelinePhase {
    /// Whether the last run has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// The payload written to the sink (possibly empty).
    pub payload: String,
    /// Number of events forwarded to the caller.
    pub events: usize,
    pub stages_completed: usize,
    /// Audit report from the screening stage, if one ran.
    pub audit_report: Option<AuditReport>,
    pub source_failures: Vec<SourceFailure>,
}

/// Runs stages in order over one [`PipelineState`] and persists the last
/// non-empty event text exactly once, however the run ends.
///
/// A stage error moves the pipeline to `Failed`; cancellation moves it to
/// `Cancelled`. In both cases the payload observed so far is persisted
/// before the error is returned.
pub struct Pipeline<S: OutputSink> {
    name: String,
    stages: Vec<Box<dyn Stage>>,
    sink: S,
    phase: PipelinePhase,
}

impl<S: OutputSink> Pipeline<S> {
    pub fn new(name: impl Into<String>, sink: S) -> Self {
        Self {
            name: name.into(),
            stages: Vec::new(),
            sink,
            phase: PipelinePhase::Idle,
        }
    }

    /// Append a stage. Stages run in the order they are added.
    pub fn with_stage(mut self, stage: impl Stage + 'static) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn phase(&self) -> PipelinePhase {
        self.phase
    }

    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run all stages with a fresh state, discarding events.
    pub fn run(&mut self) -> Result<RunSummary> {
        self.run_with(PipelineState::new(), |_| {}, &CancellationToken::new())
    }

    /// Run all stages over `state`, forwarding every event to `on_event`.
    pub fn run_with<F>(
        &mut self,
        mut state: PipelineState,
        mut on_event: F,
        cancel: &CancellationToken,
    ) -> Result<RunSummary>
    where
        F: FnMut(&StageEvent),
    {
        let mut payload = String::new();
        let mut forwarded = 0;
        let mut completed = 0;
        let mut failure: Option<DocscreenError> = None;

        info!(pipeline = %self.name, stages = self.stages.len(), "Pipeline started");

        'stages: for (index, stage) in self.stages.iter().enumerate() {
            if cancel.is_cancelled() {
                self.phase = PipelinePhase::Cancelled;
                failure = Some(DocscreenError::Cancelled {
                    stage: stage.name().to_string(),
                });
                break;
            }

            self.phase = PipelinePhase::Running(index);
            debug!(pipeline = %self.name, stage = stage.name(), index, "Stage started");

            let mut stage_events = 0;
            for item in stage.run(&mut state) {
                match item {
                    Ok(event) => {
                        if let Some(text) = event.payload() {
                            payload = text.to_string();
                        }
                        stage_events += 1;
                        forwarded += 1;
                        on_event(&event);
                    }
                    Err(e) => {
                        warn!(pipeline = %self.name, stage = stage.name(), error = %e, "Stage failed");
                        self.phase = PipelinePhase::Failed;
                        let fatal = matches!(
                            e,
                            DocscreenError::Stage { .. } | DocscreenError::Cancelled { .. }
                        );
                        failure = Some(if fatal {
                            e
                        } else {
                            DocscreenError::stage(stage.name(), e.to_string())
                        });
                        break 'stages;
                    }
                }

                if cancel.is_cancelled() {
                    self.phase = PipelinePhase::Cancelled;
                    failure = Some(DocscreenError::Cancelled {
                        stage: stage.name().to_string(),
                    });
                    break 'stages;
                }
            }

            completed += 1;
            debug!(
                pipeline = %self.name,
                stage = stage.name(),
                events = stage_events,
                "Stage finished"
            );
        }

        let persisted = self.sink.persist(&payload);
        match persisted {
            Ok(()) => info!(
                pipeline = %self.name,
                sink = %self.sink.describe(),
                bytes = payload.len(),
                "Persisted final output"
            ),
            Err(ref e) => warn!(
                pipeline = %self.name,
                sink = %self.sink.describe(),
                error = %e,
                "Failed to persist final output"
            ),
        }

        if let Some(e) = failure {
            return Err(e);
        }
        if let Err(e) = persisted {
            self.phase = PipelinePhase::Failed;
            return Err(e);
        }

        self.phase = PipelinePhase::Completed;
        info!(pipeline = %self.name, events = forwarded, "Pipeline completed");

        Ok(RunSummary {
            payload,
            events: forwarded,
            stages_completed: completed,
            audit_report: state.audit_report.take(),
            source_failures: std::mem::take(&mut state.source_failures),
        })
    }
}

impl<S: OutputSink> fmt::Debug for Pipeline<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .field("sink", &self.sink.describe())
            .field("phase", &self.phase)
            .finish()
    }
}
