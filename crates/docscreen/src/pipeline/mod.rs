//! Sequential pipeline: ingestion, screening, and exactly-once output.
//!
//! A [`Pipeline`] owns an ordered list of [`Stage`]s and one
//! [`OutputSink`]. Stages share a typed [`PipelineState`] for the duration
//! of a run; the last non-empty event text is written to the sink once,
//! whether the run completes, fails, or is cancelled.

mod cancel;
mod ingestion;
mod orchestrator;
mod screen;
mod sink;
mod stage;
mod state;

pub use cancel::CancellationToken;
pub use ingestion::{IngestionStage, IngestionWindow};
pub use orchestrator::{Pipeline, PipelinePhase, RunSummary};
pub use screen::ScreeningStage;
pub use sink::{FileSink, MemorySink, OutputSink, DEFAULT_OUTPUT_PATH};
pub use stage::{Stage, StageEvent, StageEvents};
pub use state::{PipelineState, SourceFailure};
