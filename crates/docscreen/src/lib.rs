//! Docscreen: deterministic, auditable screening of document listings.
//!
//! Docscreen ingests file listings from one or more document sources,
//! normalizes them into metadata records, and decides which documents are
//! eligible for downstream processing. It reasons only over metadata
//! (path, name, extension, tags, status, timestamps, version hints), never
//! over document content.
//!
//! # Core Principles
//!
//! - **Deterministic**: the same metadata always yields the same decision
//! - **Fail-closed**: ambiguous metadata is rejected, never an error
//! - **Auditable**: every decision is recorded with its reason and a full
//!   metadata snapshot
//!
//! # Example
//!
//! ```no_run
//! use docscreen::{Docscreen, SourceConfig, SourceRegistry};
//! use docscreen::source::{ConnectorCatalog, MockConnector};
//!
//! let connector = MockConnector::new().with_path("/docs/final/handbook.pdf");
//! let registry = SourceRegistry::register_with(
//!     vec![SourceConfig::new("filesource", true, "/docs")],
//!     ConnectorCatalog::default().with_connector("filesource", connector),
//! )
//! .unwrap();
//!
//! let summary = Docscreen::new(registry).with_output("out/agent_output.txt").run().unwrap();
//! println!("{}", summary.payload);
//! ```

pub mod audit;
pub mod error;
pub mod metadata;
pub mod pipeline;
pub mod policy;
pub mod screening;
pub mod source;

mod docscreen;

pub use crate::docscreen::{Docscreen, DocscreenConfig};
pub use audit::{AuditRecord, AuditReport};
pub use error::{DocscreenError, Result};
pub use metadata::{normalize, DocumentMetadata, FileMetadata, MetadataInput, RawFileEntry};
pub use pipeline::{Pipeline, PipelinePhase, PipelineState, RunSummary, Stage, StageEvent};
pub use policy::{deduplicate, evaluate, Decision, PolicyConfig, PolicyEngine};
pub use screening::{DeterministicScreener, JudgmentScreener, ScreenedFile, Screener};
pub use source::{SourceConfig, SourceRegistry};
