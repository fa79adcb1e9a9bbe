//! Error types for the docscreen library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docscreen operations.
#[derive(Debug, Error)]
pub enum DocscreenError {
    /// Malformed or empty source configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reference to a source id that is not registered or not enabled.
    #[error("Unknown source or source not enabled: {0}")]
    UnknownSource(String),

    /// Listing or info lookup failed against one source.
    #[error("Source '{source_id}' failed: {message}")]
    SourceAdapter { source_id: String, message: String },

    /// The final output sink or a report file could not be written.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// A pipeline stage raised a fatal error.
    #[error("Stage '{stage}' failed: {message}")]
    Stage { stage: String, message: String },

    /// The run was cancelled while a stage was active.
    #[error("Pipeline cancelled during stage '{stage}'")]
    Cancelled { stage: String },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error from the CSV writer.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl DocscreenError {
    /// Build a source adapter error for a given source id.
    pub fn adapter(source_id: impl Into<String>, message: impl Into<String>) -> Self {
        DocscreenError::SourceAdapter {
            source_id: source_id.into(),
            message: message.into(),
        }
    }

    /// Build a fatal stage error.
    pub fn stage(stage: impl Into<String>, message: impl Into<String>) -> Self {
        DocscreenError::Stage {
            stage: stage.into(),
            message: message.into(),
        }
    }

    /// Whether this error only affects a single source rather than the run.
    pub fn is_source_local(&self) -> bool {
        matches!(self, DocscreenError::SourceAdapter { .. })
    }
}

/// Result type alias for docscreen operations.
pub type Result<T> = std::result::Result<T, DocscreenError>;
