//! Output sinks for the final run payload.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{DocscreenError, Result};

/// Default location of the persisted output artifact.
pub const DEFAULT_OUTPUT_PATH: &str = "agent_output.txt";

/// Destination of the single final write of a run.
pub trait OutputSink {
    /// Write the payload. The orchestrator calls this exactly once per run.
    fn persist(&mut self, payload: &str) -> Result<()>;

    /// Where the payload goes (for logging).
    fn describe(&self) -> String;
}

/// Writes the payload to a UTF-8 text file, replacing previous content.
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new(DEFAULT_OUTPUT_PATH)
    }
}

impl OutputSink for FileSink {
    fn persist(&mut self, payload: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    DocscreenError::Persistence(format!(
                        "Failed to create directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        fs::write(&self.path, payload).map_err(|e| {
            DocscreenError::Persistence(format!(
                "Failed to write output '{}': {}",
                self.path.display(),
                e
            ))
        })
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Keeps every write in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    writes: Vec<String>,
    failure: Option<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose writes are counted but always fail.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            writes: Vec::new(),
            failure: Some(message.into()),
        }
    }

    /// Every payload passed to `persist`, including failed attempts.
    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    /// The most recent payload.
    pub fn last(&self) -> Option<&str> {
        self.writes.last().map(String::as_str)
    }
}

impl OutputSink for MemorySink {
    fn persist(&mut self, payload: &str) -> Result<()> {
        self.writes.push(payload.to_string());
        match self.failure {
            Some(ref message) => Err(DocscreenError::Persistence(message.clone())),
            None => Ok(()),
        }
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
