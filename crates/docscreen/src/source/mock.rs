//! In-memory connector for tests and demos.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::error::{DocscreenError, Result};
use crate::metadata::{FileMetadata, RawFileEntry};

use super::config::SourceConfig;
use super::connector::{SourceConnector, SourceSession};

#[derive(Debug, Clone, Default)]
struct MockListing {
    entries: Vec<RawFileEntry>,
    info: HashMap<String, FileMetadata>,
    listing_error: Option<String>,
    info_errors: HashSet<String>,
    connect_error: Option<String>,
}

/// Connector that serves a fixed listing from memory.
///
/// Counts how many sessions it has opened so tests can check that sessions
/// are reused.
#[derive(Debug, Clone, Default)]
pub struct MockConnector {
    listing: Arc<MockListing>,
    connections: Arc<AtomicUsize>,
}

impl MockConnector {
    /// Create a connector with an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    fn listing_mut(&mut self) -> &mut MockListing {
        Arc::make_mut(&mut self.listing)
    }

    /// Add a file with no info beyond its path.
    pub fn with_path(self, path: impl Into<String>) -> Self {
        let path = path.into();
        let name = path.rsplit(['/', '\\']).next().unwrap_or(&path).to_string();
        self.with_file(FileMetadata::new(name, path))
    }

    /// Add a file and the info returned for it.
    pub fn with_file(mut self, info: FileMetadata) -> Self {
        let listing = self.listing_mut();
        listing
            .entries
            .push(RawFileEntry::new(info.name.clone(), info.path.clone()));
        listing.info.insert(info.path.clone(), info);
        self
    }

    /// Make every listing call fail with `message`.
    pub fn with_listing_error(mut self, message: impl Into<String>) -> Self {
        self.listing_mut().listing_error = Some(message.into());
        self
    }

    /// Make the info lookup for one path fail.
    pub fn with_info_error(mut self, path: impl Into<String>) -> Self {
        self.listing_mut().info_errors.insert(path.into());
        self
    }

    /// Make opening a session fail.
    pub fn with_connect_error(mut self, message: impl Into<String>) -> Self {
        self.listing_mut().connect_error = Some(message.into());
        self
    }

    /// Number of sessions opened so far.
    pub fn connections(&self) -> usize {
        self.connections.load(Ordering::SeqCst)
    }
}

impl SourceConnector for MockConnector {
    fn name(&self) -> &str {
        "mock"
    }

    fn connect(&self, source: &SourceConfig) -> Result<Arc<dyn SourceSession>> {
        if let Some(ref message) = self.listing.connect_error {
            return Err(DocscreenError::adapter(&source.id, message.clone()));
        }
        self.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Arc::new(MockSession {
            source_id: source.id.clone(),
            listing: Arc::clone(&self.listing),
        }))
    }
}

struct MockSession {
    source_id: String,
    listing: Arc<MockListing>,
}

impl SourceSession for MockSession {
    fn list_entries(&self, root_path: &str) -> Result<Vec<RawFileEntry>> {
        if let Some(ref message) = self.listing.listing_error {
            return Err(DocscreenError::adapter(&self.source_id, message.clone()));
        }
        Ok(self
            .listing
            .entries
            .iter()
            .filter(|e| e.path.starts_with(root_path))
            .cloned()
            .collect())
    }

    fn get_info(&self, path: &str) -> Result<FileMetadata> {
        if self.listing.info_errors.contains(path) {
            return Err(DocscreenError::adapter(
                &self.source_id,
                format!("info lookup failed for '{}'", path),
            ));
        }
        self.listing.info.get(path).cloned().ok_or_else(|| {
            DocscreenError::adapter(&self.source_id, format!("no such file: '{}'", path))
        })
    }
}
