//! Connector and session traits for document sources.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::Result;
use crate::metadata::{FileMetadata, RawFileEntry};

use super::config::SourceConfig;

/// A live connection to one source.
///
/// Implementations must be thread-safe (Send + Sync) so different sources
/// can be listed concurrently.
pub trait SourceSession: Send + Sync {
    /// List the files below `root_path`.
    fn list_entries(&self, root_path: &str) -> Result<Vec<RawFileEntry>>;

    /// Look up size and timestamps for one file.
    fn get_info(&self, path: &str) -> Result<FileMetadata>;
}

/// Factory for sessions against a configured source.
pub trait SourceConnector: Send + Sync {
    /// Get the name of this connector (for logging/debugging).
    fn name(&self) -> &str;

    /// Open a session. Called at most once per source id per registry.
    fn connect(&self, source: &SourceConfig) -> Result<Arc<dyn SourceSession>>;
}

/// A catalog slot: either a usable connector or a typed "not implemented".
#[derive(Clone)]
pub enum ConnectorEntry {
    Available(Arc<dyn SourceConnector>),
    Unavailable { reason: String },
}

impl ConnectorEntry {
    pub fn is_available(&self) -> bool {
        matches!(self, ConnectorEntry::Available(_))
    }
}

impl fmt::Debug for ConnectorEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectorEntry::Available(c) => f.debug_tuple("Available").field(&c.name()).finish(),
            ConnectorEntry::Unavailable { reason } => f
                .debug_struct("Unavailable")
                .field("reason", reason)
                .finish(),
        }
    }
}

/// Source ids whose connectors are not implemented.
const UNAVAILABLE_SOURCES: [(&str, &str); 5] = [
    ("confluence", "Confluence connector is not implemented yet"),
    ("gdocs", "Google Docs connector is not implemented yet"),
    ("sharepoint", "SharePoint connector is not implemented yet"),
    ("slack", "Slack connector is not implemented yet"),
    ("whatsapp", "WhatsApp connector is not implemented yet"),
];

/// Maps source ids to connectors.
#[derive(Debug, Clone)]
pub struct ConnectorCatalog {
    entries: HashMap<String, ConnectorEntry>,
}

impl Default for ConnectorCatalog {
    /// Catalog with the unimplemented source kinds marked unavailable.
    fn default() -> Self {
        let mut catalog = Self::empty();
        for (id, reason) in UNAVAILABLE_SOURCES {
            catalog = catalog.with_unavailable(id, reason);
        }
        catalog
    }
}

impl ConnectorCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog with no entries at all.
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Bind a connector to a source id, replacing any previous entry.
    pub fn with_connector(
        mut self,
        source_id: impl Into<String>,
        connector: impl SourceConnector + 'static,
    ) -> Self {
        self.entries.insert(
            source_id.into(),
            ConnectorEntry::Available(Arc::new(connector)),
        );
        self
    }

    /// Mark a source id as known but not usable.
    pub fn with_unavailable(
        mut self,
        source_id: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.entries.insert(
            source_id.into(),
            ConnectorEntry::Unavailable {
                reason: reason.into(),
            },
        );
        self
    }

    pub fn get(&self, source_id: &str) -> Option<&ConnectorEntry> {
        self.entries.get(source_id)
    }

    /// The connector for a source id, if one is available.
    pub fn connector(&self, source_id: &str) -> Option<Arc<dyn SourceConnector>> {
        match self.entries.get(source_id)? {
            ConnectorEntry::Available(connector) => Some(Arc::clone(connector)),
            ConnectorEntry::Unavailable { .. } => None,
        }
    }
}
