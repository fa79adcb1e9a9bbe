//! Source configuration.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{DocscreenError, Result};

/// One configured document source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    /// Unique source id; also selects the connector.
    pub id: String,
    pub enabled: bool,
    /// Root location to list from.
    #[serde(alias = "rootPath")]
    pub path: String,
}

impl SourceConfig {
    pub fn new(id: impl Into<String>, enabled: bool, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            enabled,
            path: path.into(),
        }
    }

    /// Kind of source implied by the id.
    pub fn kind(&self) -> SourceKind {
        SourceKind::from_id(&self.id)
    }

    /// Check that every required field carries a value.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(DocscreenError::Config(
                "Source entry is missing required field 'id'".to_string(),
            ));
        }
        if self.path.trim().is_empty() {
            return Err(DocscreenError::Config(format!(
                "Source '{}' is missing required field 'path'",
                self.id
            )));
        }
        Ok(())
    }
}

/// Kinds of document sources known to the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Filesystem,
    Confluence,
    GoogleDocs,
    SharePoint,
    Slack,
    WhatsApp,
    Other(String),
}

impl SourceKind {
    pub fn from_id(id: &str) -> Self {
        match id.trim().to_lowercase().as_str() {
            "filesource" | "filesystem" => SourceKind::Filesystem,
            "confluence" => SourceKind::Confluence,
            "gdocs" => SourceKind::GoogleDocs,
            "sharepoint" => SourceKind::SharePoint,
            "slack" => SourceKind::Slack,
            "whatsapp" => SourceKind::WhatsApp,
            other => SourceKind::Other(other.to_string()),
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &str {
        match self {
            SourceKind::Filesystem => "filesystem",
            SourceKind::Confluence => "Confluence",
            SourceKind::GoogleDocs => "Google Docs",
            SourceKind::SharePoint => "SharePoint",
            SourceKind::Slack => "Slack",
            SourceKind::WhatsApp => "WhatsApp",
            SourceKind::Other(id) => id,
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// The ordered list of configured sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub sources: Vec<SourceConfig>,
}

impl RegistryConfig {
    /// Parse a JSON document of the form `{"sources": [...]}`.
    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| DocscreenError::Config(format!("Invalid source configuration: {}", e)))
    }

    /// Read the configuration from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| DocscreenError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&text)
    }
}
