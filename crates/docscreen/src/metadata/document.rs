//! Canonical document metadata and the normalizer that produces it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::file::{FileMetadata, RawFileEntry};

/// Canonical metadata for one document.
///
/// `file_name`, `extension` and `source_location` are always consistent with
/// `source_path` unless they were supplied explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentMetadata {
    pub source_id: String,
    pub source_path: String,
    pub file_name: String,
    /// Lower-cased suffix including the dot (e.g. `.docx`), or empty.
    pub extension: String,
    /// Everything in the path before the file name, separators normalized to `/`.
    pub source_location: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub ingested_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authors: Vec<String>,
    #[serde(rename = "abstract", default, skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_images: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

/// Partial metadata handed to the normalizer.
///
/// Only `source_id` and `source_path` are required; every explicit field
/// overrides the value that would otherwise be inferred.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataInput {
    pub source_id: String,
    pub source_path: String,
    #[serde(default)]
    pub file_name: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub source_location: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub ingested_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub authors: Option<Vec<String>>,
    #[serde(rename = "abstract", default)]
    pub abstract_text: Option<String>,
    #[serde(default)]
    pub has_images: Option<bool>,
    #[serde(default)]
    pub front_image: Option<String>,
    #[serde(default)]
    pub temporal: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
}

impl MetadataInput {
    /// Start an input from the two required fields.
    pub fn new(source_id: impl Into<String>, source_path: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            source_path: source_path.into(),
            ..Self::default()
        }
    }

    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    pub fn with_source_location(mut self, location: impl Into<String>) -> Self {
        self.source_location = Some(location.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = Some(tags.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn with_ingested_at(mut self, at: DateTime<Utc>) -> Self {
        self.ingested_at = Some(at);
        self
    }

    pub fn with_created_at(mut self, at: DateTime<Utc>) -> Self {
        self.created_at = Some(at);
        self
    }

    pub fn with_updated_at(mut self, at: DateTime<Utc>) -> Self {
        self.updated_at = Some(at);
        self
    }

    pub fn with_authors<I, S>(mut self, authors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authors = Some(authors.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = Some(size);
        self
    }

    /// Copy size and timestamps from connector-supplied file info.
    pub fn with_file_info(mut self, info: &FileMetadata) -> Self {
        self.size_bytes = info.size_bytes.or(self.size_bytes);
        self.created_at = info.created_at.or(self.created_at);
        self.updated_at = info.modified_at.or(self.updated_at);
        self
    }
}

/// File name, extension and containing location derived from a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathParts {
    pub file_name: String,
    pub extension: String,
    pub source_location: String,
}

/// Split a path into its file name, lower-cased extension and location.
///
/// Backslashes are treated as separators so Windows-style paths from a
/// connector produce the same parts as their forward-slash equivalents.
pub fn infer_path_parts(path: &str) -> PathParts {
    let normalized = path.replace('\\', "/");
    let file_name = match normalized.rfind('/') {
        Some(idx) => normalized[idx + 1..].to_string(),
        None => normalized.clone(),
    };
    let extension = file_name
        .rfind('.')
        .map(|dot| file_name[dot..].to_lowercase())
        .unwrap_or_default();
    let source_location = normalized[..normalized.len() - file_name.len()].to_string();

    PathParts {
        file_name,
        extension,
        source_location,
    }
}

impl DocumentMetadata {
    /// Produce canonical metadata from a partial input. Never fails.
    pub fn normalize(input: MetadataInput) -> Self {
        let inferred = infer_path_parts(&input.source_path);

        Self {
            source_id: input.source_id,
            source_path: input.source_path,
            file_name: input.file_name.unwrap_or(inferred.file_name),
            extension: input.extension.unwrap_or(inferred.extension),
            source_location: input.source_location.unwrap_or(inferred.source_location),
            tags: input.tags.unwrap_or_default(),
            ingested_at: input.ingested_at.unwrap_or_else(Utc::now),
            created_at: input.created_at,
            updated_at: input.updated_at,
            authors: input.authors.unwrap_or_default(),
            abstract_text: input.abstract_text,
            has_images: input.has_images,
            front_image: input.front_image,
            temporal: input.temporal,
            status: input.status,
            size_bytes: input.size_bytes,
        }
    }

    /// Normalize a listed entry, folding in its file info when available.
    pub fn from_entry(
        source_id: impl Into<String>,
        entry: &RawFileEntry,
        info: Option<&FileMetadata>,
    ) -> Self {
        let mut input = MetadataInput::new(source_id, entry.path.clone());
        if !entry.name.is_empty() {
            input = input.with_file_name(entry.name.clone());
        }
        if let Some(info) = info {
            input = input.with_file_info(info);
        }
        Self::normalize(input)
    }

    /// Most recent known timestamp, preferring `updated_at`.
    pub fn last_touched(&self) -> Option<DateTime<Utc>> {
        self.updated_at.or(self.created_at)
    }
}

/// Free-function form of [`DocumentMetadata::normalize`].
pub fn normalize(input: MetadataInput) -> DocumentMetadata {
    DocumentMetadata::normalize(input)
}
