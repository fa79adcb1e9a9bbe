//! Metadata records and path-based normalization.

mod document;
mod file;

pub use document::{infer_path_parts, normalize, DocumentMetadata, MetadataInput, PathParts};
pub use file::{FileMetadata, RawFileEntry};
