//! Ingestion stage: discover candidate documents across enabled sources.

use std::sync::Arc;
use std::thread;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{DocscreenError, Result};
use crate::metadata::DocumentMetadata;
use crate::source::{SourceConfig, SourceRegistry};

use super::stage::{Stage, StageEvent, StageEvents};
use super::state::{PipelineState, SourceFailure};

/// Optional time range used for incremental ingestion.
///
/// Compared against `updated_at`, falling back to `created_at`. Documents
/// without any timestamp are always kept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionWindow {
    #[serde(default)]
    pub since: Option<DateTime<Utc>>,
    #[serde(default)]
    pub until: Option<DateTime<Utc>>,
}

impl IngestionWindow {
    /// A window that keeps everything.
    pub fn unbounded() -> Self {
        Self::default()
    }

    pub fn since(mut self, at: DateTime<Utc>) -> Self {
        self.since = Some(at);
        self
    }

    pub fn until(mut self, at: DateTime<Utc>) -> Self {
        self.until = Some(at);
        self
    }

    /// Whether a document falls inside the window (bounds inclusive).
    pub fn contains(&self, meta: &DocumentMetadata) -> bool {
        let Some(touched) = meta.last_touched() else {
            return true;
        };
        self.since.is_none_or(|since| touched >= since)
            && self.until.is_none_or(|until| touched <= until)
    }
}

/// Lists every enabled source and writes the combined candidate list.
///
/// Sources are listed concurrently, one scoped thread per source. A failing
/// source becomes a failure note; the other sources still contribute.
#[derive(Debug)]
pub struct IngestionStage {
    registry: Arc<SourceRegistry>,
    window: IngestionWindow,
}

impl IngestionStage {
    pub const NAME: &'static str = "ingestion";

    pub fn new(registry: Arc<SourceRegistry>) -> Self {
        Self {
            registry,
            window: IngestionWindow::default(),
        }
    }

    pub fn with_window(mut self, window: IngestionWindow) -> Self {
        self.window = window;
        self
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// List and normalize one source.
    fn ingest_source(&self, source: &SourceConfig) -> Result<Vec<DocumentMetadata>> {
        let session = self
            .registry
            .session(&source.id)
            .map_err(|e| into_adapter_error(&source.id, e))?;
        let entries = session
            .list_entries(&source.path)
            .map_err(|e| into_adapter_error(&source.id, e))?;

        let mut documents = Vec::with_capacity(entries.len());
        for entry in &entries {
            let info = match session.get_info(&entry.path) {
                Ok(info) => Some(info),
                Err(e) => {
                    warn!(
                        source_id = %source.id,
                        path = %entry.path,
                        error = %e,
                        "File info lookup failed; keeping entry without timestamps"
                    );
                    None
                }
            };
            let meta = DocumentMetadata::from_entry(&source.id, entry, info.as_ref());
            if self.window.contains(&meta) {
                documents.push(meta);
            }
        }

        Ok(documents)
    }

    /// Ingest every enabled source, in configured order.
    fn ingest_all(&self) -> Vec<(String, Result<Vec<DocumentMetadata>>)> {
        let sources = self.registry.enabled_sources();

        thread::scope(|scope| {
            let handles: Vec<_> = sources
                .iter()
                .map(|source| (source.id.clone(), scope.spawn(move || self.ingest_source(source))))
                .collect();

            handles
                .into_iter()
                .map(|(id, handle)| {
                    let result = handle.join().unwrap_or_else(|_| {
                        Err(DocscreenError::adapter(&id, "ingestion worker panicked"))
                    });
                    (id, result)
                })
                .collect()
        })
    }
}

fn into_adapter_error(source_id: &str, error: DocscreenError) -> DocscreenError {
    if error.is_source_local() {
        error
    } else {
        DocscreenError::adapter(source_id, error.to_string())
    }
}

impl Stage for IngestionStage {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn run<'a>(&'a self, state: &'a mut PipelineState) -> StageEvents<'a> {
        let mut events = Vec::new();
        let mut candidates = Vec::new();
        let mut failures = Vec::new();

        for (source_id, result) in self.ingest_all() {
            match result {
                Ok(documents) => {
                    info!(source_id = %source_id, candidates = documents.len(), "Ingested source");
                    events.push(Ok(StageEvent::new(
                        Self::NAME,
                        format!("Source '{}': {} candidate files", source_id, documents.len()),
                    )));
                    candidates.extend(documents);
                }
                Err(e) => {
                    warn!(source_id = %source_id, error = %e, "Source ingestion failed");
                    let message = match e {
                        DocscreenError::SourceAdapter { message, .. } => message,
                        other => other.to_string(),
                    };
                    events.push(Ok(StageEvent::new(
                        Self::NAME,
                        format!("Source '{}' failed: {}", source_id, message),
                    )));
                    failures.push(SourceFailure { source_id, message });
                }
            }
        }

        match serde_json::to_string_pretty(&candidates) {
            Ok(json) => {
                events.push(Ok(StageEvent::new(Self::NAME, json)));
                state.file_list = Some(candidates);
                state.source_failures.extend(failures);
            }
            Err(e) => events.push(Err(e.into())),
        }

        Box::new(events.into_iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{FileMetadata, MetadataInput};
    use crate::source::{ConnectorCatalog, MockConnector};
    use chrono::TimeZone;

    fn registry(catalog: ConnectorCatalog, sources: Vec<SourceConfig>) -> Arc<SourceRegistry> {
        Arc::new(SourceRegistry::register_with(sources, catalog).unwrap())
    }

    #[test]
    fn test_window_contains() {
        let at = |d| Utc.with_ymd_and_hms(2024, 1, d, 0, 0, 0).unwrap();
        let window = IngestionWindow::unbounded().since(at(5)).until(at(10));

        let doc = |d: Option<u32>| {
            let input = MetadataInput::new("filesource", "/final/a.md");
            match d {
                Some(d) => DocumentMetadata::normalize(input.with_updated_at(at(d))),
                None => DocumentMetadata::normalize(input),
            }
        };

        assert!(window.contains(&doc(Some(5))));
        assert!(window.contains(&doc(Some(10))));
        assert!(!window.contains(&doc(Some(4))));
        assert!(!window.contains(&doc(Some(11))));
        assert!(window.contains(&doc(None)));
    }

    #[test]
    fn test_ingests_all_sources() {
        let catalog = ConnectorCatalog::default()
            .with_connector(
                "filesource",
                MockConnector::new()
                    .with_path("/docs/final/a.md")
                    .with_path("/docs/final/b.pdf"),
            )
            .with_connector("archive", MockConnector::new().with_path("/old/c.txt"));
        let registry = registry(
            catalog,
            vec![
                SourceConfig::new("filesource", true, "/docs"),
                SourceConfig::new("archive", true, "/old"),
            ],
        );

        let stage = IngestionStage::new(registry);
        let mut state = PipelineState::new();
        let events: Vec<_> = stage.run(&mut state).collect::<Result<_>>().unwrap();

        assert_eq!(state.candidates().len(), 3);
        assert_eq!(state.candidates()[2].source_id, "archive");
        assert!(state.source_failures.is_empty());
        assert_eq!(events.len(), 3);
        assert!(events[2].text.contains("b.pdf"));
    }

    #[test]
    fn test_failing_source_is_isolated() {
        let catalog = ConnectorCatalog::default()
            .with_connector("filesource", MockConnector::new().with_path("/docs/final/a.md"))
            .with_connector(
                "archive",
                MockConnector::new().with_listing_error("permission denied"),
            );
        let registry = registry(
            catalog,
            vec![
                SourceConfig::new("filesource", true, "/docs"),
                SourceConfig::new("archive", true, "/old"),
            ],
        );

        let stage = IngestionStage::new(registry);
        let mut state = PipelineState::new();
        let events: Vec<_> = stage.run(&mut state).collect::<Result<_>>().unwrap();

        assert_eq!(state.candidates().len(), 1);
        assert_eq!(state.source_failures.len(), 1);
        assert_eq!(state.source_failures[0].source_id, "archive");
        assert_eq!(state.source_failures[0].message, "permission denied");
        assert!(events[1].text.contains("permission denied"));
    }

    #[test]
    fn test_info_failure_keeps_entry() {
        let modified = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let connector = MockConnector::new()
            .with_file(FileMetadata::new("a.md", "/docs/final/a.md").with_modified_at(modified))
            .with_path("/docs/final/b.md")
            .with_info_error("/docs/final/b.md");
        let registry = registry(
            ConnectorCatalog::default().with_connector("filesource", connector),
            vec![SourceConfig::new("filesource", true, "/docs")],
        );

        let stage = IngestionStage::new(registry);
        let mut state = PipelineState::new();
        stage.run(&mut state).for_each(drop);

        let files = state.candidates();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].updated_at, Some(modified));
        assert_eq!(files[1].file_name, "b.md");
        assert!(files[1].updated_at.is_none());
    }

    #[test]
    fn test_source_without_connector_is_a_note() {
        let registry = registry(
            ConnectorCatalog::default(),
            vec![SourceConfig::new("filesource", true, "/docs")],
        );

        let stage = IngestionStage::new(registry);
        let mut state = PipelineState::new();
        let events: Vec<_> = stage.run(&mut state).collect::<Result<_>>().unwrap();

        assert_eq!(state.file_list.as_deref(), Some(&[][..]));
        assert_eq!(state.source_failures.len(), 1);
        assert_eq!(events.last().unwrap().text, "[]");
    }
}
