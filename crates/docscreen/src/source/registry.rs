//! Registry of configured sources and their lazily opened sessions.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, info};

use crate::error::{DocscreenError, Result};

use super::config::{RegistryConfig, SourceConfig};
use super::connector::{ConnectorCatalog, ConnectorEntry, SourceSession};

/// The set of configured sources, built once at startup.
///
/// Source configuration is read-only after registration. Each enabled
/// source owns one session slot; the session is opened on first use and
/// reused for the registry's lifetime.
pub struct SourceRegistry {
    sources: Vec<SourceConfig>,
    catalog: ConnectorCatalog,
    sessions: HashMap<String, OnceCell<Arc<dyn SourceSession>>>,
}

impl SourceRegistry {
    /// Register sources against the default connector catalog.
    pub fn register(sources: Vec<SourceConfig>) -> Result<Self> {
        Self::register_with(sources, ConnectorCatalog::default())
    }

    /// Register sources from a parsed configuration document.
    pub fn from_config(config: RegistryConfig, catalog: ConnectorCatalog) -> Result<Self> {
        Self::register_with(config.sources, catalog)
    }

    /// Register sources against a specific connector catalog.
    ///
    /// Fails with a configuration error when the list is empty, an id
    /// repeats, a required field is missing, no source is enabled, or an
    /// enabled source maps to a connector marked unavailable.
    pub fn register_with(sources: Vec<SourceConfig>, catalog: ConnectorCatalog) -> Result<Self> {
        if sources.is_empty() {
            return Err(DocscreenError::Config("No sources configured".to_string()));
        }

        let mut seen = HashSet::new();
        for source in &sources {
            source.validate()?;
            if !seen.insert(source.id.as_str()) {
                return Err(DocscreenError::Config(format!(
                    "Duplicate source id '{}'",
                    source.id
                )));
            }
        }

        if !sources.iter().any(|s| s.enabled) {
            return Err(DocscreenError::Config("No enabled sources configured".to_string()));
        }

        for source in sources.iter().filter(|s| s.enabled) {
            if let Some(ConnectorEntry::Unavailable { reason }) = catalog.get(&source.id) {
                return Err(DocscreenError::Config(format!(
                    "Source '{}' ({}) is enabled but unavailable: {}",
                    source.id,
                    source.kind(),
                    reason
                )));
            }
        }

        let sessions = sources
            .iter()
            .filter(|s| s.enabled)
            .map(|s| (s.id.clone(), OnceCell::new()))
            .collect();

        info!(
            total = sources.len(),
            enabled = sources.iter().filter(|s| s.enabled).count(),
            "Registered document sources"
        );

        Ok(Self {
            sources,
            catalog,
            sessions,
        })
    }

    /// Look up an enabled source by id.
    pub fn resolve(&self, id: &str) -> Result<&SourceConfig> {
        self.sources
            .iter()
            .find(|s| s.id == id && s.enabled)
            .ok_or_else(|| DocscreenError::UnknownSource(id.to_string()))
    }

    /// Enabled sources in configured order.
    pub fn enabled_sources(&self) -> Vec<&SourceConfig> {
        self.sources.iter().filter(|s| s.enabled).collect()
    }

    /// Every configured source, enabled or not.
    pub fn sources(&self) -> &[SourceConfig] {
        &self.sources
    }

    /// Get the session for a source, opening it on first use.
    ///
    /// Concurrent callers for the same id share one session; different ids
    /// never share a session.
    pub fn session(&self, id: &str) -> Result<Arc<dyn SourceSession>> {
        let source = self.resolve(id)?;
        let slot = self
            .sessions
            .get(id)
            .ok_or_else(|| DocscreenError::UnknownSource(id.to_string()))?;

        let session = slot.get_or_try_init(|| {
            let connector = self.catalog.connector(id).ok_or_else(|| {
                DocscreenError::adapter(id, "no connector registered for this source")
            })?;
            debug!(source_id = %id, connector = connector.name(), "Opening source session");
            connector.connect(source)
        })?;

        Ok(Arc::clone(session))
    }

    /// Whether a session for `id` has already been opened.
    pub fn has_session(&self, id: &str) -> bool {
        self.sessions.get(id).is_some_and(|slot| slot.get().is_some())
    }
}

impl fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.sources)
            .field("catalog", &self.catalog)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MockConnector;

    fn catalog() -> ConnectorCatalog {
        ConnectorCatalog::default().with_connector("filesource", MockConnector::new())
    }

    #[test]
    fn test_register_rejects_empty() {
        let err = SourceRegistry::register(Vec::new()).unwrap_err();
        assert!(matches!(err, DocscreenError::Config(_)));
    }

    #[test]
    fn test_register_rejects_duplicates() {
        let err = SourceRegistry::register(vec![
            SourceConfig::new("filesource", true, "/a"),
            SourceConfig::new("filesource", false, "/b"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Duplicate"));
    }

    #[test]
    fn test_register_rejects_all_disabled() {
        let err =
            SourceRegistry::register(vec![SourceConfig::new("filesource", false, "/a")]).unwrap_err();
        assert!(matches!(err, DocscreenError::Config(_)));
    }

    #[test]
    fn test_register_rejects_enabled_unavailable() {
        let err = SourceRegistry::register(vec![
            SourceConfig::new("filesource", true, "/a"),
            SourceConfig::new("slack", true, "general"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("Slack"));
    }

    #[test]
    fn test_disabled_unavailable_is_fine() {
        let registry = SourceRegistry::register(vec![
            SourceConfig::new("filesource", true, "/a"),
            SourceConfig::new("slack", false, "general"),
        ])
        .unwrap();
        assert_eq!(registry.enabled_sources().len(), 1);
    }

    #[test]
    fn test_resolve() {
        let registry = SourceRegistry::register_with(
            vec![
                SourceConfig::new("filesource", true, "/a"),
                SourceConfig::new("archive", false, "/b"),
            ],
            catalog(),
        )
        .unwrap();

        assert_eq!(registry.resolve("filesource").unwrap().path, "/a");
        assert!(matches!(
            registry.resolve("archive"),
            Err(DocscreenError::UnknownSource(_))
        ));
        assert!(matches!(
            registry.resolve("missing"),
            Err(DocscreenError::UnknownSource(_))
        ));
    }

    #[test]
    fn test_session_is_opened_once() {
        let connector = MockConnector::new();
        let registry = SourceRegistry::register_with(
            vec![SourceConfig::new("filesource", true, "/a")],
            ConnectorCatalog::default().with_connector("filesource", connector.clone()),
        )
        .unwrap();

        assert!(!registry.has_session("filesource"));
        registry.session("filesource").unwrap();
        registry.session("filesource").unwrap();

        assert!(registry.has_session("filesource"));
        assert_eq!(connector.connections(), 1);
    }

    #[test]
    fn test_session_without_connector_is_adapter_error() {
        let registry =
            SourceRegistry::register(vec![SourceConfig::new("archive", true, "/a")]).unwrap();
        let err = registry.session("archive").err().unwrap();
        assert!(err.is_source_local());
    }
}
