//! Source registry and connector interfaces.
//!
//! Source-specific listing lives behind [`SourceConnector`]; this module only
//! owns configuration, availability checks, and session caching.

mod config;
mod connector;
mod mock;
mod registry;

pub use config::{RegistryConfig, SourceConfig, SourceKind};
pub use connector::{ConnectorCatalog, ConnectorEntry, SourceConnector, SourceSession};
pub use mock::MockConnector;
pub use registry::SourceRegistry;
