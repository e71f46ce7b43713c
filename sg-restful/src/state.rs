//! Application state management

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::middleware::ConnectionCache;
use crate::query::FormatRegistry;

/// Application state shared across handlers
///
/// Built once at startup; cloning only bumps reference counts.
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    formats: Arc<FormatRegistry>,
    connections: ConnectionCache,
}

impl AppState {
    /// State with the built-in query formats, activated per `config.query.formats`
    ///
    /// Fails if a configured format name is not registered.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_registry(config, FormatRegistry::with_builtin_formats())
    }

    /// State using `registry`, activated per `config.query.formats`
    ///
    /// Use this to serve additional formats registered beforehand.
    pub fn with_registry(config: Config, mut registry: FormatRegistry) -> Result<Self> {
        registry.activate(&config.query.formats)?;
        tracing::info!(formats = ?registry.active_names(), "query formats active");

        let connections = ConnectionCache::new(&config.backend)?;
        Ok(Self {
            config: Arc::new(config),
            formats: Arc::new(registry),
            connections,
        })
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Query formats, read-only
    pub fn formats(&self) -> &FormatRegistry {
        &self.formats
    }

    /// Per-credential backend clients
    pub fn connections(&self) -> &ConnectionCache {
        &self.connections
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::query::{FilterModel, QueryFormat, QueryParseError};

    fn config(formats: &[&str]) -> Config {
        let mut config = Config::default();
        config.backend.host = "http://127.0.0.1:9".to_string();
        config.query.formats = formats.iter().map(|f| f.to_string()).collect();
        config
    }

    struct Everything;

    impl QueryFormat for Everything {
        fn can_parse(&self, _input: &str) -> bool {
            true
        }

        fn parse(&self, _input: &str) -> std::result::Result<FilterModel, QueryParseError> {
            Ok(FilterModel::new())
        }
    }

    #[test]
    fn test_new_activates_configured_formats() {
        let state = AppState::new(config(&["format3", "format2"])).unwrap();
        assert_eq!(state.formats().active_names(), vec!["format3", "format2"]);
        assert!(state.connections().is_empty());
    }

    #[test]
    fn test_unknown_format_fails_startup() {
        let err = AppState::new(config(&["format1", "format4"])).unwrap_err();
        assert!(matches!(err, Error::Registry(_)));
        assert!(err.to_string().contains("format4"));
    }

    #[test]
    fn test_with_custom_registry() {
        let mut registry = FormatRegistry::with_builtin_formats();
        registry.register("everything", Everything);

        let state = AppState::with_registry(config(&["format1", "everything"]), registry).unwrap();
        assert_eq!(state.formats().active_names(), vec!["format1", "everything"]);
    }

    #[test]
    fn test_clone_shares_connections() {
        let state = AppState::new(config(&["format1"])).unwrap();
        let clone = state.clone();
        state
            .connections()
            .get_or_connect(crate::rpc::Credentials::script("a", "k"))
            .unwrap();
        assert_eq!(clone.connections().len(), 1);
    }
}
