//! Configuration management using Figment
//!
//! Configuration is loaded from multiple sources with the following precedence (highest to lowest):
//! 1. Environment variables (prefix: `SG_RESTFUL_`, nested keys split on `__`,
//!    e.g. `SG_RESTFUL_BACKEND__HOST`)
//! 2. Current working directory: ./config.toml
//! 3. System directory: /etc/sg-restful/config.toml
//! 4. Default values

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::query::FormatRegistry;
use crate::rpc::DEFAULT_API_PATH;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "SG_RESTFUL_";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service configuration
    pub service: ServiceConfig,

    /// Backend JSON-RPC configuration
    pub backend: BackendConfig,

    /// Filter query configuration
    #[serde(default)]
    pub query: QueryConfig,
}

/// Service-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service name
    pub name: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Log level or `EnvFilter` directive
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// CORS mode: `permissive`, `restrictive` or `disabled`
    #[serde(default = "default_cors_mode")]
    pub cors_mode: String,

    /// Request body size limit in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,
}

/// Backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Site URL, e.g. `https://studio.shotgunstudio.com`
    #[serde(default)]
    pub host: String,

    /// JSON-RPC endpoint path, replaces any path on `host`
    #[serde(default = "default_api_path")]
    pub api_path: String,

    /// Per-call timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Upper bound on cached per-credential clients
    #[serde(default = "default_max_cached_connections")]
    pub max_cached_connections: usize,
}

impl BackendConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Filter query configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Active formats in dispatch order
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            formats: default_formats(),
        }
    }
}

// Default value functions
fn default_port() -> u16 {
    8000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_cors_mode() -> String {
    "permissive".to_string()
}

fn default_body_limit_mb() -> usize {
    10 // 10 MB
}

fn default_api_path() -> String {
    DEFAULT_API_PATH.to_string()
}

fn default_max_cached_connections() -> usize {
    1024
}

fn default_formats() -> Vec<String> {
    FormatRegistry::builtin_names()
}

impl Config {
    /// Load configuration from the default locations
    ///
    /// Does not validate; call [`Config::validate`] once command-line
    /// overrides have been applied.
    pub fn load() -> Result<Self> {
        let config_paths = Self::find_config_paths();

        tracing::debug!("Searching for config files in order:");
        for path in &config_paths {
            tracing::debug!("  - {}", path.display());
        }

        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));

        // lowest priority first
        for path in config_paths.iter().rev() {
            if path.exists() {
                tracing::info!("Loading configuration from: {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
        }

        figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

        let config = figment.extract()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Skips the default locations. Environment variables still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()?;

        Ok(config)
    }

    /// Config file paths in priority order (highest first)
    fn find_config_paths() -> Vec<PathBuf> {
        vec![
            PathBuf::from("config.toml"),
            PathBuf::from("/etc/sg-restful/config.toml"),
        ]
    }

    /// Reject settings the server cannot start with
    pub fn validate(&self) -> Result<()> {
        if self.backend.host.is_empty() {
            return Err(config_error("Shotgun host not set."));
        }
        if !self.backend.host.starts_with("http") {
            return Err(config_error(format!(
                "Host must start with http:// or https://, got '{}'",
                self.backend.host
            )));
        }
        if self.backend.max_cached_connections == 0 {
            return Err(config_error("backend.max_cached_connections must be at least 1"));
        }
        Ok(())
    }

    /// Request body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.service.body_limit_mb * 1024 * 1024
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.service.timeout_secs)
    }
}

fn config_error(message: impl Into<String>) -> Error {
    Error::from(figment::Error::from(message.into()))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: "sg-restful".to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                cors_mode: default_cors_mode(),
                body_limit_mb: default_body_limit_mb(),
            },
            backend: BackendConfig {
                host: String::new(),
                api_path: default_api_path(),
                timeout_secs: default_timeout(),
                max_cached_connections: default_max_cached_connections(),
            },
            query: QueryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn with_host(host: &str) -> Config {
        let mut config = Config::default();
        config.backend.host = host.to_string();
        config
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.service.port, 8000);
        assert_eq!(config.service.log_level, "info");
        assert_eq!(config.service.cors_mode, "permissive");
        assert_eq!(config.backend.api_path, "/api3/json");
        assert_eq!(config.backend.max_cached_connections, 1024);
        assert_eq!(config.query.formats, vec!["format1", "format2", "format3"]);
        assert_eq!(config.body_limit_bytes(), 10 * 1024 * 1024);
    }

    #[test]
    fn test_validate_requires_host() {
        let err = Config::default().validate().unwrap_err();
        assert!(err.to_string().contains("Shotgun host not set."));
    }

    #[test]
    fn test_validate_requires_http_scheme() {
        assert!(with_host("studio.example.com").validate().is_err());
        assert!(with_host("http://localhost:9000").validate().is_ok());
        assert!(with_host("https://studio.example.com").validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_cache() {
        let mut config = with_host("https://studio.example.com");
        config.backend.max_cached_connections = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[service]
name = "sg-restful-test"
port = 9100

[backend]
host = "https://studio.example.com"
max_cached_connections = 8

[query]
formats = ["format3", "format1"]
"#
        )
        .unwrap();

        let config = Config::load_from(file.path()).unwrap();
        assert_eq!(config.service.name, "sg-restful-test");
        assert_eq!(config.service.port, 9100);
        assert_eq!(config.service.timeout_secs, 30);
        assert_eq!(config.backend.host, "https://studio.example.com");
        assert_eq!(config.backend.api_path, "/api3/json");
        assert_eq!(config.backend.max_cached_connections, 8);
        assert_eq!(config.query.formats, vec!["format3", "format1"]);
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.service.port, 8000);
        assert!(config.backend.host.is_empty());
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[service]\nport = \"not a port\"").unwrap();
        assert!(matches!(Config::load_from(file.path()), Err(Error::Config(_))));
    }
}
