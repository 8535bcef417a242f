//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::api::ApiConfig as ServerConfig;
use crate::storage::{IndexBackend, Scorer, StoreConfig, DEFAULT_MAX_PAGE_SIZE};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Record store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: IndexBackend,

    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    /// Offset east of UTC used to score local timestamps
    #[serde(default)]
    pub utc_offset_minutes: i32,

    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
}

fn default_data_dir() -> String {
    dirs::data_local_dir()
        .map(|p| p.join("chronolog").to_string_lossy().to_string())
        .unwrap_or_else(|| "./chronolog_data".to_string())
}

fn default_max_page_size() -> usize {
    DEFAULT_MAX_PAGE_SIZE
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: IndexBackend::default(),
            data_dir: default_data_dir(),
            utc_offset_minutes: 0,
            max_page_size: default_max_page_size(),
        }
    }
}

impl StorageConfig {
    /// Build the record store settings
    pub fn to_store_config(&self) -> Result<StoreConfig, ConfigError> {
        let scorer = Scorer::from_offset_minutes(self.utc_offset_minutes)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;

        Ok(StoreConfig::new(&self.data_dir)
            .backend(self.backend)
            .scorer(scorer)
            .max_page_size(self.max_page_size))
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8082
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    pub fn to_server_config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl LoggingConfig {
    pub fn is_json(&self) -> bool {
        self.format.eq_ignore_ascii_case("json")
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(path, &content)
    }

    fn parse(path: &Path, content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    ///
    /// The first existing file wins. A file that exists but cannot be read
    /// or parsed is an error, not a fallback to defaults.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load_first_existing(&default_config_paths())
    }

    fn load_first_existing(paths: &[PathBuf]) -> Result<Self, ConfigError> {
        match paths.iter().find(|path| path.exists()) {
            Some(path) => {
                let config = Self::load_with_env(path)?;
                tracing::info!("Loaded config from {:?}", path);
                Ok(config)
            }
            None => {
                tracing::info!("Using default config with environment overrides");
                Ok(Self::from_env())
            }
        }
    }

    /// Check values serde cannot check
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.max_page_size == 0 {
            return Err(ConfigError::Invalid(
                "storage.max_page_size must be greater than zero".to_string(),
            ));
        }
        self.storage.to_store_config()?;
        Ok(())
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        // Storage overrides
        if let Some(backend) = parse_var(&var, "CHRONOLOG_BACKEND") {
            self.storage.backend = backend;
        }
        if let Some(data_dir) = var("CHRONOLOG_DATA_DIR") {
            self.storage.data_dir = data_dir;
        }
        if let Some(minutes) = parse_var(&var, "CHRONOLOG_UTC_OFFSET_MINUTES") {
            self.storage.utc_offset_minutes = minutes;
        }
        if let Some(size) = parse_var(&var, "CHRONOLOG_MAX_PAGE_SIZE") {
            self.storage.max_page_size = size;
        }

        // API overrides
        if let Some(host) = var("CHRONOLOG_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = parse_var(&var, "CHRONOLOG_API_PORT") {
            self.api.port = port;
        }

        // Logging overrides
        if let Some(level) = var("CHRONOLOG_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = var("CHRONOLOG_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Config files searched by [`Config::load_default`], in order
pub fn default_config_paths() -> Vec<PathBuf> {
    [
        dirs::config_dir().map(|p| p.join("chronolog").join("config.toml")),
        Some(PathBuf::from("/etc/chronolog/config.toml")),
        Some(PathBuf::from("./config.toml")),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Read and parse an override, warning when the value does not parse
fn parse_var<T>(var: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let value = var(key)?;
    match value.parse() {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            tracing::warn!("Ignoring {}={:?}: {}", key, value, e);
            None
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Chronolog Configuration
#
# Environment variables override these settings:
# - CHRONOLOG_BACKEND
# - CHRONOLOG_DATA_DIR
# - CHRONOLOG_UTC_OFFSET_MINUTES
# - CHRONOLOG_MAX_PAGE_SIZE
# - CHRONOLOG_API_HOST
# - CHRONOLOG_API_PORT
# - CHRONOLOG_LOG_LEVEL
# - CHRONOLOG_LOG_FORMAT

[storage]
# Index backend: memory (empty at every start) or sqlite
backend = "memory"

# Directory for the sqlite backend
data_dir = "~/.local/share/chronolog"

# Offset east of UTC used to turn local timestamps into scores
utc_offset_minutes = 0

# Maximum number of records returned by /getByTime
max_page_size = 1000

[api]
# API server host
host = "0.0.0.0"

# API server port
port = 8082

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.storage.backend, IndexBackend::Memory);
        assert_eq!(config.storage.max_page_size, 1000);
        assert_eq!(config.api.port, 8082);
        assert_eq!(config.logging.level, "info");
        assert!(!config.logging.is_json());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_generated_config_parses() {
        let config = Config::parse(Path::new("generated"), &generate_default_config()).unwrap();
        assert_eq!(config.storage.backend, IndexBackend::Memory);
        assert_eq!(config.storage.utc_offset_minutes, 0);
        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_config() {
        let config = Config::parse(
            Path::new("partial"),
            "[storage]\nbackend = \"sqlite\"\nutc_offset_minutes = 120\n",
        )
        .unwrap();
        assert_eq!(config.storage.backend, IndexBackend::Sqlite);
        assert_eq!(config.storage.max_page_size, 1000);
        assert_eq!(config.api.port, 8082);

        let store = config.storage.to_store_config().unwrap();
        assert_eq!(store.scorer.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_parse_error() {
        let err = Config::parse(Path::new("bad"), "[storage\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));

        let err = Config::parse(Path::new("bad"), "[storage]\nbackend = \"redis\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load(Path::new("/nonexistent/chronolog.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[api]\nport = 9000\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.api.port, 9000);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.storage.max_page_size = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut config = Config::default();
        config.storage.utc_offset_minutes = 24 * 60;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_first_existing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&good, "[api]\nport = 9100\n").unwrap();

        let config = Config::load_first_existing(&[missing.clone(), good]).unwrap();
        assert_eq!(config.api.port, 9100);

        let config = Config::load_first_existing(&[missing]).unwrap();
        assert_eq!(config.storage.backend, IndexBackend::Memory);
    }

    #[test]
    fn test_malformed_default_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("broken.toml");
        let good = dir.path().join("good.toml");
        std::fs::write(&broken, "[storage\nbackend = \"sqlite\"\n").unwrap();
        std::fs::write(&good, "[storage]\nbackend = \"sqlite\"\n").unwrap();

        let err = Config::load_first_existing(&[broken, good]).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_unparseable_overrides_keep_current_values() {
        let vars: HashMap<&str, &str> = [
            ("CHRONOLOG_BACKEND", "redis"),
            ("CHRONOLOG_UTC_OFFSET_MINUTES", "+1h"),
            ("CHRONOLOG_MAX_PAGE_SIZE", "-5"),
            ("CHRONOLOG_API_PORT", "70000"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.storage.utc_offset_minutes = 60;
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.backend, IndexBackend::Memory);
        assert_eq!(config.storage.utc_offset_minutes, 60);
        assert_eq!(config.storage.max_page_size, 1000);
        assert_eq!(config.api.port, 8082);
    }

    #[test]
    fn test_parse_var() {
        let var = |key: &str| (key == "N").then(|| "42".to_string());
        assert_eq!(parse_var::<u16>(&var, "N"), Some(42));
        assert_eq!(parse_var::<u16>(&var, "MISSING"), None);

        let bad = |_: &str| Some("forty-two".to_string());
        assert_eq!(parse_var::<u16>(&bad, "N"), None);
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("CHRONOLOG_BACKEND", "sqlite"),
            ("CHRONOLOG_DATA_DIR", "/tmp/chronolog"),
            ("CHRONOLOG_MAX_PAGE_SIZE", "50"),
            ("CHRONOLOG_API_PORT", "not a port"),
            ("CHRONOLOG_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.storage.backend, IndexBackend::Sqlite);
        assert_eq!(config.storage.data_dir, "/tmp/chronolog");
        assert_eq!(config.storage.max_page_size, 50);
        assert_eq!(config.api.port, 8082);
        assert!(config.logging.is_json());
    }
}
