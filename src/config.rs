//! Configuration
//!
//! TigerStyle: One YAML file, explicit defaults, fail fast on anything invalid.
//!
//! ```yaml
//! env: dev
//! http_server:
//!   address: "127.0.0.1:8082"
//! storage:
//!   kind: sqlite
//!   path: storage/storage.db
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use student_core::{PostgresConfig, POOL_ACQUIRE_TIMEOUT_SECS_DEFAULT};

use crate::HTTP_BIND_ADDRESS_DEFAULT;

// =============================================================================
// TigerStyle Constants
// =============================================================================

/// Environment variable naming the config file
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Environment label used when the file has none
pub const ENV_LABEL_DEFAULT: &str = "dev";

// =============================================================================
// Types
// =============================================================================

/// Whole-process configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Environment label (dev, staging, production ...), logged at startup
    #[serde(default = "default_env")]
    pub env: String,

    /// HTTP listener settings
    #[serde(default)]
    pub http_server: HttpServerConfig,

    /// Storage backend selection and parameters
    pub storage: StorageConfig,
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize)]
pub struct HttpServerConfig {
    /// `host:port` to bind
    #[serde(default = "default_address")]
    pub address: String,
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
        }
    }
}

/// Which backend to open, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StorageConfig {
    /// Embedded file database
    Sqlite(SqliteConfig),
    /// Networked database
    Postgres(PostgresConfig),
}

impl StorageConfig {
    /// Backend name for logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Sqlite(_) => "sqlite",
            Self::Postgres(_) => "postgres",
        }
    }
}

/// SQLite parameters.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteConfig {
    /// Database file; a leading `~` is expanded
    pub path: String,

    /// Seconds to wait for a pooled connection
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl SqliteConfig {
    /// Path with `~` expanded to the home directory.
    #[must_use]
    pub fn expanded_path(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.path).into_owned())
    }
}

fn default_env() -> String {
    ENV_LABEL_DEFAULT.to_string()
}

fn default_address() -> String {
    HTTP_BIND_ADDRESS_DEFAULT.to_string()
}

fn default_acquire_timeout_secs() -> u64 {
    POOL_ACQUIRE_TIMEOUT_SECS_DEFAULT
}

// =============================================================================
// Loading
// =============================================================================

impl Config {
    /// Read and validate the YAML file at `path`.
    ///
    /// # Errors
    /// Returns error if the file is unreadable, malformed or invalid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let config: Self = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Parse and validate YAML text.
    ///
    /// # Errors
    /// Returns error if the text is malformed or invalid.
    pub fn from_yaml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(text).map_err(|source| ConfigError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.http_server.address.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "http_server.address cannot be empty".to_string(),
            ));
        }

        match &self.storage {
            StorageConfig::Sqlite(sqlite) if sqlite.path.trim().is_empty() => Err(
                ConfigError::Invalid("storage.path cannot be empty".to_string()),
            ),
            StorageConfig::Postgres(pg) if pg.max_connections == 0 => Err(ConfigError::Invalid(
                "storage.max_connections must be positive".to_string(),
            )),
            StorageConfig::Postgres(pg) if pg.dbname.trim().is_empty() => Err(
                ConfigError::Invalid("storage.dbname cannot be empty".to_string()),
            ),
            _ => Ok(()),
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config path not set: pass --config or set CONFIG_PATH")]
    MissingPath,

    #[error("cannot read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// =============================================================================
// Tests
// =============================================================================
