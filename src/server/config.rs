//! Server configuration.
//!
//! Values are layered in priority order: built-in defaults, then an
//! optional TOML file, then command line flags applied by the binary.
//!
//! ```toml
//! bind = "127.0.0.1:8080"
//! book_path = "bookshelf.json"
//! persist = true
//! sync_on_write = false
//! lock_timeout_ms = 250
//! log_level = "info"
//! ```

use crate::types::DEFAULT_BOOK_FILE;
use crate::Config;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:8080";

/// Errors raised while loading server configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Settings for the HTTP server process
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to listen on
    pub bind: String,
    /// Book file used when persistence is enabled
    pub book_path: PathBuf,
    /// Load the book at startup and store it at shutdown
    pub persist: bool,
    /// fsync the book file when storing it
    pub sync_on_write: bool,
    /// Fail requests with 503 after waiting this long for the book lock.
    /// The wait blocks the handling runtime worker thread.
    pub lock_timeout_ms: Option<u64>,
    /// Default log level when `RUST_LOG` is not set
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            book_path: PathBuf::from(DEFAULT_BOOK_FILE),
            persist: true,
            sync_on_write: false,
            lock_timeout_ms: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Check values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.trim().is_empty() {
            return Err(ConfigError::Invalid("bind address is empty".to_string()));
        }
        if self.persist && self.book_path.file_name().is_none() {
            return Err(ConfigError::Invalid(format!(
                "persistence is enabled but book_path {:?} does not name a file",
                self.book_path
            )));
        }
        if self.lock_timeout_ms == Some(0) {
            return Err(ConfigError::Invalid(
                "lock_timeout_ms must be positive; omit it to wait indefinitely".to_string(),
            ));
        }
        Ok(())
    }

    /// Lock timeout as a duration
    pub fn lock_timeout(&self) -> Option<Duration> {
        self.lock_timeout_ms.map(Duration::from_millis)
    }

    /// Bookshelf settings derived from this configuration
    pub fn book_config(&self) -> Config {
        Config::new(&self.book_path)
            .persist(self.persist)
            .sync_on_write(self.sync_on_write)
            .lock_timeout(self.lock_timeout())
    }
}
