//! Configuration for the rolodex core.
//!
//! Maps directly to `rolodex.toml`. Every key is optional.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level configuration, loadable from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RolodexConfig {
    /// General settings.
    #[serde(default)]
    pub general: GeneralConfig,
    /// Persistence backend selection.
    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl RolodexConfig {
    /// Load configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `RolodexError::Config` if the TOML is invalid.
    pub fn from_toml(toml_str: &str) -> crate::error::Result<Self> {
        toml::from_str(toml_str).map_err(|e| crate::RolodexError::Config(e.to_string()))
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: &std::path::Path) -> crate::error::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Log level: trace, debug, info, warn, error.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Which store backs the directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Single-key blob in an SQLite database.
    #[default]
    Sqlite,
    /// One JSON file on disk.
    Json,
    /// Process memory only; nothing survives a restart.
    Memory,
}

/// Persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Backend: "sqlite", "json" or "memory".
    #[serde(default)]
    pub backend: Backend,
    /// Database or JSON file location. Ignored by the memory backend.
    #[serde(default = "default_path")]
    pub path: PathBuf,
    /// Storage key the directory blob lives under.
    #[serde(default = "default_key")]
    pub key: String,
    /// Use WAL journaling (SQLite only).
    #[serde(default = "default_true")]
    pub wal_mode: bool,
    /// Store and verify a CRC-32 alongside the blob (SQLite only).
    #[serde(default = "default_true")]
    pub checksum_enabled: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            backend: Backend::default(),
            path: default_path(),
            key: default_key(),
            wal_mode: true,
            checksum_enabled: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Serde default helpers
// ---------------------------------------------------------------------------

fn default_true() -> bool { true }
fn default_log_level() -> String { "info".to_string() }
fn default_path() -> PathBuf { PathBuf::from("rolodex.db") }
fn default_key() -> String { "contacts".to_string() }
