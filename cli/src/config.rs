//! CLI configuration with TOML file support.

use std::path::Path;

use accrue_types::{HolderAddress, ProtocolParams};
use accrue_utils::LogFormat;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Configuration for the `accrue` binary.
///
/// Loaded from a TOML file via [`CliConfig::from_toml_file`]; every field has
/// a default so an empty file is valid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CliConfig {
    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log format: "human" or "json".
    #[serde(default)]
    pub log_format: LogFormat,

    /// Owner used when a scenario does not name one.
    #[serde(default)]
    pub owner: Option<HolderAddress>,

    /// Genesis rate and token metadata.
    #[serde(default)]
    pub params: ProtocolParams,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl CliConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            owner: None,
            params: ProtocolParams::default(),
        }
    }
}
