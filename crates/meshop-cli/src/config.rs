//! CLI configuration
//!
//! Stored in `~/.config/meshop/config.yaml` unless `--config` or
//! `MESHOP_CONFIG` points elsewhere.

use meshop_core::MinorVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CliError, Result};

/// Serialization format of the translated spec
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Yaml,
    Json,
}

/// CLI configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// API version
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Version used when `--version` is not given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_version: Option<MinorVersion>,

    /// Output format used when `--output` is not given
    #[serde(default)]
    pub output: OutputFormat,
}

fn default_api_version() -> String {
    "meshop.io/v1".to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_version: default_api_version(),
            default_version: None,
            output: OutputFormat::default(),
        }
    }
}

impl CliConfig {
    /// Load configuration from `explicit`, or from the default location
    ///
    /// A missing file at the default location yields the defaults. A missing
    /// explicit file is an error.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| CliError::Io {
            message: format!("{}: {}", path.display(), e),
        })?;
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Self = serde_yaml::from_str(&content).map_err(|e| {
            CliError::input_with_help(
                format!("{}: {}", path.display(), e),
                "expected keys: apiVersion, defaultVersion, output",
            )
        })?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }

    /// Get default configuration path
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("meshop").join("config.yaml"))
    }
}
