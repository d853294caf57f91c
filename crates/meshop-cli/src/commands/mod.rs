//! CLI commands

pub mod rules;
pub mod translate;
pub mod versions;

use meshop_core::MinorVersion;

use crate::config::CliConfig;
use crate::error::{CliError, Result};

/// Pick the schema version: `--version` flag, then config, then the newest table
pub fn resolve_version(flag: Option<&str>, config: &CliConfig) -> Result<MinorVersion> {
    if let Some(raw) = flag {
        return MinorVersion::parse(raw).map_err(|e| CliError::usage(e.to_string()));
    }

    if let Some(version) = config.default_version {
        return Ok(version);
    }

    meshop_translate::latest_version()
        .ok_or_else(|| CliError::internal("no mapping tables are registered"))
}
