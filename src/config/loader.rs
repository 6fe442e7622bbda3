//! Configuration file loading.
//!
//! The configuration lives in `plugin-check.yml` at the host root. A missing
//! file yields the default configuration.

use crate::config::schema::PluginCheckConfig;
use crate::config::validator::validate;
use crate::error::{PluginCheckError, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Name of the configuration file at the host root.
pub const CONFIG_FILE: &str = "plugin-check.yml";

/// Path of the configuration file for a host.
pub fn config_path(host_root: &Path) -> PathBuf {
    host_root.join(CONFIG_FILE)
}

/// Parse YAML content into PluginCheckConfig.
///
/// # Arguments
///
/// * `content` - The YAML content to parse
/// * `source_path` - Path for error reporting
pub fn parse_config(content: &str, source_path: &Path) -> Result<PluginCheckConfig> {
    if content.trim().is_empty() {
        return Ok(PluginCheckConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| PluginCheckError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and validate a config file.
///
/// # Errors
///
/// Returns `ConfigParseError` if the YAML is invalid.
/// Returns `ConfigValidationError` if a value is out of range.
pub fn load_config_file(path: &Path) -> Result<PluginCheckConfig> {
    let config = match fs::read_to_string(path) {
        Ok(content) => parse_config(&content, path)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No config at {}, using defaults", path.display());
            PluginCheckConfig::default()
        }
        Err(e) => return Err(PluginCheckError::Io(e)),
    };
    validate(&config)?;
    Ok(config)
}

/// Load config with optional path override.
///
/// If `config_override` is provided, loads that file instead of
/// `plugin-check.yml` at the host root.
pub fn load_config(host_root: &Path, config_override: Option<&Path>) -> Result<PluginCheckConfig> {
    match config_override {
        Some(path) => load_config_file(path),
        None => load_config_file(&config_path(host_root)),
    }
}
