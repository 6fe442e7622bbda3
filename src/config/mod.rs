//! Configuration loading, parsing, and validation.
//!
//! - Schema definitions in [`schema`]
//! - File loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use plugin_check::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("plugin-check.yml"), "plugins_dir: extensions").unwrap();
//!
//! let config = load_config(temp.path(), None).unwrap();
//! assert_eq!(config.plugins_dir, std::path::PathBuf::from("extensions"));
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{config_path, load_config, load_config_file, parse_config, CONFIG_FILE};
pub use schema::{
    AnalyzerCheckConfig, AnalyzerConfig, DefaultsConfig, PluginCheckConfig, RequestConfig,
    ThemeConfig,
};
pub use validator::{validate, validate_config, ValidationError};
