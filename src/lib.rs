//! plugin-check - inspect host plugins against coding and runtime conventions.
//!
//! Checks are registered in a [`ChecksRegistry`](checks::ChecksRegistry),
//! selected per run, and executed by a runner that stages a controlled host
//! environment for runtime checks and restores it afterwards.
//!
//! # Modules
//!
//! - [`ajax`] - Async request actions and their JSON envelopes
//! - [`checks`] - Check contract, categories, registry and built-in checks
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - `plugin-check.yml` loading and validation
//! - [`error`] - Error types and result aliases
//! - [`host`] - Host environment, plugin discovery and persisted state
//! - [`preparation`] - Reversible environment staging
//! - [`result`] - Positioned findings
//! - [`runner`] - Runner lifecycle, selection and the request bootstrap
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use plugin_check::checks::{CheckContext, ChecksRegistry};
//! use plugin_check::result::{CheckResult, Finding};
//!
//! let registry = ChecksRegistry::with_builtins();
//! assert!(registry.get("plugin_readme").is_some());
//!
//! let mut result = CheckResult::new(CheckContext::from_parts(
//!     "/site/plugins/foo/foo.php",
//!     "/site/plugins",
//! ));
//! result.add(Finding::error("X", "first").in_file("a.php").at(3, 1));
//! result.add(Finding::error("Y", "second").in_file("a.php").at(3, 1));
//! assert_eq!(result.errors()["a.php"][&3][&1].len(), 2);
//! ```

pub mod ajax;
pub mod checks;
pub mod cli;
pub mod config;
pub mod error;
pub mod host;
pub mod preparation;
pub mod result;
pub mod runner;
pub mod ui;

pub use error::{PluginCheckError, Result};
