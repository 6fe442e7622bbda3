//! Error types for plugin-check operations.
//!
//! This module defines [`PluginCheckError`], the error type used throughout
//! the engine, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Configuration errors are raised before any staging happens
//! - Integrity errors stop a request before it touches the environment
//! - Preparation errors are raised after the failing preparation rolled
//!   itself back
//! - Check execution errors are never returned here; they are recorded in
//!   the [`CheckResult`](crate::result::CheckResult) as harness failures

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for plugin-check operations.
#[derive(Debug, Error)]
pub enum PluginCheckError {
    /// A requested check slug is not registered.
    #[error("Unknown check: {slug}")]
    UnknownCheck { slug: String },

    /// No plugin identifier was given.
    #[error("Invalid plugin: plugin identifier must not be empty")]
    EmptyTarget,

    /// The plugin identifier does not match an installed plugin.
    #[error("Plugin '{plugin}' is not installed")]
    PluginNotInstalled { plugin: String },

    /// A runtime check was requested explicitly for a plugin that is not active.
    #[error("Runtime check '{slug}' cannot run: plugin '{plugin}' is not active")]
    RuntimeCheckInactivePlugin { slug: String, plugin: String },

    /// A check was registered without any category.
    #[error("Check '{slug}' must declare at least one category")]
    CheckWithoutCategories { slug: String },

    /// Failed to parse the configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration structure or values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// The request token could not be verified.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// A preparation failed while staging the environment.
    #[error("Preparation '{preparation}' failed: {message}")]
    Preparation { preparation: String, message: String },

    /// A runner method was called out of lifecycle order.
    #[error("Runner is {state}, expected {expected}")]
    InvalidRunnerState {
        state: &'static str,
        expected: &'static str,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PluginCheckError {
    /// Build a preparation error.
    pub fn preparation(preparation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Preparation {
            preparation: preparation.into(),
            message: message.into(),
        }
    }

    /// Whether this error is a configuration error, raised before staging.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::UnknownCheck { .. }
                | Self::EmptyTarget
                | Self::PluginNotInstalled { .. }
                | Self::RuntimeCheckInactivePlugin { .. }
                | Self::CheckWithoutCategories { .. }
                | Self::ConfigParseError { .. }
                | Self::ConfigValidationError { .. }
        )
    }
}

/// Result type alias for plugin-check operations.
pub type Result<T> = std::result::Result<T, PluginCheckError>;
