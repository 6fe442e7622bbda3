//! Configuration validation rules.
//!
//! - Analyzer checks need a slug, a ruleset and at least one category
//! - Analyzer checks need an analyzer command to run
//! - The minimal theme needs a name

use crate::config::schema::PluginCheckConfig;
use crate::error::{PluginCheckError, Result};
use std::collections::HashSet;

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Rule identifier
    pub rule: String,
    /// Human-readable error message
    pub message: String,
}

impl ValidationError {
    fn new(rule: &str, message: impl Into<String>) -> Self {
        Self {
            rule: rule.to_string(),
            message: message.into(),
        }
    }
}

/// Validate a configuration and return all errors.
pub fn validate_config(config: &PluginCheckConfig) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if config.main_file_extension.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-extension",
            "main_file_extension must not be empty",
        ));
    }

    if config.minimal_theme.name.trim().is_empty() {
        errors.push(ValidationError::new(
            "empty-theme",
            "minimal_theme.name must not be empty",
        ));
    }

    if !config.analyzer_checks.is_empty() && config.analyzer.is_none() {
        errors.push(ValidationError::new(
            "missing-analyzer",
            "analyzer_checks are declared but no analyzer command is configured",
        ));
    }

    let mut seen = HashSet::new();
    for (index, check) in config.analyzer_checks.iter().enumerate() {
        let label = if check.slug.is_empty() {
            format!("analyzer_checks[{}]", index)
        } else {
            format!("analyzer check '{}'", check.slug)
        };
        if check.slug.trim().is_empty() {
            errors.push(ValidationError::new("empty-slug", format!("{} has an empty slug", label)));
        } else if !seen.insert(check.slug.as_str()) {
            errors.push(ValidationError::new(
                "duplicate-slug",
                format!("{} is declared more than once", label),
            ));
        }
        if check.ruleset.trim().is_empty() {
            errors.push(ValidationError::new(
                "empty-ruleset",
                format!("{} has an empty ruleset", label),
            ));
        }
        if check.categories.is_empty() {
            errors.push(ValidationError::new(
                "empty-categories",
                format!("{} must declare at least one category", label),
            ));
        }
    }

    errors
}

/// Validate a configuration, failing on the first batch of errors.
pub fn validate(config: &PluginCheckConfig) -> Result<()> {
    let errors = validate_config(config);
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");
    Err(PluginCheckError::ConfigValidationError { message })
}
