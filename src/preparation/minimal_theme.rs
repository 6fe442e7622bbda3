//! Swap in the bundled minimal theme.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::{Cleanup, Preparation};
use crate::error::{PluginCheckError, Result};
use crate::host::{Environment, ThemeState};

/// Name of the bundled minimal theme.
pub const DEFAULT_MINIMAL_THEME: &str = "wp-empty-theme";

/// Location of the minimal theme rendering checks run against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimalTheme {
    pub name: String,
    pub root: PathBuf,
}

impl MinimalTheme {
    pub fn new(name: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            root: root.into(),
        }
    }
}

/// Activates the minimal theme so third-party themes do not confound
/// rendering checks.
///
/// The cleanup restores template, stylesheet and theme root exactly.
#[derive(Debug, Clone)]
pub struct MinimalThemePreparation {
    theme: MinimalTheme,
}

impl MinimalThemePreparation {
    pub fn new(theme: MinimalTheme) -> Self {
        Self { theme }
    }
}

impl Preparation for MinimalThemePreparation {
    fn name(&self) -> &str {
        "minimal-theme"
    }

    fn prepare(&self, env: &mut Environment) -> Result<Cleanup> {
        if self.theme.name.trim().is_empty() {
            return Err(PluginCheckError::preparation(
                self.name(),
                "minimal theme name is empty",
            ));
        }

        let staged = ThemeState {
            template: self.theme.name.clone(),
            stylesheet: self.theme.name.clone(),
            theme_root: Some(self.theme.root.clone()),
        };
        let snapshot = std::mem::replace(&mut env.theme, staged);
        Ok(Cleanup::new(self.name(), move |env| {
            env.theme = snapshot;
        }))
    }
}
