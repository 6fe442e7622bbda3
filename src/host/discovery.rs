//! Installed plugin discovery and target resolution.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::checks::context::read_header;
use crate::checks::CheckContext;
use crate::error::{PluginCheckError, Result};

/// Header that marks a plugin main file.
pub const PLUGIN_HEADER: &str = "Plugin Name";

/// A plugin found in the plugins directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstalledPlugin {
    /// Host key, e.g. `foo/foo.php`.
    pub basename: String,
    /// Value of the `Plugin Name` header.
    pub name: String,
    pub main_file: PathBuf,
}

/// The directory plugins are installed in.
#[derive(Debug, Clone)]
pub struct PluginDirectory {
    dir: PathBuf,
    extension: String,
}

impl PluginDirectory {
    /// Plugins in `dir` whose main files end in `.{extension}`.
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Scan for installed plugins, sorted by basename.
    ///
    /// Both top-level single files and files one directory deep are
    /// considered; a file is a plugin when it carries the plugin header.
    pub fn discover(&self) -> Result<Vec<InstalledPlugin>> {
        if !self.dir.is_dir() {
            debug!("Plugins directory {} does not exist", self.dir.display());
            return Ok(Vec::new());
        }

        let mut plugins = Vec::new();
        for entry in fs::read_dir(&self.dir)?.flatten() {
            let path = entry.path();
            if path.is_dir() {
                let mut candidates: Vec<PathBuf> = fs::read_dir(&path)?
                    .flatten()
                    .map(|e| e.path())
                    .filter(|p| p.is_file() && self.has_extension(p))
                    .collect();
                candidates.sort();
                if let Some(plugin) = candidates.iter().find_map(|p| self.inspect(p)) {
                    plugins.push(plugin);
                }
            } else if path.is_file() && self.has_extension(&path) {
                if let Some(plugin) = self.inspect(&path) {
                    plugins.push(plugin);
                }
            }
        }

        plugins.sort_by(|a, b| a.basename.cmp(&b.basename));
        Ok(plugins)
    }

    /// Resolve a user-supplied identifier to an installed plugin.
    ///
    /// Accepts a basename (`foo/foo.php`), a directory slug (`foo`), a
    /// single-file stem (`hello`) or a path to the main file.
    pub fn resolve(&self, identifier: &str) -> Result<InstalledPlugin> {
        let identifier = identifier.trim().trim_end_matches('/');
        if identifier.is_empty() {
            return Err(PluginCheckError::EmptyTarget);
        }

        let plugins = self.discover()?;
        let as_path = Path::new(identifier);
        let found = plugins.into_iter().find(|plugin| {
            plugin.basename == identifier
                || (plugin.basename.contains('/')
                    && plugin.basename.split('/').next() == Some(identifier))
                || plugin
                    .basename
                    .strip_suffix(&format!(".{}", self.extension))
                    .is_some_and(|stem| stem == identifier)
                || plugin.main_file == as_path
        });

        found.ok_or_else(|| PluginCheckError::PluginNotInstalled {
            plugin: identifier.to_string(),
        })
    }

    /// Build the check context for an installed plugin.
    pub fn context_for(&self, plugin: &InstalledPlugin) -> CheckContext {
        CheckContext::from_parts(plugin.main_file.clone(), &self.dir)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case(&self.extension))
    }

    fn inspect(&self, path: &Path) -> Option<InstalledPlugin> {
        let content = fs::read_to_string(path).ok()?;
        let name = read_header(&content, PLUGIN_HEADER)?;
        let context = CheckContext::from_parts(path.to_path_buf(), &self.dir);
        Some(InstalledPlugin {
            basename: context.basename().to_string(),
            name,
            main_file: path.to_path_buf(),
        })
    }
}
