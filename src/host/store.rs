//! Persistent host state.
//!
//! The environment of a host installation lives in
//! `<host>/.plugin-check/host.json`. Other processes serving the host read
//! the same file, so staged state is visible to them until it is restored.
//!
//! Staged state is always written after a `host.json.pre-stage` snapshot of
//! the environment it replaced. A snapshot still present at load time means
//! a run never restored the host, and loading recovers from it.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use super::environment::Environment;
use crate::error::{PluginCheckError, Result};

/// Directory holding plugin-check state inside a host root.
pub const STATE_DIR: &str = ".plugin-check";

/// Loads and saves the [`Environment`] of one host.
#[derive(Debug, Clone)]
pub struct HostStore {
    path: PathBuf,
}

impl HostStore {
    /// Store for the host rooted at `host_root`.
    pub fn for_host(host_root: &Path) -> Self {
        Self {
            path: host_root.join(STATE_DIR).join("host.json"),
        }
    }

    /// Store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the environment staged state replaced.
    pub fn snapshot_path(&self) -> PathBuf {
        self.path.with_extension("json.pre-stage")
    }

    /// Load the environment. A missing file yields an empty environment.
    ///
    /// A leftover snapshot is written back over the state file and removed
    /// first.
    pub fn load(&self) -> Result<Environment> {
        let snapshot = self.snapshot_path();
        if snapshot.exists() {
            warn!(
                "Host state was left staged; restoring from {}",
                snapshot.display()
            );
            let baseline = read_env(&snapshot)?;
            self.restore(&baseline)?;
            return Ok(baseline);
        }

        if !self.path.exists() {
            return Ok(Environment::default());
        }
        read_env(&self.path)
    }

    /// Save the environment using write-to-temp-then-rename.
    pub fn save(&self, env: &Environment) -> Result<()> {
        write_env(&self.path, env)
    }

    /// Save staged state, keeping `baseline` as the snapshot to recover.
    ///
    /// An existing snapshot is kept, since it already holds the unstaged
    /// environment.
    pub fn save_staged(&self, staged: &Environment, baseline: &Environment) -> Result<()> {
        let snapshot = self.snapshot_path();
        if !snapshot.exists() {
            write_env(&snapshot, baseline)?;
        }
        write_env(&self.path, staged)
    }

    /// Save the restored environment and drop the snapshot.
    pub fn restore(&self, env: &Environment) -> Result<()> {
        write_env(&self.path, env)?;
        let snapshot = self.snapshot_path();
        if snapshot.exists() {
            fs::remove_file(&snapshot)?;
        }
        Ok(())
    }
}

fn read_env(path: &Path) -> Result<Environment> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| PluginCheckError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn write_env(path: &Path, env: &Environment) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }

    let content = serde_json::to_string_pretty(env).map_err(|e| {
        PluginCheckError::ConfigValidationError {
            message: format!("Failed to serialize host state: {}", e),
        }
    })?;

    let mut temp_name = path.as_os_str().to_owned();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}
