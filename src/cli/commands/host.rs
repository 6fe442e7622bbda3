//! Host loading shared by the commands that inspect a host.

use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::sync::Arc;

use tracing::debug;

use crate::checks::{AnalyzerProvider, ChecksRegistry, CommandAnalyzer};
use crate::config::{load_config, PluginCheckConfig};
use crate::error::Result;
use crate::host::HostStore;
use crate::runner::{Bootstrap, NonceVerifier, RunnerSelector, RunnerSettings};

/// Everything a command needs to act on one host.
pub struct HostSetup {
    root: PathBuf,
    config: PluginCheckConfig,
    registry: Rc<ChecksRegistry>,
    settings: RunnerSettings,
    verifier: NonceVerifier,
    store: HostStore,
}

impl HostSetup {
    /// Load configuration for the host at `root` and build its registry.
    ///
    /// Analyzer-backed checks are registered only when an analyzer is
    /// configured.
    pub fn load(root: &Path, config_override: Option<&Path>) -> Result<Self> {
        let config = load_config(root, config_override)?;
        Self::from_config(root, config)
    }

    pub fn from_config(root: &Path, config: PluginCheckConfig) -> Result<Self> {
        let mut registry = ChecksRegistry::with_builtins();
        if let Some(analyzer) = &config.analyzer {
            let provider = AnalyzerProvider::new(
                config.analyzer_checks.clone(),
                config.main_file_extension.clone(),
                Arc::new(CommandAnalyzer::from_config(analyzer)),
            );
            registry.extend(&provider)?;
        }
        debug!("Registered {} check(s)", registry.len());

        Ok(Self {
            root: root.to_path_buf(),
            settings: RunnerSettings::from_config(root, &config),
            verifier: NonceVerifier::for_host(root, config.request.secret.as_deref()),
            store: HostStore::for_host(root),
            registry: Rc::new(registry),
            config,
        })
    }

    /// Replace the check registry, e.g. to add checks from an embedding host.
    pub fn with_registry(mut self, registry: ChecksRegistry) -> Self {
        self.registry = Rc::new(registry);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &PluginCheckConfig {
        &self.config
    }

    pub fn registry(&self) -> &Rc<ChecksRegistry> {
        &self.registry
    }

    pub fn settings(&self) -> &RunnerSettings {
        &self.settings
    }

    pub fn verifier(&self) -> &NonceVerifier {
        &self.verifier
    }

    pub fn store(&self) -> &HostStore {
        &self.store
    }

    /// A fresh request lifecycle for this host.
    pub fn bootstrap(&self) -> Bootstrap {
        Bootstrap::new(RunnerSelector::new(
            self.settings.clone(),
            Rc::clone(&self.registry),
            self.verifier.clone(),
        ))
    }
}
