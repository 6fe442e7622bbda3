//! The host request lifecycle.
//!
//! Runtime staging has to happen before extensions load, so the selector
//! is hooked in ahead of everything else and released when the request
//! ends.

use tracing::debug;

use super::engine::Runner;
use super::selector::{Invocation, RunnerSelector};
use crate::error::Result;
use crate::host::Environment;

/// Drives one request: select a runner, load extensions, dispatch, destroy.
pub struct Bootstrap {
    selector: RunnerSelector,
    loaded: Vec<String>,
}

impl Bootstrap {
    pub fn new(selector: RunnerSelector) -> Self {
        Self {
            selector,
            loaded: Vec::new(),
        }
    }

    pub fn selector(&self) -> &RunnerSelector {
        &self.selector
    }

    /// Extensions loaded by the last request, in load order.
    pub fn loaded_plugins(&self) -> &[String] {
        &self.loaded
    }

    /// Handle one request.
    ///
    /// `dispatch` receives the selected runner, if any, with the environment
    /// as extensions saw it. The runner's staging is torn down afterwards
    /// whatever `dispatch` returns.
    pub fn handle<T, F>(
        &mut self,
        invocation: &Invocation,
        env: &mut Environment,
        dispatch: F,
    ) -> Result<T>
    where
        F: FnOnce(Option<&mut dyn Runner>, &mut Environment) -> Result<T>,
    {
        self.selector.select(invocation, env)?;

        self.loaded = env.active_plugins.clone();
        debug!("Loaded {} extension(s)", self.loaded.len());

        let outcome = dispatch(self.selector.active_mut(), env);
        self.selector.destroy(env);
        outcome
    }
}
