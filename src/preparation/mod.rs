//! Reversible environment mutations.
//!
//! A [`Preparation`] stages part of the [`Environment`] and hands back a
//! [`Cleanup`] that restores it. Preparations compose through a
//! [`CleanupStack`]: staged in order, torn down in reverse, so later
//! preparations may rely on earlier ones.
//!
//! # Overview
//!
//! - [`ForceSinglePluginPreparation`] - only the plugin under test is active
//! - [`MinimalThemePreparation`] - the bundled minimal theme is active
//! - [`DemoContentPreparation`] - deterministic content fixtures exist
//! - [`NeutralRequestFlagsPreparation`] - admin/async signals are off
//! - [`UniversalRuntimePreparation`] - all of the above, for runtime checks
//! - [`SharedPreparation`] - a preparation several checks may request once
//!
//! # Example
//!
//! ```
//! use plugin_check::host::Environment;
//! use plugin_check::preparation::{ForceSinglePluginPreparation, Preparation};
//!
//! let mut env = Environment {
//!     active_plugins: vec!["a/a.php".into(), "target/target.php".into(), "b/b.php".into()],
//!     ..Default::default()
//! };
//!
//! let mut cleanup = ForceSinglePluginPreparation::new("target/target.php")
//!     .prepare(&mut env)
//!     .unwrap();
//! assert_eq!(env.active_plugins, vec!["target/target.php"]);
//!
//! cleanup.run(&mut env);
//! assert_eq!(env.active_plugins, vec!["a/a.php", "target/target.php", "b/b.php"]);
//! ```

pub mod demo_content;
pub mod minimal_theme;
pub mod request_flags;
pub mod shared;
pub mod single_plugin;
pub mod universal;

pub use demo_content::DemoContentPreparation;
pub use minimal_theme::{MinimalTheme, MinimalThemePreparation};
pub use request_flags::NeutralRequestFlagsPreparation;
pub use shared::{dedupe_shared, PreparationFactory, SharedPreparation};
pub use single_plugin::ForceSinglePluginPreparation;
pub use universal::UniversalRuntimePreparation;

use std::ops::Deref;

use tracing::debug;

use crate::error::Result;
use crate::host::Environment;

/// A scoped, reversible mutation of the host environment.
pub trait Preparation {
    /// Short name used in logs and errors.
    fn name(&self) -> &str;

    /// Stage the environment and return the action that restores it.
    ///
    /// If this fails, anything the call already changed has been rolled
    /// back before the error is returned.
    fn prepare(&self, env: &mut Environment) -> Result<Cleanup>;
}

type CleanupFn = Box<dyn FnOnce(&mut Environment)>;

/// Restores what a preparation staged.
///
/// Running a cleanup more than once has no further effect.
pub struct Cleanup {
    label: String,
    action: Option<CleanupFn>,
}

impl Cleanup {
    /// Create a cleanup from a restore action.
    pub fn new(label: impl Into<String>, action: impl FnOnce(&mut Environment) + 'static) -> Self {
        Self {
            label: label.into(),
            action: Some(Box::new(action)),
        }
    }

    /// A cleanup with nothing to restore.
    pub fn noop(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            action: None,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Whether the cleanup already ran (or had nothing to do).
    pub fn is_done(&self) -> bool {
        self.action.is_none()
    }

    /// Restore the environment. Subsequent calls are no-ops.
    pub fn run(&mut self, env: &mut Environment) {
        if let Some(action) = self.action.take() {
            debug!("Cleaning up '{}'", self.label);
            action(env);
        }
    }
}

impl std::fmt::Debug for Cleanup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Cleanup")
            .field("label", &self.label)
            .field("done", &self.is_done())
            .finish()
    }
}

/// Cleanups in staging order, unwound in reverse.
#[derive(Debug, Default)]
pub struct CleanupStack {
    entries: Vec<Cleanup>,
}

impl CleanupStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, cleanup: Cleanup) {
        self.entries.push(cleanup);
    }

    /// Move all of `other` on top of this stack.
    pub fn append(&mut self, mut other: CleanupStack) {
        self.entries.append(&mut other.entries);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Run every cleanup, last staged first, and empty the stack.
    pub fn unwind(&mut self, env: &mut Environment) {
        while let Some(mut cleanup) = self.entries.pop() {
            cleanup.run(env);
        }
    }

    /// Collapse the stack into a single cleanup.
    pub fn into_cleanup(self, label: impl Into<String>) -> Cleanup {
        let mut stack = self;
        Cleanup::new(label, move |env| stack.unwind(env))
    }
}

/// Stage preparations in order.
///
/// When one fails, the ones already staged are unwound before the error is
/// returned.
pub fn stage_all<'p, I>(preparations: I, env: &mut Environment) -> Result<CleanupStack>
where
    I: IntoIterator<Item = &'p dyn Preparation>,
{
    let mut stack = CleanupStack::new();
    for preparation in preparations {
        debug!("Staging '{}'", preparation.name());
        match preparation.prepare(env) {
            Ok(cleanup) => stack.push(cleanup),
            Err(err) => {
                debug!("Staging '{}' failed, rolling back", preparation.name());
                stack.unwind(env);
                return Err(err);
            }
        }
    }
    Ok(stack)
}

/// Exclusive access to an environment while preparations are staged.
///
/// Everything staged through the guard is torn down when the guard is
/// finished or dropped, whichever comes first.
pub struct StageGuard<'e> {
    env: &'e mut Environment,
    stack: CleanupStack,
}

impl<'e> StageGuard<'e> {
    pub fn new(env: &'e mut Environment) -> Self {
        Self {
            env,
            stack: CleanupStack::new(),
        }
    }

    /// Stage one preparation on top of the current stack.
    pub fn stage(&mut self, preparation: &dyn Preparation) -> Result<()> {
        debug!("Staging '{}'", preparation.name());
        let cleanup = preparation.prepare(self.env)?;
        self.stack.push(cleanup);
        Ok(())
    }

    /// Number of staged cleanups.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Tear down everything staged so far.
    pub fn teardown(mut self) {
        self.stack.unwind(self.env);
    }
}

impl Deref for StageGuard<'_> {
    type Target = Environment;

    fn deref(&self) -> &Environment {
        &*self.env
    }
}

impl Drop for StageGuard<'_> {
    fn drop(&mut self) {
        self.stack.unwind(self.env);
    }
}
