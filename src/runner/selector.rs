//! Picks the runner for an invocation and holds it for the request.

use std::rc::Rc;

use tracing::debug;

use super::cli::CliRunner;
use super::engine::{Runner, RunnerSettings};
use super::request::{AjaxRequest, NonceVerifier, RequestRunner};
use crate::checks::ChecksRegistry;
use crate::cli::args::Commands;
use crate::error::Result;
use crate::host::Environment;
use crate::preparation::CleanupStack;

/// What started the current request.
#[derive(Debug, Clone)]
pub enum Invocation {
    /// A command line invocation.
    Command(Commands),
    /// An async request.
    Request(AjaxRequest),
    /// Anything else, e.g. a page view.
    Other,
}

/// Holds at most one active runner and the cleanup of its early staging.
pub struct RunnerSelector {
    settings: RunnerSettings,
    registry: Rc<ChecksRegistry>,
    verifier: NonceVerifier,
    active: Option<(Box<dyn Runner>, CleanupStack)>,
}

impl RunnerSelector {
    pub fn new(
        settings: RunnerSettings,
        registry: Rc<ChecksRegistry>,
        verifier: NonceVerifier,
    ) -> Self {
        Self {
            settings,
            registry,
            verifier,
            active: None,
        }
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

    /// Find, configure and stage the runner for `invocation`.
    ///
    /// The command line runner is asked first, then the request runner.
    /// While a runner is active this returns it without doing anything
    /// else. `None` means no runner recognized the invocation.
    pub fn select(
        &mut self,
        invocation: &Invocation,
        env: &mut Environment,
    ) -> Result<Option<&mut dyn Runner>> {
        if self.active.is_none() {
            if let Some(mut runner) = self.recognize(invocation) {
                runner.configure(env)?;
                let stack = runner.prepare(env)?;
                debug!(
                    "Selected {} runner with {} staged preparation(s)",
                    runner.kind(),
                    stack.len()
                );
                self.active = Some((runner, stack));
            }
        }
        Ok(self.active_mut())
    }

    /// The active runner, if any.
    pub fn active_mut(&mut self) -> Option<&mut dyn Runner> {
        match &mut self.active {
            Some((runner, _)) => Some(runner.as_mut()),
            None => None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Tear down the active runner's staging and release it.
    ///
    /// Does nothing when no runner is active.
    pub fn destroy(&mut self, env: &mut Environment) {
        if let Some((mut runner, stack)) = self.active.take() {
            debug!("Destroying {} runner", runner.kind());
            runner.teardown(env, stack);
        }
    }

    fn recognize(&self, invocation: &Invocation) -> Option<Box<dyn Runner>> {
        if let Some(runner) = CliRunner::recognize(invocation, &self.settings, &self.registry) {
            return Some(Box::new(runner));
        }
        if let Some(runner) =
            RequestRunner::recognize(invocation, &self.settings, &self.registry, &self.verifier)
        {
            return Some(Box::new(runner));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::Check;
    use crate::cli::args::CheckArgs;
    use crate::error::PluginCheckError;
    use crate::preparation::testing::Log;
    use crate::runner::engine::testing::{Behavior, Host, Scripted};
    use crate::runner::engine::RunnerState;
    use crate::runner::request::RUN_CHECKS_ACTION;

    fn selector(host: &Host, log: &Log) -> RunnerSelector {
        let mut registry = ChecksRegistry::with_builtins();
        registry
            .register(Check::Runtime(Box::new(Scripted::new(
                "runtime_seen",
                Behavior::Report,
                log,
            ))))
            .unwrap();
        RunnerSelector::new(
            host.settings(),
            Rc::new(registry),
            NonceVerifier::new("secret"),
        )
    }

    fn check(plugin: &str, checks: &[&str]) -> Invocation {
        Invocation::Command(Commands::Check(CheckArgs {
            plugin: plugin.into(),
            checks: checks.iter().map(|c| c.to_string()).collect(),
            ..Default::default()
        }))
    }

    #[test]
    fn stages_runtime_environment_until_destroyed() {
        let host = Host::new();
        let log = Log::default();
        let mut selector = selector(&host, &log);
        let mut env = host.environment();
        let original = env.clone();

        let runner = selector.select(&check("foo", &["runtime_seen"]), &mut env).unwrap();
        assert_eq!(runner.map(|r| r.state()), Some(RunnerState::Staged));
        assert_eq!(env.active_plugins, vec!["foo/foo.php"]);
        assert_eq!(env.theme.template, "wp-empty-theme");

        selector.destroy(&mut env);
        assert_eq!(env, original);
        assert!(!selector.is_active());
    }

    #[test]
    fn second_select_returns_active_runner() {
        let host = Host::new();
        let log = Log::default();
        let mut selector = selector(&host, &log);
        let mut env = host.environment();

        selector.select(&check("foo", &["runtime_seen"]), &mut env).unwrap();
        let staged = env.clone();

        let again = selector
            .select(&check("bar", &["file_type"]), &mut env)
            .unwrap()
            .unwrap();
        assert_eq!(again.context().unwrap().basename(), "foo/foo.php");
        assert_eq!(env, staged);
        selector.destroy(&mut env);
    }

    #[test]
    fn unrecognized_invocation_selects_nothing() {
        let host = Host::new();
        let log = Log::default();
        let mut selector = selector(&host, &log);
        let mut env = host.environment();

        assert!(selector.select(&Invocation::Other, &mut env).unwrap().is_none());
        assert!(!selector.is_active());
    }

    #[test]
    fn destroy_without_runner_is_noop() {
        let host = Host::new();
        let log = Log::default();
        let mut selector = selector(&host, &log);
        let mut env = host.environment();
        let original = env.clone();

        selector.destroy(&mut env);
        selector.destroy(&mut env);
        assert_eq!(env, original);
    }

    #[test]
    fn configuration_error_leaves_slot_empty() {
        let host = Host::new();
        let log = Log::default();
        let mut selector = selector(&host, &log);
        let mut env = host.environment();
        let original = env.clone();

        let err = selector
            .select(&check("foo", &["missing"]), &mut env)
            .err()
            .unwrap();
        assert!(matches!(err, PluginCheckError::UnknownCheck { .. }));
        assert!(!selector.is_active());
        assert_eq!(env, original);
    }

    #[test]
    fn request_with_bad_token_is_unauthorized() {
        let host = Host::new();
        let log = Log::default();
        let mut selector = selector(&host, &log);
        let mut env = host.environment();
        let original = env.clone();

        let mut params = serde_json::Map::new();
        params.insert("plugin".into(), "foo".into());
        params.insert("nonce".into(), "forged".into());
        let invocation = Invocation::Request(AjaxRequest::new(RUN_CHECKS_ACTION, params));

        let err = selector.select(&invocation, &mut env).err().unwrap();
        assert!(matches!(err, PluginCheckError::Unauthorized { .. }));
        assert_eq!(env, original);
    }
}
