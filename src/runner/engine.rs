//! The check runner state machine.
//!
//! A runner moves through `Unconfigured → Configured → Staged → Executed →
//! TornDown`. Configuration resolves the plugin and the checks and is where
//! every configuration error surfaces; nothing is staged before it
//! succeeds.

use std::any::Any;
use std::collections::BTreeSet;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::rc::Rc;

use tracing::{debug, info, warn};

use crate::checks::{CategoryId, Check, CheckContext, ChecksRegistry, RuntimeCheck};
use crate::config::PluginCheckConfig;
use crate::error::{PluginCheckError, Result};
use crate::host::{Environment, NewContent, PluginDirectory};
use crate::preparation::{
    dedupe_shared, stage_all, CleanupStack, MinimalTheme, Preparation, StageGuard,
    UniversalRuntimePreparation,
};
use crate::result::CheckResult;

/// Where a run's target and selection come from.
pub trait InvocationSource {
    /// Short name for logs, e.g. `cli`.
    fn kind(&self) -> &'static str;

    /// Verify the invocation may run checks at all.
    fn authorize(&self) -> Result<()> {
        Ok(())
    }

    /// Plugin identifier as given by the caller.
    fn target(&self) -> &str;

    /// Explicitly requested check slugs; empty selects the defaults.
    fn check_slugs(&self) -> &[String];

    /// Requested categories; empty selects every category.
    fn categories(&self) -> &[String];

    fn include_experimental(&self) -> bool;
}

/// Lifecycle position of a runner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunnerState {
    Unconfigured,
    Configured,
    Staged,
    Executed,
    TornDown,
}

impl RunnerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunnerState::Unconfigured => "unconfigured",
            RunnerState::Configured => "configured",
            RunnerState::Staged => "staged",
            RunnerState::Executed => "executed",
            RunnerState::TornDown => "torn down",
        }
    }
}

impl std::fmt::Display for RunnerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Host-level settings every runner shares.
#[derive(Debug, Clone)]
pub struct RunnerSettings {
    pub plugins: PluginDirectory,
    pub theme: MinimalTheme,
    pub demo_content: Vec<NewContent>,
    /// Categories used when the invocation names none.
    pub default_categories: Vec<String>,
    pub include_experimental: bool,
}

impl RunnerSettings {
    /// Settings for the host at `host_root`.
    pub fn from_config(host_root: &Path, config: &PluginCheckConfig) -> Self {
        Self {
            plugins: PluginDirectory::new(
                host_root.join(&config.plugins_dir),
                config.main_file_extension.clone(),
            ),
            theme: MinimalTheme::new(
                config.minimal_theme.name.clone(),
                host_root.join(&config.minimal_theme.root),
            ),
            demo_content: config.demo_content.clone(),
            default_categories: config.defaults.categories.clone(),
            include_experimental: config.defaults.include_experimental,
        }
    }
}

/// Lifecycle shared by all runners.
pub trait Runner {
    /// Invocation kind this runner serves.
    fn kind(&self) -> &'static str;

    fn state(&self) -> RunnerState;

    /// The plugin under test, once configured.
    fn context(&self) -> Option<&CheckContext>;

    /// Slugs of the resolved checks, static checks first.
    fn planned_checks(&self) -> &[String];

    /// The result of the run, once executed.
    fn result(&self) -> Option<&CheckResult>;

    /// Authorize, resolve the plugin and resolve the checks.
    fn configure(&mut self, env: &Environment) -> Result<()>;

    /// Stage the environment runtime checks need before extensions load.
    fn prepare(&mut self, env: &mut Environment) -> Result<CleanupStack>;

    /// Stage check preparations, run every check and tear the staging down.
    fn run(&mut self, env: &mut Environment) -> Result<CheckResult>;

    /// Undo what [`prepare`](Self::prepare) staged.
    fn teardown(&mut self, env: &mut Environment, stack: CleanupStack);

    /// Configure if needed, then prepare, run and tear down in one go.
    fn execute(&mut self, env: &mut Environment) -> Result<CheckResult> {
        if self.state() == RunnerState::Unconfigured {
            self.configure(env)?;
        }
        let stack = self.prepare(env)?;
        let result = self.run(env);
        self.teardown(env, stack);
        result
    }
}

/// Runner driven by an [`InvocationSource`].
pub struct CheckRunner<S> {
    source: S,
    settings: RunnerSettings,
    registry: Rc<ChecksRegistry>,
    state: RunnerState,
    context: Option<CheckContext>,
    plan: Vec<String>,
    result: Option<CheckResult>,
}

impl<S: InvocationSource> CheckRunner<S> {
    pub fn new(source: S, settings: RunnerSettings, registry: Rc<ChecksRegistry>) -> Self {
        Self {
            source,
            settings,
            registry,
            state: RunnerState::Unconfigured,
            context: None,
            plan: Vec::new(),
            result: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    fn expect_state(&self, expected: RunnerState) -> Result<()> {
        if self.state == expected {
            Ok(())
        } else {
            Err(PluginCheckError::InvalidRunnerState {
                state: self.state.as_str(),
                expected: expected.as_str(),
            })
        }
    }

    fn has_runtime_checks(&self) -> bool {
        self.plan
            .iter()
            .filter_map(|slug| self.registry.get(slug))
            .any(Check::is_runtime)
    }
}

impl<S: InvocationSource> Runner for CheckRunner<S> {
    fn kind(&self) -> &'static str {
        self.source.kind()
    }

    fn state(&self) -> RunnerState {
        self.state
    }

    fn context(&self) -> Option<&CheckContext> {
        self.context.as_ref()
    }

    fn planned_checks(&self) -> &[String] {
        &self.plan
    }

    fn result(&self) -> Option<&CheckResult> {
        self.result.as_ref()
    }

    fn configure(&mut self, env: &Environment) -> Result<()> {
        self.expect_state(RunnerState::Unconfigured)?;
        self.source.authorize()?;

        let plugin = self.settings.plugins.resolve(self.source.target())?;
        let context = self.settings.plugins.context_for(&plugin);
        let active = env.is_plugin_active(context.basename());

        let slugs = self.source.check_slugs();
        let checks = if slugs.is_empty() {
            let requested = if self.source.categories().is_empty() {
                self.settings.default_categories.as_slice()
            } else {
                self.source.categories()
            };
            let categories: BTreeSet<CategoryId> = requested.iter().map(CategoryId::new).collect();
            let experimental =
                self.source.include_experimental() || self.settings.include_experimental;
            self.registry
                .resolve_default(active, &categories, experimental)
        } else {
            self.registry.resolve(slugs, active, context.basename())?
        };

        let (statics, runtimes): (Vec<&Check>, Vec<&Check>) =
            checks.into_iter().partition(|check| !check.is_runtime());
        let plan: Vec<String> = statics
            .iter()
            .chain(runtimes.iter())
            .map(|check| check.slug().to_string())
            .collect();

        info!(
            "Checking {} with {} check(s) ({} runtime)",
            context.basename(),
            plan.len(),
            runtimes.len()
        );
        self.plan = plan;
        self.context = Some(context);
        self.state = RunnerState::Configured;
        Ok(())
    }

    fn prepare(&mut self, env: &mut Environment) -> Result<CleanupStack> {
        self.expect_state(RunnerState::Configured)?;

        let stack = match &self.context {
            Some(context) if self.has_runtime_checks() => {
                let universal = UniversalRuntimePreparation::new(
                    context.basename(),
                    self.settings.theme.clone(),
                    self.settings.demo_content.clone(),
                );
                stage_all([&universal as &dyn Preparation], env)?
            }
            _ => CleanupStack::new(),
        };

        self.state = RunnerState::Staged;
        Ok(stack)
    }

    fn run(&mut self, env: &mut Environment) -> Result<CheckResult> {
        self.expect_state(RunnerState::Staged)?;
        self.state = RunnerState::Executed;

        let context = self
            .context
            .clone()
            .ok_or(PluginCheckError::InvalidRunnerState {
                state: "executed",
                expected: RunnerState::Configured.as_str(),
            })?;
        let registry = Rc::clone(&self.registry);
        let checks: Vec<&Check> = self
            .plan
            .iter()
            .filter_map(|slug| registry.get(slug))
            .collect();

        let mut guard = StageGuard::new(env);

        let runtime: Vec<&dyn RuntimeCheck> = checks
            .iter()
            .filter_map(|check| match check {
                Check::Runtime(check) => Some(&**check),
                Check::Static(_) => None,
            })
            .collect();
        for shared in dedupe_shared(runtime.iter().flat_map(|check| check.shared_preparations())) {
            debug!("Staging shared preparation {}", shared.key());
            let preparation = shared.build()?;
            guard.stage(preparation.as_ref())?;
        }
        for check in &runtime {
            if let Some(preparation) = check.preparation() {
                guard.stage(preparation.as_ref())?;
            }
        }

        let mut result = CheckResult::new(context);
        for check in &checks {
            run_check(check, &mut result, &guard);
        }
        guard.teardown();

        info!(
            "Finished with {} error(s) and {} warning(s)",
            result.error_count(),
            result.warning_count()
        );
        self.result = Some(result.clone());
        Ok(result)
    }

    fn teardown(&mut self, env: &mut Environment, mut stack: CleanupStack) {
        stack.unwind(env);
        self.state = RunnerState::TornDown;
    }
}

/// Run one check, recording a failure instead of propagating it.
fn run_check(check: &Check, result: &mut CheckResult, env: &Environment) {
    let slug = check.slug();
    debug!("Running {} check '{}'", check.kind(), slug);

    result.set_current_check(Some(slug));
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| match check {
        Check::Static(check) => check.run(result),
        Check::Runtime(check) => check.run(result, env),
    }));
    result.set_current_check(None);

    let message = match outcome {
        Ok(Ok(())) => return,
        Ok(Err(err)) => format!("{:#}", err),
        Err(payload) => panic_message(payload.as_ref()),
    };
    warn!("Check '{}' failed: {}", slug, message);
    result.record_failure(slug, message);
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", message)
    } else if let Some(message) = payload.downcast_ref::<String>() {
        format!("panicked: {}", message)
    } else {
        "panicked".to_string()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{Behavior, FixedSource, Host, Scripted};
    use super::*;
    use crate::preparation::testing::Log;
    use crate::preparation::DemoContentPreparation;
    use crate::result::EntryOrigin;

    fn registry(checks: Vec<Check>) -> Rc<ChecksRegistry> {
        let mut registry = ChecksRegistry::with_builtins();
        for check in checks {
            registry.register(check).unwrap();
        }
        Rc::new(registry)
    }

    fn runner(host: &Host, source: FixedSource, checks: Vec<Check>) -> CheckRunner<FixedSource> {
        CheckRunner::new(source, host.settings(), registry(checks))
    }

    fn warnings(result: &CheckResult) -> Vec<String> {
        result.warnings()["seen.php"][&1][&1]
            .iter()
            .map(|e| e.message.clone())
            .collect()
    }

    #[test]
    fn lifecycle_runs_in_order() {
        let host = Host::new();
        let mut env = host.environment();
        let mut runner = runner(&host, FixedSource::new("foo", &["plugin_readme"]), vec![]);

        assert_eq!(runner.state(), RunnerState::Unconfigured);
        runner.configure(&env).unwrap();
        assert_eq!(runner.state(), RunnerState::Configured);
        assert_eq!(runner.context().unwrap().basename(), "foo/foo.php");

        let stack = runner.prepare(&mut env).unwrap();
        assert!(stack.is_empty());
        let result = runner.run(&mut env).unwrap();
        assert!(result.is_empty());
        assert_eq!(runner.state(), RunnerState::Executed);

        runner.teardown(&mut env, stack);
        assert_eq!(runner.state(), RunnerState::TornDown);
        assert!(runner.result().is_some());
    }

    #[test]
    fn run_happens_at_most_once() {
        let host = Host::new();
        let mut env = host.environment();
        let mut runner = runner(&host, FixedSource::new("foo", &[]), vec![]);
        runner.execute(&mut env).unwrap();

        let err = runner.run(&mut env).unwrap_err();
        assert!(matches!(err, PluginCheckError::InvalidRunnerState { .. }));
    }

    #[test]
    fn prepare_requires_configuration() {
        let host = Host::new();
        let mut env = host.environment();
        let mut runner = runner(&host, FixedSource::new("foo", &[]), vec![]);
        let err = runner.prepare(&mut env).unwrap_err();
        assert!(matches!(
            err,
            PluginCheckError::InvalidRunnerState {
                state: "unconfigured",
                expected: "configured"
            }
        ));
    }

    #[test]
    fn configuration_errors_surface_before_staging() {
        let host = Host::new();
        let env = host.environment();

        let mut empty = runner(&host, FixedSource::new("", &[]), vec![]);
        assert!(matches!(
            empty.configure(&env),
            Err(PluginCheckError::EmptyTarget)
        ));

        let mut missing = runner(&host, FixedSource::new("nope", &[]), vec![]);
        assert!(matches!(
            missing.configure(&env),
            Err(PluginCheckError::PluginNotInstalled { .. })
        ));

        let mut unknown = runner(&host, FixedSource::new("foo", &["nope"]), vec![]);
        assert!(matches!(
            unknown.configure(&env),
            Err(PluginCheckError::UnknownCheck { .. })
        ));
        assert_eq!(unknown.state(), RunnerState::Unconfigured);
    }

    #[test]
    fn static_checks_run_before_runtime_checks() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![
            Check::Runtime(Box::new(Scripted::new("r1", Behavior::Report, &log))),
            Check::Static(Box::new(Scripted::new("s1", Behavior::Report, &log))),
            Check::Runtime(Box::new(Scripted::new("r2", Behavior::Report, &log))),
        ];
        let mut env = host.environment();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1", "s1", "r2"]), checks);

        runner.execute(&mut env).unwrap();
        assert_eq!(runner.planned_checks(), ["s1", "r1", "r2"]);
        assert_eq!(*log.borrow(), vec!["run:s1", "run:r1", "run:r2"]);
    }

    #[test]
    fn runtime_checks_see_staged_environment_and_host_is_restored() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![Check::Runtime(Box::new(Scripted::new(
            "r1",
            Behavior::Report,
            &log,
        )))];
        let mut env = host.environment();
        let original = env.clone();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1"]), checks);

        let result = runner.execute(&mut env).unwrap();
        assert_eq!(
            warnings(&result),
            vec!["plugins=foo/foo.php theme=wp-empty-theme content=1"]
        );
        assert_eq!(env, original);
    }

    #[test]
    fn failing_check_is_contained() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![
            Check::Static(Box::new(Scripted::new("c1", Behavior::Report, &log))),
            Check::Static(Box::new(Scripted::new("c2", Behavior::Fail, &log))),
            Check::Static(Box::new(Scripted::new("c3", Behavior::Panic, &log))),
            Check::Static(Box::new(Scripted::new("c4", Behavior::Report, &log))),
        ];
        let mut env = host.environment();
        let original = env.clone();
        let mut runner = runner(
            &host,
            FixedSource::new("foo", &["c1", "c2", "c3", "c4"]),
            checks,
        );

        let result = runner.execute(&mut env).unwrap();
        assert_eq!(warnings(&result), vec!["static", "static"]);
        assert_eq!(
            *log.borrow(),
            vec!["run:c1", "run:c2", "run:c3", "run:c4"]
        );

        let failed: Vec<_> = result.failures().iter().map(|f| f.check.as_str()).collect();
        assert_eq!(failed, vec!["c2", "c3"]);
        assert!(result.failures()[0].message.contains("boom"));
        assert!(result.failures()[1].message.contains("exploded"));

        let harness = &result.errors()[""][&0][&0];
        assert!(harness.iter().all(|e| e.origin == EntryOrigin::Harness));
        assert_eq!(env, original);
    }

    #[test]
    fn shared_preparations_are_staged_once() {
        let host = Host::new();
        let log = Log::default();
        let fixture = vec![NewContent {
            title: "shared".into(),
            ..Default::default()
        }];
        let checks = vec![
            Check::Runtime(Box::new(
                Scripted::new("r1", Behavior::Report, &log)
                    .sharing(DemoContentPreparation::shared(fixture.clone()).unwrap()),
            )),
            Check::Runtime(Box::new(
                Scripted::new("r2", Behavior::Report, &log)
                    .sharing(DemoContentPreparation::shared(fixture).unwrap()),
            )),
        ];
        let mut env = host.environment();
        let original = env.clone();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1", "r2"]), checks);

        let result = runner.execute(&mut env).unwrap();
        // One default demo post plus one shared fixture.
        assert!(warnings(&result).iter().all(|w| w.ends_with("content=2")));
        assert_eq!(env, original);
    }

    #[test]
    fn inactive_plugin_skips_runtime_checks_by_default() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![Check::Runtime(Box::new(Scripted::new(
            "r1",
            Behavior::Report,
            &log,
        )))];
        let mut env = Environment::default();
        let mut runner = runner(&host, FixedSource::new("foo", &[]), checks);

        runner.configure(&env).unwrap();
        assert!(!runner.planned_checks().contains(&"r1".to_string()));
        let stack = runner.prepare(&mut env).unwrap();
        assert!(stack.is_empty());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn explicit_runtime_check_against_inactive_plugin_fails() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![Check::Runtime(Box::new(Scripted::new(
            "r1",
            Behavior::Report,
            &log,
        )))];
        let env = Environment::default();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1"]), checks);

        assert!(matches!(
            runner.configure(&env),
            Err(PluginCheckError::RuntimeCheckInactivePlugin { .. })
        ));
    }

    #[test]
    fn preparation_failure_leaves_environment_untouched() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![Check::Runtime(Box::new(Scripted::new(
            "r1",
            Behavior::Report,
            &log,
        )))];
        let mut settings = host.settings();
        settings.demo_content = vec![NewContent::default()];
        let mut runner = CheckRunner::new(
            FixedSource::new("foo", &["r1"]),
            settings,
            registry(checks),
        );
        let mut env = host.environment();
        let original = env.clone();

        let err = runner.execute(&mut env).unwrap_err();
        assert!(matches!(err, PluginCheckError::Preparation { .. }));
        assert_eq!(env, original);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn default_categories_come_from_settings() {
        let host = Host::new();
        let mut settings = host.settings();
        settings.default_categories = vec!["security".into()];
        let mut runner = CheckRunner::new(
            FixedSource::new("foo", &[]),
            settings,
            registry(vec![]),
        );

        runner.configure(&host.environment()).unwrap();
        assert!(runner.planned_checks().is_empty());
    }

    #[test]
    fn repeated_slugs_run_once() {
        let host = Host::new();
        let log = Log::default();
        let checks = vec![Check::Runtime(Box::new(Scripted::new(
            "r1",
            Behavior::Report,
            &log,
        )))];
        let mut env = host.environment();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1", "r1"]), checks);

        let result = runner.execute(&mut env).unwrap();
        assert_eq!(runner.planned_checks(), ["r1"]);
        assert_eq!(*log.borrow(), vec!["run:r1"]);
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn check_preparation_stages_after_universal_and_shared() {
        let host = Host::new();
        let log = Log::default();
        let fixture = vec![NewContent {
            title: "shared".into(),
            ..Default::default()
        }];
        let checks = vec![Check::Runtime(Box::new(
            Scripted::new("r1", Behavior::Report, &log)
                .sharing(DemoContentPreparation::shared(fixture).unwrap())
                .owning("own"),
        ))];
        let mut env = host.environment();
        let original = env.clone();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1"]), checks);

        runner.execute(&mut env).unwrap();
        // Universal narrows plugins and adds one demo post; shared adds one more.
        assert_eq!(
            *log.borrow(),
            vec![
                "prepare:own plugins=foo/foo.php content=2",
                "run:r1",
                "cleanup:own content=2",
            ]
        );
        assert_eq!(env, original);
    }

    #[test]
    fn failing_check_preparation_rolls_back_and_runs_nothing() {
        let host = Host::new();
        let log = Log::default();
        let fixture = vec![NewContent {
            title: "shared".into(),
            ..Default::default()
        }];
        let checks = vec![
            Check::Runtime(Box::new(
                Scripted::new("r1", Behavior::Report, &log).owning("first"),
            )),
            Check::Runtime(Box::new(
                Scripted::new("r2", Behavior::Report, &log)
                    .sharing(DemoContentPreparation::shared(fixture).unwrap())
                    .owning_failing("second"),
            )),
        ];
        let mut env = host.environment();
        let original = env.clone();
        let mut runner = runner(&host, FixedSource::new("foo", &["r1", "r2"]), checks);

        let err = runner.execute(&mut env).unwrap_err();
        assert!(matches!(err, PluginCheckError::Preparation { .. }));
        assert_eq!(
            *log.borrow(),
            vec![
                "prepare:first plugins=foo/foo.php content=2",
                "cleanup:first content=2",
            ]
        );
        assert_eq!(runner.state(), RunnerState::TornDown);
        assert_eq!(env, original);
    }
}
