//! Runner for the `check` command.

use std::rc::Rc;

use super::engine::{CheckRunner, InvocationSource, RunnerSettings};
use super::selector::Invocation;
use crate::checks::ChecksRegistry;
use crate::cli::args::{CheckArgs, Commands};

/// Target and selection taken from `check` command arguments.
#[derive(Debug, Clone)]
pub struct CliSource {
    args: CheckArgs,
}

impl CliSource {
    pub fn new(args: CheckArgs) -> Self {
        Self { args }
    }

    pub fn args(&self) -> &CheckArgs {
        &self.args
    }
}

impl InvocationSource for CliSource {
    fn kind(&self) -> &'static str {
        "cli"
    }

    fn target(&self) -> &str {
        &self.args.plugin
    }

    fn check_slugs(&self) -> &[String] {
        &self.args.checks
    }

    fn categories(&self) -> &[String] {
        &self.args.categories
    }

    fn include_experimental(&self) -> bool {
        self.args.include_experimental
    }
}

/// Runner serving the command line.
pub type CliRunner = CheckRunner<CliSource>;

impl CliRunner {
    /// A runner for `invocation` if it is a `check` command.
    pub fn recognize(
        invocation: &Invocation,
        settings: &RunnerSettings,
        registry: &Rc<ChecksRegistry>,
    ) -> Option<Self> {
        match invocation {
            Invocation::Command(Commands::Check(args)) => Some(CheckRunner::new(
                CliSource::new(args.clone()),
                settings.clone(),
                Rc::clone(registry),
            )),
            _ => None,
        }
    }
}
