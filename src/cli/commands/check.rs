//! Check command implementation.
//!
//! The `plugin-check check` command runs checks against one plugin and
//! prints the findings as tables or JSON.

use crate::cli::args::{CheckArgs, Commands, OutputFormat};
use crate::error::{PluginCheckError, Result};
use crate::result::CheckResult;
use crate::runner::Invocation;
use crate::ui::{PluginCheckTheme, UserInterface};

use super::dispatcher::{Command, CommandResult};
use super::display::{flatten, render_tables, ReportFilter};
use super::host::HostSetup;

/// The check command implementation.
pub struct CheckCommand {
    setup: HostSetup,
    args: CheckArgs,
}

impl CheckCommand {
    pub fn new(setup: HostSetup, args: CheckArgs) -> Self {
        Self { setup, args }
    }

    pub fn args(&self) -> &CheckArgs {
        &self.args
    }

    /// Run the checks through the host lifecycle.
    ///
    /// While runtime preparations are staged the host state file holds the
    /// staged environment, so other processes serving the host see it. The
    /// file is rewritten with the restored environment afterwards; if that
    /// never happens, the next load recovers from the pre-stage snapshot.
    fn run(&self) -> Result<(CheckResult, Vec<String>)> {
        let store = self.setup.store();
        let mut env = store.load()?;
        let before = env.clone();
        let invocation = Invocation::Command(Commands::Check(self.args.clone()));

        let mut bootstrap = self.setup.bootstrap();
        let mut staged = false;
        let mut planned = Vec::new();
        let outcome = bootstrap.handle(&invocation, &mut env, |runner, env| {
            let runner = runner.ok_or_else(|| {
                PluginCheckError::Other(anyhow::anyhow!("No runner accepted the check command"))
            })?;
            planned = runner.planned_checks().to_vec();
            if *env != before {
                store.save_staged(env, &before)?;
                staged = true;
            }
            runner.run(env)
        });

        if staged {
            store.restore(&env)?;
        }
        outcome.map(|result| (result, planned))
    }

    fn filter(&self) -> ReportFilter {
        ReportFilter {
            errors: !self.args.ignore_errors,
            warnings: !self.args.ignore_warnings,
        }
    }
}

impl Command for CheckCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let (result, planned) = match self.run() {
            Ok(outcome) => outcome,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };

        let filter = self.filter();
        let rows = flatten(&result, filter);
        let has_errors = filter.errors && result.error_count() > 0;

        match self.args.format {
            OutputFormat::Json => {
                let json = serde_json::to_string_pretty(&rows).map_err(anyhow::Error::from)?;
                ui.emit(&json);
            }
            OutputFormat::Table => {
                let theme = PluginCheckTheme::new();
                ui.show_header(result.context().basename());
                if ui.output_mode().shows_details() {
                    ui.message(&format!("Ran: {}", planned.join(", ")));
                }

                if rows.is_empty() {
                    ui.success("Checks complete. No errors found.");
                } else {
                    for block in render_tables(&rows, &theme) {
                        ui.message(&block);
                        ui.message("");
                    }
                    let summary = format!(
                        "{} error(s), {} warning(s)",
                        if filter.errors { result.error_count() } else { 0 },
                        if filter.warnings { result.warning_count() } else { 0 },
                    );
                    if has_errors {
                        ui.error(&summary);
                    } else {
                        ui.warning(&summary);
                    }
                }
            }
        }

        if has_errors {
            Ok(CommandResult::failure(1))
        } else {
            Ok(CommandResult::success())
        }
    }
}
