//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::ui::UserInterface;

use super::check::CheckCommand;
use super::completions::CompletionsCommand;
use super::host::HostSetup;
use super::list::{ListCategoriesCommand, ListChecksCommand};
use super::nonce::NonceCommand;
use super::request::RequestCommand;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    ///
    /// Configuration and integrity problems are reported through `ui` and
    /// turned into a failing [`CommandResult`]; only unexpected errors are
    /// returned as `Err`.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    host_root: PathBuf,
    config_override: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a dispatcher for the host rooted at `host_root`.
    pub fn new(host_root: PathBuf, config_override: Option<PathBuf>) -> Self {
        Self {
            host_root,
            config_override,
        }
    }

    pub fn host_root(&self) -> &Path {
        &self.host_root
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Check(args) => {
                self.with_host(ui, |setup| CheckCommand::new(setup, args.clone()))
            }
            Commands::ListChecks(args) => {
                self.with_host(ui, |setup| ListChecksCommand::new(setup, args.clone()))
            }
            Commands::ListCategories(args) => {
                self.with_host(ui, |setup| ListCategoriesCommand::new(setup, args.clone()))
            }
            Commands::Request(args) => {
                self.with_host(ui, |setup| RequestCommand::new(setup, args.clone()))
            }
            Commands::Nonce(args) => {
                self.with_host(ui, |setup| NonceCommand::new(setup, args.clone()))
            }
            Commands::Completions(args) => CompletionsCommand::new(args.clone()).execute(ui),
        }
    }

    /// Load the host, then build and run a command against it.
    ///
    /// A host that cannot be loaded fails the command with exit code 1.
    fn with_host<C, F>(&self, ui: &mut dyn UserInterface, build: F) -> Result<CommandResult>
    where
        C: Command,
        F: FnOnce(HostSetup) -> C,
    {
        let setup = match HostSetup::load(&self.host_root, self.config_override.as_deref()) {
            Ok(setup) => setup,
            Err(e) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(1));
            }
        };
        build(setup).execute(ui)
    }
}
