//! Command-line interface for plugin-check.
//!
//! - [`args`] - Argument definitions using clap's derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    CheckArgs, Cli, Commands, CompletionsArgs, ListCategoriesArgs, ListChecksArgs, NonceArgs,
    OutputFormat, RequestArgs,
};
pub use commands::{Command, CommandDispatcher, CommandResult};
