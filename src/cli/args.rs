//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::runner::request::RUN_CHECKS_ACTION;

/// Plugin Check - inspect plugins against host coding and runtime conventions.
#[derive(Debug, Parser)]
#[command(name = "plugin-check")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default plugin-check.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Path to the host root (overrides current directory)
    #[arg(long, global = true, env = "PLUGIN_CHECK_HOST")]
    pub host: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Run checks against a plugin
    Check(CheckArgs),

    /// List available checks
    ListChecks(ListChecksArgs),

    /// List check categories
    ListCategories(ListCategoriesArgs),

    /// Handle an async request as the host would
    Request(RequestArgs),

    /// Print the request token for an action
    Nonce(NonceArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Output format for check results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// Arguments for the `check` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct CheckArgs {
    /// Plugin slug, basename or main file path
    pub plugin: String,

    /// Run only these checks (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub checks: Vec<String>,

    /// Run only checks in these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Leave errors out of the report
    #[arg(long)]
    pub ignore_errors: bool,

    /// Leave warnings out of the report
    #[arg(long)]
    pub ignore_warnings: bool,

    /// Include experimental checks
    #[arg(long)]
    pub include_experimental: bool,
}

/// Arguments for the `list-checks` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListChecksArgs {
    /// Only list checks in these categories (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub categories: Vec<String>,

    /// Include experimental checks
    #[arg(long)]
    pub include_experimental: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `list-categories` command.
#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListCategoriesArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `request` command.
#[derive(Debug, Clone, clap::Args)]
pub struct RequestArgs {
    /// Action name, e.g. plugin_check_run_checks
    pub action: String,

    /// Request parameters as a JSON object
    #[arg(long, default_value = "{}")]
    pub data: String,
}

/// Arguments for the `nonce` command.
#[derive(Debug, Clone, clap::Args)]
pub struct NonceArgs {
    /// Action the token is bound to
    #[arg(default_value = RUN_CHECKS_ACTION)]
    pub action: String,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, clap::Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}
