//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands that
//! touch a host build it through [`HostSetup`].

pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod host;
pub mod list;
pub mod nonce;
pub mod request;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use host::HostSetup;
