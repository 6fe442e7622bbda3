//! Check run orchestration.
//!
//! - [`engine`] - the runner lifecycle shared by every invocation kind
//! - [`cli`] - runner for the `check` command
//! - [`request`] - runner for async requests, with token verification
//! - [`selector`] - picks and holds the runner for one invocation
//! - [`bootstrap`] - the host request lifecycle the selector hooks into

pub mod bootstrap;
pub mod cli;
pub mod engine;
pub mod request;
pub mod selector;

pub use bootstrap::Bootstrap;
pub use cli::{CliRunner, CliSource};
pub use engine::{CheckRunner, InvocationSource, Runner, RunnerSettings, RunnerState};
pub use request::{
    AjaxRequest, NonceVerifier, RequestRunner, RequestSource, GET_CHECKS_ACTION,
    RUN_CHECKS_ACTION,
};
pub use selector::{Invocation, RunnerSelector};
