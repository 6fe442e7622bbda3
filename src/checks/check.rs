//! Check definitions.
//!
//! - [`CheckInfo`] - metadata every check carries
//! - [`StaticCheck`] - inspects files without executing plugin code
//! - [`RuntimeCheck`] - inspects the plugin inside a staged environment
//! - [`Check`] - a registered check of either kind

use serde::Serialize;

use super::category::CategoryId;
use crate::host::Environment;
use crate::preparation::{Preparation, SharedPreparation};
use crate::result::CheckResult;

/// Maturity of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stability {
    #[default]
    Stable,
    /// Excluded from default runs.
    Experimental,
}

impl std::fmt::Display for Stability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stability::Stable => write!(f, "stable"),
            Stability::Experimental => write!(f, "experimental"),
        }
    }
}

/// Metadata shared by static and runtime checks.
pub trait CheckInfo {
    /// Stable identifier, e.g. `plugin_readme`.
    fn slug(&self) -> &str;

    /// Categories the check belongs to. Must not be empty.
    fn categories(&self) -> Vec<CategoryId>;

    fn stability(&self) -> Stability {
        Stability::Stable
    }

    /// One-line description of what the check looks for.
    fn description(&self) -> &str;

    /// Where the findings of this check are explained.
    fn documentation_url(&self) -> &str {
        ""
    }

    fn is_experimental(&self) -> bool {
        self.stability() == Stability::Experimental
    }
}

/// A check that only reads the plugin's files.
///
/// Findings go into the result; an `Err` means the check could not do its
/// work at all and is recorded as a failure of the check.
pub trait StaticCheck: CheckInfo {
    fn run(&self, result: &mut CheckResult) -> anyhow::Result<()>;
}

/// A check that runs against the staged host environment.
pub trait RuntimeCheck: CheckInfo {
    fn run(&self, result: &mut CheckResult, env: &Environment) -> anyhow::Result<()>;

    /// Environment changes this check alone needs.
    fn preparation(&self) -> Option<Box<dyn Preparation>> {
        None
    }

    /// Environment changes this check may share with other checks.
    fn shared_preparations(&self) -> Vec<SharedPreparation> {
        Vec::new()
    }
}

/// A registered check.
pub enum Check {
    Static(Box<dyn StaticCheck>),
    Runtime(Box<dyn RuntimeCheck>),
}

impl Check {
    /// Metadata of the wrapped check.
    pub fn info(&self) -> &dyn CheckInfo {
        match self {
            Check::Static(check) => &**check,
            Check::Runtime(check) => &**check,
        }
    }

    pub fn slug(&self) -> &str {
        self.info().slug()
    }

    pub fn is_runtime(&self) -> bool {
        matches!(self, Check::Runtime(_))
    }

    /// `"static"` or `"runtime"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Check::Static(_) => "static",
            Check::Runtime(_) => "runtime",
        }
    }
}

impl std::fmt::Debug for Check {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Check")
            .field("slug", &self.slug())
            .field("kind", &self.kind())
            .finish()
    }
}
