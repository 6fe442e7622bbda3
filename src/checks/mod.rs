//! Checks and the registries they are selected from.
//!
//! A check is either a [`StaticCheck`], which only reads the plugin's files,
//! or a [`RuntimeCheck`], which runs against a staged host environment.
//! Checks register in a [`ChecksRegistry`] under a unique slug and belong to
//! one or more categories from the [`CategoryRegistry`].
//!
//! # Example
//!
//! ```
//! use std::collections::BTreeSet;
//! use plugin_check::checks::{CategoryId, ChecksRegistry};
//!
//! let registry = ChecksRegistry::with_builtins();
//! let repo: BTreeSet<_> = [CategoryId::new(CategoryId::PLUGIN_REPO)].into();
//! let selected = registry.resolve_default(false, &repo, false);
//! assert!(selected.iter().any(|c| c.slug() == "plugin_readme"));
//! ```

pub mod analyzer;
pub mod builtin;
pub mod category;
pub mod check;
pub mod context;
pub mod registry;

pub use analyzer::{
    AnalyzerCheck, AnalyzerDiagnostic, AnalyzerProvider, CommandAnalyzer, StaticAnalyzer,
};
pub use category::{matches_categories, CategoryId, CategoryRegistry};
pub use check::{Check, CheckInfo, RuntimeCheck, Stability, StaticCheck};
pub use context::CheckContext;
pub use registry::{CheckProvider, ChecksRegistry};
