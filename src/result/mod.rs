//! Result model shared by all checks and consumers.
//!
//! Every check of a run writes into one [`CheckResult`]; consumers read the
//! nested `file → line → column → entries` trees from
//! [`CheckResult::errors`] and [`CheckResult::warnings`].
//!
//! # Example
//!
//! ```
//! use plugin_check::checks::CheckContext;
//! use plugin_check::result::{CheckResult, Finding};
//!
//! let context = CheckContext::from_parts("/host/plugins/foo/foo.php", "/host/plugins");
//! let mut result = CheckResult::new(context);
//! result.add(Finding::error("X", "first").in_file("a.php").at(3, 1));
//! result.add(Finding::error("Y", "second").in_file("a.php").at(3, 1));
//!
//! let codes: Vec<_> = result.errors()["a.php"][&3][&1]
//!     .iter()
//!     .map(|e| e.code.as_str())
//!     .collect();
//! assert_eq!(codes, vec!["X", "Y"]);
//! ```

pub mod check_result;
pub mod entry;

pub use check_result::{CheckFailure, CheckResult, ResultTree, CHECK_FAILED_CODE};
pub use entry::{EntryOrigin, Finding, ResultEntry, Severity};
