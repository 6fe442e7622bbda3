//! The aggregated, positioned result of one check run.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Serialize;

use super::entry::{EntryOrigin, Finding, ResultEntry, Severity};
use crate::checks::CheckContext;

/// `file → line → column → entries`.
pub type ResultTree = BTreeMap<String, BTreeMap<u32, BTreeMap<u32, Vec<ResultEntry>>>>;

/// Code used for entries recorded when a check itself failed.
pub const CHECK_FAILED_CODE: &str = "check_execution_failed";

/// A check that broke while running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckFailure {
    pub check: String,
    pub message: String,
}

/// Findings collected for one plugin.
///
/// Error and warning counts always match the number of leaf entries in the
/// respective tree.
#[derive(Debug, Clone)]
pub struct CheckResult {
    context: CheckContext,
    errors: ResultTree,
    warnings: ResultTree,
    error_count: usize,
    warning_count: usize,
    failures: Vec<CheckFailure>,
    current_check: Option<String>,
}

impl CheckResult {
    /// Create an empty result for the given plugin.
    pub fn new(context: CheckContext) -> Self {
        Self {
            context,
            errors: ResultTree::new(),
            warnings: ResultTree::new(),
            error_count: 0,
            warning_count: 0,
            failures: Vec::new(),
            current_check: None,
        }
    }

    /// The plugin this result belongs to.
    pub fn context(&self) -> &CheckContext {
        &self.context
    }

    /// Record a finding.
    ///
    /// Absolute file paths inside the plugin are stored relative to the
    /// plugin root.
    pub fn add(&mut self, finding: Finding) {
        let file = finding
            .file
            .as_deref()
            .map(|f| self.file_key(f))
            .unwrap_or_default();
        let entry = ResultEntry {
            code: finding.code,
            message: finding.message,
            check: self.current_check.clone(),
            docs: finding.docs,
            origin: EntryOrigin::Finding,
        };
        self.insert(finding.severity, file, finding.line, finding.column, entry);
    }

    /// Shorthand for an unpositioned-or-positioned error.
    pub fn add_error(
        &mut self,
        code: &str,
        message: &str,
        file: Option<&Path>,
        line: u32,
        column: u32,
    ) {
        let mut finding = Finding::error(code, message).at(line, column);
        if let Some(file) = file {
            finding = finding.in_file(file);
        }
        self.add(finding);
    }

    /// Shorthand for an unpositioned-or-positioned warning.
    pub fn add_warning(
        &mut self,
        code: &str,
        message: &str,
        file: Option<&Path>,
        line: u32,
        column: u32,
    ) {
        let mut finding = Finding::warning(code, message).at(line, column);
        if let Some(file) = file {
            finding = finding.in_file(file);
        }
        self.add(finding);
    }

    /// Record that a check failed while running.
    ///
    /// The failure is listed in [`failures`](Self::failures) and also
    /// appears as a harness-tagged error so it travels with the findings.
    pub fn record_failure(&mut self, check: &str, message: impl Into<String>) {
        let message = message.into();
        let entry = ResultEntry {
            code: CHECK_FAILED_CODE.to_string(),
            message: format!("Check '{}' failed: {}", check, message),
            check: Some(check.to_string()),
            docs: None,
            origin: EntryOrigin::Harness,
        };
        self.insert(Severity::Error, String::new(), 0, 0, entry);
        self.failures.push(CheckFailure {
            check: check.to_string(),
            message,
        });
    }

    /// Merge another result for the same plugin into this one.
    ///
    /// Buckets present in both are concatenated, `self` first.
    pub fn merge(&mut self, other: CheckResult) {
        for (severity, tree) in [
            (Severity::Error, other.errors),
            (Severity::Warning, other.warnings),
        ] {
            for (file, lines) in tree {
                for (line, columns) in lines {
                    for (column, entries) in columns {
                        for entry in entries {
                            self.insert(severity, file.clone(), line, column, entry);
                        }
                    }
                }
            }
        }
        self.failures.extend(other.failures);
    }

    /// Errors as `file → line → column → entries`.
    pub fn errors(&self) -> &ResultTree {
        &self.errors
    }

    /// Warnings as `file → line → column → entries`.
    pub fn warnings(&self) -> &ResultTree {
        &self.warnings
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    /// Checks that broke while running.
    pub fn failures(&self) -> &[CheckFailure] {
        &self.failures
    }

    /// Whether nothing at all was recorded.
    pub fn is_empty(&self) -> bool {
        self.error_count == 0 && self.warning_count == 0
    }

    /// Attribute subsequent entries to `check`. Used by the runner.
    pub(crate) fn set_current_check(&mut self, check: Option<&str>) {
        self.current_check = check.map(str::to_string);
    }

    fn file_key(&self, file: &Path) -> String {
        self.context.relative_path(file)
    }

    fn insert(&mut self, severity: Severity, file: String, line: u32, column: u32, entry: ResultEntry) {
        let tree = match severity {
            Severity::Error => {
                self.error_count += 1;
                &mut self.errors
            }
            Severity::Warning => {
                self.warning_count += 1;
                &mut self.warnings
            }
        };
        tree.entry(file)
            .or_default()
            .entry(line)
            .or_default()
            .entry(column)
            .or_default()
            .push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckContext;
    use std::path::PathBuf;

    fn context() -> CheckContext {
        CheckContext::from_parts(
            PathBuf::from("/host/plugins/foo/foo.php"),
            PathBuf::from("/host/plugins"),
        )
    }

    fn leaf_count(tree: &ResultTree) -> usize {
        tree.values()
            .flat_map(|lines| lines.values())
            .flat_map(|cols| cols.values())
            .map(Vec::len)
            .sum()
    }

    #[test]
    fn new_result_is_empty() {
        let result = CheckResult::new(context());
        assert!(result.is_empty());
        assert_eq!(result.error_count(), 0);
        assert_eq!(result.warning_count(), 0);
        assert_eq!(result.context().basename(), "foo/foo.php");
    }

    #[test]
    fn insertion_order_is_preserved_within_bucket() {
        let mut result = CheckResult::new(context());
        result.add(Finding::error("X", "first").in_file("a.php").at(3, 1));
        result.add(Finding::error("Y", "second").in_file("a.php").at(3, 1));

        let bucket = &result.errors()["a.php"][&3][&1];
        let codes: Vec<_> = bucket.iter().map(|e| e.code.as_str()).collect();
        assert_eq!(codes, vec!["X", "Y"]);
        assert_eq!(result.error_count(), 2);
    }

    #[test]
    fn absolute_paths_are_made_relative() {
        let mut result = CheckResult::new(context());
        result.add(Finding::warning("W", "w").in_file("/host/plugins/foo/inc/a.php").at(1, 2));
        assert!(result.warnings().contains_key("inc/a.php"));
    }

    #[test]
    fn unpositioned_findings_default_to_zero() {
        let mut result = CheckResult::new(context());
        result.add_warning("W", "no position", None, 0, 0);
        assert_eq!(result.warnings()[""][&0][&0].len(), 1);
    }

    #[test]
    fn errors_and_warnings_are_disjoint() {
        let mut result = CheckResult::new(context());
        result.add_error("E", "e", Some(Path::new("a.php")), 1, 1);
        result.add_warning("W", "w", Some(Path::new("a.php")), 1, 1);

        assert_eq!(result.errors()["a.php"][&1][&1][0].code, "E");
        assert_eq!(result.warnings()["a.php"][&1][&1][0].code, "W");
        assert_eq!(result.error_count(), 1);
        assert_eq!(result.warning_count(), 1);
    }

    #[test]
    fn merge_unites_trees_and_keeps_counts() {
        let mut left = CheckResult::new(context());
        left.add(Finding::error("X", "x").in_file("a.php").at(3, 1));
        left.add(Finding::warning("W1", "w").in_file("b.php").at(1, 1));

        let mut right = CheckResult::new(context());
        right.add(Finding::error("Y", "y").in_file("a.php").at(3, 1));
        right.add(Finding::error("Z", "z").in_file("c.php").at(9, 0));
        right.record_failure("broken", "boom");

        left.merge(right);

        let codes: Vec<_> = left.errors()["a.php"][&3][&1]
            .iter()
            .map(|e| e.code.as_str())
            .collect();
        assert_eq!(codes, vec!["X", "Y"]);
        assert_eq!(left.error_count(), leaf_count(left.errors()));
        assert_eq!(left.warning_count(), leaf_count(left.warnings()));
        assert_eq!(left.error_count(), 4);
        assert_eq!(left.failures().len(), 1);
    }

    #[test]
    fn entries_are_attributed_to_current_check() {
        let mut result = CheckResult::new(context());
        result.set_current_check(Some("file_type"));
        result.add(Finding::error("E", "e"));
        result.set_current_check(None);
        result.add(Finding::error("F", "f"));

        let bucket = &result.errors()[""][&0][&0];
        assert_eq!(bucket[0].check.as_deref(), Some("file_type"));
        assert_eq!(bucket[1].check, None);
    }

    #[test]
    fn record_failure_is_tagged_as_harness() {
        let mut result = CheckResult::new(context());
        result.record_failure("broken", "exploded");

        let entry = &result.errors()[""][&0][&0][0];
        assert_eq!(entry.code, CHECK_FAILED_CODE);
        assert_eq!(entry.origin, EntryOrigin::Harness);
        assert!(entry.message.contains("exploded"));
        assert_eq!(result.failures()[0].check, "broken");
        assert_eq!(result.error_count(), 1);
    }
}
