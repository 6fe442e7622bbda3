//! Individual result entries and the findings checks report.

use std::path::PathBuf;

use serde::Serialize;

/// Classification of a finding. A message is an error XOR a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

/// Where an entry came from.
///
/// Consumers use this to tell "the check found a problem" apart from
/// "the check itself broke".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryOrigin {
    #[default]
    Finding,
    Harness,
}

/// A leaf of the result tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultEntry {
    pub code: String,
    pub message: String,
    /// Slug of the check that produced the entry.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(skip_serializing_if = "is_finding")]
    pub origin: EntryOrigin,
}

fn is_finding(origin: &EntryOrigin) -> bool {
    *origin == EntryOrigin::Finding
}

/// A positioned message reported by a check.
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub code: String,
    pub message: String,
    pub file: Option<PathBuf>,
    pub line: u32,
    pub column: u32,
    pub docs: Option<String>,
}

impl Finding {
    /// Create an unpositioned error.
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Create an unpositioned warning.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    fn new(severity: Severity, code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            code: code.into(),
            message: message.into(),
            file: None,
            line: 0,
            column: 0,
            docs: None,
        }
    }

    /// Attach the file the finding refers to.
    pub fn in_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Attach a line and column.
    pub fn at(mut self, line: u32, column: u32) -> Self {
        self.line = line;
        self.column = column;
        self
    }

    /// Attach a documentation link.
    pub fn with_docs(mut self, url: impl Into<String>) -> Self {
        self.docs = Some(url.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_defaults_to_unpositioned() {
        let finding = Finding::error("X", "broken");
        assert_eq!(finding.severity, Severity::Error);
        assert!(finding.file.is_none());
        assert_eq!(finding.line, 0);
        assert_eq!(finding.column, 0);
    }

    #[test]
    fn finding_builder_pattern() {
        let finding = Finding::warning("W", "careful")
            .in_file("foo.php")
            .at(12, 4)
            .with_docs("https://example.com/w");

        assert_eq!(finding.severity, Severity::Warning);
        assert_eq!(finding.file, Some(PathBuf::from("foo.php")));
        assert_eq!((finding.line, finding.column), (12, 4));
        assert_eq!(finding.docs.as_deref(), Some("https://example.com/w"));
    }

    #[test]
    fn harness_origin_is_serialized_findings_are_not() {
        let mut entry = ResultEntry {
            code: "X".into(),
            message: "m".into(),
            check: None,
            docs: None,
            origin: EntryOrigin::Finding,
        };
        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("origin").is_none());

        entry.origin = EntryOrigin::Harness;
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["origin"], "harness");
    }

    #[test]
    fn severity_display() {
        assert_eq!(Severity::Error.to_string(), "error");
        assert_eq!(Severity::Warning.to_string(), "warning");
    }
}
