//! Static checks backed by an external code analyzer.
//!
//! The analyzer is treated as a black box: a ruleset and a file list go in,
//! positioned diagnostics come out. [`CommandAnalyzer`] drives a
//! `phpcs`-compatible command line tool and reads its JSON report.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;

use anyhow::{bail, Context as _};
use serde::Deserialize;
use tracing::debug;

use super::category::CategoryId;
use super::check::{Check, CheckInfo, Stability, StaticCheck};
use super::registry::CheckProvider;
use crate::config::{AnalyzerCheckConfig, AnalyzerConfig};
use crate::result::{CheckResult, Finding};

/// A positioned message reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalyzerDiagnostic {
    pub file: PathBuf,
    pub line: u32,
    pub column: u32,
    /// Sniff or rule that produced the message.
    pub source: String,
    pub message: String,
    pub is_error: bool,
}

/// Runs a ruleset over a set of files.
pub trait StaticAnalyzer {
    fn analyze(&self, ruleset: &str, files: &[PathBuf]) -> anyhow::Result<Vec<AnalyzerDiagnostic>>;
}

/// Analyzer invoked as an external command.
///
/// The command receives `--standard=<ruleset> --report=json` followed by the
/// files, after any configured arguments.
#[derive(Debug, Clone)]
pub struct CommandAnalyzer {
    command: String,
    args: Vec<String>,
}

impl CommandAnalyzer {
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.command.clone(), config.args.clone())
    }
}

impl StaticAnalyzer for CommandAnalyzer {
    fn analyze(&self, ruleset: &str, files: &[PathBuf]) -> anyhow::Result<Vec<AnalyzerDiagnostic>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        debug!(
            "Running {} with ruleset '{}' on {} file(s)",
            self.command,
            ruleset,
            files.len()
        );
        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(format!("--standard={}", ruleset))
            .arg("--report=json")
            .args(files)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("Failed to run analyzer '{}'", self.command))?;

        // Non-zero exit codes also signal "violations found"; only an
        // unreadable report is a failure.
        let stdout = String::from_utf8_lossy(&output.stdout);
        if stdout.trim().is_empty() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            bail!(
                "Analyzer '{}' produced no report: {}",
                self.command,
                stderr.trim()
            );
        }
        parse_report(&stdout)
    }
}

#[derive(Debug, Deserialize)]
struct Report {
    #[serde(default)]
    files: BTreeMap<String, ReportFile>,
}

#[derive(Debug, Deserialize)]
struct ReportFile {
    #[serde(default)]
    messages: Vec<ReportMessage>,
}

#[derive(Debug, Deserialize)]
struct ReportMessage {
    message: String,
    #[serde(default)]
    source: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    line: u32,
    #[serde(default)]
    column: u32,
}

/// Parse a JSON analyzer report.
pub fn parse_report(json: &str) -> anyhow::Result<Vec<AnalyzerDiagnostic>> {
    let report: Report = serde_json::from_str(json).context("Invalid analyzer report")?;
    Ok(report
        .files
        .into_iter()
        .flat_map(|(file, entry)| {
            let file = PathBuf::from(file);
            entry.messages.into_iter().map(move |m| AnalyzerDiagnostic {
                file: file.clone(),
                line: m.line,
                column: m.column,
                source: m.source,
                message: m.message,
                is_error: m.kind.eq_ignore_ascii_case("error"),
            })
        })
        .collect())
}

/// A static check that applies one analyzer ruleset.
pub struct AnalyzerCheck {
    slug: String,
    ruleset: String,
    categories: Vec<CategoryId>,
    description: String,
    stability: Stability,
    extension: String,
    analyzer: Arc<dyn StaticAnalyzer>,
}

impl AnalyzerCheck {
    pub fn new(
        config: &AnalyzerCheckConfig,
        extension: impl Into<String>,
        analyzer: Arc<dyn StaticAnalyzer>,
    ) -> Self {
        Self {
            slug: config.slug.clone(),
            ruleset: config.ruleset.clone(),
            categories: config.categories.iter().map(CategoryId::new).collect(),
            description: config.description.clone(),
            stability: if config.experimental {
                Stability::Experimental
            } else {
                Stability::Stable
            },
            extension: extension.into(),
            analyzer,
        }
    }

    fn has_extension(&self, file: &Path) -> bool {
        file.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(&self.extension))
            .unwrap_or(false)
    }
}

impl CheckInfo for AnalyzerCheck {
    fn slug(&self) -> &str {
        &self.slug
    }

    fn categories(&self) -> Vec<CategoryId> {
        self.categories.clone()
    }

    fn stability(&self) -> Stability {
        self.stability
    }

    fn description(&self) -> &str {
        &self.description
    }
}

impl StaticCheck for AnalyzerCheck {
    fn run(&self, result: &mut CheckResult) -> anyhow::Result<()> {
        let files: Vec<PathBuf> = result
            .context()
            .files()
            .iter()
            .filter(|file| self.has_extension(file))
            .cloned()
            .collect();

        for diagnostic in self.analyzer.analyze(&self.ruleset, &files)? {
            let finding = if diagnostic.is_error {
                Finding::error(diagnostic.source, diagnostic.message)
            } else {
                Finding::warning(diagnostic.source, diagnostic.message)
            };
            result.add(
                finding
                    .in_file(diagnostic.file)
                    .at(diagnostic.line, diagnostic.column),
            );
        }
        Ok(())
    }
}

/// Contributes the analyzer checks declared in configuration.
pub struct AnalyzerProvider {
    checks: Vec<AnalyzerCheckConfig>,
    extension: String,
    analyzer: Arc<dyn StaticAnalyzer>,
}

impl AnalyzerProvider {
    pub fn new(
        checks: Vec<AnalyzerCheckConfig>,
        extension: impl Into<String>,
        analyzer: Arc<dyn StaticAnalyzer>,
    ) -> Self {
        Self {
            checks,
            extension: extension.into(),
            analyzer,
        }
    }
}

impl CheckProvider for AnalyzerProvider {
    fn checks(&self) -> Vec<Check> {
        self.checks
            .iter()
            .map(|config| {
                Check::Static(Box::new(AnalyzerCheck::new(
                    config,
                    self.extension.clone(),
                    Arc::clone(&self.analyzer),
                )))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::CheckContext;
    use crate::checks::ChecksRegistry;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    const REPORT: &str = r#"{
        "totals": {"errors": 1, "warnings": 1, "fixable": 0},
        "files": {
            "/host/plugins/foo/foo.php": {
                "errors": 1,
                "warnings": 1,
                "messages": [
                    {"message": "Unescaped output", "source": "Security.Escape", "severity": 5, "fixable": false, "type": "ERROR", "line": 12, "column": 7},
                    {"message": "Slow query", "source": "Perf.Query", "severity": 5, "fixable": false, "type": "WARNING", "line": 30, "column": 1}
                ]
            }
        }
    }"#;

    #[test]
    fn parses_report() {
        let diagnostics = parse_report(REPORT).unwrap();
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].source, "Security.Escape");
        assert!(diagnostics[0].is_error);
        assert_eq!((diagnostics[0].line, diagnostics[0].column), (12, 7));
        assert!(!diagnostics[1].is_error);
    }

    #[test]
    fn rejects_invalid_report() {
        assert!(parse_report("not json").is_err());
    }

    struct Canned {
        seen: RefCell<Vec<(String, Vec<PathBuf>)>>,
    }

    impl StaticAnalyzer for Canned {
        fn analyze(
            &self,
            ruleset: &str,
            files: &[PathBuf],
        ) -> anyhow::Result<Vec<AnalyzerDiagnostic>> {
            self.seen
                .borrow_mut()
                .push((ruleset.to_string(), files.to_vec()));
            Ok(files
                .iter()
                .map(|file| AnalyzerDiagnostic {
                    file: file.clone(),
                    line: 2,
                    column: 3,
                    source: "Rule.Found".into(),
                    message: "found".into(),
                    is_error: false,
                })
                .collect())
        }
    }

    fn config(slug: &str) -> AnalyzerCheckConfig {
        AnalyzerCheckConfig {
            slug: slug.into(),
            ruleset: "Custom".into(),
            categories: vec!["security".into()],
            description: "Custom rules".into(),
            experimental: true,
        }
    }

    #[test]
    fn maps_diagnostics_into_result() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("foo");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("foo.php"), "<?php").unwrap();
        fs::write(root.join("style.css"), "body{}").unwrap();

        let analyzer = Arc::new(Canned {
            seen: RefCell::new(Vec::new()),
        });
        let check = AnalyzerCheck::new(&config("custom"), "php", analyzer.clone());
        assert!(check.is_experimental());

        let mut result = CheckResult::new(CheckContext::from_parts(root.join("foo.php"), temp.path()));
        check.run(&mut result).unwrap();

        assert_eq!(result.warning_count(), 1);
        assert_eq!(result.warnings()["foo.php"][&2][&3][0].code, "Rule.Found");
        let seen = analyzer.seen.borrow();
        assert_eq!(seen[0].0, "Custom");
        assert_eq!(seen[0].1, vec![root.join("foo.php")]);
    }

    #[test]
    fn provider_registers_configured_checks() {
        let analyzer: Arc<dyn StaticAnalyzer> = Arc::new(Canned {
            seen: RefCell::new(Vec::new()),
        });
        let provider = AnalyzerProvider::new(vec![config("a"), config("b")], "php", analyzer);

        let mut registry = ChecksRegistry::with_builtins();
        registry.extend(&provider).unwrap();
        assert!(registry.get("a").is_some());
        assert!(registry.get("b").is_some());
    }
}
