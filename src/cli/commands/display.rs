//! Flattening and rendering of check results.
//!
//! Results are stored as `file → line → column` trees, one per severity.
//! Reports need a single list ordered by position, which is built here.

use serde::Serialize;

use crate::result::{CheckResult, ResultEntry, ResultTree, Severity};
use crate::ui::{PluginCheckTheme, Table};

/// One row of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub file: String,
    pub line: u32,
    pub column: u32,
    #[serde(rename = "type")]
    pub severity: Severity,
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
}

impl ReportRow {
    fn new(severity: Severity, file: &str, line: u32, column: u32, entry: &ResultEntry) -> Self {
        Self {
            file: file.to_string(),
            line,
            column,
            severity,
            code: entry.code.clone(),
            message: entry.message.clone(),
            check: entry.check.clone(),
            docs: entry.docs.clone(),
        }
    }
}

/// Which severities a report includes.
#[derive(Debug, Clone, Copy)]
pub struct ReportFilter {
    pub errors: bool,
    pub warnings: bool,
}

impl Default for ReportFilter {
    fn default() -> Self {
        Self {
            errors: true,
            warnings: true,
        }
    }
}

/// Flatten a result into rows sorted by file, line and column.
///
/// At the same position errors come before warnings and entries keep the
/// order they were reported in.
pub fn flatten(result: &CheckResult, filter: ReportFilter) -> Vec<ReportRow> {
    let mut rows = Vec::new();
    if filter.errors {
        push_rows(&mut rows, Severity::Error, result.errors());
    }
    if filter.warnings {
        push_rows(&mut rows, Severity::Warning, result.warnings());
    }
    rows.sort_by(|a, b| (&a.file, a.line, a.column).cmp(&(&b.file, b.line, b.column)));
    rows
}

fn push_rows(rows: &mut Vec<ReportRow>, severity: Severity, tree: &ResultTree) {
    for (file, lines) in tree {
        for (line, columns) in lines {
            for (column, entries) in columns {
                rows.extend(
                    entries
                        .iter()
                        .map(|entry| ReportRow::new(severity, file, *line, *column, entry)),
                );
            }
        }
    }
}

/// Label shown for rows not tied to a file.
const PLUGIN_LEVEL: &str = "(plugin)";

/// Render rows as one table per file.
pub fn render_tables(rows: &[ReportRow], theme: &PluginCheckTheme) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut start = 0;
    while start < rows.len() {
        let file = &rows[start].file;
        let end = rows[start..]
            .iter()
            .position(|row| &row.file != file)
            .map_or(rows.len(), |offset| start + offset);

        let mut table = Table::new(&["Line", "Column", "Type", "Code", "Message"]);
        for row in &rows[start..end] {
            let kind = match row.severity {
                Severity::Error => theme.error.apply_to("ERROR").to_string(),
                Severity::Warning => theme.warning.apply_to("WARNING").to_string(),
            };
            table.add_row([
                row.line.to_string(),
                row.column.to_string(),
                kind,
                row.code.clone(),
                row.message.clone(),
            ]);
        }

        let label = if file.is_empty() { PLUGIN_LEVEL } else { file.as_str() };
        blocks.push(format!(
            "{} {}\n{}",
            theme.dim.apply_to("FILE:"),
            theme.highlight.apply_to(label),
            table.render()
        ));
        start = end;
    }
    blocks
}
