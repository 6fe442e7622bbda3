//! Box-drawn tables for check reports and listings.

use console::measure_text_width;

/// A simple table for formatted output.
///
/// Column widths follow the widest cell as printed on screen, so styled
/// cells and non-ASCII text line up.
#[derive(Debug)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    column_widths: Vec<usize>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        let headers: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
        let column_widths = headers.iter().map(|h| measure_text_width(h)).collect();

        Self {
            headers,
            rows: Vec::new(),
            column_widths,
        }
    }

    /// Add a row. Cells past the header count are dropped.
    pub fn add_row<I, S>(&mut self, row: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut row: Vec<String> = row.into_iter().map(Into::into).collect();
        row.truncate(self.headers.len());

        for (i, cell) in row.iter().enumerate() {
            self.column_widths[i] = self.column_widths[i].max(measure_text_width(cell));
        }

        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Render the table as a string.
    pub fn render(&self) -> String {
        let mut lines = Vec::with_capacity(self.rows.len() + 4);
        lines.push(self.render_border('┌', '┬', '┐'));
        lines.push(self.render_row(&self.headers));
        lines.push(self.render_border('├', '┼', '┤'));
        lines.extend(self.rows.iter().map(|row| self.render_row(row)));
        lines.push(self.render_border('└', '┴', '┘'));
        lines.join("\n")
    }

    fn render_border(&self, left: char, mid: char, right: char) -> String {
        let segments: Vec<String> = self
            .column_widths
            .iter()
            .map(|width| "─".repeat(width + 2))
            .collect();
        format!("{}{}{}", left, segments.join(&mid.to_string()), right)
    }

    fn render_row(&self, row: &[String]) -> String {
        let mut s = String::from("│");

        for (i, width) in self.column_widths.iter().enumerate() {
            let cell = row.get(i).map(String::as_str).unwrap_or("");
            let pad = width - measure_text_width(cell);
            s.push(' ');
            s.push_str(cell);
            s.push_str(&" ".repeat(pad));
            s.push_str(" │");
        }

        s
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table_renders_headers() {
        let table = Table::new(&["Line", "Message"]);
        assert!(table.is_empty());

        let output = table.render();
        assert!(output.contains("Line"));
        assert!(output.contains("Message"));
        assert_eq!(output.lines().count(), 4);
    }

    #[test]
    fn rows_widen_columns() {
        let mut table = Table::new(&["Type", "Code"]);
        table.add_row(["ERROR", "no_plugin_readme"]);
        table.add_row(["WARNING", "x"]);

        assert_eq!(table.row_count(), 2);
        let output = table.render();
        let lines: Vec<_> = output.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[3], "│ ERROR   │ no_plugin_readme │");
        assert!(lines
            .iter()
            .all(|l| measure_text_width(l) == measure_text_width(lines[0])));
    }

    #[test]
    fn missing_cells_are_blank_and_extra_cells_dropped() {
        let mut table = Table::new(&["A", "B"]);
        table.add_row(["only"]);
        table.add_row(["a", "b", "c"]);

        let output = table.render();
        assert!(output.contains("│ only │   │"));
        assert!(!output.contains(" c "));
    }

    #[test]
    fn uses_box_drawing() {
        let output = Table::new(&["A", "B"]).render();
        for c in ['┌', '┬', '┐', '├', '┼', '┤', '└', '┴', '┘'] {
            assert!(output.contains(c), "missing {}", c);
        }
    }
}
