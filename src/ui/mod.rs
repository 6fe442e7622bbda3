//! Terminal output for plugin-check.
//!
//! Commands talk to the user through the [`UserInterface`] trait:
//!
//! - [`TerminalUI`] writes styled lines to stdout
//! - [`MockUI`] captures everything for assertions in tests
//!
//! Report rendering lives in [`table`]; colors in [`theme`].

pub mod mock;
pub mod output;
pub mod table;
pub mod terminal;
pub mod theme;

pub use mock::MockUI;
pub use output::OutputMode;
pub use table::Table;
pub use terminal::TerminalUI;
pub use theme::{should_use_colors, PluginCheckTheme};

/// Abstraction over user-facing output.
pub trait UserInterface {
    /// Current verbosity.
    fn output_mode(&self) -> OutputMode;

    /// Change verbosity.
    fn set_output_mode(&mut self, mode: OutputMode);

    /// Plain status line.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Error line. Shown in every mode.
    fn error(&mut self, msg: &str);

    /// Section header, e.g. the plugin being checked.
    fn show_header(&mut self, title: &str);

    /// Write machine-readable output verbatim.
    ///
    /// Unlike [`message`](Self::message) this ignores the output mode, so
    /// `--quiet` never truncates a JSON document.
    fn emit(&mut self, text: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(ui: &mut dyn UserInterface) {
        ui.show_header("foo/foo.php");
        ui.message("2 checks");
        ui.warning("1 warning");
        ui.success("done");
    }

    #[test]
    fn trait_objects_capture_output() {
        let mut ui = MockUI::new();
        report(&mut ui);
        assert_eq!(ui.headers(), ["foo/foo.php"]);
        assert!(ui.has_message("2 checks"));
        assert!(ui.has_warning("1 warning"));
        assert!(ui.has_success("done"));
    }

    #[test]
    fn output_mode_can_change() {
        let mut ui = MockUI::new();
        ui.set_output_mode(OutputMode::Quiet);
        assert_eq!(ui.output_mode(), OutputMode::Quiet);
    }
}
