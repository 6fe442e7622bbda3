//! Checks shipped with the binary.

mod file_type;
mod plugin_readme;

pub use file_type::FileTypeCheck;
pub use plugin_readme::PluginReadmeCheck;

/// Documentation for the plugin repository checks.
const PLUGIN_REPO_DOCS: &str =
    "https://developer.wordpress.org/plugins/wordpress-org/detailed-plugin-guidelines/";
