//! Configuration schema definitions.
//!
//! These structs map to the `plugin-check.yml` file format. Every field is
//! optional; a missing file is equivalent to an empty one.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::host::NewContent;
use crate::preparation::minimal_theme::DEFAULT_MINIMAL_THEME;
use crate::preparation::DemoContentPreparation;

/// Root configuration structure for plugin-check.yml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PluginCheckConfig {
    /// Directory plugins are installed in, relative to the host root
    pub plugins_dir: PathBuf,

    /// Extension of plugin main files
    pub main_file_extension: String,

    /// Theme activated while runtime checks run
    pub minimal_theme: ThemeConfig,

    /// Content seeded while runtime checks run
    pub demo_content: Vec<NewContent>,

    /// Request token settings
    pub request: RequestConfig,

    /// Selection used when a run names no checks
    pub defaults: DefaultsConfig,

    /// External static analyzer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzer: Option<AnalyzerConfig>,

    /// Checks backed by analyzer rulesets
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub analyzer_checks: Vec<AnalyzerCheckConfig>,
}

impl Default for PluginCheckConfig {
    fn default() -> Self {
        Self {
            plugins_dir: PathBuf::from("plugins"),
            main_file_extension: "php".to_string(),
            minimal_theme: ThemeConfig::default(),
            demo_content: DemoContentPreparation::default_fixtures(),
            request: RequestConfig::default(),
            defaults: DefaultsConfig::default(),
            analyzer: None,
            analyzer_checks: Vec::new(),
        }
    }
}

/// Minimal theme location
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub name: String,

    /// Theme root, relative to the host root
    pub root: PathBuf,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_MINIMAL_THEME.to_string(),
            root: PathBuf::from(".plugin-check/themes"),
        }
    }
}

/// Request token settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestConfig {
    /// Secret request tokens are derived from. Falls back to a value derived
    /// from the host root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

/// Default check selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    #[serde(skip_serializing_if = "is_false")]
    pub include_experimental: bool,
}

/// External analyzer command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Executable, e.g. `phpcs`
    pub command: String,

    /// Arguments placed before the generated ones
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,
}

/// A check that applies one analyzer ruleset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzerCheckConfig {
    pub slug: String,

    /// Ruleset passed as `--standard`
    pub ruleset: String,

    pub categories: Vec<String>,

    #[serde(default)]
    pub description: String,

    #[serde(default, skip_serializing_if = "is_false")]
    pub experimental: bool,
}

fn is_false(v: &bool) -> bool {
    !*v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let config: PluginCheckConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, PluginCheckConfig::default());
        assert_eq!(config.plugins_dir, PathBuf::from("plugins"));
        assert_eq!(config.minimal_theme.name, "wp-empty-theme");
        assert_eq!(config.demo_content.len(), 1);
    }

    #[test]
    fn parses_full_document() {
        let yaml = r#"
plugins_dir: wp-content/plugins
main_file_extension: php
minimal_theme:
  name: blank
  root: themes
demo_content:
  - title: Hello
    body: World
    status: draft
request:
  secret: s3cret
defaults:
  categories: [security]
  include_experimental: true
analyzer:
  command: phpcs
  args: ["-q"]
analyzer_checks:
  - slug: escaping
    ruleset: WordPress.Security
    categories: [security]
"#;
        let config: PluginCheckConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.plugins_dir, PathBuf::from("wp-content/plugins"));
        assert_eq!(config.minimal_theme.name, "blank");
        assert_eq!(config.minimal_theme.root, PathBuf::from("themes"));
        assert_eq!(config.demo_content[0].title, "Hello");
        assert_eq!(config.request.secret.as_deref(), Some("s3cret"));
        assert!(config.defaults.include_experimental);
        assert_eq!(config.analyzer.as_ref().unwrap().args, vec!["-q"]);
        assert_eq!(config.analyzer_checks[0].ruleset, "WordPress.Security");
        assert!(!config.analyzer_checks[0].experimental);
    }

    #[test]
    fn partial_theme_keeps_default_root() {
        let config: PluginCheckConfig =
            serde_yaml::from_str("minimal_theme:\n  name: other\n").unwrap();
        assert_eq!(config.minimal_theme.name, "other");
        assert_eq!(config.minimal_theme.root, PathBuf::from(".plugin-check/themes"));
    }
}
