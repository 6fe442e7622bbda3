use std::fs;

use anyhow::Context as _;

use super::PLUGIN_REPO_DOCS;
use crate::checks::category::CategoryId;
use crate::checks::check::{CheckInfo, StaticCheck};
use crate::checks::context::read_header;
use crate::result::{CheckResult, Finding};

const README_NAMES: &[&str] = &["readme.txt", "readme.md"];

/// Requires a readme with a `Stable tag` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct PluginReadmeCheck;

impl CheckInfo for PluginReadmeCheck {
    fn slug(&self) -> &str {
        "plugin_readme"
    }

    fn categories(&self) -> Vec<CategoryId> {
        vec![CategoryId::new(CategoryId::PLUGIN_REPO)]
    }

    fn description(&self) -> &str {
        "Checks that the plugin ships a readme declaring its stable tag."
    }

    fn documentation_url(&self) -> &str {
        PLUGIN_REPO_DOCS
    }
}

impl StaticCheck for PluginReadmeCheck {
    fn run(&self, result: &mut CheckResult) -> anyhow::Result<()> {
        let context = result.context().clone();
        if context.is_single_file() {
            return Ok(());
        }

        let readme = context.files().iter().find(|file| {
            file.parent() == Some(context.root())
                && file
                    .file_name()
                    .and_then(|name| name.to_str())
                    .map(|name| README_NAMES.contains(&name.to_ascii_lowercase().as_str()))
                    .unwrap_or(false)
        });

        let Some(readme) = readme else {
            result.add(
                Finding::error("no_plugin_readme", "The plugin readme.txt does not exist.")
                    .with_docs(PLUGIN_REPO_DOCS),
            );
            return Ok(());
        };

        let content = fs::read_to_string(readme)
            .with_context(|| format!("Failed to read {}", readme.display()))?;
        if read_header(&content, "Stable tag").is_none() {
            result.add(
                Finding::error(
                    "no_stable_tag",
                    "The readme is missing the \"Stable tag\" header.",
                )
                .in_file(readme)
                .with_docs(PLUGIN_REPO_DOCS),
            );
        }
        Ok(())
    }
}
