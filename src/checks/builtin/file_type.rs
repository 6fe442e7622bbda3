use std::collections::BTreeSet;
use std::path::Path;

use super::PLUGIN_REPO_DOCS;
use crate::checks::category::CategoryId;
use crate::checks::check::{CheckInfo, StaticCheck};
use crate::result::{CheckResult, Finding};

const VCS_DIRS: &[&str] = &[".git", ".svn", ".hg", ".bzr"];
const ARCHIVE_EXTENSIONS: &[&str] = &["zip", "gz", "tgz", "rar", "tar", "7z", "phar"];

/// Flags files that do not belong in a distributed plugin.
///
/// Reports version control directories, compressed archives and hidden
/// files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileTypeCheck;

impl CheckInfo for FileTypeCheck {
    fn slug(&self) -> &str {
        "file_type"
    }

    fn categories(&self) -> Vec<CategoryId> {
        vec![CategoryId::new(CategoryId::PLUGIN_REPO)]
    }

    fn description(&self) -> &str {
        "Detects version control directories, archives and hidden files."
    }

    fn documentation_url(&self) -> &str {
        PLUGIN_REPO_DOCS
    }
}

impl StaticCheck for FileTypeCheck {
    fn run(&self, result: &mut CheckResult) -> anyhow::Result<()> {
        let context = result.context().clone();
        let mut vcs_reported = BTreeSet::new();

        for file in context.files() {
            let relative = context.relative_path(file);
            let segments: Vec<&str> = relative.split('/').collect();

            if let Some(index) = segments.iter().position(|s| VCS_DIRS.contains(s)) {
                let dir = segments[..=index].join("/");
                if vcs_reported.insert(dir.clone()) {
                    result.add(
                        Finding::error(
                            "vcs_present",
                            format!("Version control directory is not permitted: {}", dir),
                        )
                        .in_file(dir)
                        .with_docs(PLUGIN_REPO_DOCS),
                    );
                }
                continue;
            }

            if is_archive(file) {
                result.add(
                    Finding::error(
                        "compressed_files",
                        "Compressed files are not permitted.",
                    )
                    .in_file(file)
                    .with_docs(PLUGIN_REPO_DOCS),
                );
            }

            if segments.iter().any(|s| s.starts_with('.')) {
                result.add(
                    Finding::error("hidden_files", "Hidden files are not permitted.")
                        .in_file(file)
                        .with_docs(PLUGIN_REPO_DOCS),
                );
            }
        }
        Ok(())
    }
}

fn is_archive(file: &Path) -> bool {
    file.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ARCHIVE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}
