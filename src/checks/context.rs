//! Identity and location of the plugin under test.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{LazyLock, OnceLock};

use regex::Regex;

/// `Name: value` header lines, with optional comment decoration.
static HEADER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[\s/*#@]*([^:\r\n]+?):[ \t]*(.+?)\s*$").expect("HEADER_REGEX must compile")
});

/// Readme files consulted when the main file has no version header.
const README_FILES: &[&str] = &["readme.txt", "README.txt", "readme.md", "README.md"];

/// Identifies the plugin a run inspects.
///
/// Paths are fixed at construction; the minimum host version and the file
/// listing are computed on first use and cached.
#[derive(Debug, Clone)]
pub struct CheckContext {
    main_file: PathBuf,
    basename: String,
    root: PathBuf,
    single_file: bool,
    minimum_host_version: OnceLock<Option<String>>,
    files: OnceLock<Vec<PathBuf>>,
}

impl CheckContext {
    /// Build a context from the plugin main file and the directory plugins
    /// are installed in.
    pub fn from_parts(main_file: impl Into<PathBuf>, plugins_dir: impl AsRef<Path>) -> Self {
        let main_file = main_file.into();
        let plugins_dir = plugins_dir.as_ref();

        let relative = main_file
            .strip_prefix(plugins_dir)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| fallback_relative(&main_file));
        let single_file = relative.components().count() == 1;
        let basename = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");

        let root = if single_file {
            main_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default()
        } else {
            let top = relative.components().next().map(|c| c.as_os_str().to_owned());
            match top {
                Some(dir) => plugins_dir.join(dir),
                None => main_file.clone(),
            }
        };

        Self {
            main_file,
            basename,
            root,
            single_file,
            minimum_host_version: OnceLock::new(),
            files: OnceLock::new(),
        }
    }

    /// Absolute path of the plugin main file.
    pub fn main_file(&self) -> &Path {
        &self.main_file
    }

    /// The host's unique key for the plugin, e.g. `foo/foo.php`.
    pub fn basename(&self) -> &str {
        &self.basename
    }

    /// Directory slug, or the file stem for single-file plugins.
    pub fn slug(&self) -> &str {
        let first = self.basename.split('/').next().unwrap_or(&self.basename);
        if self.single_file {
            first.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(first)
        } else {
            first
        }
    }

    /// Plugin root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether the plugin is a single file directly in the plugins directory.
    pub fn is_single_file(&self) -> bool {
        self.single_file
    }

    /// Path of `file` relative to the plugin root, with `/` separators.
    ///
    /// Paths outside the plugin are returned unchanged.
    pub fn relative_path(&self, file: &Path) -> String {
        let relative = file.strip_prefix(&self.root).unwrap_or(file);
        relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Minimum supported host version.
    ///
    /// Read from the main file's `Requires at least:` header, falling back to
    /// the readme.
    pub fn minimum_host_version(&self) -> Option<&str> {
        self.minimum_host_version
            .get_or_init(|| self.read_minimum_host_version())
            .as_deref()
    }

    /// All files belonging to the plugin, sorted.
    pub fn files(&self) -> &[PathBuf] {
        self.files.get_or_init(|| {
            if self.single_file {
                return vec![self.main_file.clone()];
            }
            let mut files = Vec::new();
            collect_files(&self.root, &mut files);
            files.sort();
            files
        })
    }

    fn read_minimum_host_version(&self) -> Option<String> {
        if let Some(version) = fs::read_to_string(&self.main_file)
            .ok()
            .and_then(|content| read_header(&content, "Requires at least"))
        {
            return Some(version);
        }
        if self.single_file {
            return None;
        }
        README_FILES.iter().find_map(|name| {
            fs::read_to_string(self.root.join(name))
                .ok()
                .and_then(|content| read_header(&content, "Requires at least"))
        })
    }
}

/// Read a `Name: value` header from file content.
///
/// Leading comment decoration (`*`, `#`, `//`, `@`) is ignored.
pub fn read_header(content: &str, name: &str) -> Option<String> {
    HEADER_REGEX
        .captures_iter(content)
        .find(|caps| caps[1].eq_ignore_ascii_case(name))
        .map(|caps| caps[2].trim_end_matches("*/").trim().to_string())
        .filter(|value| !value.is_empty())
}

fn fallback_relative(main_file: &Path) -> PathBuf {
    let file_name = main_file.file_name().map(PathBuf::from).unwrap_or_default();
    match main_file.parent().and_then(Path::file_name) {
        Some(dir) => Path::new(dir).join(file_name),
        None => file_name,
    }
}

fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        match entry.file_type() {
            Ok(t) if t.is_dir() => collect_files(&path, out),
            Ok(t) if t.is_file() => out.push(path),
            _ => {}
        }
    }
}
