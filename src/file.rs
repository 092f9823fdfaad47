use crate::error::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Base name that marks a package's main document.
pub(crate) const README_FILE_NAME: &str = "README.md";

static MARKDOWN_EXTENSIONS: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["md", "markdown"].into_iter().collect());

/// Repository housekeeping files that never carry usable documentation.
static IGNORED_FILE_NAMES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "CHANGELOG.md",
        "CONTRIBUTING.md",
        "CODE_OF_CONDUCT.md",
        "SECURITY.md",
        "LICENSE.md",
    ]
    .into_iter()
    .collect()
});

/// A markdown file discovered under one of the source roots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Absolute path to the file
    pub absolute_path: PathBuf,

    /// Path relative to the source root, `/`-separated
    pub relative_path: String,
}

impl SourceFile {
    /// Creates a new source file.
    #[must_use]
    pub fn new(absolute_path: PathBuf, relative_path: impl Into<String>) -> Self {
        Self {
            absolute_path,
            relative_path: relative_path.into(),
        }
    }

    /// Returns the file name, e.g. `guide.md`.
    #[must_use]
    pub fn file_name(&self) -> String {
        self.absolute_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Returns the file name without its markdown extension.
    #[must_use]
    pub fn base_name(&self) -> String {
        let name = self.file_name();
        if has_markdown_extension(&self.absolute_path) {
            self.absolute_path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or(name)
        } else {
            name
        }
    }

    /// Returns true for a file named exactly `README.md`.
    #[must_use]
    pub fn is_readme(&self) -> bool {
        self.file_name() == README_FILE_NAME
    }

    /// Reads the file as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.absolute_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                Error::invalid_utf8(&self.absolute_path)
            } else {
                Error::io(&self.absolute_path, e)
            }
        })
    }
}

/// Checks if a path has a `.md` or `.markdown` extension.
#[must_use]
pub(crate) fn has_markdown_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MARKDOWN_EXTENSIONS.contains(ext))
}

/// Checks if a file is on the housekeeping denylist (case-sensitive).
#[must_use]
pub(crate) fn is_ignored_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| IGNORED_FILE_NAMES.contains(name))
}
