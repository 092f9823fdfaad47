use crate::{
    config::Config,
    error::{Error, Result},
    file::{SourceFile, has_markdown_extension, is_ignored_file},
};
use ignore::{DirEntry, WalkBuilder};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

/// Statistics collected during scanning.
#[derive(Debug, Default, Clone)]
pub(crate) struct ScanStats {
    /// Markdown files found
    pub markdown_files: usize,

    /// Files dropped by the housekeeping denylist
    pub ignored_files: usize,

    /// Walk errors encountered
    pub errors: usize,
}

/// Discovers markdown files below the configured source roots.
pub(crate) struct Scanner {
    source_dirs: Vec<PathBuf>,
    exclude: HashSet<String>,
    skip_dirs: Vec<PathBuf>,
}

impl Scanner {
    /// Creates a new scanner from configuration.
    pub(crate) fn new(config: &Config) -> Self {
        Self {
            source_dirs: config.source_dirs.clone(),
            exclude: config.exclude.iter().cloned().collect(),
            skip_dirs: Vec::new(),
        }
    }

    /// Prunes a directory by path, e.g. the destination of generated rules.
    ///
    /// `dir` must be canonical, since walked paths are built from canonical roots.
    pub(crate) fn skip_dir(&mut self, dir: PathBuf) {
        debug!("Skipping directory during scan: {}", dir.display());
        self.skip_dirs.push(dir);
    }

    /// Walks every source root and returns the markdown files worth converting.
    ///
    /// Roots are visited in the given order and entries within a root are
    /// sorted by file name, so the result is deterministic.
    ///
    /// # Errors
    ///
    /// Returns an error if a source root cannot be resolved.
    pub(crate) fn scan(&self) -> Result<(Vec<SourceFile>, ScanStats)> {
        let mut files = Vec::new();
        let mut stats = ScanStats::default();

        for source_dir in &self.source_dirs {
            let root = fs::canonicalize(source_dir).map_err(|e| Error::io(source_dir, e))?;
            debug!("Scanning {}", root.display());
            self.scan_root(&root, &mut files, &mut stats);
        }

        debug!(
            "Scan complete: {} markdown, {} ignored, {} errors",
            stats.markdown_files, stats.ignored_files, stats.errors
        );

        if stats.errors > 0 {
            warn!(
                "Encountered {} errors during scanning (non-fatal)",
                stats.errors
            );
        }

        Ok((files, stats))
    }

    fn scan_root(&self, root: &Path, files: &mut Vec<SourceFile>, stats: &mut ScanStats) {
        let exclude = self.exclude.clone();
        let skip_dirs = self.skip_dirs.clone();

        let walker = WalkBuilder::new(root)
            .standard_filters(false)
            .follow_links(false)
            .sort_by_file_name(|a, b| a.cmp(b))
            .filter_entry(move |entry| {
                !is_excluded_dir(entry, &exclude) && !is_skipped_dir(entry, &skip_dirs)
            })
            .build();

        for result in walker {
            let entry = match result {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Walk error: {}", e);
                    stats.errors += 1;
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|ft| ft.is_file()) {
                continue;
            }

            let path = entry.path();
            if !has_markdown_extension(path) {
                continue;
            }

            stats.markdown_files += 1;

            if is_ignored_file(path) {
                trace!("Skipping housekeeping file: {}", path.display());
                stats.ignored_files += 1;
                continue;
            }

            files.push(SourceFile::new(path.to_path_buf(), relative_path(path, root)));
        }
    }
}

/// Prunes excluded directories by name; the walk root itself is never pruned.
fn is_excluded_dir(entry: &DirEntry, exclude: &HashSet<String>) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|ft| ft.is_dir())
        && entry
            .file_name()
            .to_str()
            .is_some_and(|name| exclude.contains(name))
}

fn is_skipped_dir(entry: &DirEntry, skip_dirs: &[PathBuf]) -> bool {
    entry.depth() > 0
        && entry.file_type().is_some_and(|ft| ft.is_dir())
        && skip_dirs.iter().any(|dir| entry.path() == dir)
}

/// Computes a `/`-separated path relative to the source root.
///
/// A root that is itself a file yields just the file name.
fn relative_path(path: &Path, root: &Path) -> String {
    let relative = pathdiff::diff_paths(path, root)
        .filter(|p| !p.as_os_str().is_empty())
        .or_else(|| path.file_name().map(PathBuf::from))
        .unwrap_or_else(|| path.to_path_buf());

    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}
