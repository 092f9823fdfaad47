//! Package manifest lookup and grouping of source files by package.
//!
//! A markdown file belongs to the nearest `package.json` found in its own
//! directory or in one of a bounded number of ancestor directories. Files
//! are grouped by the manifest's location, never by its declared name.

use crate::file::SourceFile;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Default number of ancestor directories searched above a file's own directory.
pub const PACKAGE_SEARCH_DEPTH: usize = 3;

const MANIFEST_FILE_NAME: &str = "package.json";

/// The subset of `package.json` fields this crate reads.
#[derive(Debug, Deserialize)]
struct Manifest {
    name: Option<String>,
    description: Option<String>,
}

/// Identity of the package that owns a set of documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDescriptor {
    /// Scope including the leading `@`, e.g. `@acme`
    pub scope: Option<String>,

    /// Package name without scope, never empty
    pub name: String,

    /// Directory containing the manifest
    pub directory: PathBuf,

    /// Path of the manifest file itself
    pub manifest_path: PathBuf,

    /// `description` field of the manifest
    pub description: Option<String>,
}

impl PackageDescriptor {
    fn from_manifest(manifest_path: &Path, manifest: Manifest) -> Option<Self> {
        let (scope, name) = parse_package_name(manifest.name.as_deref()?)?;
        let description = manifest
            .description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(ToString::to_string);

        Some(Self {
            scope,
            name,
            directory: manifest_path.parent()?.to_path_buf(),
            manifest_path: manifest_path.to_path_buf(),
            description,
        })
    }

    /// Returns the scope without its leading `@`, as used for directory names.
    #[must_use]
    pub fn scope_dir_name(&self) -> Option<&str> {
        self.scope
            .as_deref()
            .map(|scope| scope.trim_start_matches('@'))
            .filter(|scope| !scope.is_empty())
    }
}

/// Splits a manifest name into an optional `@scope` and the base name.
///
/// Returns `None` when no usable base name remains.
#[must_use]
pub fn parse_package_name(full_name: &str) -> Option<(Option<String>, String)> {
    let full_name = full_name.trim();

    let (scope, name) = match full_name.split_once('/') {
        Some((scope, name)) if scope.starts_with('@') => (Some(scope.to_string()), name),
        _ => (None, full_name),
    };

    if name.is_empty() {
        return None;
    }

    Some((scope, name.to_string()))
}

/// Files that share one package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroup {
    /// The owning package
    pub package: PackageDescriptor,

    /// Member files in discovery order
    pub files: Vec<SourceFile>,
}

/// Result of partitioning files by package.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupedFiles {
    /// Groups in first-seen order
    pub package_groups: Vec<PackageGroup>,

    /// Files without a package, in input order
    pub standalone_files: Vec<SourceFile>,
}

/// Finds the package manifest that owns a file.
#[derive(Debug, Clone, Copy)]
pub struct PackageResolver {
    max_depth: usize,
}

impl Default for PackageResolver {
    fn default() -> Self {
        Self::new(PACKAGE_SEARCH_DEPTH)
    }
}

impl PackageResolver {
    /// Creates a resolver searching `max_depth` ancestors above a file's directory.
    #[must_use]
    pub const fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    /// Resolves the nearest package for `file_path`.
    ///
    /// Missing, unreadable, or malformed manifests and manifests without a
    /// name are skipped and the search continues upwards.
    #[must_use]
    pub fn resolve(&self, file_path: &Path) -> Option<PackageDescriptor> {
        let start = file_path.parent()?;

        start
            .ancestors()
            .take(self.max_depth.saturating_add(1))
            .find_map(|dir| {
                let manifest_path = dir.join(MANIFEST_FILE_NAME);
                let manifest = read_manifest(&manifest_path)?;
                let package = PackageDescriptor::from_manifest(&manifest_path, manifest);
                if package.is_none() {
                    debug!("Manifest without usable name: {}", manifest_path.display());
                }
                package
            })
    }

    /// Partitions files into package groups and standalone files.
    #[must_use]
    pub fn group_files(&self, files: Vec<SourceFile>) -> GroupedFiles {
        let mut grouped = GroupedFiles::default();
        let mut index_by_manifest: HashMap<PathBuf, usize> = HashMap::new();

        for file in files {
            let Some(package) = self.resolve(&file.absolute_path) else {
                grouped.standalone_files.push(file);
                continue;
            };

            match index_by_manifest.get(&package.manifest_path) {
                Some(&index) => grouped.package_groups[index].files.push(file),
                None => {
                    trace!(
                        "New package group '{}' at {}",
                        package.name,
                        package.directory.display()
                    );
                    index_by_manifest.insert(
                        package.manifest_path.clone(),
                        grouped.package_groups.len(),
                    );
                    grouped.package_groups.push(PackageGroup {
                        package,
                        files: vec![file],
                    });
                }
            }
        }

        grouped
    }
}

/// Reads and parses a manifest, returning `None` on any failure.
fn read_manifest(path: &Path) -> Option<Manifest> {
    let content = fs::read_to_string(path).ok()?;

    match serde_json::from_str::<Manifest>(&content) {
        Ok(manifest) => Some(manifest),
        Err(e) => {
            debug!("Ignoring malformed manifest {}: {}", path.display(), e);
            None
        }
    }
}
