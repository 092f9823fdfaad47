//! Output path, tag, and source naming for generated rule files.

use crate::config::OutputFormat;
use crate::file::SourceFile;
use crate::package::PackageDescriptor;
use std::path::PathBuf;
use url::Url;

/// Where and under which tag one rule file is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputInfo {
    /// Full path of the rule file
    pub output_path: PathBuf,

    /// Directory containing the rule file
    pub output_dir: PathBuf,

    /// File name without extension
    pub output_file_name: String,

    /// Handle appended as `@tag`
    pub at_tag: String,

    /// Path or URL written into each `SOURCE:` line
    pub source: String,
}

/// Output directory of a package with several documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageOutputInfo {
    /// `<dest>/<scope>/<name>` or `<dest>/<name>`
    pub package_dir: PathBuf,

    /// Package name without scope
    pub package_name: String,

    /// Scope including `@`
    pub package_scope: Option<String>,
}

/// Derives output locations below a destination root.
#[derive(Debug, Clone)]
pub struct OutputNamer {
    output_dir: PathBuf,
    source_url: Option<Url>,
}

impl OutputNamer {
    /// Creates a namer writing below `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>, source_url: Option<Url>) -> Self {
        Self {
            output_dir: output_dir.into(),
            source_url,
        }
    }

    /// Output for a file written on its own.
    ///
    /// `package` is the file's owning package as found during grouping. A
    /// `README.md` owned by a package is named after the package and, for
    /// scoped packages, nested under the scope's directory.
    #[must_use]
    pub fn determine_output_info(
        &self,
        file: &SourceFile,
        package: Option<&PackageDescriptor>,
        format: OutputFormat,
    ) -> OutputInfo {
        let mut name = file.base_name();
        let mut output_dir = self.output_dir.clone();

        if let Some(package) = package.filter(|_| file.is_readme()) {
            if let Some(scope) = package.scope_dir_name() {
                output_dir = output_dir.join(scope);
            }
            name = package.name.clone();
        }

        self.build_info(output_dir, name, file, format)
    }

    /// Output directory for a package with more than one document.
    #[must_use]
    pub fn determine_package_output_info(&self, package: &PackageDescriptor) -> PackageOutputInfo {
        let mut package_dir = self.output_dir.clone();
        if let Some(scope) = package.scope_dir_name() {
            package_dir = package_dir.join(scope);
        }
        package_dir = package_dir.join(&package.name);

        PackageOutputInfo {
            package_dir,
            package_name: package.name.clone(),
            package_scope: package.scope.clone(),
        }
    }

    /// Output for one document inside a multi-file package directory.
    ///
    /// Every member keeps its own base name, `README.md` included.
    #[must_use]
    pub fn package_file_output_info(
        &self,
        package_info: &PackageOutputInfo,
        file: &SourceFile,
        format: OutputFormat,
    ) -> OutputInfo {
        self.build_info(package_info.package_dir.clone(), file.base_name(), file, format)
    }

    fn build_info(
        &self,
        output_dir: PathBuf,
        name: String,
        file: &SourceFile,
        format: OutputFormat,
    ) -> OutputInfo {
        OutputInfo {
            output_path: output_dir.join(format!("{name}.{}", format.extension())),
            output_dir,
            at_tag: name.clone(),
            output_file_name: name,
            source: self.resolve_source(file),
        }
    }

    /// Joins the relative path onto the source URL, if one is configured.
    fn resolve_source(&self, file: &SourceFile) -> String {
        match &self.source_url {
            Some(base) => base
                .join(&format!("./{}", file.relative_path))
                .map_or_else(|_| format!("{base}{}", file.relative_path), String::from),
            None => file.relative_path.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::PackageResolver;
    use assert_fs::prelude::*;
    use std::path::Path;

    fn write_source(temp: &assert_fs::TempDir, relative: &str) -> SourceFile {
        let child = temp.child(relative);
        child.write_str("# Doc").unwrap();
        SourceFile::new(child.path().to_path_buf(), relative)
    }

    fn namer(dest: &Path) -> OutputNamer {
        OutputNamer::new(dest, None)
    }

    fn owning_package(file: &SourceFile) -> Option<PackageDescriptor> {
        PackageResolver::default().resolve(&file.absolute_path)
    }

    #[test]
    fn test_standalone_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.child("out");
        let file = write_source(&temp, "docs/guide.md");

        let info = namer(dest.path()).determine_output_info(
            &file,
            owning_package(&file).as_ref(),
            OutputFormat::Markdown,
        );

        assert_eq!(info.output_path, dest.path().join("guide.md"));
        assert_eq!(info.output_dir, dest.path());
        assert_eq!(info.output_file_name, "guide");
        assert_eq!(info.at_tag, "guide");
        assert_eq!(info.source, "docs/guide.md");
    }

    #[test]
    fn test_mdc_extension() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.child("out");
        let file = write_source(&temp, "intro.markdown");

        let info = namer(dest.path()).determine_output_info(&file, None, OutputFormat::Mdc);

        assert_eq!(info.output_path, dest.path().join("intro.mdc"));
    }

    #[test]
    fn test_readme_named_after_scoped_package() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.child("out");
        temp.child("pkg/package.json")
            .write_str(r#"{"name": "@scope/name"}"#)
            .unwrap();
        let file = write_source(&temp, "pkg/README.md");

        let info = namer(dest.path()).determine_output_info(
            &file,
            owning_package(&file).as_ref(),
            OutputFormat::Markdown,
        );

        assert_eq!(info.output_path, dest.path().join("scope").join("name.md"));
        assert_eq!(info.output_dir, dest.path().join("scope"));
        assert_eq!(info.at_tag, "name");
    }

    #[test]
    fn test_readme_named_after_unscoped_package() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.child("out");
        temp.child("pkg/package.json").write_str(r#"{"name": "name"}"#).unwrap();
        let file = write_source(&temp, "pkg/README.md");

        let info = namer(dest.path()).determine_output_info(
            &file,
            owning_package(&file).as_ref(),
            OutputFormat::Markdown,
        );

        assert_eq!(info.output_path, dest.path().join("name.md"));
        assert_eq!(info.at_tag, "name");
    }

    #[test]
    fn test_readme_without_package_keeps_name() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.child("out");
        let file = write_source(&temp, "README.md");

        let info = namer(dest.path()).determine_output_info(
            &file,
            owning_package(&file).as_ref(),
            OutputFormat::Markdown,
        );

        assert_eq!(info.output_path, dest.path().join("README.md"));
        assert_eq!(info.at_tag, "README");
    }

    #[test]
    fn test_non_readme_in_package_keeps_name() {
        let temp = assert_fs::TempDir::new().unwrap();
        let dest = temp.child("out");
        temp.child("pkg/package.json").write_str(r#"{"name": "pkg"}"#).unwrap();
        let file = write_source(&temp, "pkg/usage.md");

        let info = namer(dest.path()).determine_output_info(
            &file,
            owning_package(&file).as_ref(),
            OutputFormat::Markdown,
        );

        assert_eq!(info.output_path, dest.path().join("usage.md"));
    }

    #[test]
    fn test_readme_uses_given_package_without_disk_lookup() {
        let package = PackageDescriptor {
            scope: Some("@acme".to_string()),
            name: "widgets".to_string(),
            directory: PathBuf::from("/repo/widgets"),
            manifest_path: PathBuf::from("/repo/widgets/package.json"),
            description: None,
        };
        let file = SourceFile::new(PathBuf::from("/repo/widgets/README.md"), "widgets/README.md");

        let namer = namer(Path::new("/out"));
        let info = namer.determine_output_info(&file, Some(&package), OutputFormat::Markdown);
        assert_eq!(info.output_path, PathBuf::from("/out/acme/widgets.md"));
        assert_eq!(info.at_tag, "widgets");

        let info = namer.determine_output_info(&file, None, OutputFormat::Markdown);
        assert_eq!(info.output_path, PathBuf::from("/out/README.md"));
    }

    #[test]
    fn test_package_output_dirs() {
        let dest = Path::new("/out");
        let scoped = PackageDescriptor {
            scope: Some("@acme".to_string()),
            name: "widgets".to_string(),
            directory: PathBuf::from("/repo/widgets"),
            manifest_path: PathBuf::from("/repo/widgets/package.json"),
            description: None,
        };
        let unscoped = PackageDescriptor {
            scope: None,
            ..scoped.clone()
        };

        let namer = namer(dest);
        let scoped_info = namer.determine_package_output_info(&scoped);
        assert_eq!(scoped_info.package_dir, PathBuf::from("/out/acme/widgets"));
        assert_eq!(scoped_info.package_name, "widgets");
        assert_eq!(scoped_info.package_scope.as_deref(), Some("@acme"));

        let unscoped_info = namer.determine_package_output_info(&unscoped);
        assert_eq!(unscoped_info.package_dir, PathBuf::from("/out/widgets"));
    }

    #[test]
    fn test_package_files_keep_base_names() {
        let dest = Path::new("/out");
        let package_info = PackageOutputInfo {
            package_dir: PathBuf::from("/out/pkg"),
            package_name: "pkg".to_string(),
            package_scope: None,
        };
        let readme = SourceFile::new(PathBuf::from("/repo/pkg/README.md"), "pkg/README.md");
        let guide = SourceFile::new(PathBuf::from("/repo/pkg/guide.md"), "pkg/guide.md");

        let namer = namer(dest);
        let readme_info = namer.package_file_output_info(&package_info, &readme, OutputFormat::Markdown);
        let guide_info = namer.package_file_output_info(&package_info, &guide, OutputFormat::Mdc);

        assert_eq!(readme_info.output_path, PathBuf::from("/out/pkg/README.md"));
        assert_eq!(readme_info.at_tag, "README");
        assert_eq!(guide_info.output_path, PathBuf::from("/out/pkg/guide.mdc"));
        assert_eq!(guide_info.at_tag, "guide");
    }

    #[test]
    fn test_source_url_joined_with_relative_path() {
        let base = Url::parse("https://github.com/org/repo/blob/main/").unwrap();
        let namer = OutputNamer::new("/out", Some(base));
        let file = SourceFile::new(PathBuf::from("/repo/docs/api/intro.md"), "docs/api/intro.md");

        let info = namer.determine_output_info(&file, None, OutputFormat::Markdown);

        assert_eq!(
            info.source,
            "https://github.com/org/repo/blob/main/docs/api/intro.md"
        );
    }
}
