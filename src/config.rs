use crate::error::{Error, Result};
use crate::package::PACKAGE_SEARCH_DEPTH;
use globset::Glob;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

/// Directory names skipped during discovery unless overridden.
pub const DEFAULT_EXCLUDES: &[&str] = &[
    "images",
    "node_modules",
    "dist",
    "build",
    "coverage",
    "test",
    "cjs",
    "generator",
    "lib",
    "src",
];

/// Output format for generated rule files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Plain markdown snippets
    #[default]
    Markdown,
    /// Markdown snippets with rule frontmatter
    Mdc,
}

impl OutputFormat {
    /// Returns the file extension for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Markdown => "md",
            Self::Mdc => "mdc",
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "md" => Ok(Self::Markdown),
            "mdc" => Ok(Self::Mdc),
            other => Err(Error::config(format!(
                "Unknown format '{other}', expected 'md' or 'mdc'"
            ))),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

/// How an `.mdc` rule is applied by the consuming tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleApplication {
    /// `alwaysApply: <bool>` frontmatter
    AlwaysApply(bool),
    /// `glob: "<pattern>"` frontmatter
    Glob(String),
}

impl Default for RuleApplication {
    fn default() -> Self {
        Self::AlwaysApply(true)
    }
}

/// Configuration for a conversion run.
///
/// Use [`Config::builder()`] to construct a new configuration.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct Config {
    /// Destination directory for rule files
    pub output_dir: PathBuf,

    /// Source directories or files to convert
    pub source_dirs: Vec<PathBuf>,

    /// Output format
    pub format: OutputFormat,

    /// Directory names skipped during discovery
    pub exclude: Vec<String>,

    /// Base URL prepended to relative source paths, always ending in `/`
    pub source_url: Option<Url>,

    /// Frontmatter mode for `.mdc` output
    pub rule_application: RuleApplication,

    /// How many ancestor directories are searched for a `package.json`
    pub package_search_depth: usize,

    /// Dry run mode (no file writes)
    pub dry_run: bool,
}

impl Config {
    /// Creates a new configuration builder.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use md_rules::{Config, OutputFormat};
    ///
    /// let config = Config::builder()
    ///     .output_dir("./rules")
    ///     .source_dir("./docs")
    ///     .format(OutputFormat::Mdc)
    ///     .build()
    ///     .expect("valid configuration");
    /// ```
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - No source paths are given
    /// - A source path doesn't exist
    /// - The apply glob is empty or not a valid glob
    pub fn validate(&self) -> Result<()> {
        if self.source_dirs.is_empty() {
            return Err(Error::config("At least one source path is required"));
        }

        for source in &self.source_dirs {
            if !source.exists() {
                return Err(Error::config(format!(
                    "Source path does not exist: {}",
                    source.display()
                )));
            }
        }

        if let RuleApplication::Glob(pattern) = &self.rule_application {
            if pattern.trim().is_empty() {
                return Err(Error::invalid_pattern(pattern, "Glob pattern must not be empty"));
            }
            Glob::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e.to_string()))?;
        }

        if self.format == OutputFormat::Markdown
            && self.rule_application != RuleApplication::default()
        {
            tracing::warn!(
                "Rule application settings are only used with the mdc format. Current format: {}",
                self.format
            );
        }

        Ok(())
    }
}

/// Builder for creating a [`Config`].
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    output_dir: Option<PathBuf>,
    source_dirs: Vec<PathBuf>,
    format: Option<OutputFormat>,
    exclude: Option<Vec<String>>,
    source_url: Option<String>,
    always_apply: Option<bool>,
    apply_glob: Option<String>,
    package_search_depth: Option<usize>,
    dry_run: bool,
}

impl ConfigBuilder {
    /// Sets the destination directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Adds a source directory or file.
    #[must_use]
    pub fn source_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_dirs.push(path.into());
        self
    }

    /// Adds several source directories or files.
    #[must_use]
    pub fn source_dirs<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.source_dirs.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Sets the output format.
    #[must_use]
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }

    /// Replaces the excluded directory names.
    #[must_use]
    pub fn exclude(mut self, names: Vec<String>) -> Self {
        self.exclude = Some(names);
        self
    }

    /// Sets the base URL used for the `SOURCE:` field.
    ///
    /// Must be an absolute `http` or `https` URL.
    #[must_use]
    pub fn source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Sets `alwaysApply` for `.mdc` output.
    #[must_use]
    pub fn always_apply(mut self, enabled: bool) -> Self {
        self.always_apply = Some(enabled);
        self
    }

    /// Sets the `glob` pattern for `.mdc` output.
    ///
    /// Cannot be combined with [`ConfigBuilder::always_apply`].
    #[must_use]
    pub fn apply_glob(mut self, pattern: impl Into<String>) -> Self {
        self.apply_glob = Some(pattern.into());
        self
    }

    /// Sets how many ancestor directories are searched for a package manifest.
    #[must_use]
    pub fn package_search_depth(mut self, depth: usize) -> Self {
        self.package_search_depth = Some(depth);
        self
    }

    /// Enables dry run mode (no file writes).
    #[must_use]
    pub fn dry_run(mut self, enabled: bool) -> Self {
        self.dry_run = enabled;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The destination directory is missing
    /// - The source URL is not an absolute http(s) URL
    /// - Both a glob and an explicit always-apply flag are set
    /// - Validation fails
    pub fn build(self) -> Result<Config> {
        let output_dir = self
            .output_dir
            .ok_or_else(|| Error::config("Destination directory is required"))?;

        let rule_application = match (self.always_apply, self.apply_glob) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "always-apply and apply-glob are mutually exclusive",
                ));
            }
            (_, Some(pattern)) => RuleApplication::Glob(pattern),
            (Some(enabled), None) => RuleApplication::AlwaysApply(enabled),
            (None, None) => RuleApplication::default(),
        };

        let source_url = self.source_url.as_deref().map(parse_source_url).transpose()?;

        let config = Config {
            output_dir,
            source_dirs: self.source_dirs,
            format: self.format.unwrap_or_default(),
            exclude: self.exclude.unwrap_or_else(|| {
                DEFAULT_EXCLUDES.iter().map(ToString::to_string).collect()
            }),
            source_url,
            rule_application,
            package_search_depth: self.package_search_depth.unwrap_or(PACKAGE_SEARCH_DEPTH),
            dry_run: self.dry_run,
        };

        config.validate()?;
        Ok(config)
    }
}

/// Parses an absolute http(s) URL and normalizes it to end with `/`.
fn parse_source_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw)
        .map_err(|e| Error::config(format!("Invalid source URL '{raw}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(Error::config(format!(
            "Source URL must be an absolute http(s) URL: {raw}"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }

    Ok(url)
}
