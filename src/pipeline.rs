use crate::{
    config::Config,
    error::{Error, Result},
    file::SourceFile,
    formatter::{RenderOptions, render},
    output::{OutputInfo, OutputNamer},
    package::{PackageDescriptor, PackageGroup, PackageResolver},
    scanner::Scanner,
    snippet::extract_snippets,
    token::tokenize,
    writer::Writer,
};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, info, instrument, warn};

/// Statistics collected during a conversion run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionStats {
    /// Markdown files considered for conversion
    pub files_found: usize,

    /// Housekeeping files skipped by name
    pub ignored_files: usize,

    /// Number of package groups
    pub package_groups: usize,

    /// Files without a package
    pub standalone_files: usize,

    /// Files converted without error
    pub files_processed: usize,

    /// Rule files written (or that would be written in dry run mode)
    pub files_written: usize,

    /// Files without any renderable snippet
    pub files_empty: usize,

    /// Snippets across all written files
    pub total_snippets: usize,

    /// Files that failed to convert
    pub error_count: usize,

    /// The per-file failures
    #[serde(skip)]
    pub errors: Vec<Error>,

    /// Total execution time
    pub duration: Duration,

    /// Output directory path
    pub output_directory: String,
}

impl ConversionStats {
    /// Returns true if every file converted without error.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }

    /// Turns collected per-file failures into an error after the batch has run.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Multiple`] if any file failed.
    pub fn into_result(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::multiple(self.errors))
        }
    }

    /// Serializes the counters as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serialization`] if the stats cannot be encoded.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Prints a human-readable summary to stdout.
    pub fn print_summary(&self) {
        println!("\n╔═══════════════════════════════════════════════════════╗");
        println!("║            Conversion Summary                         ║");
        println!("╠═══════════════════════════════════════════════════════╣");
        println!(
            "║ Markdown Files:       {:>8}                        ║",
            self.files_found
        );
        println!(
            "║   - Ignored:          {:>8}                        ║",
            self.ignored_files
        );
        println!(
            "║   - In packages:      {:>8} groups                 ║",
            self.package_groups
        );
        println!(
            "║   - Standalone:       {:>8}                        ║",
            self.standalone_files
        );
        println!("║                                                       ║");
        println!(
            "║ Files Processed:      {:>8}                        ║",
            self.files_processed
        );
        println!(
            "║ Files Written:        {:>8}                        ║",
            self.files_written
        );
        println!(
            "║ Without Snippets:     {:>8}                        ║",
            self.files_empty
        );
        println!(
            "║ Snippets:             {:>8}                        ║",
            self.total_snippets
        );
        println!(
            "║ Errors:               {:>8}                        ║",
            self.error_count
        );
        println!("║ Output Directory:                                     ║");
        println!(
            "║   {}                                              ║",
            self.output_directory
        );
        println!(
            "║ Total Time:           {:>8.2}s                     ║",
            self.duration.as_secs_f64()
        );
        println!("╚═══════════════════════════════════════════════════════╝\n");
    }

    fn record(&mut self, file: &SourceFile, outcome: Result<FileOutcome>) {
        match outcome {
            Ok(FileOutcome::Written { snippets }) => {
                self.files_processed += 1;
                self.files_written += 1;
                self.total_snippets += snippets;
            }
            Ok(FileOutcome::Empty) => {
                self.files_processed += 1;
                self.files_empty += 1;
            }
            Err(e) => {
                warn!("Failed to convert {}: {}", file.absolute_path.display(), e);
                self.error_count += 1;
                self.errors.push(e);
            }
        }
    }
}

/// What happened to a single source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileOutcome {
    Written { snippets: usize },
    Empty,
}

/// Orchestrates discovery, grouping, extraction, rendering, and writing.
pub struct Pipeline {
    config: Config,
    scanner: Scanner,
    resolver: PackageResolver,
    namer: OutputNamer,
    writer: Writer,
}

impl Pipeline {
    /// Creates a new pipeline with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration validation fails.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;

        let resolver = PackageResolver::new(config.package_search_depth);
        let scanner = Scanner::new(&config);
        let namer = OutputNamer::new(&config.output_dir, config.source_url.clone());
        let writer = Writer::new(config.dry_run);

        Ok(Self {
            config,
            scanner,
            resolver,
            namer,
            writer,
        })
    }

    /// Converts every discovered markdown file and returns statistics.
    ///
    /// A file that fails is logged and counted; the remaining files are
    /// still converted. Use [`ConversionStats::into_result`] to turn
    /// failures into an error once the batch is done.
    ///
    /// # Errors
    ///
    /// Returns an error if the destination directory cannot be created or a
    /// source root cannot be resolved.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use md_rules::{Config, Pipeline};
    ///
    /// # fn main() -> anyhow::Result<()> {
    /// let config = Config::builder()
    ///     .output_dir("./rules")
    ///     .source_dir("./docs")
    ///     .build()?;
    ///
    /// let stats = Pipeline::new(config)?.run()?;
    /// stats.print_summary();
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self), fields(output_dir = %self.config.output_dir.display()))]
    pub fn run(mut self) -> Result<ConversionStats> {
        let start_time = Instant::now();

        info!("Starting conversion");
        if self.config.dry_run {
            warn!("Dry run mode enabled - skipping file writes");
        }

        self.writer.ensure_dir(&self.config.output_dir)?;

        // Rule files from earlier runs must not be read back as documents.
        // In dry run mode the directory may not exist, so there is nothing to skip.
        if let Ok(output_root) = fs::canonicalize(&self.config.output_dir) {
            self.scanner.skip_dir(output_root);
        }

        let (files, scan_stats) = self.scanner.scan()?;
        info!(
            "✓ Found {} markdown files ({} ignored)",
            files.len(),
            scan_stats.ignored_files
        );

        let grouped = self.resolver.group_files(files);
        info!(
            "✓ {} package groups, {} standalone files",
            grouped.package_groups.len(),
            grouped.standalone_files.len()
        );

        let mut stats = ConversionStats {
            files_found: scan_stats.markdown_files - scan_stats.ignored_files,
            ignored_files: scan_stats.ignored_files,
            package_groups: grouped.package_groups.len(),
            standalone_files: grouped.standalone_files.len(),
            output_directory: self.config.output_dir.display().to_string(),
            ..ConversionStats::default()
        };
        let mut written_paths = HashSet::new();

        for group in &grouped.package_groups {
            self.convert_group(group, &mut stats, &mut written_paths);
        }

        for file in &grouped.standalone_files {
            let output_info = self.namer.determine_output_info(file, None, self.config.format);
            let outcome = self.convert_file(file, &output_info, None, &mut written_paths);
            stats.record(file, outcome);
        }

        stats.duration = start_time.elapsed();

        if stats.is_success() {
            info!(
                "✓ Wrote {} rule files in {:.2}s",
                stats.files_written,
                stats.duration.as_secs_f64()
            );
        } else {
            warn!(
                "Conversion finished with {} failed files out of {}",
                stats.error_count, stats.files_found
            );
        }

        Ok(stats)
    }

    /// Converts the files of one package.
    ///
    /// A lone file goes through the single-file naming rules; several files
    /// share a dedicated package directory.
    fn convert_group(
        &self,
        group: &PackageGroup,
        stats: &mut ConversionStats,
        written_paths: &mut HashSet<PathBuf>,
    ) {
        let package = &group.package;
        let format = self.config.format;

        if group.files.len() > 1 {
            let package_info = self.namer.determine_package_output_info(package);
            debug!(
                "Package '{}' has {} files, writing to {}",
                package.name,
                group.files.len(),
                package_info.package_dir.display()
            );

            for file in &group.files {
                let output_info = self.namer.package_file_output_info(&package_info, file, format);
                let description = package_description(package, file);
                let outcome = self.convert_file(file, &output_info, description, written_paths);
                stats.record(file, outcome);
            }
        } else {
            for file in &group.files {
                let output_info = self.namer.determine_output_info(file, Some(package), format);
                let description = package_description(package, file);
                let outcome = self.convert_file(file, &output_info, description, written_paths);
                stats.record(file, outcome);
            }
        }
    }

    /// Reads, extracts, renders, and writes a single file.
    fn convert_file(
        &self,
        file: &SourceFile,
        output_info: &OutputInfo,
        description: Option<String>,
        written_paths: &mut HashSet<PathBuf>,
    ) -> Result<FileOutcome> {
        let markdown = file.read()?;
        let snippets = extract_snippets(&tokenize(&markdown), &output_info.source);

        let options = RenderOptions {
            rule_application: self.config.rule_application.clone(),
            description,
        };
        let content = render(&snippets, output_info, self.config.format, &options);

        if content.is_empty() {
            debug!("No snippets in {}, nothing to write", file.relative_path);
            return Ok(FileOutcome::Empty);
        }

        if !written_paths.insert(output_info.output_path.clone()) {
            warn!(
                "{} overwrites an output written earlier in this run: {}",
                file.relative_path,
                output_info.output_path.display()
            );
        }

        self.writer.write(&output_info.output_path, &content)?;

        Ok(FileOutcome::Written {
            snippets: snippets.len(),
        })
    }
}

/// The manifest description is used for a package's README output only.
fn package_description(package: &PackageDescriptor, file: &SourceFile) -> Option<String> {
    if file.is_readme() {
        package.description.clone()
    } else {
        None
    }
}
