//! # md-rules
//!
//! Converts trees of markdown documentation into snippet "rule" files for
//! LLMs and IDEs.
//!
//! ## Features
//!
//! - Extracts every fenced code block with its heading, description, source, and language
//! - Groups documents by their nearest `package.json`
//! - Plain `.md` output or `.mdc` rules with `alwaysApply` / `glob` frontmatter
//! - Atomic file writes, fail-at-end batch error reporting
//!
//! ## Quick Start
//!
//! ```no_run
//! use md_rules::{Config, OutputFormat, Pipeline};
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = Config::builder()
//!     .output_dir("./rules")
//!     .source_dir("./docs")
//!     .format(OutputFormat::Mdc)
//!     .build()?;
//!
//! Pipeline::new(config)?.run()?.into_result()?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library follows a pipeline architecture:
//! 1. **Scanner**: Discovers markdown files, skipping excluded directories
//! 2. **Package resolver**: Groups files by their owning `package.json`
//! 3. **Tokenizer + snippet extraction**: Turns each document into snippets
//! 4. **Namer + formatter**: Decides where each rule file goes and renders it
//! 5. **Writer**: Persists rule files atomically

#![warn(
    missing_docs,
    rust_2018_idioms,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery
)]
#![allow(clippy::module_name_repetitions)]

mod config;
mod error;
mod file;
mod formatter;
mod output;
mod package;
mod pipeline;
mod scanner;
mod snippet;
mod token;
mod writer;

pub use config::{Config, ConfigBuilder, DEFAULT_EXCLUDES, OutputFormat, RuleApplication};
pub use error::{Error, Result};
pub use file::SourceFile;
pub use formatter::{RenderOptions, render};
pub use output::{OutputInfo, OutputNamer, PackageOutputInfo};
pub use package::{
    GroupedFiles, PACKAGE_SEARCH_DEPTH, PackageDescriptor, PackageGroup, PackageResolver,
    parse_package_name,
};
pub use pipeline::{ConversionStats, Pipeline};
pub use snippet::{Snippet, extract_snippets};
pub use token::{Token, tokenize};

/// Runs a complete conversion with the given configuration.
///
/// Every file is attempted; failures are reported together afterwards.
///
/// # Errors
///
/// Returns an error if:
/// - Configuration is invalid
/// - The destination directory cannot be created
/// - Any file failed to convert ([`Error::Multiple`])
///
/// # Examples
///
/// ```no_run
/// use md_rules::{Config, run};
///
/// # fn main() -> anyhow::Result<()> {
/// let config = Config::builder()
///     .output_dir("./rules")
///     .source_dir(".")
///     .build()?;
///
/// let stats = run(config)?;
/// println!("{} rule files written", stats.files_written);
/// # Ok(())
/// # }
/// ```
pub fn run(config: Config) -> Result<ConversionStats> {
    Pipeline::new(config)?.run()?.into_result()
}
