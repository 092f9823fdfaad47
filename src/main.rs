use anyhow::Context;
use clap::Parser;
use md_rules::{Config, OutputFormat, PACKAGE_SEARCH_DEPTH, Pipeline};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "md-rules",
    version,
    author,
    about = "Convert markdown documentation into snippet rule files",
    long_about = "Convert markdown documentation into snippet rule files for LLMs and IDEs.\n\n\
    Every fenced code block is extracted with its heading, preceding description, \
    source, and language. Documents are grouped by their nearest package.json.\n\n\
    USAGE EXAMPLES:\n  \
      # Convert a docs folder\n  \
      md-rules ./rules ./docs\n\n  \
      # Cursor rules applied to TypeScript files\n  \
      md-rules ./.cursor/rules ./packages --format mdc --apply-glob '**/*.ts'\n\n  \
      # Link snippets back to the repository\n  \
      md-rules ./rules ./docs --source-url https://github.com/org/repo/blob/main/docs"
)]
struct Cli {
    /// Destination directory for rule files
    #[arg(value_name = "DEST")]
    dest: PathBuf,

    /// Source directories or markdown files
    #[arg(value_name = "SOURCE", required = true)]
    sources: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "md")]
    format: CliFormat,

    /// Comma-separated directory names to skip
    /// [default: images,node_modules,dist,build,coverage,test,cjs,generator,lib,src]
    #[arg(long, value_delimiter = ',', value_name = "NAMES")]
    exclude: Option<Vec<String>>,

    /// Base URL for the SOURCE field (http or https)
    #[arg(long, value_name = "URL")]
    source_url: Option<String>,

    /// Set alwaysApply in mdc frontmatter (default: true)
    #[arg(long, value_name = "BOOL")]
    always_apply: Option<bool>,

    /// Set a glob in mdc frontmatter instead of alwaysApply
    #[arg(long, value_name = "GLOB")]
    apply_glob: Option<String>,

    /// Ancestor directories searched for package.json
    #[arg(long, default_value_t = PACKAGE_SEARCH_DEPTH)]
    package_depth: usize,

    /// Dry run (don't write files)
    #[arg(long)]
    dry_run: bool,

    /// Print run statistics as JSON instead of the summary box
    #[arg(long)]
    json: bool,

    /// Verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliFormat {
    Md,
    Mdc,
}

impl From<CliFormat> for OutputFormat {
    fn from(f: CliFormat) -> Self {
        match f {
            CliFormat::Md => Self::Markdown,
            CliFormat::Mdc => Self::Mdc,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose)?;

    let mut builder = Config::builder()
        .output_dir(cli.dest)
        .source_dirs(cli.sources)
        .format(cli.format.into())
        .package_search_depth(cli.package_depth)
        .dry_run(cli.dry_run);

    if let Some(exclude) = cli.exclude {
        builder = builder.exclude(exclude);
    }

    if let Some(url) = cli.source_url {
        builder = builder.source_url(url);
    }

    if let Some(enabled) = cli.always_apply {
        builder = builder.always_apply(enabled);
    }

    if let Some(pattern) = cli.apply_glob {
        builder = builder.apply_glob(pattern);
    }

    let config = builder.build().context("Failed to build configuration")?;

    let stats = Pipeline::new(config)
        .context("Failed to create pipeline")?
        .run()
        .context("Conversion failed")?;

    if cli.json {
        println!("{}", stats.to_json().context("Failed to encode statistics")?);
    } else {
        stats.print_summary();
    }

    stats
        .into_result()
        .context("Some files could not be converted")?;

    Ok(())
}

fn setup_tracing(verbosity: u8) -> anyhow::Result<()> {
    let filter = match verbosity {
        0 => EnvFilter::new("md_rules=info"),
        1 => EnvFilter::new("md_rules=debug"),
        _ => EnvFilter::new("md_rules=trace"),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_thread_ids(false))
        .init();

    Ok(())
}
