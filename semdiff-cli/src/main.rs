//! semdiff CLI - structural diffs between code resources
//!
//! Compares files, directories, historical revisions and adapter-provided
//! resources by their functions, classes and imports instead of their lines.

use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod config;
mod output;

use commands::{diff, show};
use config::SemdiffConfig;
use output::{OutputConfig, OutputFormat};
use semdiff_core::{Registry, SemdiffError};

/// Structural diff for source code.
#[derive(Parser)]
#[command(name = "semdiff")]
#[command(author, version)]
#[command(about = "Structural diff between files, directories and revisions")]
#[command(propagate_version = true)]
#[command(after_help = "Locators:
  old.py:new.py              Two files
  src:other/src              Two directories
  git://src@HEAD~3:src       A directory three commits ago against today
  a.py:b.py/parse            Only the element named 'parse'
  json://before.json:app.py  A saved snapshot against a live file")]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all logging except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format (overrides config default)
    #[arg(long, global = true, value_enum)]
    format: Option<OutputFormat>,

    /// Minified JSON and borderless tables
    #[arg(long, global = true)]
    compact: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare two resources given as '<left>:<right>[/element]'
    #[command(visible_alias = "d")]
    Diff {
        /// Compound locator, e.g. 'old.py:new.py' or 'git://src@HEAD~1:src'
        locator: String,

        /// Compare only this element (overrides a '/element' suffix)
        #[arg(short, long)]
        element: Option<String>,
    },

    /// Print the structure a single locator resolves to
    Show {
        /// Resource locator, e.g. 'src', 'git://app.py@v1.2' or 'json://snap.json'
        locator: String,
    },
}

fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

/// One-line error report, prefixed with the error's kind when it has one.
fn describe_error(err: &anyhow::Error) -> String {
    match err.downcast_ref::<SemdiffError>() {
        Some(e) => format!("{}: {}", e.kind().label(), e),
        None => format!("Error: {:#}", err),
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = SemdiffConfig::load(Path::new("."));

    // CLI flag > config default > Table
    let format = cli.format.unwrap_or_else(|| {
        config
            .default_format()
            .and_then(|f| f.parse().ok())
            .unwrap_or(OutputFormat::Table)
    });

    let mut output = OutputConfig::auto_detect_with_color_override(format, config.use_color());
    if cli.compact {
        output = output.compact();
    }
    colored::control::set_override(output.use_colors());

    let registry = Arc::new(Registry::with_defaults());
    let options = config.resolve_options();

    match cli.command {
        Commands::Diff { locator, element } => {
            diff::run(&locator, element, registry, options, &output).await
        }
        Commands::Show { locator } => show::run(&locator, registry, options, &output).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{}", describe_error(&err));
            ExitCode::FAILURE
        }
    }
}
