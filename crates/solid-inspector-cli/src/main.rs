//! solid-inspector: check polygon models for solid validity from the command line.
//!
//! Reports stray edges, open borders, internal and external faces, reversed
//! faces and the other defects that stop a model from being a solid, and
//! writes a fixed copy on request. Suitable for scripting and CI pipelines:
//! the exit code is 1 whenever defects remain.
//!
//! # Logging
//!
//! Set the `RUST_LOG` environment variable to control log output:
//! - `RUST_LOG=solid_inspector=info` - Basic operation logging
//! - `RUST_LOG=solid_inspector=debug` - Per-phase details
//! - `RUST_LOG=solid_inspector::timing=debug` - Performance timing
//! - `RUST_LOG=debug` - All debug output
//!
//! # Example
//!
//! ```bash
//! # Inspect with short-edge detection
//! solid-inspector inspect part.obj --short-edges
//!
//! # Fix and write a copy, with info logging
//! RUST_LOG=solid_inspector=info solid-inspector fix part.obj -o part-fixed.obj
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod commands;
mod output;

use commands::{fix, info, inspect, kinds};

/// solid-inspector - find and fix what keeps a model from being a solid.
#[derive(Parser)]
#[command(name = "solid-inspector")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format for results
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    /// Suppress all non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase output verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output for scripting
    Json,
}

/// Inspection options shared by `inspect` and `fix`.
#[derive(clap::Args, Clone)]
pub struct InspectArgs {
    /// Report edges shorter than the threshold
    #[arg(long)]
    short_edges: bool,

    /// Short-edge threshold in mm (implies --short-edges)
    #[arg(long)]
    threshold: Option<f64>,

    /// Also search inside nested instances
    #[arg(long)]
    nested: bool,

    /// Load inspection settings from a TOML file; flags override it
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect a model and list its defects
    Inspect {
        /// Input model file (OBJ)
        input: PathBuf,

        #[command(flatten)]
        args: InspectArgs,
    },

    /// Fix what can be fixed and save the result
    Fix {
        /// Input model file (OBJ)
        input: PathBuf,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,

        /// Replace nested instances by their contents
        #[arg(long)]
        explode_instances: bool,

        #[command(flatten)]
        args: InspectArgs,
    },

    /// Display model topology statistics
    Info {
        /// Input model file (OBJ)
        input: PathBuf,
    },

    /// Describe every defect kind and how it is fixed
    Kinds,
}

/// Initialize the tracing subscriber based on verbosity level.
fn init_tracing(verbose: u8, quiet: bool) {
    if quiet {
        return;
    }

    // RUST_LOG wins over -v flags
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "warn",
            1 => "solid_inspector=info",
            2 => "solid_inspector=debug",
            _ => "trace",
        };
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() -> Result<()> {
    #[cfg(debug_assertions)]
    miette::set_panic_hook();

    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    let result = match &cli.command {
        Commands::Inspect { input, args } => inspect::run(input, args, &cli),
        Commands::Fix {
            input,
            output,
            explode_instances,
            args,
        } => fix::run(input, output, *explode_instances, args, &cli),
        Commands::Info { input } => info::run(input, &cli),
        Commands::Kinds => kinds::run(&cli),
    };

    match result {
        Ok(clean) => {
            if !clean {
                std::process::exit(1);
            }
        }
        Err(e) => {
            if !cli.quiet {
                if let Some(err) = e.downcast_ref::<solid_inspector::InspectError>() {
                    eprintln!("{}: {}", "Error".red().bold(), err);
                    eprintln!("  {}: {}", "Code".cyan(), err.code());
                    eprintln!("  {}: {}", "Suggestion".green(), err.recovery_suggestion());
                    if let Some(location) = err.location() {
                        eprintln!("  {}: {}", "Location".yellow(), location);
                    }
                } else {
                    eprintln!("{}: {}", "Error".red().bold(), e);
                    for cause in e.chain().skip(1) {
                        eprintln!("  {}: {}", "Caused by".yellow(), cause);
                    }
                }
            }
            std::process::exit(2);
        }
    }

    Ok(())
}
