//! Playwright Visual CLI - Main Entry Point
//!
//! Runs snapshot checks outside a test harness and manages the baseline and
//! failure-artifact trees they produce.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use playwright_visual::RunConfig;

mod commands;
mod output;

use commands::{clean, compare, list};

/// Playwright Visual - screenshot baselines and pixel comparison
#[derive(Parser)]
#[command(name = "playwright-visual")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, default_value = "playwright-visual.toml", global = true)]
    config: PathBuf,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: output::OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare an image or a live page against its baseline
    Compare(compare::CompareArgs),

    /// List recorded baselines for a test file
    List(list::ListArgs),

    /// Remove failure artifacts for a test file
    Clean(clean::CleanArgs),
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(2);
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<i32> {
    let config = RunConfig::load(&cli.config)?;

    match cli.command {
        Commands::Compare(args) => compare::execute(args, config, cli.format),
        Commands::List(args) => list::execute(args, cli.format).map(|_| 0),
        Commands::Clean(args) => clean::execute(args, &config).map(|_| 0),
    }
}
