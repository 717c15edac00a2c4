//! Gemsim command-line interface
//!
//! Loads a scenario catalog and reply table, runs scenarios against a
//! simulated or wall clock, and prints the resulting transcript and verdicts.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

mod commands;
mod context;
mod output;

use commands::{analyze, catalog, scenarios};
use context::CliContext;

#[derive(Parser)]
#[command(name = "gemsim")]
#[command(about = "Gemsim - host/equipment message exchange simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Simulator config file (TOML); defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Scenario catalog document (JSON array)
    #[arg(long, global = true, default_value = "fixtures/catalog.json")]
    catalog: PathBuf,

    /// Reply table document (JSON object keyed by response id)
    #[arg(long, global = true)]
    replies: Option<PathBuf>,

    /// Sleep on the wall clock instead of the simulated one
    #[arg(long, global = true)]
    realtime: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List scenarios in the catalog
    List,

    /// Check parameter values without running
    Validate(scenarios::ScenarioArgs),

    /// Run one scenario and print its transcript
    Run(scenarios::RunArgs),

    /// Run every scenario in catalog order
    RunAll(scenarios::RunAllArgs),

    /// Print the catalog as an importable document
    Export(catalog::ExportArgs),

    /// Run every scenario and print an offline analysis of the transcript
    Analyze,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(log_filter(cli.verbose))
        .with_writer(std::io::stderr)
        .init();

    let ctx = CliContext::load(
        cli.config.as_deref(),
        &cli.catalog,
        cli.replies.as_deref(),
        cli.realtime,
    )?;

    let passed = match cli.command {
        Commands::List => {
            scenarios::list(&ctx);
            true
        }
        Commands::Validate(args) => scenarios::validate(ctx, args)?,
        Commands::Run(args) => scenarios::run(ctx, args).await?,
        Commands::RunAll(args) => scenarios::run_all(ctx, args).await?,
        Commands::Export(args) => {
            catalog::export(&ctx, args)?;
            true
        }
        Commands::Analyze => analyze::run(ctx).await?,
    };

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// `RUST_LOG` wins; otherwise `--verbose` picks debug over info.
fn log_filter(verbose: bool) -> EnvFilter {
    let log_level = if verbose { "debug" } else { "info" };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}
