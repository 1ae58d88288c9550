use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

mod error;
mod samples;
mod subcommands;

/// Checks and inspects citation markup in annotated corpus files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Report markup problems in corpus files
    Check(subcommands::check::Args),

    /// Show the structure of the samples in a corpus file
    Inspect(subcommands::inspect::Args),

    /// Summarize corpus files: sample balance, span counts, oversized and duplicate samples
    Stats(subcommands::stats::Args),
}

fn main() -> Result<ExitCode> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();

    let code = match args.command {
        Commands::Check(args) => subcommands::check::run(&args)?,
        Commands::Inspect(args) => subcommands::inspect::run(&args)?,
        Commands::Stats(args) => subcommands::stats::run(&args)?,
    };
    Ok(code)
}
