//! pitwall CLI
//!
//! Command-line interface for running benchmark races.

use anyhow::Result;
use clap::Parser;
use pitwall::cli::Cli;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    cli.run()
}
