//! Binary crate for the `meteolux` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive location setup
//! - Hosting the refresh cycles and printing what they publish

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod output;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
