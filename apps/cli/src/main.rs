//! ClipScout CLI: extract stock-footage clip records from listing pages.
//!
//! Fetches a page (or reads a saved DOM snapshot), runs the multi-strategy
//! extractor and prints or exports the records.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
