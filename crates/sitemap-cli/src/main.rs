//! sitemap-urls CLI - list every page URL referenced by XML sitemaps
//!
//! This is the main entry point for the sitemap-urls command-line interface.

use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;

mod cli;
mod commands;
mod output;
mod utils;

use cli::Cli;
use utils::logging::initialize_logging;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    commands::resolve(&cli).await
}
