#![recursion_limit = "256"]

mod auth;
mod cli;
mod config;
mod error;
mod insights;
mod metrics;
mod models;
mod output;
mod providers;
mod registry;
mod server;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    output::print_banner();

    let cli = Cli::parse();
    info!("Starting runboard");
    cli.execute().await?;

    Ok(())
}
