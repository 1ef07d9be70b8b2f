mod browse;
mod cli;
mod client;
mod config;
mod detail;
mod error;
mod graph;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing - only show warnings by default, use RUST_LOG=info for more detail
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let cli = Cli::parse();
    let endpoints = cli.endpoints;

    match cli.command {
        Commands::Init { force } => {
            cli::commands::init::run(force).await?;
        }
        Commands::Dashboard => {
            cli::commands::dashboard::run(&endpoints).await?;
        }
        Commands::List {
            page,
            page_size,
            query,
        } => {
            cli::commands::list::run(&endpoints, page, page_size, query).await?;
        }
        Commands::Browse { page_size } => {
            cli::commands::browse::run(&endpoints, page_size).await?;
        }
        Commands::Search { query } => {
            cli::commands::search::run(&endpoints, &query).await?;
        }
        Commands::Show { id, summarize } => {
            cli::commands::show::run(&endpoints, &id, summarize).await?;
        }
        Commands::Graph {
            output,
            width,
            height,
            focus,
            open,
        } => {
            cli::commands::graph::run(output, width, height, focus, open).await?;
        }
    }

    Ok(())
}
