//! Kronos CLI - container image version retention for GitHub Container Registry.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "kronos=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::ListVersions(args) => commands::list::execute(args).await,
        Commands::CleanupVersions(args) => commands::cleanup::execute(args).await,
        Commands::Version => {
            println!("kronos {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
