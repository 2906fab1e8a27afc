use anyhow::Result;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod connections;
mod server;
mod ws;

use config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // Build the log filter from RUST_LOG or default to info
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,huddle_core=debug,huddle_server=debug"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::parse();

    info!("Huddle server starting...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    server::start(config).await?;

    Ok(())
}
