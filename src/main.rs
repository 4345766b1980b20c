//! Cosmos API Translation Gateway
//!
//! Entry point for the gateway that bridges the Cosmos SDK API surface to a
//! Substrate chain. Loads configuration from environment/.env file and
//! starts the combined REST/JSON-RPC server.

use anyhow::Result;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cosm_gateway::config::Config;
use cosm_gateway::server::start_server;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .init();

    info!("=== Cosmos API Translation Gateway ===");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));
    info!("Bridging Cosmos SDK REST/JSON-RPC to a Substrate chain");
    info!("");

    // Load configuration
    let config = Config::from_env()?;

    info!("Configuration:");
    info!("  Server port: {}", config.server_port);
    info!("  Chain RPC: {}", config.chain_endpoint);
    info!("  Native denom: {}", config.chain_denom);
    info!("  Store path: {}", config.db_path);
    info!("");

    // Start the server
    start_server(config).await?;

    Ok(())
}
