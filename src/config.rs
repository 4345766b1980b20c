use anyhow::{Context, Result};
use std::env;

/// Gateway configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// REST/JSON-RPC listen port
    pub server_port: u16,
    /// Advertised endpoint (reported in status/node_info)
    pub server_endpoint: String,
    /// Chain node WebSocket RPC endpoint
    pub chain_endpoint: String,
    /// Native denom of the chain
    pub chain_denom: String,
    /// Network name reported in status
    pub chain_network: String,
    /// Reported chain version
    pub chain_version: String,
    /// Node moniker reported in status
    pub chain_moniker: String,
    /// Path of the embedded transaction store
    pub db_path: String,
    /// Runtime index of the pallet carrying bridged transactions
    pub cosmos_pallet_index: u8,
    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    /// Call dotenvy::dotenv() before calling this.
    pub fn from_env() -> Result<Self> {
        let server_port: u16 = env::var("SERVER_PORT")
            .unwrap_or_else(|_| "1317".to_string())
            .parse()
            .context("SERVER_PORT must be a valid u16")?;

        let server_endpoint = env::var("SERVER_ENDPOINT")
            .unwrap_or_else(|_| format!("http://127.0.0.1:{server_port}"));

        let chain_endpoint = env::var("CHAIN_ENDPOINT")
            .unwrap_or_else(|_| "ws://127.0.0.1:9944".to_string());

        let chain_denom = env::var("CHAIN_DENOM").unwrap_or_else(|_| "stake".to_string());

        let chain_network =
            env::var("CHAIN_NETWORK").unwrap_or_else(|_| "local-testnet".to_string());

        let chain_version = env::var("CHAIN_VERSION").unwrap_or_else(|_| "0.1.0".to_string());

        let chain_moniker = env::var("CHAIN_MONIKER").unwrap_or_else(|_| "gateway".to_string());

        let db_path = env::var("DB_PATH").unwrap_or_else(|_| "data/gateway-db".to_string());

        let cosmos_pallet_index: u8 = env::var("COSMOS_PALLET_INDEX")
            .unwrap_or_else(|_| "60".to_string())
            .parse()
            .context("COSMOS_PALLET_INDEX must be a valid u8")?;

        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

        Ok(Config {
            server_port,
            server_endpoint,
            chain_endpoint,
            chain_denom,
            chain_network,
            chain_version,
            chain_moniker,
            db_path,
            cosmos_pallet_index,
            log_level,
        })
    }
}
