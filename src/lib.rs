//! Cosmos API Translation Gateway
//!
//! This crate implements a REST + JSON-RPC/WebSocket server that accepts
//! Cosmos-SDK-compatible API calls and translates them to a Substrate-based
//! chain that has no native Cosmos surface. This enables standard Cosmos
//! tooling (wallets, explorers, CLIs) to interact with the chain unmodified.
//!
//! # Architecture
//!
//! ```text
//! Client (wallet/explorer/CLI)
//!     |
//!     | Cosmos REST / JSON-RPC / WebSocket
//!     v
//! Gateway (this crate)
//!     |
//!     | chain RPC (state queries, bridged calls, block subscription)
//!     v
//! Substrate chain node
//! ```
//!
//! Request handling and block ingestion run independently: the ingestor
//! drains the chain's block stream and records transaction results in the
//! hash-keyed store, decoupled in time from any client call.
//!
//! # Modules
//!
//! - `config` - Environment and configuration management
//! - `server` - Service wiring, REST router and WebSocket bridge
//! - `methods` - REST handlers and JSON-RPC method registration
//! - `services` - Account, balance, ABCI, transaction and status services
//! - `chain` - Chain RPC client, storage keys, wire and event types
//! - `store` - Durable hash-keyed transaction store
//! - `ingest` - Block ingestion and result correlation
//! - `translator` - Encoding and codespace translation

pub mod chain;
pub mod config;
pub mod error;
pub mod ingest;
pub mod methods;
pub mod server;
pub mod services;
pub mod store;
pub mod translator;
pub mod types;
