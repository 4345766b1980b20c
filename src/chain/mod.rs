pub mod client;
pub mod storage;
pub mod types;

pub use client::ChainClient;
pub use types::NativeAccountId;
