use thiserror::Error;

/// Errors surfaced by the gateway core.
///
/// Absent accounts, assets and transaction results are not errors; those
/// resolve to zero-value or empty responses at the call site.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The chain connection is down or the RPC call could not be served.
    #[error("chain unavailable: {0}")]
    ChainUnavailable(String),

    /// ABCI query path with no registered handler.
    #[error("unsupported query path: {0}")]
    UnsupportedQueryPath(String),

    /// Malformed protobuf, SCALE or event payload bytes.
    #[error("decode error: {0}")]
    Decode(String),

    /// Malformed client input, rejected before any chain I/O.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The chain rejected a transaction with a structured module error.
    #[error("transaction rejected: codespace {codespace}, code {code}")]
    TxRejected { codespace: u8, code: u8, log: String },

    /// Embedded store failure.
    #[error("store error: {0}")]
    Store(#[from] sled::Error),
}

pub type Result<T> = std::result::Result<T, GatewayError>;
