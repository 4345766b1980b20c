//! JSON-RPC method set reachable over the WebSocket and HTTP transports.

use std::sync::Arc;

use anyhow::Result;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use jsonrpsee::types::ErrorObjectOwned;
use jsonrpsee::RpcModule;
use serde::Deserialize;
use serde_json::Value;

use crate::error::GatewayError;
use crate::server::GatewayState;
use crate::translator::{encode_attributes, Encoding};
use crate::types::{BroadcastTxSyncResponse, ResultTxSearch};

#[derive(Debug, Deserialize)]
struct AbciQueryParams {
    path: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct BroadcastTxParams {
    tx: String,
}

#[derive(Debug, Deserialize)]
struct TxSearchParams {
    query: String,
}

/// Register all JSON-RPC methods on the module.
pub fn register_methods(module: &mut RpcModule<Arc<GatewayState>>) -> Result<()> {
    module.register_async_method("status", |_params, ctx, _| async move {
        let status = ctx.status.status().await.map_err(rpc_error)?;
        to_json(status)
    })?;

    module.register_async_method("abci_query", |params, ctx, _| async move {
        let p: AbciQueryParams = params.parse()?;
        let response = ctx.abci.query(&p.path, &p.data).await.map_err(rpc_error)?;
        to_json(serde_json::json!({ "response": response }))
    })?;

    module.register_async_method("broadcast_tx_sync", |params, ctx, _| async move {
        let p: BroadcastTxParams = params.parse()?;
        let tx_bytes = BASE64
            .decode(&p.tx)
            .map_err(|e| rpc_error(GatewayError::BadRequest(format!("invalid tx: {e}"))))?;
        let result = ctx.tx.broadcast_tx(&tx_bytes).await.map_err(rpc_error)?;
        to_json(BroadcastTxSyncResponse {
            code: result.code,
            data: result.data,
            log: result.raw_log,
            codespace: result.codespace,
            hash: result.txhash,
        })
    })?;

    module.register_async_method("tx_search", |params, ctx, _| async move {
        let p: TxSearchParams = params.parse()?;
        let hash = parse_tx_hash_query(&p.query).ok_or_else(|| {
            rpc_error(GatewayError::BadRequest(format!(
                "unsupported query: {}",
                p.query
            )))
        })?;

        let mut txs = ctx.tx.search_tx(&hash).map_err(rpc_error)?;
        for tx in &mut txs {
            for event in &mut tx.tx_result.events {
                event.attributes =
                    encode_attributes(&event.attributes, Encoding::Utf8, Encoding::Base64)
                        .map_err(rpc_error)?;
            }
        }

        to_json(ResultTxSearch {
            total_count: txs.len().to_string(),
            txs,
        })
    })?;

    Ok(())
}

/// Pull the hash out of a `tx.hash='<hex>'` filter expression. Quote
/// characters are stripped defensively.
pub fn parse_tx_hash_query(query: &str) -> Option<String> {
    query.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key.trim() == "tx.hash").then(|| value.replace(['\'', '"'], ""))
    })
}

fn to_json<T: serde::Serialize>(value: T) -> Result<Value, ErrorObjectOwned> {
    serde_json::to_value(value).map_err(|e| internal_error(&e.to_string()))
}

fn rpc_error(error: GatewayError) -> ErrorObjectOwned {
    internal_error(&error.to_string())
}

fn internal_error(message: &str) -> ErrorObjectOwned {
    ErrorObjectOwned::owned(-32603, message.to_string(), None::<()>)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tx_hash_query() {
        assert_eq!(
            parse_tx_hash_query("tx.hash='AB12CD'"),
            Some("AB12CD".to_string())
        );
        assert_eq!(
            parse_tx_hash_query("tx.hash=\"ab12cd\""),
            Some("ab12cd".to_string())
        );
        assert_eq!(
            parse_tx_hash_query("tx.height=5&tx.hash='FF'"),
            Some("FF".to_string())
        );
        assert_eq!(parse_tx_hash_query("tx.height=5"), None);
        assert_eq!(parse_tx_hash_query(""), None);
    }
}
