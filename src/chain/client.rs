use std::sync::Arc;
use std::time::Duration;

use jsonrpsee::core::client::{ClientT, Subscription, SubscriptionClientT};
use jsonrpsee::core::ClientError;
use jsonrpsee::rpc_params;
use jsonrpsee::ws_client::{WsClient, WsClientBuilder};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::types::{ChainInfo, Header, RawSimulateResponse, SignedBlock};
use crate::error::{GatewayError, Result};
use crate::translator::strip_hex_prefix;

/// Client wrapper for the chain node's WebSocket RPC.
///
/// Owns the live connection. Calls made while disconnected fail fast with
/// `ChainUnavailable`; reconnection runs on a fixed interval, driven by the
/// block ingestion loop (which is alive for the whole process).
pub struct ChainClient {
    endpoint: String,
    retry_interval: Duration,
    request_timeout: Duration,
    inner: RwLock<Option<Arc<WsClient>>>,
}

impl ChainClient {
    pub fn new(endpoint: &str, retry_interval: Duration) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            retry_interval,
            request_timeout: Duration::from_secs(30),
            inner: RwLock::new(None),
        }
    }

    /// Attempt a single connection; used at startup.
    pub async fn try_connect(&self) -> Result<()> {
        let client = WsClientBuilder::default()
            .request_timeout(self.request_timeout)
            .build(&self.endpoint)
            .await
            .map_err(|e| {
                GatewayError::ChainUnavailable(format!(
                    "failed to connect to {}: {e}",
                    self.endpoint
                ))
            })?;
        info!("Chain RPC connected: {}", self.endpoint);
        *self.inner.write().await = Some(Arc::new(client));
        Ok(())
    }

    /// Reconnect with a fixed backoff until the node answers again.
    pub async fn reconnect(&self) {
        loop {
            tokio::time::sleep(self.retry_interval).await;
            debug!("Try connecting to chain RPC. endpoint: {}", self.endpoint);
            match self.try_connect().await {
                Ok(()) => return,
                Err(e) => warn!("Chain RPC reconnect failed: {e}"),
            }
        }
    }

    async fn client(&self) -> Result<Arc<WsClient>> {
        let guard = self.inner.read().await;
        match guard.as_ref() {
            Some(client) if client.is_connected() => Ok(client.clone()),
            _ => Err(GatewayError::ChainUnavailable(format!(
                "not connected to {}",
                self.endpoint
            ))),
        }
    }

    // --- Chain and state queries ---

    pub async fn finalized_head(&self) -> Result<String> {
        let client = self.client().await?;
        client
            .request("chain_getFinalizedHead", rpc_params![])
            .await
            .map_err(rpc_error)
    }

    /// Header of the given block, or the best block when `hash` is `None`.
    pub async fn header(&self, hash: Option<&str>) -> Result<Header> {
        let client = self.client().await?;
        let header: Option<Header> = client
            .request("chain_getHeader", rpc_params![hash])
            .await
            .map_err(rpc_error)?;
        header.ok_or_else(|| GatewayError::ChainUnavailable("header not available".to_string()))
    }

    pub async fn block_hash(&self, number: u64) -> Result<Option<String>> {
        let client = self.client().await?;
        client
            .request("chain_getBlockHash", rpc_params![number])
            .await
            .map_err(rpc_error)
    }

    pub async fn block(&self, hash: &str) -> Result<SignedBlock> {
        let client = self.client().await?;
        let block: Option<SignedBlock> = client
            .request("chain_getBlock", rpc_params![hash])
            .await
            .map_err(rpc_error)?;
        block.ok_or_else(|| GatewayError::ChainUnavailable(format!("block {hash} not available")))
    }

    /// Resolve the best head once: (height, block hash). Read paths thread
    /// this single reference through every storage query of one call.
    pub async fn best_block_ref(&self) -> Result<(u64, String)> {
        let header = self.header(None).await?;
        let number = header.block_number()?;
        let hash = self.block_hash(number).await?.ok_or_else(|| {
            GatewayError::ChainUnavailable("best block hash not available".to_string())
        })?;
        Ok((number, hash))
    }

    pub async fn storage(&self, key: &[u8], at: Option<&str>) -> Result<Option<Vec<u8>>> {
        let client = self.client().await?;
        let key_hex = format!("0x{}", hex::encode(key));
        let value: Option<String> = client
            .request("state_getStorage", rpc_params![key_hex, at])
            .await
            .map_err(rpc_error)?;
        value
            .map(|v| {
                hex::decode(strip_hex_prefix(&v))
                    .map_err(|e| GatewayError::Decode(format!("malformed storage value: {e}")))
            })
            .transpose()
    }

    pub async fn storage_keys_paged(
        &self,
        prefix: &[u8],
        count: u32,
        start_key: Option<&[u8]>,
        at: Option<&str>,
    ) -> Result<Vec<Vec<u8>>> {
        let client = self.client().await?;
        let prefix_hex = format!("0x{}", hex::encode(prefix));
        let start_hex = start_key.map(|k| format!("0x{}", hex::encode(k)));
        let keys: Vec<String> = client
            .request(
                "state_getKeysPaged",
                rpc_params![prefix_hex, count, start_hex, at],
            )
            .await
            .map_err(rpc_error)?;
        keys.into_iter()
            .map(|k| {
                hex::decode(strip_hex_prefix(&k))
                    .map_err(|e| GatewayError::Decode(format!("malformed storage key: {e}")))
            })
            .collect()
    }

    pub async fn subscribe_new_heads(&self) -> Result<Subscription<Header>> {
        let client = self.client().await?;
        client
            .subscribe(
                "chain_subscribeNewHeads",
                rpc_params![],
                "chain_unsubscribeNewHeads",
            )
            .await
            .map_err(rpc_error)
    }

    // --- Bridged RPC calls ---

    /// Submit raw transaction bytes; returns the content hash the node
    /// derives from them (sha256, hex).
    pub async fn broadcast_tx(&self, tx_bytes: &[u8]) -> Result<String> {
        let client = self.client().await?;
        let tx_hex = format!("0x{}", hex::encode(tx_bytes));
        client
            .request("cosmos_broadcastTx", rpc_params![tx_hex])
            .await
            .map_err(rpc_error)
    }

    /// Dry-run raw transaction bytes at the given block.
    ///
    /// A structured rejection from the chain (rendered as
    /// `... codespace: <n> ... code: <n> ...` in the RPC error) is parsed
    /// here, once, into `GatewayError::TxRejected`; callers never scrape
    /// error strings themselves.
    pub async fn simulate(
        &self,
        tx_bytes: &[u8],
        at: Option<&str>,
    ) -> Result<RawSimulateResponse> {
        let client = self.client().await?;
        let tx_hex = format!("0x{}", hex::encode(tx_bytes));
        client
            .request("cosmos_simulate", rpc_params![tx_hex, at])
            .await
            .map_err(|e| match e {
                ClientError::Call(object) => {
                    let message = object.message().to_string();
                    match parse_rejection(&message) {
                        Some((codespace, code)) => GatewayError::TxRejected {
                            codespace,
                            code,
                            log: message,
                        },
                        None => GatewayError::BadRequest(message),
                    }
                }
                other => rpc_error(other),
            })
    }

    pub async fn chain_info(&self) -> Result<ChainInfo> {
        let client = self.client().await?;
        client
            .request("cosmos_chainInfo", rpc_params![])
            .await
            .map_err(rpc_error)
    }

    /// Forward an opaque contract query; returns the raw response bytes.
    pub async fn contract_query(
        &self,
        contract: &str,
        gas: u64,
        query_request: &[u8],
        at: Option<&str>,
    ) -> Result<Vec<u8>> {
        let client = self.client().await?;
        let request_hex = format!("0x{}", hex::encode(query_request));
        let response: String = client
            .request("cosmwasm_query", rpc_params![contract, gas, request_hex, at])
            .await
            .map_err(rpc_error)?;
        hex::decode(strip_hex_prefix(&response))
            .map_err(|e| GatewayError::Decode(format!("malformed contract response: {e}")))
    }
}

fn rpc_error(error: ClientError) -> GatewayError {
    GatewayError::ChainUnavailable(error.to_string())
}

/// Pull the `codespace:`/`code:` pair out of the node's rejection message.
fn parse_rejection(message: &str) -> Option<(u8, u8)> {
    let codespace = number_after(message, "codespace:")?;
    let code = number_after(message, "code:")?;
    Some((codespace, code))
}

fn number_after(message: &str, token: &str) -> Option<u8> {
    let start = message.find(token)? + token.len();
    let digits: String = message[start..]
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rejection() {
        let message = "Simulate transaction failed: CosmosError { codespace: 1, code: 5 }";
        assert_eq!(parse_rejection(message), Some((1, 5)));
    }

    #[test]
    fn test_parse_rejection_sdk_namespace() {
        let message = "CosmosError { codespace: 0, code: 13 }";
        assert_eq!(parse_rejection(message), Some((0, 13)));
    }

    #[test]
    fn test_parse_rejection_unstructured_message() {
        assert_eq!(parse_rejection("Invalid transaction"), None);
        assert_eq!(parse_rejection("codespace: x code: 1"), None);
    }
}
