//! Block ingestion: the asynchronous half of the transaction lifecycle.
//!
//! A long-lived task drains the chain's new-head subscription and, for
//! every bridged operation found in a block, joins the on-chain outcome
//! with the hash-keyed store. Ingestion is strictly sequential per block;
//! an operation whose terminal event cannot be found or decoded is skipped
//! for good (single pass, at most once).

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cosmos_sdk_proto::cosmos::tx::v1beta1::Tx;
use prost::Message;
use sp_crypto_hashing::sha2_256;
use tracing::{debug, info, warn};

use crate::chain::storage::system_events_key;
use crate::chain::types::{
    decode_block_events, transact_tx_bytes, BlockEvent, BridgeEvent, DispatchError, EventDetail,
    Header, Phase, ScaleCosmosEvent, SystemEvent,
};
use crate::chain::ChainClient;
use crate::error::Result;
use crate::store::TxStore;
use crate::translator::decode_module_error;
use crate::types::{Event, EventAttribute, ResultTx, TxResult};

/// Decoded terminal event of one bridged operation.
#[derive(Debug, Clone, PartialEq)]
pub enum TerminalOutcome {
    Success {
        gas_wanted: u64,
        gas_used: u64,
        events: Vec<ScaleCosmosEvent>,
    },
    Failure {
        dispatch_error: DispatchError,
        gas_used: u64,
    },
}

pub struct BlockIngestor {
    chain: Arc<ChainClient>,
    store: Arc<TxStore>,
    bridge_pallet_index: u8,
}

impl BlockIngestor {
    pub fn new(chain: Arc<ChainClient>, store: Arc<TxStore>, bridge_pallet_index: u8) -> Self {
        Self {
            chain,
            store,
            bridge_pallet_index,
        }
    }

    /// Run until process shutdown. Headers are processed in arrival order,
    /// one block completing before the next begins; the subscription is
    /// re-established with a fixed backoff when the connection drops.
    pub async fn run(self) {
        loop {
            match self.chain.subscribe_new_heads().await {
                Ok(mut subscription) => {
                    info!("Subscribed to new block headers");
                    while let Some(next) = subscription.next().await {
                        match next {
                            Ok(header) => {
                                if let Err(e) = self.ingest_header(&header).await {
                                    warn!("Block ingestion failed: {e}");
                                }
                            }
                            Err(e) => {
                                warn!("Header stream error: {e}");
                                break;
                            }
                        }
                    }
                    warn!("Block subscription closed");
                }
                Err(e) => warn!("Failed to subscribe to new heads: {e}"),
            }
            self.chain.reconnect().await;
        }
    }

    async fn ingest_header(&self, header: &Header) -> Result<()> {
        let number = header.block_number()?;
        let Some(block_hash) = self.chain.block_hash(number).await? else {
            warn!("No hash known for block {number}, skipping");
            return Ok(());
        };

        let block = self.chain.block(&block_hash).await?;
        // fetched once, on the first bridged operation of the block
        let mut block_events: Option<Vec<BlockEvent>> = None;

        for (index, extrinsic) in block.block.extrinsics.iter().enumerate() {
            let Some(tx_bytes) = transact_tx_bytes(extrinsic, self.bridge_pallet_index) else {
                continue;
            };
            let index = index as u32;
            let hash = hex::encode(sha2_256(&tx_bytes));

            if self.store.result(&hash)?.is_some() {
                debug!("Result already recorded for {hash}");
                continue;
            }

            if block_events.is_none() {
                let bytes = self
                    .chain
                    .storage(&system_events_key(), Some(&block_hash))
                    .await?
                    .unwrap_or_default();
                block_events = Some(decode_block_events(&bytes, self.bridge_pallet_index)?);
            }

            let Some(outcome) = terminal_outcome(block_events.as_ref().unwrap(), index) else {
                warn!("No terminal event for operation {index} in block {number}");
                continue;
            };

            let tx = match self.store.pending(&hash)? {
                Some(bytes) => BASE64.encode(bytes),
                // submitted elsewhere; the block itself carries the bytes
                None => BASE64.encode(&tx_bytes),
            };

            let result = build_result(&hash, number, index, &tx_bytes, tx, outcome);
            if self.store.put_result_if_absent(&hash, &result)? {
                info!(
                    "Recorded result for {} at block {number}, code {}",
                    result.hash, result.tx_result.code
                );
            }
        }

        Ok(())
    }
}

/// The terminal event of an operation, matched strictly by extrinsic index.
pub fn terminal_outcome(events: &[BlockEvent], extrinsic_index: u32) -> Option<TerminalOutcome> {
    events.iter().find_map(|record| {
        if record.phase != Phase::ApplyExtrinsic(extrinsic_index) {
            return None;
        }
        match &record.detail {
            EventDetail::Bridge(BridgeEvent::Executed {
                gas_wanted,
                gas_used,
                events,
            }) => Some(TerminalOutcome::Success {
                gas_wanted: *gas_wanted,
                gas_used: *gas_used,
                events: events.clone(),
            }),
            EventDetail::System(SystemEvent::ExtrinsicFailed {
                dispatch_error,
                dispatch_info,
            }) => Some(TerminalOutcome::Failure {
                dispatch_error: dispatch_error.clone(),
                gas_used: dispatch_info.weight.ref_time,
            }),
            _ => None,
        }
    })
}

fn build_result(
    hash: &str,
    height: u64,
    index: u32,
    tx_bytes: &[u8],
    tx: String,
    outcome: TerminalOutcome,
) -> ResultTx {
    let tx_result = match outcome {
        TerminalOutcome::Success {
            gas_wanted,
            gas_used,
            events,
        } => TxResult {
            code: 0,
            data: String::new(),
            log: String::new(),
            info: String::new(),
            gas_wanted: gas_wanted.to_string(),
            gas_used: gas_used.to_string(),
            events: events_from_scale(&events),
            codespace: String::new(),
        },
        TerminalOutcome::Failure {
            dispatch_error,
            gas_used,
        } => {
            let (codespace, code) = match &dispatch_error {
                DispatchError::Module(module) => {
                    decode_module_error(&module.raw_bytes()).unwrap_or(("unknown", 1))
                }
                _ => ("unknown", 1),
            };
            TxResult {
                code,
                data: String::new(),
                log: format!("{dispatch_error:?}"),
                info: String::new(),
                gas_wanted: gas_limit_of(tx_bytes).to_string(),
                gas_used: gas_used.to_string(),
                events: Vec::new(),
                codespace: codespace.to_string(),
            }
        }
    };

    ResultTx {
        hash: hash.to_uppercase(),
        height: height.to_string(),
        index,
        tx_result,
        tx,
    }
}

/// Declared gas limit of the original transaction, read back from its
/// protobuf bytes. A failed dispatch emits no gas_wanted of its own.
fn gas_limit_of(tx_bytes: &[u8]) -> u64 {
    Tx::decode(tx_bytes)
        .ok()
        .and_then(|tx| tx.auth_info)
        .and_then(|auth_info| auth_info.fee)
        .map(|fee| fee.gas_limit)
        .unwrap_or(0)
}

fn events_from_scale(events: &[ScaleCosmosEvent]) -> Vec<Event> {
    events
        .iter()
        .map(|event| Event {
            r#type: String::from_utf8_lossy(&event.r#type).into_owned(),
            attributes: event
                .attributes
                .iter()
                .map(|attribute| EventAttribute {
                    key: String::from_utf8_lossy(&attribute.key).into_owned(),
                    value: String::from_utf8_lossy(&attribute.value).into_owned(),
                    index: true,
                })
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::{
        DispatchClass, DispatchInfo, ModuleError, Pays, ScaleEventAttribute, Weight,
    };

    fn success_record(index: u32, gas_wanted: u64, gas_used: u64) -> BlockEvent {
        BlockEvent {
            phase: Phase::ApplyExtrinsic(index),
            detail: EventDetail::Bridge(BridgeEvent::Executed {
                gas_wanted,
                gas_used,
                events: Vec::new(),
            }),
        }
    }

    fn failure_record(index: u32, error: [u8; 4]) -> BlockEvent {
        BlockEvent {
            phase: Phase::ApplyExtrinsic(index),
            detail: EventDetail::System(SystemEvent::ExtrinsicFailed {
                dispatch_error: DispatchError::Module(ModuleError { index: 0, error }),
                dispatch_info: DispatchInfo {
                    weight: Weight {
                        ref_time: 95_000,
                        proof_size: 0,
                    },
                    class: DispatchClass::Normal,
                    pays_fee: Pays::Yes,
                },
            }),
        }
    }

    #[test]
    fn test_terminal_outcome_matches_by_index_not_position() {
        let events = vec![
            success_record(3, 30_000, 21_000),
            failure_record(1, [1, 5, 0, 0]),
            success_record(0, 21_000, 18_000),
        ];

        assert_eq!(
            terminal_outcome(&events, 0),
            Some(TerminalOutcome::Success {
                gas_wanted: 21_000,
                gas_used: 18_000,
                events: Vec::new(),
            })
        );
        assert!(matches!(
            terminal_outcome(&events, 1),
            Some(TerminalOutcome::Failure { .. })
        ));
        assert_eq!(terminal_outcome(&events, 2), None);
    }

    #[test]
    fn test_build_result_success() {
        let outcome = TerminalOutcome::Success {
            gas_wanted: 21_000,
            gas_used: 18_000,
            events: vec![ScaleCosmosEvent {
                r#type: b"message".to_vec(),
                attributes: vec![ScaleEventAttribute {
                    key: b"sender".to_vec(),
                    value: b"cosmos1abc".to_vec(),
                }],
            }],
        };

        let result = build_result("ab12", 42, 1, &[0xaa], "qg==".to_string(), outcome);
        assert_eq!(result.hash, "AB12");
        assert_eq!(result.height, "42");
        assert_eq!(result.index, 1);
        assert_eq!(result.tx_result.code, 0);
        assert_eq!(result.tx_result.gas_used, "18000");
        assert_eq!(result.tx_result.gas_wanted, "21000");
        assert_eq!(result.tx_result.codespace, "");
        assert_eq!(result.tx_result.events[0].r#type, "message");
        assert_eq!(result.tx_result.events[0].attributes[0].key, "sender");
    }

    #[test]
    fn test_build_result_module_failure() {
        let outcome = TerminalOutcome::Failure {
            dispatch_error: DispatchError::Module(ModuleError {
                index: 0,
                error: [1, 5, 0, 0],
            }),
            gas_used: 95_000,
        };

        let result = build_result("cd34", 7, 0, &[0xbb], "uw==".to_string(), outcome);
        assert_eq!(result.tx_result.code, 5);
        assert_eq!(result.tx_result.codespace, "wasm");
        assert_eq!(result.tx_result.gas_used, "95000");
        assert!(result.tx_result.events.is_empty());
    }

    #[test]
    fn test_content_hash_is_sha256_of_tx_bytes() {
        // the store key must equal what the chain returns from broadcast
        assert_eq!(
            hex::encode(sha2_256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let hash = hex::encode(sha2_256(&[0xaa, 0xbb, 0xcc]));
        assert_eq!(hash.len(), 64);
        assert_ne!(hash, hex::encode(sha2_256(&[0xaa, 0xbb])));
    }
}
