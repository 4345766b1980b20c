use std::sync::Arc;

use tracing::{debug, info};

use crate::chain::types::RawCosmosEvent;
use crate::chain::ChainClient;
use crate::error::Result;
use crate::store::TxStore;
use crate::translator::{convert, Encoding};
use crate::types::{Event, EventAttribute, ResultTx, TxResponse};

/// Outcome of a dry run: gas figures plus the emitted events, already
/// translated to UTF-8.
#[derive(Debug, Clone)]
pub struct SimulateOutcome {
    pub gas_wanted: u64,
    pub gas_used: u64,
    pub events: Vec<Event>,
}

/// Submission, lookup and dry-run of bridged transactions. Owns the
/// hash-keyed store together with the block ingestor.
pub struct TxService {
    chain: Arc<ChainClient>,
    store: Arc<TxStore>,
}

impl TxService {
    pub fn new(chain: Arc<ChainClient>, store: Arc<TxStore>) -> Self {
        Self { chain, store }
    }

    /// Submit raw transaction bytes and persist them under their content
    /// hash. Returns an acknowledgement immediately; the authoritative
    /// outcome is recorded later by the block ingestor, and callers are
    /// expected to poll `search_tx`.
    pub async fn broadcast_tx(&self, tx_bytes: &[u8]) -> Result<TxResponse> {
        let hash_hex = self.chain.broadcast_tx(tx_bytes).await?;
        let hash = TxStore::normalize_hash(&hash_hex);

        self.store.put_pending(&hash, tx_bytes)?;
        info!("broadcast_tx: submitted {} bytes, hash {hash}", tx_bytes.len());

        Ok(TxResponse::accepted(hash.to_uppercase()))
    }

    /// Recorded result for the hash; empty while the outcome has not been
    /// observed on-chain ("not found" is a valid state, not an error).
    pub fn search_tx(&self, hash: &str) -> Result<Vec<ResultTx>> {
        debug!("search_tx: {hash}");
        Ok(self.store.result(hash)?.into_iter().collect())
    }

    /// Dry-run the transaction at the given block.
    pub async fn simulate(&self, tx_bytes: &[u8], at: Option<&str>) -> Result<SimulateOutcome> {
        let response = self.chain.simulate(tx_bytes, at).await?;
        let events = events_from_raw(&response.events)?;

        debug!(
            "simulate: gas_wanted={}, gas_used={}, events={}",
            response.gas_info.gas_wanted,
            response.gas_info.gas_used,
            events.len()
        );

        Ok(SimulateOutcome {
            gas_wanted: response.gas_info.gas_wanted,
            gas_used: response.gas_info.gas_used,
            events,
        })
    }

}

/// Translate chain-side events (hex payloads) into UTF-8 event records,
/// attribute by attribute, preserving order and count.
pub fn events_from_raw(raw: &[RawCosmosEvent]) -> Result<Vec<Event>> {
    raw.iter()
        .map(|event| {
            Ok(Event {
                r#type: convert(&event.r#type, Encoding::Hex, Encoding::Utf8)?,
                attributes: event
                    .attributes
                    .iter()
                    .map(|attribute| {
                        Ok(EventAttribute {
                            key: convert(&attribute.key, Encoding::Hex, Encoding::Utf8)?,
                            value: convert(&attribute.value, Encoding::Hex, Encoding::Utf8)?,
                            index: true,
                        })
                    })
                    .collect::<Result<_>>()?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::types::RawEventAttribute;

    #[test]
    fn test_events_from_raw_translates_hex() {
        let raw = vec![RawCosmosEvent {
            r#type: format!("0x{}", hex::encode("transfer")),
            attributes: vec![
                RawEventAttribute {
                    key: hex::encode("recipient"),
                    value: hex::encode("cosmos1xyz"),
                },
                RawEventAttribute {
                    key: hex::encode("amount"),
                    value: hex::encode("25stake"),
                },
            ],
        }];

        let events = events_from_raw(&raw).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].r#type, "transfer");
        assert_eq!(events[0].attributes.len(), 2);
        assert_eq!(events[0].attributes[0].key, "recipient");
        assert_eq!(events[0].attributes[1].value, "25stake");
    }

    #[test]
    fn test_events_from_raw_rejects_bad_hex() {
        let raw = vec![RawCosmosEvent {
            r#type: "zz".to_string(),
            attributes: Vec::new(),
        }];
        assert!(events_from_raw(&raw).is_err());
    }
}
