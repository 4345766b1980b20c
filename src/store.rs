//! Durable hash-keyed transaction store.
//!
//! Correlates submitted transaction bytes with the result observed later by
//! the block ingestor. Pending bytes are written on the submission path,
//! results are written exactly once by ingestion; concurrent readers are
//! safe and a missing key is always a valid state.

use crate::error::{GatewayError, Result};
use crate::translator::strip_hex_prefix;
use crate::types::ResultTx;

const PENDING_PREFIX: &str = "tx::origin::";
const RESULT_PREFIX: &str = "tx::result::";

pub struct TxStore {
    db: sled::Db,
}

impl TxStore {
    pub fn open(path: &str) -> Result<Self> {
        Ok(Self {
            db: sled::open(path)?,
        })
    }

    /// Canonical store key form of a transaction hash.
    pub fn normalize_hash(hash: &str) -> String {
        strip_hex_prefix(hash.trim()).to_ascii_lowercase()
    }

    /// Persist the original bytes of a submitted transaction.
    pub fn put_pending(&self, hash: &str, tx_bytes: &[u8]) -> Result<()> {
        let key = format!("{PENDING_PREFIX}{}", Self::normalize_hash(hash));
        self.db.insert(key.as_bytes(), tx_bytes)?;
        Ok(())
    }

    pub fn pending(&self, hash: &str) -> Result<Option<Vec<u8>>> {
        let key = format!("{PENDING_PREFIX}{}", Self::normalize_hash(hash));
        Ok(self.db.get(key.as_bytes())?.map(|v| v.to_vec()))
    }

    /// Record a transaction result. The record is created once and never
    /// mutated; returns false when a result already exists for the hash.
    pub fn put_result_if_absent(&self, hash: &str, result: &ResultTx) -> Result<bool> {
        let key = format!("{RESULT_PREFIX}{}", Self::normalize_hash(hash));
        let bytes = serde_json::to_vec(result)
            .map_err(|e| GatewayError::Decode(format!("unencodable result record: {e}")))?;
        let swapped = self
            .db
            .compare_and_swap(key.as_bytes(), None::<&[u8]>, Some(bytes))?;
        Ok(swapped.is_ok())
    }

    pub fn result(&self, hash: &str) -> Result<Option<ResultTx>> {
        let key = format!("{RESULT_PREFIX}{}", Self::normalize_hash(hash));
        self.db
            .get(key.as_bytes())?
            .map(|bytes| {
                serde_json::from_slice(&bytes)
                    .map_err(|e| GatewayError::Decode(format!("malformed result record: {e}")))
            })
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::TxResult;

    fn temp_store() -> TxStore {
        TxStore {
            db: sled::Config::new().temporary(true).open().unwrap(),
        }
    }

    fn sample_result(hash: &str, gas_used: &str) -> ResultTx {
        ResultTx {
            hash: hash.to_uppercase(),
            height: "12".to_string(),
            index: 1,
            tx_result: TxResult {
                code: 0,
                data: String::new(),
                log: String::new(),
                info: String::new(),
                gas_wanted: "21000".to_string(),
                gas_used: gas_used.to_string(),
                events: Vec::new(),
                codespace: String::new(),
            },
            tx: "qrvM".to_string(),
        }
    }

    #[test]
    fn test_normalize_hash() {
        assert_eq!(TxStore::normalize_hash("0xAABB"), "aabb");
        assert_eq!(TxStore::normalize_hash("AABB"), "aabb");
        assert_eq!(TxStore::normalize_hash(" aabb "), "aabb");
    }

    #[test]
    fn test_pending_round_trip() {
        let store = temp_store();
        store.put_pending("0xAB", &[0xaa, 0xbb]).unwrap();
        assert_eq!(store.pending("ab").unwrap(), Some(vec![0xaa, 0xbb]));
        assert_eq!(store.pending("cd").unwrap(), None);
    }

    #[test]
    fn test_result_absent_before_recorded() {
        let store = temp_store();
        assert!(store.result("ab").unwrap().is_none());
    }

    #[test]
    fn test_result_written_once() {
        let store = temp_store();
        let first = sample_result("ab", "18000");

        assert!(store.put_result_if_absent("ab", &first).unwrap());
        // a second write for the same hash is a no-op
        let second = sample_result("ab", "99999");
        assert!(!store.put_result_if_absent("ab", &second).unwrap());

        let read = store.result("0xAB").unwrap().unwrap();
        assert_eq!(read, first);
        assert_eq!(read.tx_result.gas_used, "18000");
    }
}
