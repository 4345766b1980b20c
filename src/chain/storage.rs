//! Storage-key construction and SCALE decoding for the state entries the
//! gateway reads.
//!
//! Key layout is the standard frame one: `twox128(pallet) ++ twox128(item)`
//! followed by the item's hasher applied to the SCALE-encoded map key.

use parity_scale_codec::{Decode, Encode};
use sp_crypto_hashing::{blake2_128, twox_128, twox_64};

use crate::error::{GatewayError, Result};

/// SCALE variant tag of a Cosmos entry in the chain's unified address map.
pub const COSMOS_ADDRESS_TAG: u8 = 0x01;

pub fn storage_prefix(pallet: &str, item: &str) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(&twox_128(pallet.as_bytes()));
    key.extend_from_slice(&twox_128(item.as_bytes()));
    key
}

fn blake2_128_concat(bytes: &[u8]) -> Vec<u8> {
    let mut out = blake2_128(bytes).to_vec();
    out.extend_from_slice(bytes);
    out
}

fn twox_64_concat(bytes: &[u8]) -> Vec<u8> {
    let mut out = twox_64(bytes).to_vec();
    out.extend_from_slice(bytes);
    out
}

/// `System::Account(account)` — nonce and native balance record.
pub fn system_account_key(account: &[u8; 32]) -> Vec<u8> {
    let mut key = storage_prefix("System", "Account");
    key.extend_from_slice(&blake2_128_concat(account));
    key
}

/// `System::Events` — the per-block event records.
pub fn system_events_key() -> Vec<u8> {
    storage_prefix("System", "Events")
}

/// `Timestamp::Now` — block timestamp in milliseconds.
pub fn timestamp_now_key() -> Vec<u8> {
    storage_prefix("Timestamp", "Now")
}

/// `AddressMap::Index(Cosmos(raw))` — registered-address reverse lookup.
/// The tag byte keeps Cosmos entries apart from the map's other address
/// kinds, which share the same index.
pub fn address_map_index_key(raw_address: &[u8]) -> Vec<u8> {
    let mut value = Vec::with_capacity(1 + raw_address.len());
    value.push(COSMOS_ADDRESS_TAG);
    value.extend_from_slice(raw_address);

    let mut key = storage_prefix("AddressMap", "Index");
    key.extend_from_slice(&twox_64_concat(&value));
    key
}

/// `AssetMap::Index(denom)` — denom to asset id.
pub fn asset_map_index_key(denom: &[u8]) -> Vec<u8> {
    let mut key = storage_prefix("AssetMap", "Index");
    key.extend_from_slice(&blake2_128_concat(&denom.to_vec().encode()));
    key
}

/// `AssetMap::Map(asset_id)` — asset id to its denom set.
pub fn asset_map_map_key(asset_id: u32) -> Vec<u8> {
    let mut key = storage_prefix("AssetMap", "Map");
    key.extend_from_slice(&blake2_128_concat(&asset_id.encode()));
    key
}

/// `Assets::Account(asset_id, account)` — per-asset balance record.
pub fn assets_account_key(asset_id: u32, account: &[u8; 32]) -> Vec<u8> {
    let mut key = storage_prefix("Assets", "Account");
    key.extend_from_slice(&blake2_128_concat(&asset_id.encode()));
    key.extend_from_slice(&blake2_128_concat(account));
    key
}

/// Prefix of `Assets::Metadata`, iterated to discover known asset ids.
pub fn assets_metadata_prefix() -> Vec<u8> {
    storage_prefix("Assets", "Metadata")
}

/// Recover the asset id from a full `Assets::Metadata` key: the id is the
/// SCALE u32 after the 32-byte prefix and the 16-byte blake2_128 of the key.
pub fn asset_id_from_metadata_key(key: &[u8]) -> Option<u32> {
    let tail = key.get(48..)?;
    u32::decode(&mut &*tail).ok()
}

// --- State record layouts ---

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AccountInfo {
    pub nonce: u32,
    pub consumers: u32,
    pub providers: u32,
    pub sufficients: u32,
    pub data: AccountData,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AccountData {
    pub free: u128,
    pub reserved: u128,
    pub frozen: u128,
    pub flags: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct AssetAccount {
    pub balance: u128,
    pub status: AssetAccountStatus,
    pub reason: ExistenceReason,
    pub extra: (),
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum AssetAccountStatus {
    Liquid,
    Frozen,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ExistenceReason {
    Consumer,
    Sufficient,
    DepositHeld(u128),
    DepositRefunded,
    DepositFrom([u8; 32], u128),
}

pub fn decode_account_info(bytes: &[u8]) -> Result<AccountInfo> {
    AccountInfo::decode(&mut &*bytes)
        .map_err(|e| GatewayError::Decode(format!("malformed account record: {e}")))
}

pub fn decode_asset_account(bytes: &[u8]) -> Result<AssetAccount> {
    AssetAccount::decode(&mut &*bytes)
        .map_err(|e| GatewayError::Decode(format!("malformed asset account record: {e}")))
}

pub fn decode_asset_id(bytes: &[u8]) -> Result<u32> {
    u32::decode(&mut &*bytes).map_err(|e| GatewayError::Decode(format!("malformed asset id: {e}")))
}

pub fn decode_account_id(bytes: &[u8]) -> Result<[u8; 32]> {
    <[u8; 32]>::decode(&mut &*bytes)
        .map_err(|e| GatewayError::Decode(format!("malformed account id: {e}")))
}

/// Denom sets are stored as an ordered set of byte strings; the first entry
/// is the canonical denom.
pub fn decode_denom_set(bytes: &[u8]) -> Result<Vec<Vec<u8>>> {
    Vec::<Vec<u8>>::decode(&mut &*bytes)
        .map_err(|e| GatewayError::Decode(format!("malformed denom set: {e}")))
}

pub fn decode_timestamp(bytes: &[u8]) -> Result<u64> {
    u64::decode(&mut &*bytes)
        .map_err(|e| GatewayError::Decode(format!("malformed timestamp: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_prefix_layout() {
        let key = system_account_key(&[7u8; 32]);
        // 16 + 16 prefix, 16 hash, 32 account id
        assert_eq!(key.len(), 80);
        assert_eq!(&key[..16], &twox_128(b"System"));
        assert_eq!(&key[16..32], &twox_128(b"Account"));
        assert_eq!(&key[64..], &[7u8; 32]);
    }

    #[test]
    fn test_address_map_key_carries_tag() {
        let raw = [0xaau8; 20];
        let key = address_map_index_key(&raw);
        // twox64_concat keeps the raw value after the 8-byte hash
        assert_eq!(key.len(), 32 + 8 + 1 + 20);
        assert_eq!(key[40], COSMOS_ADDRESS_TAG);
        assert_eq!(&key[41..], &raw);
    }

    #[test]
    fn test_asset_id_from_metadata_key() {
        let asset_id = 42u32;
        let mut key = assets_metadata_prefix();
        key.extend_from_slice(&blake2_128_concat(&asset_id.encode()));
        assert_eq!(asset_id_from_metadata_key(&key), Some(asset_id));
        assert_eq!(asset_id_from_metadata_key(&key[..40]), None);
    }

    #[test]
    fn test_decode_account_info() {
        let info = AccountInfo {
            nonce: 3,
            consumers: 0,
            providers: 1,
            sufficients: 0,
            data: AccountData {
                free: 1_000_000_000_000_000_000,
                reserved: 0,
                frozen: 0,
                flags: 0,
            },
        };
        let decoded = decode_account_info(&info.encode()).unwrap();
        assert_eq!(decoded, info);
        assert_eq!(decoded.data.free.to_string(), "1000000000000000000");
    }

    #[test]
    fn test_decode_asset_account() {
        let account = AssetAccount {
            balance: 500,
            status: AssetAccountStatus::Liquid,
            reason: ExistenceReason::Sufficient,
            extra: (),
        };
        assert_eq!(decode_asset_account(&account.encode()).unwrap(), account);
    }

    #[test]
    fn test_decode_denom_set() {
        let set: Vec<Vec<u8>> = vec![b"uatom".to_vec(), b"ibc/atom".to_vec()];
        assert_eq!(decode_denom_set(&set.encode()).unwrap(), set);
    }
}
