use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use sp_crypto_hashing::blake2_256;
use tracing::debug;

use crate::chain::{storage, ChainClient, NativeAccountId};
use crate::error::{GatewayError, Result};
use crate::types::{
    AccountResponse, BaseAccount, PublicKey, BASE_ACCOUNT_TYPE_URL, PLACEHOLDER_PUBKEY,
    SECP256K1_PUBKEY_TYPE_URL,
};

/// Domain separator of the deterministic interim account derivation.
/// A wire-format contract shared with existing deployments; never change.
const INTERIM_DOMAIN: &[u8] = b"cosm:";

/// Resolves bech32 addresses to native account ids and shapes
/// Cosmos-style account records from native account state.
pub struct AccountService {
    chain: Arc<ChainClient>,
}

impl AccountService {
    pub fn new(chain: Arc<ChainClient>) -> Self {
        Self { chain }
    }

    /// Decode a bech32 address into its raw payload bytes.
    /// Fails fast before any chain I/O.
    pub fn decode_address(address: &str) -> Result<Vec<u8>> {
        let (_hrp, data) = bech32::decode(address)
            .map_err(|e| GatewayError::BadRequest(format!("invalid address {address}: {e}")))?;
        Ok(data)
    }

    /// Registered native id for the address, if a mapping exists on-chain.
    /// Absence is a valid result, distinct from a failed read.
    pub async fn origin(&self, address: &str, at: Option<&str>) -> Result<Option<NativeAccountId>> {
        let raw = Self::decode_address(address)?;
        let key = storage::address_map_index_key(&raw);
        match self.chain.storage(&key, at).await? {
            Some(bytes) => Ok(Some(storage::decode_account_id(&bytes)?.into())),
            None => Ok(None),
        }
    }

    /// Deterministic fallback id for an unregistered address. Pure, total,
    /// stable across restarts; not reversible to a real public key.
    pub fn interim(address: &str) -> Result<NativeAccountId> {
        let raw = Self::decode_address(address)?;
        let mut preimage = Vec::with_capacity(INTERIM_DOMAIN.len() + raw.len());
        preimage.extend_from_slice(INTERIM_DOMAIN);
        preimage.extend_from_slice(&raw);
        Ok(blake2_256(&preimage).into())
    }

    /// Registered mapping first, interim fallback. The registered mapping
    /// wins as soon as it appears; absence is never cached.
    pub async fn resolve(&self, address: &str, at: Option<&str>) -> Result<NativeAccountId> {
        match self.origin(address, at).await? {
            Some(id) => Ok(id),
            None => Self::interim(address),
        }
    }

    /// Sequence (nonce) of the native account, "0" when absent on-chain.
    pub async fn sequence(&self, id: &NativeAccountId, at: Option<&str>) -> Result<u64> {
        let key = storage::system_account_key(id.as_bytes());
        match self.chain.storage(&key, at).await? {
            Some(bytes) => Ok(storage::decode_account_info(&bytes)?.nonce as u64),
            None => Ok(0),
        }
    }

    /// Cosmos-shaped account record for the address at the given block
    /// (best head when omitted).
    pub async fn accounts(&self, address: &str, at: Option<&str>) -> Result<AccountResponse> {
        debug!("accounts: {address}");

        let id = self.resolve(address, at).await?;
        let sequence = self.sequence(&id, at).await?;

        Ok(AccountResponse {
            account: BaseAccount {
                type_url: BASE_ACCOUNT_TYPE_URL.to_string(),
                address: address.to_string(),
                pub_key: PublicKey {
                    type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
                    key: BASE64.encode(PLACEHOLDER_PUBKEY),
                },
                account_number: "0".to_string(),
                sequence: sequence.to_string(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bech32::{Bech32, Hrp};

    fn test_address(payload: &[u8; 20]) -> String {
        bech32::encode::<Bech32>(Hrp::parse("cosmos").unwrap(), payload).unwrap()
    }

    #[test]
    fn test_interim_is_deterministic() {
        let address = test_address(&[0x11; 20]);
        let first = AccountService::interim(&address).unwrap();
        let second = AccountService::interim(&address).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_interim_is_input_sensitive() {
        let mut payload = [0x11u8; 20];
        let base = AccountService::interim(&test_address(&payload)).unwrap();
        payload[19] ^= 0x01;
        let changed = AccountService::interim(&test_address(&payload)).unwrap();
        assert_ne!(base, changed);
    }

    #[test]
    fn test_interim_matches_domain_separated_hash() {
        let payload = [0x42u8; 20];
        let address = test_address(&payload);

        let mut preimage = b"cosm:".to_vec();
        preimage.extend_from_slice(&payload);
        let expected: NativeAccountId = blake2_256(&preimage).into();

        assert_eq!(AccountService::interim(&address).unwrap(), expected);
    }

    #[test]
    fn test_decode_address_rejects_garbage() {
        assert!(matches!(
            AccountService::decode_address("not-an-address"),
            Err(GatewayError::BadRequest(_))
        ));
    }

    #[test]
    fn test_placeholder_pubkey_shape() {
        // compressed secp256k1: 33 bytes, leading 0x02
        assert_eq!(PLACEHOLDER_PUBKEY.len(), 33);
        assert_eq!(PLACEHOLDER_PUBKEY[0], 0x02);
        assert_eq!(BASE64.decode(BASE64.encode(PLACEHOLDER_PUBKEY)).unwrap(), PLACEHOLDER_PUBKEY);
    }
}
