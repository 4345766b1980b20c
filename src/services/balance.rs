use std::sync::Arc;

use tracing::debug;

use super::account::AccountService;
use crate::chain::{storage, ChainClient};
use crate::error::Result;
use crate::types::Balance;

const KEY_PAGE_SIZE: u32 = 256;

/// Reads native and registered-asset balances for resolved accounts.
pub struct BalanceService {
    chain: Arc<ChainClient>,
    account: Arc<AccountService>,
    native_denom: String,
}

impl BalanceService {
    pub fn new(chain: Arc<ChainClient>, account: Arc<AccountService>, native_denom: String) -> Self {
        Self {
            chain,
            account,
            native_denom,
        }
    }

    /// Every read of one call happens at one block. Callers may pass a
    /// reference block; otherwise the best head is pinned here.
    async fn pin_block(&self, at: Option<&str>) -> Result<String> {
        match at {
            Some(hash) => Ok(hash.to_string()),
            None => Ok(self.chain.best_block_ref().await?.1),
        }
    }

    async fn native_balance(&self, account: &[u8; 32], at: &str) -> Result<u128> {
        let key = storage::system_account_key(account);
        match self.chain.storage(&key, Some(at)).await? {
            Some(bytes) => Ok(storage::decode_account_info(&bytes)?.data.free),
            None => Ok(0),
        }
    }

    /// Balance of one denom. Absent accounts, unknown denoms and empty
    /// asset records all resolve to amount "0", never an error.
    pub async fn balance(&self, address: &str, denom: &str, at: Option<&str>) -> Result<Balance> {
        let at = self.pin_block(at).await?;
        let origin = self.account.resolve(address, Some(&at)).await?;

        let amount = if denom == self.native_denom {
            self.native_balance(origin.as_bytes(), &at).await?
        } else {
            match self
                .chain
                .storage(&storage::asset_map_index_key(denom.as_bytes()), Some(&at))
                .await?
            {
                Some(bytes) => {
                    let asset_id = storage::decode_asset_id(&bytes)?;
                    let key = storage::assets_account_key(asset_id, origin.as_bytes());
                    match self.chain.storage(&key, Some(&at)).await? {
                        Some(bytes) => storage::decode_asset_account(&bytes)?.balance,
                        None => 0,
                    }
                }
                None => 0,
            }
        };

        debug!("balance: denom={denom}, amount={amount}");
        Ok(Balance {
            denom: denom.to_string(),
            amount: amount.to_string(),
        })
    }

    /// All balances of the address: the native denom unconditionally
    /// (possibly "0"), then every asset with a non-empty record, in
    /// discovery order, denom resolved through the asset map.
    pub async fn balances(&self, address: &str, at: Option<&str>) -> Result<Vec<Balance>> {
        let at = self.pin_block(at).await?;
        let origin = self.account.resolve(address, Some(&at)).await?;

        let mut balances = vec![Balance {
            denom: self.native_denom.clone(),
            amount: self.native_balance(origin.as_bytes(), &at).await?.to_string(),
        }];

        let prefix = storage::assets_metadata_prefix();
        let mut start_key: Option<Vec<u8>> = None;
        loop {
            let keys = self
                .chain
                .storage_keys_paged(&prefix, KEY_PAGE_SIZE, start_key.as_deref(), Some(&at))
                .await?;

            for key in &keys {
                let Some(asset_id) = storage::asset_id_from_metadata_key(key) else {
                    continue;
                };
                let account_key = storage::assets_account_key(asset_id, origin.as_bytes());
                let Some(record) = self.chain.storage(&account_key, Some(&at)).await? else {
                    continue;
                };
                let asset_account = storage::decode_asset_account(&record)?;

                let map_key = storage::asset_map_map_key(asset_id);
                let Some(denoms) = self.chain.storage(&map_key, Some(&at)).await? else {
                    continue;
                };
                let Some(denom_bytes) = storage::decode_denom_set(&denoms)?.into_iter().next()
                else {
                    continue;
                };
                let denom = String::from_utf8_lossy(&denom_bytes).into_owned();

                if balances.iter().any(|balance| balance.denom == denom) {
                    continue;
                }
                debug!("balances: denom={denom}, amount={}", asset_account.balance);
                balances.push(Balance {
                    denom,
                    amount: asset_account.balance.to_string(),
                });
            }

            if keys.len() < KEY_PAGE_SIZE as usize {
                break;
            }
            start_key = keys.into_iter().last();
        }

        Ok(balances)
    }
}
