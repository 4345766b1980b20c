use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use cosmos_sdk_proto::cosmos::auth::v1beta1::{
    BaseAccount, QueryAccountRequest, QueryAccountResponse,
};
use cosmos_sdk_proto::cosmos::bank::v1beta1::{
    QueryAllBalancesRequest, QueryAllBalancesResponse, QueryBalanceRequest, QueryBalanceResponse,
};
use cosmos_sdk_proto::cosmos::base::abci::v1beta1::{GasInfo, Result as SimResult};
use cosmos_sdk_proto::cosmos::base::query::v1beta1::PageResponse;
use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey;
use cosmos_sdk_proto::cosmos::tx::v1beta1::{SimulateRequest, SimulateResponse};
use cosmos_sdk_proto::cosmwasm::wasm::v1::{
    QuerySmartContractStateRequest, QuerySmartContractStateResponse,
};
use cosmos_sdk_proto::tendermint::abci::{Event as ProtoEvent, EventAttribute as ProtoAttribute};
use cosmos_sdk_proto::Any;
use prost::Message;
use tracing::debug;

use super::account::AccountService;
use super::balance::BalanceService;
use super::tx::TxService;
use crate::chain::ChainClient;
use crate::error::{GatewayError, Result};
use crate::translator::{codespace_name, strip_hex_prefix};
use crate::types::{
    AbciQueryResponse, Event, BASE_ACCOUNT_TYPE_URL, PLACEHOLDER_PUBKEY, SECP256K1_PUBKEY_TYPE_URL,
};

const ACCOUNT_PATH: &str = "/cosmos.auth.v1beta1.Query/Account";
const ALL_BALANCES_PATH: &str = "/cosmos.bank.v1beta1.Query/AllBalances";
const BALANCE_PATH: &str = "/cosmos.bank.v1beta1.Query/Balance";
const SIMULATE_PATH: &str = "/cosmos.tx.v1beta1.Service/Simulate";
const SMART_CONTRACT_STATE_PATH: &str = "/cosmwasm.wasm.v1.Query/SmartContractState";

/// Gas ceiling handed to the chain's contract-query RPC.
const CONTRACT_QUERY_GAS: u64 = 10_000_000_000;

/// Routes opaque ABCI query paths to the resolvers and packages the
/// protobuf-encoded results into a uniform envelope.
pub struct AbciService {
    chain: Arc<ChainClient>,
    account: Arc<AccountService>,
    balance: Arc<BalanceService>,
    tx: Arc<TxService>,
}

impl AbciService {
    pub fn new(
        chain: Arc<ChainClient>,
        account: Arc<AccountService>,
        balance: Arc<BalanceService>,
        tx: Arc<TxService>,
    ) -> Self {
        Self {
            chain,
            account,
            balance,
            tx,
        }
    }

    /// Dispatch a path-addressed query carrying hex-encoded request bytes.
    /// The best head is resolved once and threaded through every read.
    pub async fn query(&self, path: &str, data: &str) -> Result<AbciQueryResponse> {
        debug!("abci_query: path={path}");

        let data = hex::decode(strip_hex_prefix(data))
            .map_err(|e| GatewayError::BadRequest(format!("invalid query data hex: {e}")))?;
        let (height, block_hash) = self.chain.best_block_ref().await?;
        let at = Some(block_hash.as_str());

        match path {
            ACCOUNT_PATH => {
                let request = QueryAccountRequest::decode(&data[..]).map_err(decode_error)?;
                let response = self.account.accounts(&request.address, at).await?;

                let pub_key = PubKey {
                    key: PLACEHOLDER_PUBKEY.to_vec(),
                };
                let base_account = BaseAccount {
                    address: response.account.address,
                    pub_key: Some(Any {
                        type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
                        value: pub_key.encode_to_vec(),
                    }),
                    account_number: 0,
                    sequence: response.account.sequence.parse().unwrap_or(0),
                };
                let value = QueryAccountResponse {
                    account: Some(Any {
                        type_url: BASE_ACCOUNT_TYPE_URL.to_string(),
                        value: base_account.encode_to_vec(),
                    }),
                }
                .encode_to_vec();

                Ok(ok_envelope(value, height))
            }
            ALL_BALANCES_PATH => {
                let request = QueryAllBalancesRequest::decode(&data[..]).map_err(decode_error)?;
                let balances = self.balance.balances(&request.address, at).await?;

                let value = QueryAllBalancesResponse {
                    balances: balances
                        .into_iter()
                        .map(|balance| Coin {
                            denom: balance.denom,
                            amount: balance.amount,
                        })
                        .collect(),
                    pagination: Some(PageResponse {
                        next_key: Vec::new(),
                        total: 0,
                    }),
                }
                .encode_to_vec();

                Ok(ok_envelope(value, height))
            }
            BALANCE_PATH => {
                let request = QueryBalanceRequest::decode(&data[..]).map_err(decode_error)?;
                let balance = self
                    .balance
                    .balance(&request.address, &request.denom, at)
                    .await?;

                let value = QueryBalanceResponse {
                    balance: Some(Coin {
                        denom: balance.denom,
                        amount: balance.amount,
                    }),
                }
                .encode_to_vec();

                Ok(ok_envelope(value, height))
            }
            SIMULATE_PATH => {
                let request = SimulateRequest::decode(&data[..]).map_err(decode_error)?;
                match self.tx.simulate(&request.tx_bytes, at).await {
                    Ok(outcome) => {
                        let value = SimulateResponse {
                            gas_info: Some(GasInfo {
                                gas_wanted: outcome.gas_wanted,
                                gas_used: outcome.gas_used,
                            }),
                            result: Some(SimResult {
                                data: Vec::new(),
                                log: String::new(),
                                events: proto_events(&outcome.events),
                                msg_responses: Vec::new(),
                            }),
                        }
                        .encode_to_vec();
                        Ok(ok_envelope(value, height))
                    }
                    // the one path where a chain-side failure becomes a
                    // successful envelope carrying an application code
                    Err(GatewayError::TxRejected {
                        codespace,
                        code,
                        log,
                    }) => Ok(AbciQueryResponse {
                        code: code as u32,
                        log,
                        info: String::new(),
                        index: "0".to_string(),
                        key: String::new(),
                        value: String::new(),
                        proof_ops: None,
                        height: height.to_string(),
                        codespace: codespace_name(codespace).to_string(),
                    }),
                    Err(other) => Err(other),
                }
            }
            SMART_CONTRACT_STATE_PATH => {
                let request =
                    QuerySmartContractStateRequest::decode(&data[..]).map_err(decode_error)?;

                let message = serde_json::json!({
                    "wasm": {
                        "smart": {
                            "contract_addr": request.address,
                            "msg": BASE64.encode(&request.query_data),
                        }
                    }
                });
                let response = self
                    .chain
                    .contract_query(
                        &request.address,
                        CONTRACT_QUERY_GAS,
                        message.to_string().as_bytes(),
                        at,
                    )
                    .await?;

                let value = QuerySmartContractStateResponse { data: response }.encode_to_vec();
                Ok(ok_envelope(value, height))
            }
            _ => Err(GatewayError::UnsupportedQueryPath(path.to_string())),
        }
    }
}

fn ok_envelope(value: Vec<u8>, height: u64) -> AbciQueryResponse {
    AbciQueryResponse {
        code: 0,
        log: String::new(),
        info: String::new(),
        index: "0".to_string(),
        key: String::new(),
        value: BASE64.encode(value),
        proof_ops: None,
        height: height.to_string(),
        codespace: String::new(),
    }
}

fn proto_events(events: &[Event]) -> Vec<ProtoEvent> {
    events
        .iter()
        .map(|event| ProtoEvent {
            r#type: event.r#type.clone(),
            attributes: event
                .attributes
                .iter()
                .map(|attribute| ProtoAttribute {
                    key: attribute.key.clone(),
                    value: attribute.value.clone(),
                    index: attribute.index,
                })
                .collect(),
        })
        .collect()
}

fn decode_error(error: prost::DecodeError) -> GatewayError {
    GatewayError::Decode(format!("malformed query request: {error}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_envelope_wraps_value_as_base64() {
        let envelope = ok_envelope(vec![0x0a, 0x00], 42);
        assert_eq!(envelope.code, 0);
        assert_eq!(envelope.height, "42");
        assert_eq!(BASE64.decode(&envelope.value).unwrap(), vec![0x0a, 0x00]);
        assert_eq!(envelope.codespace, "");
    }

    #[test]
    fn test_account_response_round_trips_through_protobuf() {
        let pub_key = PubKey {
            key: PLACEHOLDER_PUBKEY.to_vec(),
        };
        let base_account = BaseAccount {
            address: "cosmos1abc".to_string(),
            pub_key: Some(Any {
                type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
                value: pub_key.encode_to_vec(),
            }),
            account_number: 0,
            sequence: 7,
        };
        let encoded = QueryAccountResponse {
            account: Some(Any {
                type_url: BASE_ACCOUNT_TYPE_URL.to_string(),
                value: base_account.encode_to_vec(),
            }),
        }
        .encode_to_vec();

        let decoded = QueryAccountResponse::decode(&encoded[..]).unwrap();
        let any = decoded.account.unwrap();
        assert_eq!(any.type_url, BASE_ACCOUNT_TYPE_URL);
        let account = BaseAccount::decode(&any.value[..]).unwrap();
        assert_eq!(account.sequence, 7);
        assert_eq!(account.address, "cosmos1abc");
    }
}
