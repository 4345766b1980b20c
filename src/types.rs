//! Cosmos- and CometBFT-shaped response types.
//!
//! These are the JSON bodies served to clients. Field names are snake_case
//! on the wire; anything that is protobuf `bytes` upstream is base64 here,
//! matching what Cosmos SDK REST endpoints and CometBFT RPC emit.

use serde::{Deserialize, Serialize};

pub const BASE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.BaseAccount";
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";

/// Fixed placeholder compressed secp256k1 key served for accounts whose
/// real key is not registered on-chain. Deterministic, never random.
pub const PLACEHOLDER_PUBKEY: [u8; 33] = [
    0x02, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
    0, 0, 0,
];

// --- Accounts ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub account: BaseAccount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BaseAccount {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub address: String,
    pub pub_key: PublicKey,
    pub account_number: String,
    pub sequence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicKey {
    #[serde(rename = "@type")]
    pub type_url: String,
    pub key: String,
}

// --- Balances ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub denom: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllBalancesResponse {
    pub balances: Vec<Balance>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub balance: Balance,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub next_key: String,
    pub total: String,
}

impl Pagination {
    pub fn empty() -> Self {
        Self {
            next_key: String::new(),
            total: "0".to_string(),
        }
    }
}

// --- Transactions (CometBFT result shapes) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultTxSearch {
    pub txs: Vec<ResultTx>,
    pub total_count: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultTx {
    pub hash: String,
    pub height: String,
    pub index: u32,
    pub tx_result: TxResult,
    /// Original transaction bytes, base64.
    pub tx: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TxResult {
    pub code: u32,
    pub data: String,
    pub log: String,
    pub info: String,
    pub gas_wanted: String,
    pub gas_used: String,
    pub events: Vec<Event>,
    pub codespace: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub r#type: String,
    pub attributes: Vec<EventAttribute>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventAttribute {
    pub key: String,
    pub value: String,
    pub index: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastTxSyncResponse {
    pub code: u32,
    pub data: String,
    pub log: String,
    pub codespace: String,
    pub hash: String,
}

/// REST broadcast response: `{"tx_response": {...}}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BroadcastTxResponse {
    pub tx_response: TxResponse,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    pub height: String,
    pub txhash: String,
    pub codespace: String,
    pub code: u32,
    pub data: String,
    pub raw_log: String,
    pub logs: Vec<serde_json::Value>,
    pub info: String,
    pub gas_wanted: String,
    pub gas_used: String,
    pub tx: Option<serde_json::Value>,
    pub timestamp: String,
    pub events: Vec<Event>,
}

impl TxResponse {
    /// Placeholder acknowledgement returned at submit time; the
    /// authoritative outcome is recorded later by the block ingestor.
    pub fn accepted(txhash: String) -> Self {
        Self {
            height: "0".to_string(),
            txhash,
            codespace: String::new(),
            code: 0,
            data: String::new(),
            raw_log: String::new(),
            logs: Vec::new(),
            info: String::new(),
            gas_wanted: "0".to_string(),
            gas_used: "0".to_string(),
            tx: None,
            timestamp: String::new(),
            events: Vec::new(),
        }
    }
}

// --- Simulation ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateRestResponse {
    pub gas_info: GasInfo,
    pub result: SimulateResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GasInfo {
    pub gas_wanted: String,
    pub gas_used: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulateResult {
    pub data: String,
    pub log: String,
    pub events: Vec<Event>,
    pub msg_responses: Vec<serde_json::Value>,
}

// --- ABCI query envelope ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AbciQueryResponse {
    pub code: u32,
    pub log: String,
    pub info: String,
    pub index: String,
    pub key: String,
    /// Path-specific protobuf response, base64.
    pub value: String,
    #[serde(rename = "proofOps")]
    pub proof_ops: Option<serde_json::Value>,
    pub height: String,
    pub codespace: String,
}

// --- Status ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultStatus {
    pub node_info: StatusNodeInfo,
    pub sync_info: SyncInfo,
    pub validator_info: ValidatorInfo,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusNodeInfo {
    pub protocol_version: ProtocolVersion,
    pub id: String,
    pub listen_addr: String,
    pub network: String,
    pub version: String,
    pub channels: String,
    pub moniker: String,
    pub other: NodeInfoOther,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub p2p: String,
    pub block: String,
    pub app: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfoOther {
    pub tx_index: String,
    pub rpc_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncInfo {
    pub latest_block_hash: String,
    pub latest_app_hash: String,
    pub latest_block_height: String,
    pub latest_block_time: String,
    pub catching_up: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorInfo {
    pub address: String,
    pub pub_key: ValidatorPubKey,
    pub voting_power: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatorPubKey {
    #[serde(rename = "type")]
    pub r#type: String,
    pub value: String,
}

// --- Node info ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeInfoResponse {
    pub default_node_info: DefaultNodeInfo,
    pub application_version: ApplicationVersion,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultNodeInfo {
    pub protocol_version: ProtocolVersion,
    pub default_node_id: String,
    pub listen_addr: String,
    pub network: String,
    pub version: String,
    /// 8 channel bytes, base64.
    pub channels: String,
    pub moniker: String,
    pub other: NodeInfoOther,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationVersion {
    pub name: String,
    pub app_name: String,
    pub version: String,
    pub git_commit: String,
    pub build_tags: String,
    pub go_version: String,
    pub build_deps: Vec<serde_json::Value>,
    pub cosmos_sdk_version: String,
}

// --- Staking / distribution stubs ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DelegationsResponse {
    pub delegation_responses: Vec<serde_json::Value>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnbondingDelegationsResponse {
    pub unbonding_responses: Vec<serde_json::Value>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewardsResponse {
    pub rewards: Vec<serde_json::Value>,
    pub total: Vec<serde_json::Value>,
}
