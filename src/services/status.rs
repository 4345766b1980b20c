use std::sync::Arc;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};

use crate::chain::{storage, ChainClient};
use crate::config::Config;
use crate::error::Result;
use crate::translator::strip_hex_prefix;
use crate::types::{
    ApplicationVersion, DefaultNodeInfo, NodeInfoOther, NodeInfoResponse, ProtocolVersion,
    ResultStatus, StatusNodeInfo, SyncInfo, ValidatorInfo, ValidatorPubKey,
};

/// Fixed placeholders for identity fields this chain does not model.
/// Deterministic by design, never random.
const ZERO_ID: &str = "0000000000000000000000000000000000000000";
const ZERO_APP_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";
const ZERO_CHANNELS: &str = "0000000000000000";
const ZERO_ED25519_KEY: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";

/// Synthesizes a CometBFT-shaped status record from chain state.
pub struct StatusService {
    chain: Arc<ChainClient>,
    config: Config,
}

impl StatusService {
    pub fn new(chain: Arc<ChainClient>, config: Config) -> Self {
        Self { chain, config }
    }

    pub async fn status(&self) -> Result<ResultStatus> {
        let finalized = self.chain.finalized_head().await?;
        let block = self.chain.block(&finalized).await?;
        let height = block.block.header.block_number()?;

        let millis = match self
            .chain
            .storage(&storage::timestamp_now_key(), Some(&finalized))
            .await?
        {
            Some(bytes) => storage::decode_timestamp(&bytes)?,
            None => 0,
        };
        let block_time = DateTime::<Utc>::from_timestamp_millis(millis as i64)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
            .to_rfc3339_opts(SecondsFormat::Millis, true);

        Ok(ResultStatus {
            node_info: StatusNodeInfo {
                protocol_version: ProtocolVersion {
                    p2p: "0".to_string(),
                    block: "0".to_string(),
                    app: "0".to_string(),
                },
                id: ZERO_ID.to_string(),
                listen_addr: self.config.server_endpoint.clone(),
                network: self.config.chain_network.clone(),
                version: self.config.chain_version.clone(),
                channels: ZERO_CHANNELS.to_string(),
                moniker: self.config.chain_moniker.clone(),
                other: NodeInfoOther {
                    tx_index: "off".to_string(),
                    rpc_address: self.config.server_endpoint.clone(),
                },
            },
            sync_info: SyncInfo {
                latest_block_hash: strip_hex_prefix(&finalized).to_uppercase(),
                latest_app_hash: ZERO_APP_HASH.to_string(),
                latest_block_height: height.to_string(),
                latest_block_time: block_time,
                catching_up: false,
            },
            validator_info: ValidatorInfo {
                address: ZERO_ID.to_string(),
                pub_key: ValidatorPubKey {
                    r#type: "tendermint/PubKeyEd25519".to_string(),
                    value: ZERO_ED25519_KEY.to_string(),
                },
                voting_power: "0".to_string(),
            },
        })
    }
}

/// Synthesizes a Cosmos node-info record from the chain's identity RPC.
pub struct NodeInfoService {
    chain: Arc<ChainClient>,
    config: Config,
}

impl NodeInfoService {
    pub fn new(chain: Arc<ChainClient>, config: Config) -> Self {
        Self { chain, config }
    }

    pub async fn node_info(&self) -> Result<NodeInfoResponse> {
        let info = self.chain.chain_info().await?;

        Ok(NodeInfoResponse {
            default_node_info: DefaultNodeInfo {
                protocol_version: ProtocolVersion {
                    p2p: "0".to_string(),
                    block: "0".to_string(),
                    app: "0".to_string(),
                },
                default_node_id: ZERO_ID.to_string(),
                listen_addr: self.config.server_endpoint.clone(),
                network: info.chain_id,
                version: info.version.clone(),
                channels: BASE64.encode([0u8; 8]),
                moniker: info.bech32_prefix,
                other: NodeInfoOther {
                    tx_index: "off".to_string(),
                    rpc_address: String::new(),
                },
            },
            application_version: ApplicationVersion {
                name: info.name.clone(),
                app_name: info.name,
                version: info.version,
                git_commit: ZERO_ID.to_string(),
                build_tags: String::new(),
                go_version: "0".to_string(),
                build_deps: Vec::new(),
                cosmos_sdk_version: "0".to_string(),
            },
        })
    }
}
