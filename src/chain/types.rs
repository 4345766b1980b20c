use std::fmt;

use parity_scale_codec::{Compact, Decode, Encode};
use serde::Deserialize;

use crate::error::{GatewayError, Result};
use crate::translator::strip_hex_prefix;

/// The chain's native 32-byte account identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NativeAccountId([u8; 32]);

impl NativeAccountId {
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl From<[u8; 32]> for NativeAccountId {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for NativeAccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

// --- JSON wire types served by the node's RPC ---

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Header {
    pub parent_hash: String,
    /// Hex-encoded block number.
    pub number: String,
    pub state_root: String,
    pub extrinsics_root: String,
}

impl Header {
    pub fn block_number(&self) -> Result<u64> {
        u64::from_str_radix(strip_hex_prefix(&self.number), 16)
            .map_err(|e| GatewayError::Decode(format!("malformed block number: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SignedBlock {
    pub block: Block,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Block {
    pub header: Header,
    /// Hex-encoded SCALE extrinsics.
    pub extrinsics: Vec<String>,
}

/// Chain identity served by the node's bridged `chainInfo` RPC.
#[derive(Debug, Clone, Deserialize)]
pub struct ChainInfo {
    pub chain_id: String,
    pub bech32_prefix: String,
    pub name: String,
    pub version: String,
}

/// Dry-run response of the bridged `simulate` RPC. Event payloads arrive
/// hex-encoded and are translated to UTF-8 by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct RawSimulateResponse {
    pub gas_info: RawGasInfo,
    pub events: Vec<RawCosmosEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawGasInfo {
    pub gas_wanted: u64,
    pub gas_used: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawCosmosEvent {
    #[serde(rename = "type")]
    pub r#type: String,
    pub attributes: Vec<RawEventAttribute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawEventAttribute {
    pub key: String,
    pub value: String,
}

// --- SCALE event records read from System::Events ---

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ScaleCosmosEvent {
    pub r#type: Vec<u8>,
    pub attributes: Vec<ScaleEventAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ScaleEventAttribute {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Encode, Decode)]
pub enum Phase {
    ApplyExtrinsic(u32),
    Finalization,
    Initialization,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct Weight {
    #[codec(compact)]
    pub ref_time: u64,
    #[codec(compact)]
    pub proof_size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum DispatchClass {
    Normal,
    Operational,
    Mandatory,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum Pays {
    Yes,
    No,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct DispatchInfo {
    pub weight: Weight,
    pub class: DispatchClass,
    pub pays_fee: Pays,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub struct ModuleError {
    pub index: u8,
    pub error: [u8; 4],
}

impl ModuleError {
    /// The raw bytes handed to the codespace translator.
    pub fn raw_bytes(&self) -> [u8; 5] {
        [
            self.index,
            self.error[0],
            self.error[1],
            self.error[2],
            self.error[3],
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TokenError {
    FundsUnavailable,
    OnlyProvider,
    BelowMinimum,
    CannotCreate,
    UnknownAsset,
    Frozen,
    Unsupported,
    CannotCreateHold,
    NotExpendable,
    Blocked,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum ArithmeticError {
    Underflow,
    Overflow,
    DivisionByZero,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum TransactionalError {
    LimitReached,
    NoLayer,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum DispatchError {
    Other,
    CannotLookup,
    BadOrigin,
    Module(ModuleError),
    ConsumerRemaining,
    NoProviders,
    TooManyConsumers,
    Token(TokenError),
    Arithmetic(ArithmeticError),
    Transactional(TransactionalError),
    Exhausted,
    Corruption,
    Unavailable,
    RootNotAllowed,
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum SystemEvent {
    ExtrinsicSuccess {
        dispatch_info: DispatchInfo,
    },
    ExtrinsicFailed {
        dispatch_error: DispatchError,
        dispatch_info: DispatchInfo,
    },
    CodeUpdated,
    NewAccount {
        account: [u8; 32],
    },
    KilledAccount {
        account: [u8; 32],
    },
    Remarked {
        sender: [u8; 32],
        hash: [u8; 32],
    },
    UpgradeAuthorized {
        code_hash: [u8; 32],
        check_version: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Encode, Decode)]
pub enum BridgeEvent {
    Executed {
        gas_wanted: u64,
        gas_used: u64,
        events: Vec<ScaleCosmosEvent>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventDetail {
    System(SystemEvent),
    Bridge(BridgeEvent),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockEvent {
    pub phase: Phase,
    pub detail: EventDetail,
}

/// Decode the block's event records.
///
/// Only `System` events and the bridging pallet's events are understood.
/// An event from any other pallet has an unknowable length without runtime
/// metadata, so the decode fails there and the block's correlation is
/// skipped by the caller.
pub fn decode_block_events(bytes: &[u8], bridge_pallet_index: u8) -> Result<Vec<BlockEvent>> {
    let input = &mut &*bytes;
    let count = <Compact<u32>>::decode(input)
        .map_err(|e| GatewayError::Decode(format!("malformed event count: {e}")))?
        .0;

    let mut events = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let phase = Phase::decode(input)
            .map_err(|e| GatewayError::Decode(format!("malformed event phase: {e}")))?;
        let pallet = u8::decode(input)
            .map_err(|e| GatewayError::Decode(format!("malformed event pallet index: {e}")))?;

        let detail = if pallet == 0 {
            EventDetail::System(
                SystemEvent::decode(input)
                    .map_err(|e| GatewayError::Decode(format!("malformed system event: {e}")))?,
            )
        } else if pallet == bridge_pallet_index {
            EventDetail::Bridge(
                BridgeEvent::decode(input)
                    .map_err(|e| GatewayError::Decode(format!("malformed bridge event: {e}")))?,
            )
        } else {
            return Err(GatewayError::Decode(format!(
                "unrecognized event from pallet {pallet}"
            )));
        };

        let _topics = Vec::<[u8; 32]>::decode(input)
            .map_err(|e| GatewayError::Decode(format!("malformed event topics: {e}")))?;

        events.push(BlockEvent { phase, detail });
    }

    Ok(events)
}

/// Extract the transaction bytes from a bridged `transact` extrinsic.
///
/// Bridged calls arrive as bare (unsigned) v4 extrinsics whose call is
/// `(bridge_pallet_index, 0, tx_bytes)`. Anything else is not a bridged
/// operation and yields `None`.
pub fn transact_tx_bytes(extrinsic_hex: &str, bridge_pallet_index: u8) -> Option<Vec<u8>> {
    let bytes = hex::decode(strip_hex_prefix(extrinsic_hex)).ok()?;
    let input = &mut &*bytes;

    let _length = <Compact<u32>>::decode(input).ok()?;
    let version = u8::decode(input).ok()?;
    if version != 0x04 {
        return None;
    }

    let pallet = u8::decode(input).ok()?;
    let call = u8::decode(input).ok()?;
    if pallet != bridge_pallet_index || call != 0 {
        return None;
    }

    Vec::<u8>::decode(input).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const BRIDGE_INDEX: u8 = 60;

    fn encode_extrinsic(version: u8, pallet: u8, call: u8, tx_bytes: &[u8]) -> String {
        let mut body = vec![version, pallet, call];
        body.extend_from_slice(&tx_bytes.to_vec().encode());
        let mut full = Compact(body.len() as u32).encode();
        full.extend_from_slice(&body);
        format!("0x{}", hex::encode(full))
    }

    #[test]
    fn test_transact_tx_bytes_extracts_call_argument() {
        let tx = vec![0xaa, 0xbb, 0xcc];
        let extrinsic = encode_extrinsic(0x04, BRIDGE_INDEX, 0, &tx);
        assert_eq!(transact_tx_bytes(&extrinsic, BRIDGE_INDEX), Some(tx));
    }

    #[test]
    fn test_transact_tx_bytes_skips_foreign_calls() {
        let tx = vec![0xaa];
        // signed extrinsic
        assert_eq!(
            transact_tx_bytes(&encode_extrinsic(0x84, BRIDGE_INDEX, 0, &tx), BRIDGE_INDEX),
            None
        );
        // another pallet
        assert_eq!(
            transact_tx_bytes(&encode_extrinsic(0x04, 3, 0, &tx), BRIDGE_INDEX),
            None
        );
        // another call of the bridge pallet
        assert_eq!(
            transact_tx_bytes(&encode_extrinsic(0x04, BRIDGE_INDEX, 1, &tx), BRIDGE_INDEX),
            None
        );
    }

    fn encode_record(phase: &Phase, pallet: u8, event_body: Vec<u8>) -> Vec<u8> {
        let mut out = phase.encode();
        out.push(pallet);
        out.extend_from_slice(&event_body);
        out.extend_from_slice(&Vec::<[u8; 32]>::new().encode());
        out
    }

    #[test]
    fn test_decode_block_events() {
        let success = SystemEvent::ExtrinsicSuccess {
            dispatch_info: DispatchInfo {
                weight: Weight {
                    ref_time: 125_000,
                    proof_size: 0,
                },
                class: DispatchClass::Normal,
                pays_fee: Pays::Yes,
            },
        };
        let executed = BridgeEvent::Executed {
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

        let mut bytes = Compact(3u32).encode();
        bytes.extend(encode_record(
            &Phase::ApplyExtrinsic(0),
            0,
            success.encode(),
        ));
        bytes.extend(encode_record(
            &Phase::ApplyExtrinsic(1),
            BRIDGE_INDEX,
            executed.encode(),
        ));
        bytes.extend(encode_record(
            &Phase::ApplyExtrinsic(1),
            0,
            success.encode(),
        ));

        let events = decode_block_events(&bytes, BRIDGE_INDEX).unwrap();
        assert_eq!(events.len(), 3);
        assert_eq!(events[0].phase, Phase::ApplyExtrinsic(0));
        assert_eq!(events[1].phase, Phase::ApplyExtrinsic(1));
        assert_eq!(events[1].detail, EventDetail::Bridge(executed));
    }

    #[test]
    fn test_decode_block_events_rejects_unknown_pallet() {
        let mut bytes = Compact(1u32).encode();
        bytes.extend(encode_record(&Phase::Initialization, 9, vec![0x00]));
        assert!(decode_block_events(&bytes, BRIDGE_INDEX).is_err());
    }

    #[test]
    fn test_decode_extrinsic_failed_module_error() {
        let failed = SystemEvent::ExtrinsicFailed {
            dispatch_error: DispatchError::Module(ModuleError {
                index: 0,
                error: [1, 5, 0, 0],
            }),
            dispatch_info: DispatchInfo {
                weight: Weight {
                    ref_time: 90_000,
                    proof_size: 0,
                },
                class: DispatchClass::Normal,
                pays_fee: Pays::Yes,
            },
        };

        let mut bytes = Compact(1u32).encode();
        bytes.extend(encode_record(&Phase::ApplyExtrinsic(2), 0, failed.encode()));

        let events = decode_block_events(&bytes, BRIDGE_INDEX).unwrap();
        match &events[0].detail {
            EventDetail::System(SystemEvent::ExtrinsicFailed { dispatch_error, .. }) => {
                match dispatch_error {
                    DispatchError::Module(module) => {
                        assert_eq!(module.raw_bytes(), [0, 1, 5, 0, 0]);
                    }
                    other => panic!("unexpected dispatch error: {other:?}"),
                }
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_header_block_number() {
        let header = Header {
            parent_hash: "0x00".into(),
            number: "0x2a".into(),
            state_root: "0x00".into(),
            extrinsics_root: "0x00".into(),
        };
        assert_eq!(header.block_number().unwrap(), 42);
    }
}
