use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::{GatewayError, Result};
use crate::types::{Event, EventAttribute};

/// Byte encodings used at the transport boundaries.
///
/// Chain-side RPC payloads are hex, stored records are UTF-8, and the
/// CometBFT-style JSON-RPC surface carries base64.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Hex,
    Utf8,
    Base64,
}

/// Strip an optional `0x` prefix.
pub fn strip_hex_prefix(value: &str) -> &str {
    value.strip_prefix("0x").unwrap_or(value)
}

/// Re-encode a string value from one encoding to another.
/// A hex source may carry a `0x` prefix; it is stripped before decoding.
pub fn convert(value: &str, from: Encoding, to: Encoding) -> Result<String> {
    let bytes = match from {
        Encoding::Hex => hex::decode(strip_hex_prefix(value))
            .map_err(|e| GatewayError::Decode(format!("invalid hex value: {e}")))?,
        Encoding::Utf8 => value.as_bytes().to_vec(),
        Encoding::Base64 => BASE64
            .decode(value)
            .map_err(|e| GatewayError::Decode(format!("invalid base64 value: {e}")))?,
    };

    Ok(match to {
        Encoding::Hex => hex::encode(&bytes),
        Encoding::Utf8 => String::from_utf8_lossy(&bytes).into_owned(),
        Encoding::Base64 => BASE64.encode(&bytes),
    })
}

/// Re-encode every key/value pair of an attribute list.
/// Order and count are preserved exactly.
pub fn encode_attributes(
    attributes: &[EventAttribute],
    from: Encoding,
    to: Encoding,
) -> Result<Vec<EventAttribute>> {
    attributes
        .iter()
        .map(|attribute| {
            Ok(EventAttribute {
                key: convert(&attribute.key, from, to)?,
                value: convert(&attribute.value, from, to)?,
                index: attribute.index,
            })
        })
        .collect()
}

/// Re-encode the type string and all attributes of an event list.
pub fn encode_events(events: &[Event], from: Encoding, to: Encoding) -> Result<Vec<Event>> {
    events
        .iter()
        .map(|event| {
            Ok(Event {
                r#type: convert(&event.r#type, from, to)?,
                attributes: encode_attributes(&event.attributes, from, to)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_hex_to_utf8() {
        assert_eq!(
            convert("0x7472616e73666572", Encoding::Hex, Encoding::Utf8).unwrap(),
            "transfer"
        );
        assert_eq!(
            convert("7472616e73666572", Encoding::Hex, Encoding::Utf8).unwrap(),
            "transfer"
        );
    }

    #[test]
    fn test_convert_utf8_to_base64() {
        assert_eq!(
            convert("transfer", Encoding::Utf8, Encoding::Base64).unwrap(),
            "dHJhbnNmZXI="
        );
    }

    #[test]
    fn test_convert_rejects_bad_hex() {
        assert!(convert("0xzz", Encoding::Hex, Encoding::Utf8).is_err());
    }

    #[test]
    fn test_attributes_round_trip() {
        let attributes = vec![
            EventAttribute {
                key: hex::encode("sender"),
                value: hex::encode("cosmos1abc"),
                index: true,
            },
            EventAttribute {
                key: hex::encode("amount"),
                value: hex::encode("100stake"),
                index: true,
            },
        ];

        let utf8 = encode_attributes(&attributes, Encoding::Hex, Encoding::Utf8).unwrap();
        assert_eq!(utf8[0].key, "sender");
        assert_eq!(utf8[1].value, "100stake");

        let back = encode_attributes(&utf8, Encoding::Utf8, Encoding::Hex).unwrap();
        assert_eq!(back, attributes);
    }

    #[test]
    fn test_encode_events_preserves_order_and_count() {
        let events = vec![
            Event {
                r#type: hex::encode("message"),
                attributes: vec![EventAttribute {
                    key: hex::encode("action"),
                    value: hex::encode("send"),
                    index: true,
                }],
            },
            Event {
                r#type: hex::encode("transfer"),
                attributes: Vec::new(),
            },
        ];

        let converted = encode_events(&events, Encoding::Hex, Encoding::Utf8).unwrap();
        assert_eq!(converted.len(), 2);
        assert_eq!(converted[0].r#type, "message");
        assert_eq!(converted[0].attributes.len(), 1);
        assert_eq!(converted[1].r#type, "transfer");
        assert!(converted[1].attributes.is_empty());
    }
}
