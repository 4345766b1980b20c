/// Map the chain's error namespace byte to a Cosmos SDK codespace string.
pub fn codespace_name(index: u8) -> &'static str {
    match index {
        0 => "sdk",
        1 => "wasm",
        _ => "unknown",
    }
}

/// Decode a dispatch module error into a (codespace, code) pair.
///
/// Layout: `[pallet index, codespace, code, ..]` — the pallet byte is the
/// runtime's own namespacing and is not part of the Cosmos error identity.
pub fn decode_module_error(bytes: &[u8]) -> Option<(&'static str, u32)> {
    if bytes.len() < 3 {
        return None;
    }
    Some((codespace_name(bytes[1]), bytes[2] as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codespace_table() {
        assert_eq!(codespace_name(0), "sdk");
        assert_eq!(codespace_name(1), "wasm");
        assert_eq!(codespace_name(2), "unknown");
        assert_eq!(codespace_name(255), "unknown");
    }

    #[test]
    fn test_decode_module_error() {
        assert_eq!(decode_module_error(&[0x00, 0x01, 0x05]), Some(("wasm", 5)));
        assert_eq!(
            decode_module_error(&[0x2a, 0x00, 0x0d, 0x00, 0x00]),
            Some(("sdk", 13))
        );
    }

    #[test]
    fn test_decode_module_error_short_input() {
        assert_eq!(decode_module_error(&[0x00, 0x01]), None);
        assert_eq!(decode_module_error(&[]), None);
    }
}
