pub mod codespace;
pub mod encoding;

pub use codespace::{codespace_name, decode_module_error};
pub use encoding::{convert, encode_attributes, encode_events, strip_hex_prefix, Encoding};
