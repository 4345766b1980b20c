pub mod jsonrpc;
pub mod rest;
