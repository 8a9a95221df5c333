//! Transcoders from CFGL values to other document formats.

pub mod cbor;
pub mod json;
pub mod toml;
pub mod yaml;
