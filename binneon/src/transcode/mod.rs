//! Renderers from decoded NEON documents into other data formats.
//!
//! NEON keys may be any scalar. Formats that only allow string keys use the
//! key's display text, so `1`, `true` and `null` become `"1"`, `"true"` and
//! `"null"`.

pub mod cbor;
pub mod json;
pub mod toml;
pub mod yaml;
