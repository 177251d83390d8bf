//! TOML transcoding: render NEON documents as TOML text.
//!
//! Mapping from NEON to TOML:
//!   - Value::Null      -> error (TOML has no null)
//!   - Value::Bool      -> TOML boolean
//!   - Value::Integer   -> TOML integer (if fits in i64, otherwise error)
//!   - Value::Float     -> TOML float
//!   - Value::String    -> TOML string
//!   - Value::Sequence  -> TOML array
//!   - Value::Mapping   -> TOML table; inline table inside arrays
//!
//! Keys are the display text of the NEON key. The top-level value must be a
//! mapping, which every decoded document is.

use libneon::{Mapping, Value};
use num_traits::ToPrimitive;
use toml_edit::{Array, DocumentMut, InlineTable, Item, Table};

/// Encode a NEON value as a TOML string.
pub fn encode(value: &Value) -> Result<String, String> {
    match value {
        Value::Mapping(map) => {
            let mut doc = DocumentMut::new();
            for (key, value) in map {
                doc[key.to_string().as_str()] = value_to_item(value)?;
            }
            Ok(doc.to_string())
        }
        _ => Err("TOML requires the top-level value to be a table".to_string()),
    }
}

/// Mappings outside arrays become standard tables.
fn value_to_item(value: &Value) -> Result<Item, String> {
    match value {
        Value::Mapping(map) => {
            let mut table = Table::new();
            for (key, value) in map {
                table.insert(&key.to_string(), value_to_item(value)?);
            }
            Ok(Item::Table(table))
        }
        other => value_to_toml(other).map(Item::Value),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Value, String> {
    match value {
        Value::Null => Err("TOML has no null type".to_string()),
        Value::Bool(b) => Ok((*b).into()),
        Value::Integer(n) => n
            .to_i64()
            .map(toml_edit::Value::from)
            .ok_or_else(|| format!("Integer {} too large for TOML (i64)", n)),
        Value::Float(f) => Ok((*f).into()),
        Value::String(s) => Ok(s.as_str().into()),
        Value::Sequence(items) => {
            let mut array = Array::new();
            for item in items {
                array.push(value_to_toml(item)?);
            }
            Ok(toml_edit::Value::Array(array))
        }
        Value::Mapping(map) => inline_table(map).map(toml_edit::Value::InlineTable),
    }
}

fn inline_table(map: &Mapping) -> Result<InlineTable, String> {
    let mut table = InlineTable::new();
    for (key, value) in map {
        table.insert(&key.to_string(), value_to_toml(value)?);
    }
    Ok(table)
}
