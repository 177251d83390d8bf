//! JSON transcoding: render NEON values as JSON text.
//!
//! Mapping from NEON to JSON:
//!   - Value::Null      -> null
//!   - Value::Bool      -> true / false
//!   - Value::Integer   -> number (if it fits in i64 or u64, otherwise error)
//!   - Value::Float     -> number (NaN and infinities error; JSON has neither)
//!   - Value::String    -> string
//!   - Value::Sequence  -> array
//!   - Value::Mapping   -> object, in document order, keys as display text

use libneon::Value;
use num_traits::ToPrimitive;
use serde_json::{Map, Number, Value as JsonValue};

/// Encode a NEON value as pretty-printed JSON.
pub fn encode(value: &Value) -> Result<String, String> {
    let json = value_to_json(value)?;
    serde_json::to_string_pretty(&json).map_err(|e| format!("JSON encode error: {}", e))
}

fn value_to_json(value: &Value) -> Result<JsonValue, String> {
    match value {
        Value::Null => Ok(JsonValue::Null),
        Value::Bool(b) => Ok(JsonValue::Bool(*b)),
        Value::Integer(n) => {
            if let Some(i) = n.to_i64() {
                Ok(JsonValue::from(i))
            } else if let Some(u) = n.to_u64() {
                Ok(JsonValue::from(u))
            } else {
                Err(format!("Integer {} too large for JSON", n))
            }
        }
        Value::Float(f) => Number::from_f64(*f)
            .map(JsonValue::Number)
            .ok_or_else(|| format!("JSON has no representation for {}", f)),
        Value::String(s) => Ok(JsonValue::String(s.clone())),
        Value::Sequence(items) => items
            .iter()
            .map(value_to_json)
            .collect::<Result<Vec<_>, _>>()
            .map(JsonValue::Array),
        Value::Mapping(map) => {
            let mut obj = Map::new();
            for (k, v) in map {
                obj.insert(k.to_string(), value_to_json(v)?);
            }
            Ok(JsonValue::Object(obj))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_document_order() {
        let doc = libneon::decode("b: 1\na: [x, 2.5, null]\n1: true").unwrap();
        let json = encode(&Value::Mapping(doc)).unwrap();
        let compact: String = json.split_whitespace().collect();
        assert_eq!(compact, r#"{"b":1,"a":["x",2.5,null],"1":true}"#);
    }

    #[test]
    fn test_rejects_infinity() {
        assert!(encode(&Value::Float(f64::INFINITY)).is_err());
    }
}
