//! YAML transcoding: render NEON values as YAML text.
//!
//! Mapping from NEON to YAML:
//!   - Value::Null      -> YAML null
//!   - Value::Bool      -> YAML bool
//!   - Value::Integer   -> YAML integer (arbitrary precision as string if > u64)
//!   - Value::Float     -> YAML float (including .nan, .inf, -.inf)
//!   - Value::String    -> YAML string
//!   - Value::Sequence  -> YAML sequence
//!   - Value::Mapping   -> YAML mapping, in document order
//!
//! Scalar keys stay typed: a NEON key `1` is the YAML integer key `1`.

use libneon::Value;
use num_traits::ToPrimitive;

/// Encode a NEON value as a YAML string.
pub fn encode(value: &Value) -> Result<String, String> {
    let yaml_value = value_to_yaml(value);
    serde_yaml::to_string(&yaml_value).map_err(|e| format!("YAML encode error: {}", e))
}

fn value_to_yaml(value: &Value) -> serde_yaml::Value {
    match value {
        Value::Null => serde_yaml::Value::Null,
        Value::Bool(b) => serde_yaml::Value::Bool(*b),
        Value::Integer(n) => {
            if let Some(i) = n.to_i64() {
                serde_yaml::Value::Number(i.into())
            } else if let Some(u) = n.to_u64() {
                serde_yaml::Value::Number(u.into())
            } else {
                // YAML has no arbitrary-precision integers
                serde_yaml::Value::String(n.to_string())
            }
        }
        Value::Float(f) => serde_yaml::Value::Number((*f).into()),
        Value::String(s) => serde_yaml::Value::String(s.clone()),
        Value::Sequence(items) => {
            serde_yaml::Value::Sequence(items.iter().map(value_to_yaml).collect())
        }
        Value::Mapping(map) => serde_yaml::Value::Mapping(
            map.iter()
                .map(|(k, v)| (value_to_yaml(k), value_to_yaml(v)))
                .collect(),
        ),
    }
}
