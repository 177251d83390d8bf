//! CBOR transcoding: render NEON values as CBOR bytes and as CBOR diagnostic
//! notation.
//!
//! Mapping from NEON to CBOR:
//!   - Value::Null      -> CBOR null (simple value 22)
//!   - Value::Bool      -> CBOR bool (simple values 20/21)
//!   - Value::Integer   -> CBOR integer (smallest encoding that fits)
//!   - Value::Float     -> CBOR float64 (always 9 bytes, never downgraded)
//!   - Value::String    -> CBOR text string (determinate length)
//!   - Value::Sequence  -> CBOR array (determinate length)
//!   - Value::Mapping   -> CBOR map (determinate length, document order)
//!
//! Map keys keep their scalar type. Integers outside CBOR's native range
//! (-2^64 to 2^64-1) produce an error rather than using bignum tags.

use ciborium::value::Value as CborValue;
use libneon::Value;
use num_bigint::{BigInt, Sign};
use num_traits::{One, ToPrimitive};
use std::fmt::{self, Write};

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_TEXT: u8 = 3;
const MAJOR_ARRAY: u8 = 4;
const MAJOR_MAP: u8 = 5;

const FALSE: u8 = 0xf4;
const TRUE: u8 = 0xf5;
const NULL: u8 = 0xf6;
const FLOAT64: u8 = 0xfb;

/// Encode a NEON value as CBOR bytes.
pub fn encode(value: &Value) -> Result<Vec<u8>, String> {
    let mut buf = Vec::new();
    write_value(&mut buf, value)?;
    Ok(buf)
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<(), String> {
    match value {
        Value::Null => buf.push(NULL),
        Value::Bool(b) => buf.push(if *b { TRUE } else { FALSE }),
        Value::Integer(n) => write_integer(buf, n)?,
        Value::Float(f) => {
            buf.push(FLOAT64);
            buf.extend_from_slice(&f.to_be_bytes());
        }
        Value::String(s) => {
            write_head(buf, MAJOR_TEXT, s.len() as u64);
            buf.extend_from_slice(s.as_bytes());
        }
        Value::Sequence(items) => {
            write_head(buf, MAJOR_ARRAY, items.len() as u64);
            for item in items {
                write_value(buf, item)?;
            }
        }
        Value::Mapping(map) => {
            write_head(buf, MAJOR_MAP, map.len() as u64);
            for (key, value) in map {
                write_value(buf, key)?;
                write_value(buf, value)?;
            }
        }
    }
    Ok(())
}

/// Write the initial byte of an item plus its argument in the fewest bytes:
/// inline below 24, then 1, 2, 4 or 8 following bytes (additional info 24-27).
fn write_head(buf: &mut Vec<u8>, major: u8, arg: u64) {
    let high = major << 5;
    if arg < 24 {
        buf.push(high | arg as u8);
    } else if let Ok(arg) = u8::try_from(arg) {
        buf.push(high | 24);
        buf.push(arg);
    } else if let Ok(arg) = u16::try_from(arg) {
        buf.push(high | 25);
        buf.extend_from_slice(&arg.to_be_bytes());
    } else if let Ok(arg) = u32::try_from(arg) {
        buf.push(high | 26);
        buf.extend_from_slice(&arg.to_be_bytes());
    } else {
        buf.push(high | 27);
        buf.extend_from_slice(&arg.to_be_bytes());
    }
}

/// Negative integers use major type 1 with argument `-1 - n`.
fn write_integer(buf: &mut Vec<u8>, n: &BigInt) -> Result<(), String> {
    let (major, arg) = match n.sign() {
        Sign::Minus => (MAJOR_NEGATIVE, (-n - BigInt::one()).to_u64()),
        _ => (MAJOR_UNSIGNED, n.to_u64()),
    };
    let arg = arg.ok_or_else(|| {
        format!(
            "integer {} exceeds CBOR's native integer range (-2^64 to 2^64-1)",
            n
        )
    })?;
    write_head(buf, major, arg);
    Ok(())
}

// ---------------------------------------------------------------------------
// Diagnostic Notation (RFC 8949 §8)
// ---------------------------------------------------------------------------

/// Render CBOR bytes as diagnostic notation.
///
/// The text is produced from the encoded bytes, so it shows exactly what
/// went on the wire.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let cbor: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    diag_value(&mut out, &cbor, 0).map_err(|e| e.to_string())?;
    out.push('\n');
    Ok(out)
}

fn diag_value(out: &mut String, value: &CborValue, indent: usize) -> fmt::Result {
    match value {
        CborValue::Null => out.write_str("null"),
        CborValue::Bool(b) => write!(out, "{}", b),
        CborValue::Integer(i) => write!(out, "{}", i128::from(*i)),
        CborValue::Float(f) => diag_float(out, *f),
        CborValue::Text(s) => diag_text(out, s),
        CborValue::Bytes(bytes) => {
            out.write_str("h'")?;
            for byte in bytes {
                write!(out, "{:02x}", byte)?;
            }
            out.write_char('\'')
        }
        CborValue::Array(items) => diag_array(out, items, indent),
        CborValue::Map(pairs) => diag_map(out, pairs, indent),
        CborValue::Tag(tag, inner) => {
            write!(out, "{}(", tag)?;
            diag_value(out, inner, indent)?;
            out.write_char(')')
        }
        other => write!(out, "<?unknown {:?}>", other),
    }
}

fn diag_float(out: &mut String, f: f64) -> fmt::Result {
    if f.is_nan() {
        out.write_str("NaN")
    } else if f.is_infinite() {
        out.write_str(if f > 0.0 { "Infinity" } else { "-Infinity" })
    } else {
        // Debug keeps a fraction or exponent on every finite float: 1.0, -0.0, 1e300
        write!(out, "{:?}", f)
    }
}

fn diag_text(out: &mut String, s: &str) -> fmt::Result {
    out.write_char('"')?;
    for ch in s.chars() {
        match ch {
            '"' => out.write_str("\\\"")?,
            '\\' => out.write_str("\\\\")?,
            '\n' => out.write_str("\\n")?,
            '\r' => out.write_str("\\r")?,
            '\t' => out.write_str("\\t")?,
            c if c.is_control() => write!(out, "\\u{:04x}", c as u32)?,
            c => out.write_char(c)?,
        }
    }
    out.write_char('"')
}

fn pad(out: &mut String, width: usize) {
    out.extend(std::iter::repeat(' ').take(width));
}

fn diag_array(out: &mut String, items: &[CborValue], indent: usize) -> fmt::Result {
    if items.is_empty() {
        return out.write_str("[]");
    }
    // Short runs of scalars stay on one line
    if items.len() <= 5 && items.iter().all(is_scalar) {
        out.write_char('[')?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                out.write_str(", ")?;
            }
            diag_value(out, item, indent)?;
        }
        return out.write_char(']');
    }
    out.write_str("[\n")?;
    for (i, item) in items.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, item, indent + 2)?;
        out.write_str(if i + 1 < items.len() { ",\n" } else { "\n" })?;
    }
    pad(out, indent);
    out.write_char(']')
}

fn diag_map(out: &mut String, pairs: &[(CborValue, CborValue)], indent: usize) -> fmt::Result {
    if pairs.is_empty() {
        return out.write_str("{}");
    }
    out.write_str("{\n")?;
    for (i, (key, value)) in pairs.iter().enumerate() {
        pad(out, indent + 2);
        diag_value(out, key, indent + 2)?;
        out.write_str(": ")?;
        diag_value(out, value, indent + 2)?;
        out.write_str(if i + 1 < pairs.len() { ",\n" } else { "\n" })?;
    }
    pad(out, indent);
    out.write_char('}')
}

fn is_scalar(value: &CborValue) -> bool {
    matches!(
        value,
        CborValue::Null
            | CborValue::Bool(_)
            | CborValue::Integer(_)
            | CborValue::Float(_)
            | CborValue::Text(_)
            | CborValue::Bytes(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_scalars() {
        assert_eq!(encode(&Value::Null).unwrap(), vec![0xf6]);
        assert_eq!(encode(&Value::from(10)).unwrap(), vec![0x0a]);
        assert_eq!(encode(&Value::from(500)).unwrap(), vec![0x19, 0x01, 0xf4]);
        assert_eq!(encode(&Value::from(-1)).unwrap(), vec![0x20]);
        assert_eq!(encode(&Value::from("a")).unwrap(), vec![0x61, b'a']);
    }

    #[test]
    fn test_float_is_never_downgraded() {
        let bytes = encode(&Value::Float(1.5)).unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 0xfb);
    }

    #[test]
    fn test_map_keeps_order_and_key_types() {
        let doc = libneon::decode("b: 1\n2: x").unwrap();
        let bytes = encode(&Value::Mapping(doc)).unwrap();
        assert_eq!(bytes, vec![0xa2, 0x61, b'b', 0x01, 0x02, 0x61, b'x']);
    }

    #[test]
    fn test_diagnostic() {
        let doc = libneon::decode("a: [1, 2.0, null]\nb: {}").unwrap();
        let bytes = encode(&Value::Mapping(doc)).unwrap();
        assert_eq!(
            diagnostic(&bytes).unwrap(),
            "{\n  \"a\": [1, 2.0, null],\n  \"b\": {}\n}\n"
        );
    }
}
