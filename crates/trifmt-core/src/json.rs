//! JSON decoding and encoding, backed by `serde_json` with `preserve_order`.
//!
//! JSON accepts any root value. The only value JSON cannot carry is a
//! non-finite float (reachable from YAML's `.nan` and `.inf`), which the
//! encoder rejects instead of silently writing `null`.

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::{strip_location, DecodeError, EncodeError, EncodeErrorKind, Position, Result};
use crate::format::Format;
use crate::options::{DecodeOptions, EncodeOptions};
use crate::value::{Mapping, Number, Path, Value};

/// Decode a JSON document. Object key order is kept; a repeated key keeps
/// its first position and its last value.
pub fn decode(input: &[u8], _options: &DecodeOptions) -> Result<Value, DecodeError> {
    let json: serde_json::Value = serde_json::from_slice(input).map_err(|e| {
        DecodeError::syntax(Format::Json, strip_location(&e.to_string()))
            .at(Position::from_line_column(input, e.line(), e.column()))
    })?;
    Ok(from_json(json))
}

fn from_json(json: serde_json::Value) -> Value {
    match json {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(b) => Value::Bool(b),
        serde_json::Value::Number(n) => Value::Number(from_json_number(&n)),
        serde_json::Value::String(s) => Value::String(s),
        serde_json::Value::Array(items) => {
            Value::Sequence(items.into_iter().map(from_json).collect())
        }
        serde_json::Value::Object(map) => {
            let mut mapping = Mapping::with_capacity(map.len());
            for (key, value) in map {
                mapping.insert(key, from_json(value));
            }
            Value::Mapping(mapping)
        }
    }
}

fn from_json_number(n: &serde_json::Number) -> Number {
    if let Some(i) = n.as_i64() {
        Number::Int(i)
    } else if let Some(u) = n.as_u64() {
        Number::UInt(u)
    } else {
        // Without arbitrary_precision every remaining number is an f64.
        Number::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Encode a value as JSON text followed by a newline.
///
/// Indentation follows [`EncodeOptions::indent`]; `0` yields compact output.
pub fn encode(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>, EncodeError> {
    let mut path = Path::default();
    let json = to_json(value, &mut path)?;

    let mut out = Vec::new();
    let written = if options.indent == 0 {
        serde_json::to_writer(&mut out, &json)
    } else {
        let indent = vec![b' '; options.indent];
        let mut ser =
            serde_json::Serializer::with_formatter(&mut out, PrettyFormatter::with_indent(&indent));
        json.serialize(&mut ser)
    };
    written.map_err(|e| {
        EncodeError::new(Format::Json, EncodeErrorKind::Serialization, e.to_string())
    })?;
    out.push(b'\n');
    Ok(out)
}

fn to_json<'a>(value: &'a Value, path: &mut Path<'a>) -> Result<serde_json::Value, EncodeError> {
    Ok(match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => serde_json::Value::Number(to_json_number(n, path)?),
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                path.push_index(i);
                out.push(to_json(item, path)?);
                path.pop();
            }
            serde_json::Value::Array(out)
        }
        Value::Mapping(mapping) => {
            let mut out = serde_json::Map::with_capacity(mapping.len());
            for (key, item) in mapping {
                path.push_key(key);
                out.insert(key.clone(), to_json(item, path)?);
                path.pop();
            }
            serde_json::Value::Object(out)
        }
    })
}

fn to_json_number(n: &Number, path: &Path<'_>) -> Result<serde_json::Number, EncodeError> {
    match *n {
        Number::Int(i) => Ok(i.into()),
        Number::UInt(u) => Ok(u.into()),
        Number::Float(f) => serde_json::Number::from_f64(f).ok_or_else(|| {
            EncodeError::new(
                Format::Json,
                EncodeErrorKind::UnsupportedValue,
                format!("non-finite number {n} at {path} has no JSON representation"),
            )
        }),
    }
}
