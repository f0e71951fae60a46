//! Tolerant deserializers for upstream payloads.
//!
//! The trail service is schemaless JSON produced by another system. A single
//! malformed field must degrade that field (NaN, `false`, empty string), never
//! fail the whole payload.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// JavaScript-style truthiness: `true`, non-zero numbers and non-empty strings.
pub(crate) fn truthy<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Null => false,
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0 && !x.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    })
}

/// JavaScript `Number(x)` coercion: `null` and `""` are 0, booleans are 0/1,
/// numeric strings parse, anything else is NaN. An absent field never reaches
/// this function and keeps its NaN default.
pub(crate) fn number<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::Null => 0.0,
        Value::Bool(b) => f64::from(u8::from(b)),
        Value::String(ref s) if s.trim().is_empty() => 0.0,
        _ => value_as_f64(&v).unwrap_or(f64::NAN),
    })
}

/// Prices are used uncoerced: only a JSON number is a price.
pub(crate) fn price<'de, D: Deserializer<'de>>(d: D) -> Result<f64, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(v.as_f64().unwrap_or(f64::NAN))
}

/// Epoch-millisecond timestamp; `None` when absent or unparseable.
pub(crate) fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    let v = Value::deserialize(d)?;
    if let Some(i) = v.as_i64() {
        return Ok(Some(i));
    }
    Ok(value_as_f64(&v)
        .filter(|x| x.is_finite())
        .map(|x| x.trunc() as i64))
}

/// String or `null`; other JSON types become an empty string.
pub(crate) fn string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    let v = Value::deserialize(d)?;
    Ok(match v {
        Value::String(s) => s,
        _ => String::new(),
    })
}

/// Flag object; `null`, non-objects and broken objects all read as "no flags".
pub(crate) fn flags<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<super::SignalFlags, D::Error> {
    let v = Value::deserialize(d)?;
    match v {
        Value::Object(_) => Ok(serde_json::from_value(v).unwrap_or_default()),
        _ => Ok(super::SignalFlags::default()),
    }
}

fn value_as_f64(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
