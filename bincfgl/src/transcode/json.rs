//! JSON transcoding: convert CFGL values to JSON text.
//!
//! Objects keep CFGL insertion order (`serde_json` is built with
//! `preserve_order`). Floats are always written with a fractional part so
//! they stay distinguishable from integers.

use libcfgl::Value;
use serde_json::{Map, Number};

/// Encode a CFGL Value as pretty-printed JSON.
pub fn encode(value: &Value) -> Result<String, String> {
    let json = value_to_json(value)?;
    serde_json::to_string_pretty(&json).map_err(|e| format!("JSON encode error: {}", e))
}

fn value_to_json(value: &Value) -> Result<serde_json::Value, String> {
    match value {
        Value::Integer(n) => Ok(serde_json::Value::Number(Number::from(*n))),
        Value::Float(f) => Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .ok_or_else(|| format!("JSON has no representation for {}", f)),
        Value::Text(s) => Ok(serde_json::Value::String(s.clone())),
        Value::Mapping(map) => {
            let mut obj = Map::new();
            for (k, v) in map {
                obj.insert(k.clone(), value_to_json(v)?);
            }
            Ok(serde_json::Value::Object(obj))
        }
    }
}
