//! TOML transcoding: convert CFGL values to TOML text.
//!
//! Mapping from CFGL to TOML:
//!   - Value::Integer  -> TOML integer
//!   - Value::Float    -> TOML float
//!   - Value::Text     -> TOML string
//!   - Value::Mapping  -> TOML table
//!
//! Lossy edges:
//!   - TOML writes a table's plain values before its sub-tables, so a nested
//!     mapping that precedes a scalar entry moves after it.
//!   - TOML requires the top-level value to be a table; CFGL documents always
//!     are, but a bare scalar errors.

use libcfgl::Value;
use toml_edit::DocumentMut;

/// Encode a CFGL Value as a TOML string.
pub fn encode(value: &Value) -> Result<String, String> {
    match value {
        Value::Mapping(_) => match value_to_toml(value)? {
            toml_edit::Item::Table(table) => {
                let mut doc = DocumentMut::new();
                for (key, item) in table.iter() {
                    doc[key] = item.clone();
                }
                Ok(doc.to_string())
            }
            _ => Err("Internal error: expected table".to_string()),
        },
        _ => Err("TOML requires the top-level value to be a table".to_string()),
    }
}

fn value_to_toml(value: &Value) -> Result<toml_edit::Item, String> {
    match value {
        Value::Integer(n) => Ok(toml_edit::Item::Value(toml_edit::Value::Integer(
            toml_edit::Formatted::new(*n),
        ))),
        Value::Float(f) => {
            if !f.is_finite() {
                return Err(format!("TOML float {} cannot come from CFGL", f));
            }
            Ok(toml_edit::Item::Value(toml_edit::Value::Float(
                toml_edit::Formatted::new(*f),
            )))
        }
        Value::Text(s) => Ok(toml_edit::Item::Value(toml_edit::Value::String(
            toml_edit::Formatted::new(s.clone()),
        ))),
        Value::Mapping(map) => {
            let mut table = toml_edit::Table::new();
            for (k, v) in map {
                table.insert(k, value_to_toml(v)?);
            }
            Ok(toml_edit::Item::Table(table))
        }
    }
}
