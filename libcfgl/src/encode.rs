//! Encode values back to canonical CFGL.
//!
//! The canonical form is one construct per line: a top-level `{` ... `}.`
//! block, `key -> value.` entries, structural `key -> {` nesting for every
//! nested mapping, `[[...]]` text, and floats that always carry a decimal
//! point. Reading the output back yields the same tree.

use crate::error::{ParseError, Result};
use crate::lexer::is_identifier;
use crate::value::{Mapping, Value};

const INDENT: &str = "    ";

/// Encode a value as a CFGL document.
///
/// A mapping becomes a full document. Any other value is written as a bare
/// value token, which is only meaningful on the right-hand side of an entry.
pub fn encode(value: &Value) -> Result<String> {
    match value {
        Value::Mapping(map) => {
            let mut out = String::from("{\n");
            encode_entries(&mut out, map, 1)?;
            out.push_str("}.\n");
            Ok(out)
        }
        scalar => encode_scalar(scalar),
    }
}

fn encode_entries(out: &mut String, map: &Mapping, depth: usize) -> Result<()> {
    let pad = INDENT.repeat(depth);
    for (key, value) in map {
        if !is_identifier(key) {
            return Err(ParseError::Unwritable(format!("key {:?}", key)));
        }
        match value {
            Value::Mapping(nested) => {
                out.push_str(&format!("{}{} -> {{\n", pad, key));
                encode_entries(out, nested, depth + 1)?;
                out.push_str(&format!("{}}}.\n", pad));
            }
            scalar => {
                out.push_str(&format!("{}{} -> {}.\n", pad, key, encode_scalar(scalar)?));
            }
        }
    }
    Ok(())
}

fn encode_scalar(value: &Value) -> Result<String> {
    match value {
        Value::Integer(n) => Ok(n.to_string()),
        Value::Float(f) => encode_float(*f),
        Value::Text(s) => {
            if s.contains('\n') || s.contains('\r') {
                return Err(ParseError::Unwritable(
                    "text containing a line break".to_string(),
                ));
            }
            Ok(format!("[[{}]]", s))
        }
        Value::Mapping(map) if map.is_empty() => Ok("{}".to_string()),
        Value::Mapping(_) => Err(ParseError::Unwritable(
            "a non-empty mapping as a single token".to_string(),
        )),
    }
}

fn encode_float(f: f64) -> Result<String> {
    if !f.is_finite() {
        return Err(ParseError::Unwritable(format!("non-finite float {}", f)));
    }
    // Display never uses exponent notation for f64.
    let s = format!("{}", f);
    if s.contains('.') {
        Ok(s)
    } else {
        Ok(format!("{}.0", s))
    }
}
