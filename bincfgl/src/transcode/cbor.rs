//! CBOR transcoding: convert CFGL values to CBOR binary data, and render
//! CBOR as diagnostic notation (RFC 8949 §8).
//!
//! CFGL integers become CBOR integers in their shortest head, floats are
//! always float64, text becomes a definite-length text string, and mappings
//! become definite-length maps with text keys in insertion order.

use ciborium::value::Value as CborValue;
use libcfgl::Value;
use std::fmt::Write as _;

const MAJOR_UNSIGNED: u8 = 0;
const MAJOR_NEGATIVE: u8 = 1;
const MAJOR_TEXT: u8 = 3;
const MAJOR_MAP: u8 = 5;
/// Major type 7 with additional info 27.
const FLOAT64: u8 = 0xfb;

/// Encode a CFGL Value as CBOR bytes.
///
/// Bytes are written by hand: ciborium shrinks floats to half or single
/// precision when lossless, which would lose the float64 width CFGL promises.
pub fn encode(value: &Value) -> Vec<u8> {
    let mut out = Vec::new();
    push_value(&mut out, value);
    out
}

fn push_value(out: &mut Vec<u8>, value: &Value) {
    match value {
        Value::Integer(n) if *n >= 0 => push_head(out, MAJOR_UNSIGNED, *n as u64),
        // -1 - n fits in u64 for every negative i64.
        Value::Integer(n) => push_head(out, MAJOR_NEGATIVE, (-1 - *n) as u64),
        Value::Float(f) => {
            out.push(FLOAT64);
            out.extend(f.to_bits().to_be_bytes());
        }
        Value::Text(s) => push_text(out, s),
        Value::Mapping(map) => {
            push_head(out, MAJOR_MAP, map.len() as u64);
            for (key, item) in map {
                push_text(out, key);
                push_value(out, item);
            }
        }
    }
}

fn push_text(out: &mut Vec<u8>, s: &str) {
    push_head(out, MAJOR_TEXT, s.len() as u64);
    out.extend_from_slice(s.as_bytes());
}

/// Initial byte plus the argument in the fewest following bytes
/// (none below 24, then 1, 2, 4, or 8).
fn push_head(out: &mut Vec<u8>, major: u8, arg: u64) {
    let major = major << 5;
    if arg < 24 {
        out.push(major | arg as u8);
        return;
    }
    let width: usize = match arg {
        0..=0xff => 1,
        0x100..=0xffff => 2,
        0x1_0000..=0xffff_ffff => 4,
        _ => 8,
    };
    let info = 24 + width.trailing_zeros() as u8;
    out.push(major | info);
    out.extend_from_slice(&arg.to_be_bytes()[8 - width..]);
}

/// Render CBOR bytes as diagnostic notation.
///
/// Works from the decoded wire bytes rather than the CFGL tree, so the output
/// reflects exactly what [`encode`] produced.
pub fn diagnostic(input: &[u8]) -> Result<String, String> {
    let decoded: CborValue =
        ciborium::de::from_reader(input).map_err(|e| format!("CBOR decode error: {}", e))?;
    let mut out = String::new();
    render(&mut out, &decoded, 0);
    out.push('\n');
    Ok(out)
}

fn render(out: &mut String, value: &CborValue, depth: usize) {
    match value {
        CborValue::Integer(n) => {
            let _ = write!(out, "{}", i128::from(*n));
        }
        CborValue::Float(f) => out.push_str(&float_notation(*f)),
        CborValue::Text(s) => quote(out, s),
        CborValue::Map(entries) if entries.is_empty() => out.push_str("{}"),
        CborValue::Map(entries) => {
            let pad = "  ".repeat(depth + 1);
            out.push_str("{\n");
            let last = entries.len() - 1;
            for (i, (key, item)) in entries.iter().enumerate() {
                out.push_str(&pad);
                render(out, key, depth + 1);
                out.push_str(": ");
                render(out, item, depth + 1);
                out.push_str(if i == last { "\n" } else { ",\n" });
            }
            out.push_str(&"  ".repeat(depth));
            out.push('}');
        }
        // Never produced by `encode`.
        other => {
            let _ = write!(out, "<?{:?}>", other);
        }
    }
}

/// Diagnostic floats always show a fractional part, so `2.0` never reads as
/// the integer `2`.
fn float_notation(f: f64) -> String {
    let s = format!("{:?}", f);
    if s.contains(['.', 'e', 'N', 'i']) {
        s
    } else {
        format!("{}.0", s)
    }
}

fn quote(out: &mut String, s: &str) {
    out.push('"');
    for ch in s.chars() {
        match ch {
            '"' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04x}", c as u32);
            }
            c => out.push(c),
        }
    }
    out.push('"');
}
