//! CFGL parser implementation.
//!
//! CFGL is a small line-oriented configuration language: one top-level
//! mapping of `key -> value.` entries, with integers, floats, `[[text]]`,
//! nested mappings, and `def NAME = VALUE;` constants referenced as `|NAME|`.
//!
//! # Parsing Pipeline
//!
//! The parser operates in three phases:
//!
//! 1. **Scanner**: Splits source text into trimmed, numbered lines.
//!
//! 2. **Line Classifier**: Sorts each line into blank, comment, declaration,
//!    brace, or entry.
//!
//! 3. **Reader**: Recursive descent over the lines with an explicit cursor,
//!    resolving constants and assembling nested mappings.

mod constants;
mod encode;
mod error;
mod lexer;
mod parser;
mod scanner;
mod value;

pub use constants::ConstantTable;
pub use encode::encode;
pub use error::{Location, ParseError, Result};
pub use parser::Parser;
pub use value::{Mapping, Value};

/// Parse a CFGL document from a string.
///
/// # Example
///
/// ```
/// use libcfgl::parse;
///
/// let value = parse("{\n    port -> 8080.\n}.").unwrap();
/// assert_eq!(value.get("port").and_then(|v| v.as_integer()), Some(8080));
/// ```
pub fn parse(input: &str) -> Result<Value> {
    Parser::new().parse(input)
}

/// Parse a CFGL document from a string with a filename for error messages.
pub fn parse_with_filename(input: &str, filename: Option<&str>) -> Result<Value> {
    match filename {
        Some(name) => Parser::new().filename(name).parse(input),
        None => parse(input),
    }
}
