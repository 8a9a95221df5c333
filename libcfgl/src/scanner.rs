//! Phase 1: Scanner
//!
//! The scanner converts raw source text into scan lines. It performs:
//! - Line splitting (`\n`, with a trailing `\r` dropped)
//! - Whitespace trimming
//! - Line numbering for error reporting
//!
//! Nothing is filtered here. Blank and comment lines stay in the sequence so
//! that the parser's cursor and the reported line numbers agree.

/// A single line after the scanning phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanLine {
    /// Line content with surrounding whitespace removed.
    pub text: String,
    /// 1-based line number for error reporting.
    pub line_num: usize,
}

/// Scan a whole document into lines.
pub fn scan(source: &str) -> Vec<ScanLine> {
    scan_embedded(source, 1)
}

/// Scan the body of an inline mapping literal.
///
/// Embedded line `i` reports `origin_line + i`, so errors inside a literal
/// point back at the line the literal was written on.
pub fn scan_embedded(content: &str, origin_line: usize) -> Vec<ScanLine> {
    content
        .split('\n')
        .enumerate()
        .map(|(i, raw)| ScanLine {
            text: raw.strip_suffix('\r').unwrap_or(raw).trim().to_string(),
            line_num: origin_line + i,
        })
        .collect()
}
