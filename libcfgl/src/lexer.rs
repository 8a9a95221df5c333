//! Phase 2: Line Classifier
//!
//! Every scan line falls into exactly one `LineKind`. The parser dispatches
//! on the kind and only then applies the stricter pattern for that rule, so a
//! malformed declaration is reported as a declaration error rather than as a
//! bad entry.

/// Kind of a single scanned line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Empty after trimming.
    Blank,
    /// Starts with `*>`.
    Comment,
    /// Starts with `def` (and is not an entry whose key begins with `def`).
    Declaration,
    /// Exactly `{`.
    OpenBrace,
    /// Starts with `}`; only `}` and `}.` are well formed.
    CloseBrace,
    /// Anything else, validated as `key -> value.` or `key -> {`.
    Entry,
}

impl LineKind {
    /// Lines the readers step over without effect.
    pub fn is_skippable(self) -> bool {
        matches!(self, LineKind::Blank | LineKind::Comment)
    }
}

/// Classify a trimmed line.
pub fn classify(text: &str) -> LineKind {
    if text.is_empty() {
        LineKind::Blank
    } else if text.starts_with("*>") {
        LineKind::Comment
    } else if text == "{" {
        LineKind::OpenBrace
    } else if text.starts_with('}') {
        LineKind::CloseBrace
    } else if text.starts_with("def") && !is_arrow_line(text) {
        LineKind::Declaration
    } else {
        LineKind::Entry
    }
}

/// Whether the line is `identifier ->` followed by anything.
fn is_arrow_line(text: &str) -> bool {
    let key_len = identifier_len(text);
    key_len > 0 && text[key_len..].trim_start().starts_with("->")
}

/// Length in bytes of the identifier at the start of `s`, or 0 if none.
pub fn identifier_len(s: &str) -> usize {
    let mut chars = s.char_indices();
    match chars.next() {
        Some((_, c)) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return 0,
    }
    chars
        .find(|(_, c)| !(c.is_ascii_alphanumeric() || *c == '_'))
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

/// Whether `s` is an identifier in its entirety.
pub fn is_identifier(s: &str) -> bool {
    !s.is_empty() && identifier_len(s) == s.len()
}
