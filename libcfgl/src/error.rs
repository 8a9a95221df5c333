//! Error types for CFGL parsing.

use std::fmt;
use thiserror::Error;

/// Result type for CFGL parsing operations.
pub type Result<T> = std::result::Result<T, ParseError>;

/// Parse context carrying filename for error reporting.
#[derive(Clone, Debug, Default)]
pub struct ParseContext {
    pub filename: Option<String>,
}

impl ParseContext {
    /// Create a new parse context.
    pub fn new(filename: Option<&str>) -> Self {
        Self {
            filename: filename.map(String::from),
        }
    }

    /// Build the location of a 1-based line in the current document.
    pub fn location(&self, line: usize) -> Location {
        Location {
            line: Some(line),
            filename: self.filename.clone(),
        }
    }
}

/// Where an error was detected.
///
/// A bare `Location` renders as nothing; once a line (and optionally a
/// filename) is attached it renders as a message suffix.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Location {
    /// 1-based line number.
    pub line: Option<usize>,
    pub filename: Option<String>,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.line, &self.filename) {
            (Some(line), Some(name)) => write!(f, " at line {} of <{}>", line, name),
            (Some(line), None) => write!(f, " at line {}", line),
            (None, Some(name)) => write!(f, " in <{}>", name),
            (None, None) => Ok(()),
        }
    }
}

/// Error type for CFGL parsing.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Document content before any block that is neither a declaration nor `{`.
    #[error("expected opening brace '{{'{0}")]
    ExpectedOpeningBrace(Location),

    /// End of input reached inside a block.
    #[error("expected closing brace '}}'{0}")]
    UnterminatedMapping(Location),

    /// Content after the top-level block was closed.
    #[error("expected end of file after closing brace{0}")]
    ExpectedEndOfFile(Location),

    /// A line starting with `}` that is neither `}` nor `}.`.
    #[error("expected end of nested mapping with trailing period{0}")]
    MalformedClosingBrace(Location),

    /// Malformed `def NAME = VALUE;` line.
    #[error("invalid constant declaration{0}")]
    InvalidDeclaration(Location),

    /// Line matching neither `key -> value.` nor `key -> {`.
    #[error("invalid mapping entry{0}")]
    InvalidEntry(Location),

    /// `|NAME|` reference to a constant that was never declared in scope.
    #[error("undefined constant: {0}{1}")]
    UndefinedConstant(String, Location),

    /// Value token that is not text, mapping, reference, or a valid number.
    #[error("invalid number format: {0}{1}")]
    InvalidNumber(String, Location),

    /// Value the CFGL writer has no syntax for.
    #[error("cannot write {0} as CFGL")]
    Unwritable(String),
}

impl ParseError {
    /// Attach the line where the fault was detected.
    pub fn with_location(self, ctx: &ParseContext, line: usize) -> Self {
        let loc = ctx.location(line);
        match self {
            ParseError::ExpectedOpeningBrace(_) => ParseError::ExpectedOpeningBrace(loc),
            ParseError::UnterminatedMapping(_) => ParseError::UnterminatedMapping(loc),
            ParseError::ExpectedEndOfFile(_) => ParseError::ExpectedEndOfFile(loc),
            ParseError::MalformedClosingBrace(_) => ParseError::MalformedClosingBrace(loc),
            ParseError::InvalidDeclaration(_) => ParseError::InvalidDeclaration(loc),
            ParseError::InvalidEntry(_) => ParseError::InvalidEntry(loc),
            ParseError::UndefinedConstant(name, _) => ParseError::UndefinedConstant(name, loc),
            ParseError::InvalidNumber(token, _) => ParseError::InvalidNumber(token, loc),
            ParseError::Unwritable(what) => ParseError::Unwritable(what),
        }
    }

    /// Location attached to this error, if it has one.
    pub fn location(&self) -> Option<&Location> {
        match self {
            ParseError::ExpectedOpeningBrace(loc)
            | ParseError::UnterminatedMapping(loc)
            | ParseError::ExpectedEndOfFile(loc)
            | ParseError::MalformedClosingBrace(loc)
            | ParseError::InvalidDeclaration(loc)
            | ParseError::InvalidEntry(loc)
            | ParseError::UndefinedConstant(_, loc)
            | ParseError::InvalidNumber(_, loc) => Some(loc),
            ParseError::Unwritable(_) => None,
        }
    }

    /// 1-based line where the error was detected.
    pub fn line(&self) -> Option<usize> {
        self.location().and_then(|loc| loc.line)
    }
}
