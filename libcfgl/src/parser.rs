//! Phase 3: Recursive-Descent Reader
//!
//! The reader walks the scanned lines with an explicit cursor and builds the
//! value tree. It handles:
//! - The document driver: leading declarations, exactly one top-level block
//! - Blocks: entries, declarations, closing lines, anonymous nested blocks
//! - Values: `[[text]]`, `{ inline mappings }`, `|constant|` references, numbers
//!
//! Mappings nest in two ways with different constant scoping:
//! - Structural (`key -> {` on its own line) recurses into the same state, so
//!   constants flow freely in and out of the nested block.
//! - Inline (`key -> { ... }.`) runs a new state over a snapshot of the
//!   constant table; nothing declared inside is visible outside, and nothing
//!   declared outside afterwards is visible inside.

use crate::constants::ConstantTable;
use crate::error::{Location, ParseContext, ParseError, Result};
use crate::lexer::{classify, LineKind};
use crate::scanner::{scan, scan_embedded, ScanLine};
use crate::value::{Mapping, Value};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};

/// `def NAME = VALUE;`
static DECLARATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^def\s+([A-Za-z_][A-Za-z0-9_]*)\s*=\s*(.+);$").unwrap());

/// `key -> value.`
static ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*->\s*(.+)\.$").unwrap());

/// `key -> {`
static NESTED_ENTRY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)\s*->\s*\{$").unwrap());

static NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-?[0-9]+(\.[0-9]+)?$").unwrap());

/// Reusable CFGL parser.
///
/// Constants declared by a parse stay in the parser's table, so a parser can
/// be pre-seeded with [`Parser::with_constants`] and inspected afterwards with
/// [`Parser::constants`].
#[derive(Debug, Default)]
pub struct Parser {
    constants: ConstantTable,
    ctx: ParseContext,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing constant table.
    pub fn with_constants(constants: ConstantTable) -> Self {
        Self {
            constants,
            ctx: ParseContext::default(),
        }
    }

    /// Name the document in error messages.
    pub fn filename(mut self, name: &str) -> Self {
        self.ctx = ParseContext::new(Some(name));
        self
    }

    /// Parse a whole document into a top-level mapping.
    pub fn parse(&mut self, input: &str) -> Result<Value> {
        let constants = std::mem::take(&mut self.constants);
        let mut state = ParserState::new(scan(input), constants, &self.ctx, Closing::Required);
        debug!(lines = state.lines.len(), "parsing document");
        let result = state.parse_document();
        self.constants = state.into_constants();
        if let Ok(value) = &result {
            debug!(
                entries = value.as_mapping().map_or(0, |m| m.len()),
                constants = self.constants.len(),
                "parsed document"
            );
        }
        result
    }

    /// Constants visible at the end of the last parse.
    pub fn constants(&self) -> &ConstantTable {
        &self.constants
    }
}

/// How a state's blocks may end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Closing {
    /// Every block needs a `}` / `}.` line.
    Required,
    /// The braces were already stripped; running out of lines closes the
    /// outermost block. Blocks opened inside it still need a closing line.
    EndOfInput,
}

/// Lines, cursor, and constants of one parse scope.
struct ParserState<'c> {
    lines: Vec<ScanLine>,
    cursor: usize,
    constants: ConstantTable,
    ctx: &'c ParseContext,
    closing: Closing,
    /// Structural blocks currently open inside the outermost one.
    depth: usize,
}

impl<'c> ParserState<'c> {
    fn new(
        lines: Vec<ScanLine>,
        constants: ConstantTable,
        ctx: &'c ParseContext,
        closing: Closing,
    ) -> Self {
        Self {
            lines,
            cursor: 0,
            constants,
            ctx,
            closing,
            depth: 0,
        }
    }

    fn into_constants(self) -> ConstantTable {
        self.constants
    }

    fn current(&self) -> Option<&ScanLine> {
        self.lines.get(self.cursor)
    }

    fn advance(&mut self) {
        self.cursor += 1;
    }

    fn error_at(&self, err: ParseError, line: usize) -> ParseError {
        err.with_location(self.ctx, line)
    }

    fn last_line_num(&self) -> usize {
        self.lines.last().map_or(1, |l| l.line_num)
    }

    // ========================================================================
    // Driver
    // ========================================================================

    /// Declarations and comments, then exactly one block, then nothing.
    fn parse_document(&mut self) -> Result<Value> {
        while let Some(line) = self.current().cloned() {
            let kind = classify(&line.text);
            trace!(line = line.line_num, ?kind, "document line");
            match kind {
                LineKind::Blank | LineKind::Comment => self.advance(),
                LineKind::Declaration => self.read_declaration(&line)?,
                LineKind::OpenBrace => {
                    self.advance();
                    let root = self.read_block()?;
                    self.expect_end()?;
                    return Ok(Value::Mapping(root));
                }
                _ => match single_line_body(&line.text) {
                    Some(body) => {
                        let root = self.read_single_line_document(body, line.line_num)?;
                        self.advance();
                        self.expect_end()?;
                        return Ok(Value::Mapping(root));
                    }
                    None => {
                        return Err(self.error_at(
                            ParseError::ExpectedOpeningBrace(Location::default()),
                            line.line_num,
                        ))
                    }
                },
            }
        }
        Ok(Value::empty_mapping())
    }

    /// A whole document written as `{ ... }.` on one line. The body shares
    /// this state's constants.
    fn read_single_line_document(&mut self, body: &str, line_num: usize) -> Result<Mapping> {
        let constants = std::mem::take(&mut self.constants);
        let mut inner = ParserState::new(
            scan_embedded(body.trim(), line_num),
            constants,
            self.ctx,
            Closing::EndOfInput,
        );
        let root = inner.read_block();
        self.constants = inner.into_constants();
        root
    }

    /// Only blank and comment lines may follow the top-level block.
    fn expect_end(&mut self) -> Result<()> {
        while let Some(line) = self.current() {
            if !classify(&line.text).is_skippable() {
                return Err(self.error_at(
                    ParseError::ExpectedEndOfFile(Location::default()),
                    line.line_num,
                ));
            }
            self.advance();
        }
        Ok(())
    }

    // ========================================================================
    // Blocks
    // ========================================================================

    /// Read entries up to the closing line of the current block.
    fn read_block(&mut self) -> Result<Mapping> {
        let mut entries = Mapping::new();
        while let Some(line) = self.current().cloned() {
            let kind = classify(&line.text);
            trace!(line = line.line_num, ?kind, "block line");
            match kind {
                LineKind::Blank | LineKind::Comment => self.advance(),
                LineKind::Declaration => self.read_declaration(&line)?,
                LineKind::OpenBrace => {
                    // A bare `{` replaces this block: entries read so far are dropped.
                    debug!(
                        line = line.line_num,
                        dropped = entries.len(),
                        "anonymous nested block"
                    );
                    self.advance();
                    return self.read_block();
                }
                LineKind::CloseBrace => {
                    if line.text != "}" && line.text != "}." {
                        return Err(self.error_at(
                            ParseError::MalformedClosingBrace(Location::default()),
                            line.line_num,
                        ));
                    }
                    self.advance();
                    return Ok(entries);
                }
                LineKind::Entry => self.read_entry(&line, &mut entries)?,
            }
        }
        match (self.closing, self.depth) {
            (Closing::EndOfInput, 0) => Ok(entries),
            _ => Err(self.error_at(
                ParseError::UnterminatedMapping(Location::default()),
                self.last_line_num(),
            )),
        }
    }

    /// `def NAME = VALUE;` binds NAME in this state's table.
    fn read_declaration(&mut self, line: &ScanLine) -> Result<()> {
        let caps = DECLARATION.captures(&line.text).ok_or_else(|| {
            self.error_at(
                ParseError::InvalidDeclaration(Location::default()),
                line.line_num,
            )
        })?;
        let value = self.read_value(caps[2].trim(), line.line_num)?;
        debug!(
            name = &caps[1],
            line = line.line_num,
            kind = value.type_name(),
            "declared constant"
        );
        self.constants.declare(&caps[1], value);
        self.advance();
        Ok(())
    }

    /// `key -> value.` or the structural form `key -> {`.
    fn read_entry(&mut self, line: &ScanLine, entries: &mut Mapping) -> Result<()> {
        if let Some(caps) = ENTRY.captures(&line.text) {
            let value = self.read_value(caps[2].trim(), line.line_num)?;
            entries.insert(caps[1].to_string(), value);
            self.advance();
            return Ok(());
        }

        if let Some(caps) = NESTED_ENTRY.captures(&line.text) {
            debug!(key = &caps[1], line = line.line_num, "structural nesting");
            self.advance();
            self.depth += 1;
            let nested = self.read_block();
            self.depth -= 1;
            entries.insert(caps[1].to_string(), Value::Mapping(nested?));
            return Ok(());
        }

        Err(self.error_at(ParseError::InvalidEntry(Location::default()), line.line_num))
    }

    // ========================================================================
    // Values
    // ========================================================================

    /// Classify a trimmed value token by its delimiters.
    fn read_value(&self, token: &str, line_num: usize) -> Result<Value> {
        if token.starts_with("[[") && token.ends_with("]]") {
            return Ok(Value::Text(token[2..token.len() - 2].to_string()));
        }

        if token.starts_with('{') && token.ends_with('}') {
            return self.read_inline_mapping(&token[1..token.len() - 1], line_num);
        }

        if token.len() >= 2 && token.starts_with('|') && token.ends_with('|') {
            let name = token[1..token.len() - 1].trim();
            return self.constants.resolve(name).cloned().ok_or_else(|| {
                self.error_at(
                    ParseError::UndefinedConstant(name.to_string(), Location::default()),
                    line_num,
                )
            });
        }

        parse_number(token).ok_or_else(|| {
            self.error_at(
                ParseError::InvalidNumber(token.to_string(), Location::default()),
                line_num,
            )
        })
    }

    /// Parse `{ ... }` contents in a fresh state over a constant snapshot.
    fn read_inline_mapping(&self, body: &str, line_num: usize) -> Result<Value> {
        debug!(
            line = line_num,
            constants = self.constants.len(),
            "inline mapping literal"
        );
        let mut nested = ParserState::new(
            scan_embedded(body.trim(), line_num),
            self.constants.snapshot(),
            self.ctx,
            Closing::EndOfInput,
        );
        nested.read_block().map(Value::Mapping)
    }
}

/// Interior of a document line of the form `{ ... }` or `{ ... }.`.
fn single_line_body(text: &str) -> Option<&str> {
    let rest = text.strip_prefix('{')?;
    rest.strip_suffix("}.").or_else(|| rest.strip_suffix('}'))
}

/// Decimal integer or float; `.` selects a float.
fn parse_number(s: &str) -> Option<Value> {
    if !NUMBER.is_match(s) {
        return None;
    }
    if s.contains('.') {
        s.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(Value::Float)
    } else {
        s.parse::<i64>().ok().map(Value::Integer)
    }
}
