//! Line classification for test description files.
//!
//! A description file is read one line at a time. Each line is either plain
//! text or a declaration that opens a new test: `tests:` for a nested suite,
//! `exec:` for a command case, and `.<ext>:` for a generated-source case.
//! Declarations are followed by the test name; whatever remains of the line is
//! kept for the parser to read the command from.

use crate::errors::ParseErrorKind;

/// Prefix of a nested suite declaration.
pub const SUITE_PREFIX: &str = "tests:";

/// Prefix of a command case declaration.
pub const EXEC_PREFIX: &str = "exec:";

/// Returns true for characters allowed in test names and file extensions.
pub fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Classification of a single input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineKind {
    Text,
    Suite,
    Exec,
    /// Carries the extension including its leading dot.
    Code { extension: String },
    EndOfInput,
}

impl LineKind {
    pub fn is_text(&self) -> bool {
        matches!(self, LineKind::Text)
    }

    pub fn is_end(&self) -> bool {
        matches!(self, LineKind::EndOfInput)
    }
}

/// A classified line. For declarations, `name` holds the extracted test name
/// and `rest` the unconsumed remainder; for text lines `rest` is the whole line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub kind: LineKind,
    pub name: String,
    pub rest: String,
}

impl Line {
    fn text(line: &str) -> Self {
        Self {
            kind: LineKind::Text,
            name: String::new(),
            rest: line.to_string(),
        }
    }

    fn end() -> Self {
        Self {
            kind: LineKind::EndOfInput,
            name: String::new(),
            rest: String::new(),
        }
    }

    /// Index of the first non-whitespace character of `rest`, if any.
    pub fn first_non_whitespace(&self) -> Option<usize> {
        self.rest.find(|c: char| !c.is_whitespace())
    }

    pub fn is_blank(&self) -> bool {
        self.first_non_whitespace().is_none()
    }
}

/// Classifies one line of text.
pub fn classify(line: &str) -> Result<Line, ParseErrorKind> {
    if let Some(rest) = line.strip_prefix(SUITE_PREFIX) {
        return declaration(LineKind::Suite, rest);
    }
    if let Some(rest) = line.strip_prefix(EXEC_PREFIX) {
        return declaration(LineKind::Exec, rest);
    }
    if let Some(after_dot) = line.strip_prefix('.') {
        let ext_len = after_dot
            .find(|c: char| !is_name_char(c))
            .unwrap_or(after_dot.len());
        if ext_len > 0 && after_dot[ext_len..].starts_with(':') {
            let extension = line[..ext_len + 1].to_string();
            return declaration(LineKind::Code { extension }, &after_dot[ext_len + 1..]);
        }
    }
    Ok(Line::text(line))
}

/// Splits `rest` into a test name and the remainder of the line.
fn declaration(kind: LineKind, rest: &str) -> Result<Line, ParseErrorKind> {
    let trimmed = rest.trim_start();
    let name_len = trimmed
        .find(|c: char| !is_name_char(c))
        .unwrap_or(trimmed.len());
    if name_len == 0 {
        return Err(ParseErrorKind::MissingName);
    }
    Ok(Line {
        kind,
        name: trimmed[..name_len].to_string(),
        rest: trimmed[name_len..].to_string(),
    })
}

// ============================================================================
// LEXER - Classifies a whole source, one line per advance
// ============================================================================

/// Walks a source text line by line, keeping the current classification along
/// with its line number and byte span for diagnostics.
#[derive(Debug)]
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line_no: usize,
    line_start: usize,
    line_len: usize,
    current: Line,
}

impl<'a> Lexer<'a> {
    /// Creates a lexer positioned before the first line.
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line_no: 0,
            line_start: 0,
            line_len: 0,
            current: Line::text(""),
        }
    }

    pub fn current(&self) -> &Line {
        &self.current
    }

    /// Line number of the current line (1-based; 0 before the first advance).
    pub fn line_no(&self) -> usize {
        self.line_no
    }

    /// Byte offset and length of the current line within the source.
    pub fn span(&self) -> (usize, usize) {
        (self.line_start, self.line_len)
    }

    /// Moves to the next line. Once the end has been reached the lexer stays
    /// there.
    pub fn advance(&mut self) -> Result<&Line, ParseErrorKind> {
        if self.current.kind.is_end() {
            return Ok(&self.current);
        }
        if self.offset >= self.source.len() {
            self.line_no += 1;
            self.line_start = self.source.len();
            self.line_len = 0;
            self.current = Line::end();
            return Ok(&self.current);
        }

        let remaining = &self.source[self.offset..];
        let raw_len = remaining.find('\n').map_or(remaining.len(), |i| i + 1);
        let raw = &remaining[..raw_len];
        let text = raw.strip_suffix('\n').unwrap_or(raw);
        let text = text.strip_suffix('\r').unwrap_or(text);

        self.line_no += 1;
        self.line_start = self.offset;
        self.line_len = text.len();
        self.offset += raw_len;
        self.current = classify(text)?;
        Ok(&self.current)
    }
}
