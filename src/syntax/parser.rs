//! Recursive-descent parser for test description files.
//!
//! A description file starts with free explanatory text, followed by any
//! number of tests:
//!
//! ```text
//! Introductory text...
//! tests: nested          <- loads nested/tests relative to this file
//! exec: hello echo hello
//! context lines for the case
//! .c: prog cc -o prog    <- the lines below become prog.c
//! int main() { return 0; }
//! ```
//!
//! Files are obtained through a [`SuiteLoader`], so the parser can run against
//! in-memory descriptions as well as the file system.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{ParseError, ParseErrorKind, TesterError};
use crate::syntax::lexer::{Lexer, LineKind};
use crate::tree::{CodeCase, ExecCase, Suite, TestNode, MAX_NESTING, ROOT_FILE};

// ============================================================================
// LOADERS - Where description files come from
// ============================================================================

/// Supplies the text of the description file stored in a suite directory.
pub trait SuiteLoader {
    /// Reads `<dir>/tests`.
    fn load(&self, dir: &Path) -> io::Result<String>;
}

/// Reads description files from disk.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsLoader;

impl SuiteLoader for FsLoader {
    fn load(&self, dir: &Path) -> io::Result<String> {
        fs::read_to_string(dir.join(ROOT_FILE))
    }
}

/// Serves description files from memory, keyed by suite directory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLoader {
    files: HashMap<PathBuf, String>,
}

impl InMemoryLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the description for the suite stored in `dir`.
    pub fn with_suite(mut self, dir: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        self.files.insert(dir.into(), source.into());
        self
    }
}

impl SuiteLoader for InMemoryLoader {
    fn load(&self, dir: &Path) -> io::Result<String> {
        self.files.get(dir).cloned().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("no suite registered for {}", dir.display()),
            )
        })
    }
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Reads the suite `name` from `<parent>/<name>/tests` on disk.
pub fn read_suite(parent: &Path, name: &str) -> Result<Suite, TesterError> {
    read_suite_with(&FsLoader, parent, name)
}

/// Reads the suite `name` stored under `parent` through `loader`.
pub fn read_suite_with(
    loader: &dyn SuiteLoader,
    parent: &Path,
    name: &str,
) -> Result<Suite, TesterError> {
    let dir = parent.join(name);
    let source = loader.load(&dir).map_err(|source| {
        let path = dir.join(ROOT_FILE);
        if source.kind() == io::ErrorKind::NotFound {
            TesterError::SuiteNotFound { path, source }
        } else {
            TesterError::UnreadableSuite { path, source }
        }
    })?;
    let suite = Parser::new(loader, &dir, &source, 0).parse_suite(name)?;
    Ok(suite)
}

/// Parses a description held in memory. Nested suites resolve against `dir`.
pub fn parse_suite(
    loader: &dyn SuiteLoader,
    dir: &Path,
    name: &str,
    source: &str,
) -> Result<Suite, ParseError> {
    Parser::new(loader, dir, source, 0).parse_suite(name)
}

// ============================================================================
// PARSER
// ============================================================================

struct Parser<'a> {
    loader: &'a dyn SuiteLoader,
    dir: PathBuf,
    file: String,
    source: &'a str,
    lexer: Lexer<'a>,
    nesting: usize,
}

impl<'a> Parser<'a> {
    fn new(loader: &'a dyn SuiteLoader, dir: &Path, source: &'a str, nesting: usize) -> Self {
        Self {
            loader,
            dir: dir.to_path_buf(),
            file: dir.join(ROOT_FILE).display().to_string(),
            source,
            lexer: Lexer::new(source),
            nesting,
        }
    }

    fn error(&self, kind: ParseErrorKind) -> ParseError {
        let (offset, len) = self.lexer.span();
        ParseError::new(
            kind,
            self.file.clone(),
            self.source,
            self.lexer.line_no(),
            offset,
            len,
        )
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.lexer
            .advance()
            .map(|_| ())
            .map_err(|kind| self.error(kind))
    }

    fn kind(&self) -> &LineKind {
        &self.lexer.current().kind
    }

    /// Explanatory text followed by tests, up to the end of the file.
    fn parse_suite(mut self, name: &str) -> Result<Suite, ParseError> {
        let explain = self.read_text()?;
        let mut children = Vec::new();
        while !self.kind().is_end() {
            children.push(self.parse_test()?);
        }
        Ok(Suite::new(name, explain, children))
    }

    /// Consumes a run of text lines, leaving the lexer on the first line that
    /// is not text.
    fn read_text(&mut self) -> Result<Vec<String>, ParseError> {
        let mut lines = Vec::new();
        loop {
            self.advance()?;
            if !self.kind().is_text() {
                return Ok(lines);
            }
            lines.push(self.lexer.current().rest.clone());
        }
    }

    fn parse_test(&mut self) -> Result<TestNode, ParseError> {
        let line = self.lexer.current().clone();
        match line.kind {
            LineKind::Suite => {
                let suite = self.parse_nested(&line.name)?;
                loop {
                    self.advance()?;
                    if !self.kind().is_text() {
                        break;
                    }
                    if !self.lexer.current().is_blank() {
                        return Err(self.error(ParseErrorKind::StrayText));
                    }
                }
                Ok(TestNode::Suite(suite))
            }
            LineKind::Exec => {
                let command = self.command()?;
                let context = self.read_text()?;
                Ok(TestNode::Exec(ExecCase::new(line.name, command, context)))
            }
            LineKind::Code { extension } => {
                let command = self.command()?;
                let source = self.read_text()?;
                Ok(TestNode::Code(CodeCase::new(
                    line.name, extension, command, source,
                )))
            }
            LineKind::Text | LineKind::EndOfInput => {
                Err(self.error(ParseErrorKind::ExpectedTestCase))
            }
        }
    }

    fn parse_nested(&self, name: &str) -> Result<Suite, ParseError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.error(ParseErrorKind::NestingTooDeep { max: MAX_NESTING }));
        }
        let dir = self.dir.join(name);
        let source = self.loader.load(&dir).map_err(|e| {
            let kind = if e.kind() == io::ErrorKind::NotFound {
                ParseErrorKind::SuiteNotFound {
                    name: name.to_string(),
                }
            } else {
                ParseErrorKind::UnreadableSuite {
                    name: name.to_string(),
                    reason: e.to_string(),
                }
            };
            self.error(kind)
        })?;
        Parser::new(self.loader, &dir, &source, self.nesting + 1).parse_suite(name)
    }

    /// The command on the declaration line, without leading whitespace.
    fn command(&self) -> Result<String, ParseError> {
        let line = self.lexer.current();
        match line.first_non_whitespace() {
            Some(start) => Ok(line.rest[start..].to_string()),
            None => Err(self.error(ParseErrorKind::MissingCommand)),
        }
    }
}
