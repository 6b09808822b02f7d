//! Tester Error Handling
//!
//! Two tiers of failure exist. Malformed test descriptions, missing suite files
//! and inaccessible roots are fatal: they surface as [`TesterError`] and abort
//! the invocation before anything runs. Everything that goes wrong while a node
//! executes is recoverable and is expressed as a [`Failure`], which the engine
//! reports and folds into the pass/fail tally.

use std::io;
use std::path::PathBuf;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

// ============================================================================
// PARSE ERRORS - Fatal problems in a description file
// ============================================================================

/// What went wrong while reading a description file.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("missing test name")]
    MissingName,
    #[error("missing command")]
    MissingCommand,
    #[error("text line is not part of a test case")]
    StrayText,
    #[error("expected start of test case")]
    ExpectedTestCase,
    #[error("input exceeds maximum test file nesting ({max} levels)")]
    NestingTooDeep { max: usize },
    #[error("test file \"{name}\" not found")]
    SuiteNotFound { name: String },
    #[error("cannot read test file \"{name}\": {reason}")]
    UnreadableSuite { name: String, reason: String },
}

/// A fatal error located at a specific line of a description file.
#[derive(Debug, Error, Diagnostic)]
#[error("error in \"{file}\", line {line}: {kind}")]
#[diagnostic(code(tester::parse))]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub file: String,
    pub line: usize,
    #[source_code]
    src: NamedSource<String>,
    #[label("here")]
    span: SourceSpan,
    #[help]
    help: Option<String>,
}

impl ParseError {
    /// Builds an error for `kind` covering `len` bytes at `offset` of `source`.
    pub fn new(
        kind: ParseErrorKind,
        file: impl Into<String>,
        source: &str,
        line: usize,
        offset: usize,
        len: usize,
    ) -> Self {
        let file = file.into();
        let help = help_for(&kind);
        Self {
            src: NamedSource::new(file.clone(), source.to_string()),
            span: (offset, len).into(),
            kind,
            file,
            line,
            help,
        }
    }
}

fn help_for(kind: &ParseErrorKind) -> Option<String> {
    let text = match kind {
        ParseErrorKind::MissingName => "names may only use letters, digits, '-' and '_'",
        ParseErrorKind::MissingCommand => "put the command on the same line as the test name",
        ParseErrorKind::StrayText => "only blank lines may follow a nested `tests:` entry",
        ParseErrorKind::ExpectedTestCase => {
            "start a test with `tests:`, `exec:` or `.<ext>:`"
        }
        ParseErrorKind::NestingTooDeep { .. } => "flatten some of the nested suites",
        ParseErrorKind::SuiteNotFound { .. } => {
            "each nested suite needs a directory containing a `tests` file"
        }
        ParseErrorKind::UnreadableSuite { .. } => return None,
    };
    Some(text.to_string())
}

// ============================================================================
// FATAL ERRORS - Everything that aborts an invocation
// ============================================================================

/// Errors that stop the whole invocation.
#[derive(Debug, Error, Diagnostic)]
pub enum TesterError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] Box<ParseError>),

    #[error("test file \"{}\" not found", path.display())]
    #[diagnostic(code(tester::io::suite_not_found))]
    SuiteNotFound {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("cannot read test file \"{}\"", path.display())]
    #[diagnostic(code(tester::io::unreadable_suite))]
    UnreadableSuite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unable to access or create folder \"{}\"", path.display())]
    #[diagnostic(code(tester::io::directory))]
    Directory { path: PathBuf },

    #[error("invalid working directory \"{}\"", path.display())]
    #[diagnostic(code(tester::io::working_directory))]
    WorkingDirectory { path: PathBuf },

    #[error("failed to search for suites: {0}")]
    #[diagnostic(code(tester::io::discovery))]
    Discovery(#[from] walkdir::Error),

    #[error("failed to write summary: {0}")]
    #[diagnostic(code(tester::output::json))]
    Json(#[from] serde_json::Error),
}

impl From<ParseError> for TesterError {
    fn from(error: ParseError) -> Self {
        TesterError::Parse(Box::new(error))
    }
}

// ============================================================================
// RECOVERABLE FAILURES - Scoped to a single node
// ============================================================================

/// Why a suite or case did not pass. Reported, never propagated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Failure {
    #[error("error with output directories")]
    DirectoryAccess,
    #[error("multiple subtests called \"{name}\"")]
    DuplicateName { name: String },
    #[error("subtest name \"{name}\" is reserved")]
    ReservedName { name: String },
    #[error("cannot access files for capturing output")]
    CaptureAccess,
    #[error("cannot write source file: {reason}")]
    SourceWrite { reason: String },
    #[error("cannot run command: {reason}")]
    Spawn { reason: String },
    #[error("cannot read captured output: {reason}")]
    CaptureRead { reason: String },
    #[error("missing expected outputs")]
    MissingExpected,
    #[error("cannot update expected outputs: {reason}")]
    BaselineUpdate { reason: String },
    #[error("test did not produce expected outputs")]
    OutputMismatch,
}
