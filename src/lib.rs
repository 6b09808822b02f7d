//! Tester: a hierarchical regression-test runner.
//!
//! Test suites are described in plain text files (see [`syntax`]), parsed into
//! a tree of [`TestNode`]s, and executed by a [`Runner`] that captures each
//! case's output and compares it with previously accepted results.

pub use crate::config::{Flags, RunConfig};
pub use crate::errors::{Failure, ParseError, ParseErrorKind, TesterError};
pub use crate::runner::{Reconciler, Runner, Tally};
pub use crate::tree::{CodeCase, ExecCase, Suite, TestNode, MAX_NESTING, ROOT_FILE};

pub mod cli;
pub mod config;
pub mod discovery;
pub mod errors;
pub mod files;
pub mod runner;
pub mod syntax;
pub mod tree;
