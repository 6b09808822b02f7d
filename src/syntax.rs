//! Syntax module for test description files
//!
//! The lexer classifies lines; the parser turns classified lines into a
//! [`Suite`](crate::tree::Suite), loading nested suites as it goes.

pub mod lexer;
pub mod parser;

pub use lexer::{classify, is_name_char, Line, LineKind};
pub use parser::{read_suite, read_suite_with, FsLoader, InMemoryLoader, SuiteLoader};
