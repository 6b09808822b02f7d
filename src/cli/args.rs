//! Defines the command-line arguments for the tester CLI.
//!
//! This module uses the `clap` crate with its "derive" feature to create a
//! declarative and type-safe argument parsing structure. Single-letter flags
//! can be combined, as in `tester -riq suite`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::config::{Flags, RunConfig};

/// The main CLI argument structure.
#[derive(Debug, Parser)]
#[command(
    name = "tester",
    version,
    about = "Runs nested regression test suites and compares their output with accepted results."
)]
pub struct TesterArgs {
    /// Names of the suites to run; each is read from <HOME>/<SUITE>/tests.
    /// Every suite under HOME is run when none are given.
    pub suites: Vec<String>,

    /// Working directory for test commands.
    #[arg(short = 'w', long, value_name = "DIR")]
    pub working_dir: Option<PathBuf>,

    /// Run the tests (without this, previously captured outputs are checked).
    #[arg(short = 'r', long)]
    pub run: bool,

    /// Ask whether to accept new outputs as the expected results.
    #[arg(short = 'i', long)]
    pub interactive: bool,

    /// Do not print test context during interaction.
    #[arg(short = 'c', long)]
    pub no_context: bool,

    /// Quiet; do not print test progress messages.
    #[arg(short = 'q', long)]
    pub quiet: bool,

    /// Do not print test failed messages.
    #[arg(short = 'f', long)]
    pub no_failures: bool,

    /// Do not print test set summaries.
    #[arg(short = 's', long)]
    pub no_summary: bool,

    /// Directory containing the suite directories.
    #[arg(long, value_name = "DIR", default_value = ".")]
    pub home: PathBuf,

    /// Directory holding the expected outputs.
    #[arg(long, value_name = "DIR", default_value = "expected")]
    pub expected: PathBuf,

    /// Directory receiving the actual outputs.
    #[arg(long, value_name = "DIR", default_value = "actual")]
    pub actual: PathBuf,

    /// Print the parsed suites without running anything.
    #[arg(long)]
    pub list: bool,

    /// Format of the final report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// When to use colors.
    #[arg(long, value_enum, default_value_t = ColorMode::Auto)]
    pub color: ColorMode,
}

/// Format of the report printed after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Color selection for console output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorMode {
    Auto,
    Always,
    Never,
}

impl TesterArgs {
    pub fn flags(&self) -> Flags {
        Flags {
            execute: self.run,
            interactive: self.interactive,
            suppress_progress: self.quiet,
            suppress_summary: self.no_summary,
            suppress_failure: self.no_failures,
            suppress_context: self.no_context,
        }
    }

    pub fn config(&self) -> RunConfig {
        RunConfig {
            working_dir: self.working_dir.clone(),
            expected_root: self.expected.clone(),
            actual_root: self.actual.clone(),
            flags: self.flags(),
        }
    }
}
