//! The tester Command-Line Interface.
//!
//! This module is the main entry point for the binary and orchestrates the
//! core library functions: parse every requested suite, run them one after the
//! other, and report the results.

use std::process;

use clap::Parser;
use serde::Serialize;
use termcolor::ColorChoice;

use crate::cli::args::{ColorMode, OutputFormat, TesterArgs};
use crate::cli::output::{indent, Channel, ConsoleReporter, Reporter};
use crate::config::RunConfig;
use crate::discovery::discover_suites;
use crate::errors::TesterError;
use crate::files;
use crate::runner::{ConsolePrompt, Reconciler, Runner, Tally};
use crate::syntax::read_suite;
use crate::tree::{Suite, TestNode};

pub mod args;
pub mod output;

/// Exit status when any case failed.
const EXIT_FAILED: i32 = 1;

/// Exit status for fatal errors.
const EXIT_FATAL: i32 = 2;

/// Result of one root suite.
#[derive(Debug, Clone, Serialize)]
pub struct SuiteReport {
    pub name: String,
    pub passed: usize,
    pub total: usize,
}

/// Results of a whole invocation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    pub suites: Vec<SuiteReport>,
    pub passed: usize,
    pub total: usize,
}

impl RunReport {
    fn push(&mut self, name: &str, tally: Tally) {
        self.suites.push(SuiteReport {
            name: name.to_string(),
            passed: tally.passed,
            total: tally.total,
        });
        self.passed += tally.passed;
        self.total += tally.total;
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

/// The main entry point for the CLI.
pub fn run() {
    let args = TesterArgs::parse();
    let mut reporter = match args.color {
        ColorMode::Auto => ConsoleReporter::auto(),
        ColorMode::Always => ConsoleReporter::new(ColorChoice::Always),
        ColorMode::Never => ConsoleReporter::new(ColorChoice::Never),
    };

    let mut prompt = ConsolePrompt::stdio();

    match execute(&args, &mut reporter, &mut prompt) {
        Ok(report) if report.all_passed() => {}
        Ok(_) => process::exit(EXIT_FAILED),
        Err(e) => {
            let report = miette::Report::new(e);
            eprintln!("{report:?}");
            process::exit(EXIT_FATAL);
        }
    }
}

/// Runs an invocation described by `args`, reporting through `reporter` and
/// asking `reconciler` whenever outputs could be accepted.
pub fn execute(
    args: &TesterArgs,
    reporter: &mut dyn Reporter,
    reconciler: &mut dyn Reconciler,
) -> Result<RunReport, TesterError> {
    let config = args.config();
    let names = if args.suites.is_empty() {
        discover_suites(&args.home)?
    } else {
        args.suites.clone()
    };

    // Parse everything first so that no test runs when any description is broken.
    let mut suites = names
        .iter()
        .map(|name| read_suite(&args.home, name))
        .collect::<Result<Vec<_>, _>>()?;

    if args.list {
        for suite in &suites {
            list_suite(reporter, suite, 0);
        }
        return Ok(RunReport::default());
    }

    prepare(&config)?;
    let mut report = RunReport::default();
    {
        let mut runner = Runner::new(&config, reporter, reconciler);
        for suite in &mut suites {
            let tally = runner.run(suite);
            report.push(suite.name(), tally);
        }
    }

    match args.format {
        OutputFormat::Text => {
            if report.suites.len() > 1 && !config.flags.suppress_summary {
                reporter.message(
                    Channel::Summary,
                    0,
                    &format!("Overall: passed {} of {} tests", report.passed, report.total),
                );
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(report)
}

/// Checks the working directory and creates the output roots.
fn prepare(config: &RunConfig) -> Result<(), TesterError> {
    if let Some(dir) = &config.working_dir {
        if !dir.is_dir() {
            return Err(TesterError::WorkingDirectory { path: dir.clone() });
        }
    }
    for root in [&config.expected_root, &config.actual_root] {
        if !files::ensure_dir(root) {
            return Err(TesterError::Directory { path: root.clone() });
        }
    }
    Ok(())
}

/// Prints a suite tree: explanatory text, then one line per test.
fn list_suite(reporter: &mut dyn Reporter, suite: &Suite, depth: usize) {
    reporter.message(
        Channel::Summary,
        depth,
        &format!("{} ({} tests)", suite.name(), suite.size()),
    );
    let explain: Vec<String> = suite
        .explain()
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| indent(depth + 1, line.trim()))
        .collect();
    reporter.display(&explain);
    for child in suite.children() {
        match child {
            TestNode::Suite(nested) => list_suite(reporter, nested, depth + 1),
            TestNode::Exec(case) => reporter.message(
                Channel::Progress,
                depth + 1,
                &format!("exec {}: {}", case.name, case.command),
            ),
            TestNode::Code(case) => reporter.message(
                Channel::Progress,
                depth + 1,
                &format!("code {}: {}", case.file_name(), case.command),
            ),
        }
    }
}
