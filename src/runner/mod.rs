//! Execution and reconciliation of a test tree.
//!
//! The runner walks a tree depth first. Each suite gets a directory of its own
//! under both the expected and the actual roots, so the on-disk layout mirrors
//! the tree. Leaves run their command, capture its output beside their
//! siblings', and compare it with the expected output. Failures stay local to
//! the node where they happen; every node reports a [`Tally`] to its parent.

pub mod case;
pub mod prompt;

use std::ops::{Add, AddAssign};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::cli::output::{Channel, Reporter};
use crate::config::RunConfig;
use crate::errors::Failure;
use crate::files;
use crate::tree::{Suite, TestNode};

pub use prompt::{AutoAccept, AutoReject, ConsolePrompt, Reconciler, Scripted};

// ============================================================================
// TALLY
// ============================================================================

/// Passed and total leaf counts for a node on one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub passed: usize,
    pub total: usize,
}

impl Tally {
    pub fn new(passed: usize, total: usize) -> Self {
        Self { passed, total }
    }

    /// The tally of a single case.
    pub fn case(passed: bool) -> Self {
        Self::new(usize::from(passed), 1)
    }

    pub fn failed(&self) -> usize {
        self.total - self.passed
    }

    pub fn all_passed(&self) -> bool {
        self.passed == self.total
    }
}

impl Add for Tally {
    type Output = Tally;

    fn add(self, other: Tally) -> Tally {
        Tally::new(self.passed + other.passed, self.total + other.total)
    }
}

impl AddAssign for Tally {
    fn add_assign(&mut self, other: Tally) {
        *self = *self + other;
    }
}

// ============================================================================
// RUNNER
// ============================================================================

/// Runs test trees against the directories of a [`RunConfig`].
pub struct Runner<'a> {
    config: &'a RunConfig,
    reporter: &'a mut dyn Reporter,
    reconciler: &'a mut dyn Reconciler,
}

impl<'a> Runner<'a> {
    pub fn new(
        config: &'a RunConfig,
        reporter: &'a mut dyn Reporter,
        reconciler: &'a mut dyn Reconciler,
    ) -> Self {
        Self {
            config,
            reporter,
            reconciler,
        }
    }

    /// Runs a root suite against the configured expected and actual roots.
    pub fn run(&mut self, suite: &mut Suite) -> Tally {
        let config = self.config;
        self.run_suite(
            suite,
            &config.expected_root,
            &config.actual_root,
            Path::new(""),
            0,
        )
    }

    /// Runs any node. `expected` and `actual` are the directories of the
    /// enclosing suite; `parent` is its display path.
    pub fn run_node(
        &mut self,
        node: &mut TestNode,
        expected: &Path,
        actual: &Path,
        parent: &Path,
        depth: usize,
    ) -> Tally {
        match node {
            TestNode::Suite(suite) => self.run_suite(suite, expected, actual, parent, depth),
            TestNode::Exec(case) => {
                let passed = self.run_exec(case, expected, actual, parent, depth);
                case.passed = passed;
                Tally::case(passed)
            }
            TestNode::Code(case) => {
                let passed = self.run_code(case, expected, actual, parent, depth);
                case.passed = passed;
                Tally::case(passed)
            }
        }
    }

    fn run_suite(
        &mut self,
        suite: &mut Suite,
        expected: &Path,
        actual: &Path,
        parent: &Path,
        depth: usize,
    ) -> Tally {
        let path = parent.join(suite.name());
        self.progress(
            depth,
            &format!(
                "Test set {} contains {} tests:",
                path.display(),
                suite.children().len()
            ),
        );
        suite.reset();

        let expected_dir = expected.join(suite.name());
        let actual_dir = actual.join(suite.name());
        if !files::ensure_dir(&expected_dir) || !files::ensure_dir(&actual_dir) {
            return self.abort_suite(suite, &path, depth, Failure::DirectoryAccess);
        }
        if let Some(conflict) = suite.name_conflict() {
            return self.abort_suite(suite, &path, depth, conflict);
        }

        let mut tally = Tally::default();
        for child in &mut suite.children {
            tally += self.run_node(child, &expected_dir, &actual_dir, &path, depth + 1);
            self.progress(0, "");
        }
        suite.record_passed(tally.passed);
        self.summary(
            depth,
            &format!(
                "{}: passed {} of {} tests",
                path.display(),
                tally.passed,
                tally.total
            ),
        );
        tally
    }

    fn abort_suite(
        &mut self,
        suite: &mut Suite,
        path: &Path,
        depth: usize,
        failure: Failure,
    ) -> Tally {
        suite.clear_results();
        self.failed(depth, &format!("Test set {}", path.display()), &failure);
        Tally::new(0, suite.size())
    }

    // ------------------------------------------------------------------------
    // Messages, gated by the run flags
    // ------------------------------------------------------------------------

    pub(crate) fn progress(&mut self, depth: usize, text: &str) {
        if !self.config.flags.suppress_progress {
            self.reporter.message(Channel::Progress, depth, text);
        }
    }

    pub(crate) fn passed(&mut self, depth: usize, path: &Path) {
        if !self.config.flags.suppress_progress {
            self.reporter
                .message(Channel::Pass, depth, &format!("PASSED {}", path.display()));
        }
    }

    pub(crate) fn failed(&mut self, depth: usize, what: &str, failure: &Failure) {
        if !self.config.flags.suppress_failure {
            self.reporter
                .message(Channel::Failure, depth, &format!("FAILED {}: {}", what, failure));
        }
    }

    pub(crate) fn summary(&mut self, depth: usize, text: &str) {
        if !self.config.flags.suppress_summary {
            self.reporter.message(Channel::Summary, depth, text);
        }
    }

    pub(crate) fn working_dir(&self) -> Option<PathBuf> {
        self.config.working_dir.clone()
    }
}
