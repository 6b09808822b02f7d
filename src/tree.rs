//! The test tree.
//!
//! A parsed description is a tree of [`TestNode`]s: suites group other nodes,
//! and the leaves are runnable cases. Names double as file system segments in
//! the expected/actual trees, so siblings must have distinct names and none may
//! be [`ROOT_FILE`].

use std::cell::Cell;

use once_cell::unsync::OnceCell;

use crate::errors::Failure;

/// Name of the file holding a suite's own description inside its directory.
pub const ROOT_FILE: &str = "tests";

/// Maximum nesting depth of suites, counting the root suite as level zero.
pub const MAX_NESTING: usize = 6;

// ============================================================================
// NODES
// ============================================================================

/// A node of the test tree.
#[derive(Debug, Clone)]
pub enum TestNode {
    Suite(Suite),
    Exec(ExecCase),
    Code(CodeCase),
}

impl TestNode {
    pub fn name(&self) -> &str {
        match self {
            TestNode::Suite(suite) => &suite.name,
            TestNode::Exec(case) => &case.name,
            TestNode::Code(case) => &case.name,
        }
    }

    /// Number of leaf cases in this node.
    pub fn size(&self) -> usize {
        match self {
            TestNode::Suite(suite) => suite.size(),
            TestNode::Exec(_) | TestNode::Code(_) => 1,
        }
    }

    /// Number of leaf cases that passed on the most recent run.
    pub fn num_passed(&self) -> usize {
        match self {
            TestNode::Suite(suite) => suite.num_passed(),
            TestNode::Exec(case) => usize::from(case.passed),
            TestNode::Code(case) => usize::from(case.passed),
        }
    }

    pub fn as_suite(&self) -> Option<&Suite> {
        match self {
            TestNode::Suite(suite) => Some(suite),
            _ => None,
        }
    }

    /// Marks every leaf below (or at) this node as not passed.
    pub(crate) fn clear_results(&mut self) {
        match self {
            TestNode::Suite(suite) => suite.clear_results(),
            TestNode::Exec(case) => case.passed = false,
            TestNode::Code(case) => case.passed = false,
        }
    }
}

/// A named group of tests plus the introductory text of its description file.
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    explain: Vec<String>,
    pub(crate) children: Vec<TestNode>,
    size: OnceCell<usize>,
    passed: Cell<Option<usize>>,
}

impl Suite {
    pub fn new(name: impl Into<String>, explain: Vec<String>, children: Vec<TestNode>) -> Self {
        Self {
            name: name.into(),
            explain,
            children,
            size: OnceCell::new(),
            passed: Cell::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn explain(&self) -> &[String] {
        &self.explain
    }

    pub fn children(&self) -> &[TestNode] {
        &self.children
    }

    /// Total leaf count, computed once and cached.
    pub fn size(&self) -> usize {
        *self
            .size
            .get_or_init(|| self.children.iter().map(TestNode::size).sum())
    }

    /// Passed leaf count for the current run, recomputed from the children
    /// whenever it is unknown.
    pub fn num_passed(&self) -> usize {
        if let Some(passed) = self.passed.get() {
            return passed;
        }
        let passed = self.children.iter().map(TestNode::num_passed).sum();
        self.passed.set(Some(passed));
        passed
    }

    /// Forgets the pass count from a previous run.
    pub fn reset(&self) {
        self.passed.set(None);
    }

    pub(crate) fn record_passed(&self, passed: usize) {
        self.passed.set(Some(passed));
    }

    pub(crate) fn clear_results(&mut self) {
        for child in &mut self.children {
            child.clear_results();
        }
        self.passed.set(Some(0));
    }

    /// Checks the sibling-name invariants, returning the first violation.
    pub fn name_conflict(&self) -> Option<Failure> {
        for (i, child) in self.children.iter().enumerate() {
            if child.name() == ROOT_FILE {
                return Some(Failure::ReservedName {
                    name: child.name().to_string(),
                });
            }
            if self.children[i + 1..]
                .iter()
                .any(|other| other.name() == child.name())
            {
                return Some(Failure::DuplicateName {
                    name: child.name().to_string(),
                });
            }
        }
        None
    }
}

/// A case that runs a command line as is.
#[derive(Debug, Clone)]
pub struct ExecCase {
    pub name: String,
    pub command: String,
    /// Free text following the declaration, shown while reconciling.
    pub context: Vec<String>,
    pub(crate) passed: bool,
}

impl ExecCase {
    pub fn new(name: impl Into<String>, command: impl Into<String>, context: Vec<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            context,
            passed: false,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}

/// A case that writes a source file and passes its path to a command.
#[derive(Debug, Clone)]
pub struct CodeCase {
    pub name: String,
    /// Extension of the generated file, including the leading dot.
    pub extension: String,
    pub command: String,
    pub source: Vec<String>,
    pub(crate) passed: bool,
}

impl CodeCase {
    pub fn new(
        name: impl Into<String>,
        extension: impl Into<String>,
        command: impl Into<String>,
        source: Vec<String>,
    ) -> Self {
        Self {
            name: name.into(),
            extension: extension.into(),
            command: command.into(),
            source,
            passed: false,
        }
    }

    /// File name of the generated source file.
    pub fn file_name(&self) -> String {
        format!("{}{}", self.name, self.extension)
    }

    pub fn passed(&self) -> bool {
        self.passed
    }
}
