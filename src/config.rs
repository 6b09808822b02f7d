//! Run configuration.

use std::path::PathBuf;

/// Operating flags for a run. None of them change how outputs are compared;
/// they control whether commands run, whether the operator is asked, and which
/// messages are shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flags {
    /// Run the commands. Without it, previously captured outputs are checked.
    pub execute: bool,
    /// Offer to accept new outputs as expected results.
    pub interactive: bool,
    /// Hide progress and pass messages.
    pub suppress_progress: bool,
    /// Hide suite summaries.
    pub suppress_summary: bool,
    /// Hide failure messages.
    pub suppress_failure: bool,
    /// Hide case context while reconciling.
    pub suppress_context: bool,
}

/// Where a run executes commands and keeps its outputs.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Working directory for commands; the current directory when unset.
    pub working_dir: Option<PathBuf>,
    pub expected_root: PathBuf,
    pub actual_root: PathBuf,
    pub flags: Flags,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            working_dir: None,
            expected_root: PathBuf::from("expected"),
            actual_root: PathBuf::from("actual"),
            flags: Flags::default(),
        }
    }
}

impl RunConfig {
    /// A configuration rooted at the given expected/actual directories.
    pub fn with_roots(expected_root: impl Into<PathBuf>, actual_root: impl Into<PathBuf>) -> Self {
        Self {
            expected_root: expected_root.into(),
            actual_root: actual_root.into(),
            ..Self::default()
        }
    }

    pub fn flags(mut self, flags: Flags) -> Self {
        self.flags = flags;
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = Some(dir.into());
        self
    }
}
