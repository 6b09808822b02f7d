//! Running a single case and reconciling its output.
//!
//! A case's standard output and standard error are captured as `<name>.out`
//! and `<name>.err` in the actual directory and compared with the files of the
//! same names in the expected directory.

use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use super::Runner;
use crate::cli::output::Channel;
use crate::errors::Failure;
use crate::files;
use crate::tree::{CodeCase, ExecCase};

/// Splits a command line on whitespace. Quotes have no special meaning.
pub fn tokenize(command: &str) -> Vec<String> {
    command.split_whitespace().map(str::to_string).collect()
}

/// Runs `argv` in `working_dir`, sending its output to the two capture files,
/// and waits for it to finish.
pub fn run_command(
    argv: &[String],
    working_dir: Option<&Path>,
    stdout: &Path,
    stderr: &Path,
) -> io::Result<ExitStatus> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "empty command"))?;
    let mut command = Command::new(program);
    command
        .args(args)
        .stdin(Stdio::null())
        .stdout(File::create(stdout)?)
        .stderr(File::create(stderr)?);
    if let Some(dir) = working_dir {
        command.current_dir(dir);
    }
    command.status()
}

/// Paths of one output stream of a case.
struct Stream {
    label: &'static str,
    expected: PathBuf,
    actual: PathBuf,
}

/// What the engine needs to know about the case being checked.
struct CaseRun<'c> {
    name: &'c str,
    path: PathBuf,
    context: &'c [String],
    argv: Vec<String>,
}

impl Runner<'_> {
    pub(super) fn run_exec(
        &mut self,
        case: &ExecCase,
        expected: &Path,
        actual: &Path,
        parent: &Path,
        depth: usize,
    ) -> bool {
        let path = parent.join(&case.name);
        self.progress(depth, &format!("Exec {}: {}", path.display(), case.command));
        let run = CaseRun {
            name: &case.name,
            path,
            context: &case.context,
            argv: tokenize(&case.command),
        };
        self.check_case(run, expected, actual, depth)
    }

    pub(super) fn run_code(
        &mut self,
        case: &CodeCase,
        expected: &Path,
        actual: &Path,
        parent: &Path,
        depth: usize,
    ) -> bool {
        let path = parent.join(&case.name);
        self.progress(
            depth,
            &format!("Code {}{}: {}", path.display(), case.extension, case.command),
        );

        let source = actual.join(case.file_name());
        if let Err(e) = files::write_lines(&source, &case.source) {
            let failure = Failure::SourceWrite {
                reason: e.to_string(),
            };
            self.failed(depth, &path.display().to_string(), &failure);
            return false;
        }
        let mut argv = tokenize(&case.command);
        argv.push(
            std::path::absolute(&source)
                .unwrap_or(source)
                .display()
                .to_string(),
        );

        let run = CaseRun {
            name: &case.name,
            path,
            context: &case.source,
            argv,
        };
        self.check_case(run, expected, actual, depth)
    }

    /// Runs the command if requested, then compares and reconciles outputs.
    fn check_case(
        &mut self,
        run: CaseRun<'_>,
        expected: &Path,
        actual: &Path,
        depth: usize,
    ) -> bool {
        let streams = [
            Stream {
                label: "standard output",
                expected: expected.join(format!("{}.out", run.name)),
                actual: actual.join(format!("{}.out", run.name)),
            },
            Stream {
                label: "standard error",
                expected: expected.join(format!("{}.err", run.name)),
                actual: actual.join(format!("{}.err", run.name)),
            },
        ];
        let [out, err] = &streams;

        if self.config.flags.execute {
            if !files::verify_writable(&out.actual) || !files::verify_writable(&err.actual) {
                return self.fail(&run, depth, Failure::CaptureAccess);
            }
            let working_dir = self.working_dir();
            let status = run_command(
                &run.argv,
                working_dir.as_deref(),
                &out.actual,
                &err.actual,
            );
            if let Err(e) = status {
                let reason = e.to_string();
                return self.fail(&run, depth, Failure::Spawn { reason });
            }
        }

        if !out.expected.is_file() || !err.expected.is_file() {
            return self.reconcile_missing(&run, &streams, depth);
        }

        let mut same = [false; 2];
        for (slot, stream) in same.iter_mut().zip(&streams) {
            match files::same_content(&stream.actual, &stream.expected) {
                Ok(equal) => *slot = equal,
                Err(e) => {
                    let reason = e.to_string();
                    return self.fail(&run, depth, Failure::CaptureRead { reason });
                }
            }
        }

        if same.contains(&false) && self.config.flags.interactive {
            self.issue("ISSUE: test did not produce expected outputs.");
            self.show_context(&run);
            for (slot, stream) in same.iter_mut().zip(&streams) {
                if *slot {
                    continue;
                }
                match self.offer_update(stream) {
                    Ok(accepted) => *slot = accepted,
                    Err(failure) => return self.fail(&run, depth, failure),
                }
            }
        }

        if same.iter().all(|s| *s) {
            self.passed(depth, &run.path);
            true
        } else {
            self.fail(&run, depth, Failure::OutputMismatch)
        }
    }

    /// Handles a case without expected outputs: offers the captured outputs as
    /// the new baseline when interacting, fails otherwise.
    fn reconcile_missing(
        &mut self,
        run: &CaseRun<'_>,
        streams: &[Stream; 2],
        depth: usize,
    ) -> bool {
        if self.config.flags.interactive {
            let captured = (
                files::read_lines(&streams[0].actual),
                files::read_lines(&streams[1].actual),
            );
            if let (Ok(out), Ok(err)) = captured {
                self.issue(&format!(
                    "ISSUE: expected outputs for {} are missing.",
                    run.path.display()
                ));
                self.show_context(run);
                self.reporter.header(streams[0].label);
                self.reporter.display(&out);
                self.reporter.header(streams[1].label);
                self.reporter.display(&err);
                self.reporter.header("");
                if self
                    .reconciler
                    .confirm("Use these outputs as the expected results")
                {
                    for stream in streams {
                        if let Err(e) = files::copy_lines(&stream.actual, &stream.expected) {
                            let reason = e.to_string();
                            return self.fail(run, depth, Failure::BaselineUpdate { reason });
                        }
                    }
                    self.passed(depth, &run.path);
                    return true;
                }
            }
        }
        self.fail(run, depth, Failure::MissingExpected)
    }

    /// Shows the differences of one stream and asks whether to accept them.
    fn offer_update(&mut self, stream: &Stream) -> Result<bool, Failure> {
        let read = |path: &Path| {
            files::read_lines(path).map_err(|e| Failure::CaptureRead {
                reason: e.to_string(),
            })
        };
        let expected = read(&stream.expected)?;
        let actual = read(&stream.actual)?;

        self.reporter.header(stream.label);
        self.reporter.diff(&expected, &actual);
        self.reporter.header("");
        if !self
            .reconciler
            .confirm(&format!("Use new {} as the expected result", stream.label))
        {
            return Ok(false);
        }
        files::copy_lines(&stream.actual, &stream.expected).map_err(|e| Failure::BaselineUpdate {
            reason: e.to_string(),
        })?;
        Ok(true)
    }

    fn show_context(&mut self, run: &CaseRun<'_>) {
        if !self.config.flags.suppress_context && !run.context.is_empty() {
            self.reporter.header("context");
            self.reporter.display(run.context);
        }
    }

    fn issue(&mut self, text: &str) {
        self.reporter.message(Channel::Issue, 0, text);
    }

    fn fail(&mut self, run: &CaseRun<'_>, depth: usize, failure: Failure) -> bool {
        self.failed(depth, &run.path.display().to_string(), &failure);
        false
    }
}
