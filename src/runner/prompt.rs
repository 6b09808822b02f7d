//! Reconciliation strategies.
//!
//! Whenever a run could promote new output to become the expected result, the
//! engine asks a [`Reconciler`]. The console implementation asks the operator;
//! the others answer without a terminal.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// Answers yes/no questions raised during a run.
pub trait Reconciler {
    fn confirm(&mut self, question: &str) -> bool;
}

/// Accepts every proposal.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoAccept;

impl Reconciler for AutoAccept {
    fn confirm(&mut self, _question: &str) -> bool {
        true
    }
}

/// Declines every proposal.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoReject;

impl Reconciler for AutoReject {
    fn confirm(&mut self, _question: &str) -> bool {
        false
    }
}

/// Replays a fixed sequence of answers, declining once they run out. Every
/// question asked is recorded.
#[derive(Debug, Default, Clone)]
pub struct Scripted {
    answers: VecDeque<bool>,
    pub asked: Vec<String>,
}

impl Scripted {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            asked: Vec::new(),
        }
    }
}

impl Reconciler for Scripted {
    fn confirm(&mut self, question: &str) -> bool {
        self.asked.push(question.to_string());
        self.answers.pop_front().unwrap_or(false)
    }
}

/// Asks on a terminal-like pair of streams until it gets `y` or `n`.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stdout> {
    /// A prompt on the process's standard input and output.
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

/// Interprets one line of operator input.
fn answer(line: &str) -> Option<bool> {
    match line.trim_start().chars().next()?.to_ascii_lowercase() {
        'y' => Some(true),
        'n' => Some(false),
        _ => None,
    }
}

impl<R: BufRead, W: Write> Reconciler for ConsolePrompt<R, W> {
    fn confirm(&mut self, question: &str) -> bool {
        let mut line = String::new();
        loop {
            let _ = write!(self.output, "{} [yn]? ", question);
            let _ = self.output.flush();
            line.clear();
            match self.input.read_line(&mut line) {
                // No more input means nobody can say yes.
                Ok(0) | Err(_) => return false,
                Ok(_) => {
                    if let Some(yes) = answer(&line) {
                        return yes;
                    }
                }
            }
        }
    }
}
