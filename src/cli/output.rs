//! Handles all user-facing output of a run.
//!
//! The engine talks to a [`Reporter`]; the console implementation colorizes
//! and indents messages, the buffer implementation keeps them for inspection.

use std::io::Write;

use difference::{Changeset, Difference};
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Width of header rulers.
const HEADER_WIDTH: usize = 72;

/// Indentation added per nesting level.
const INDENT: &str = "....";

/// The kind of message being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Progress,
    Pass,
    Failure,
    Summary,
    Issue,
}

/// Receives everything a run wants to show.
pub trait Reporter {
    /// A one-line message at the given nesting depth.
    fn message(&mut self, channel: Channel, depth: usize, text: &str);

    /// A title followed by a ruler.
    fn header(&mut self, title: &str);

    /// Raw lines, such as captured output or case context.
    fn display(&mut self, lines: &[String]);

    /// Line differences between an expected and an actual output.
    fn diff(&mut self, expected: &[String], actual: &[String]);
}

/// Formats a header line: the title padded with `=` to the ruler width.
pub fn ruler(title: &str) -> String {
    let pad = HEADER_WIDTH.saturating_sub(title.chars().count());
    format!("{}{}", title, "=".repeat(pad))
}

/// Prefixes `text` with the indentation for `depth`.
pub fn indent(depth: usize, text: &str) -> String {
    format!("{}{}", INDENT.repeat(depth), text)
}

// ============================================================================
// CONSOLE REPORTER
// ============================================================================

/// Writes colorized output to stdout.
pub struct ConsoleReporter {
    stdout: StandardStream,
}

impl ConsoleReporter {
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    /// Colors only when stdout is a terminal.
    pub fn auto() -> Self {
        let choice = if atty::is(atty::Stream::Stdout) {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        };
        Self::new(choice)
    }

    fn color_for(channel: Channel) -> Option<ColorSpec> {
        let mut spec = ColorSpec::new();
        match channel {
            Channel::Progress => return None,
            Channel::Pass => spec.set_fg(Some(Color::Green)),
            Channel::Failure => spec.set_fg(Some(Color::Red)),
            Channel::Summary => spec.set_bold(true),
            Channel::Issue => spec.set_fg(Some(Color::Yellow)).set_bold(true),
        };
        Some(spec)
    }
}

impl Reporter for ConsoleReporter {
    fn message(&mut self, channel: Channel, depth: usize, text: &str) {
        if let Some(spec) = Self::color_for(channel) {
            let _ = self.stdout.set_color(&spec);
        }
        let _ = writeln!(self.stdout, "{}", indent(depth, text));
        let _ = self.stdout.reset();
    }

    fn header(&mut self, title: &str) {
        let _ = self.stdout.set_color(ColorSpec::new().set_bold(true));
        let _ = writeln!(self.stdout, "{}", ruler(title));
        let _ = self.stdout.reset();
    }

    fn display(&mut self, lines: &[String]) {
        for line in lines {
            let _ = writeln!(self.stdout, "{}", line);
        }
    }

    fn diff(&mut self, expected: &[String], actual: &[String]) {
        let changeset = Changeset::new(&expected.join("\n"), &actual.join("\n"), "\n");
        for diff in &changeset.diffs {
            match diff {
                Difference::Same(ref x) => {
                    let _ = self.stdout.reset();
                    for line in x.split('\n') {
                        let _ = writeln!(self.stdout, " {}", line);
                    }
                }
                Difference::Add(ref x) => {
                    let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(Color::Green)));
                    for line in x.split('\n') {
                        let _ = writeln!(self.stdout, "+{}", line);
                    }
                }
                Difference::Rem(ref x) => {
                    let _ = self.stdout.set_color(ColorSpec::new().set_fg(Some(Color::Red)));
                    for line in x.split('\n') {
                        let _ = writeln!(self.stdout, "-{}", line);
                    }
                }
            }
        }
        let _ = self.stdout.reset();
    }
}

// ============================================================================
// BUFFER REPORTER
// ============================================================================

/// Collects output in memory, one entry per printed line.
#[derive(Debug, Default)]
pub struct BufferReporter {
    pub lines: Vec<String>,
    pub messages: Vec<(Channel, String)>,
}

impl BufferReporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when any printed line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.iter().any(|line| line.contains(needle))
    }

    /// Messages reported on `channel`, without indentation.
    pub fn on(&self, channel: Channel) -> Vec<&str> {
        self.messages
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    pub fn as_string(&self) -> String {
        self.lines.join("\n")
    }
}

impl Reporter for BufferReporter {
    fn message(&mut self, channel: Channel, depth: usize, text: &str) {
        self.messages.push((channel, text.to_string()));
        self.lines.push(indent(depth, text));
    }

    fn header(&mut self, title: &str) {
        self.lines.push(ruler(title));
    }

    fn display(&mut self, lines: &[String]) {
        self.lines.extend(lines.iter().cloned());
    }

    fn diff(&mut self, expected: &[String], actual: &[String]) {
        let changeset = Changeset::new(&expected.join("\n"), &actual.join("\n"), "\n");
        for diff in changeset.diffs {
            let (marker, text) = match diff {
                Difference::Same(x) => (' ', x),
                Difference::Add(x) => ('+', x),
                Difference::Rem(x) => ('-', x),
            };
            self.lines
                .extend(text.split('\n').map(|line| format!("{}{}", marker, line)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ruler_pads_to_width() {
        assert_eq!(ruler("").len(), HEADER_WIDTH);
        let header = ruler("standard output");
        assert!(header.starts_with("standard output="));
        assert_eq!(header.len(), HEADER_WIDTH);
    }

    #[test]
    fn buffer_marks_diff_lines() {
        let mut buffer = BufferReporter::new();
        let expected = vec!["one".to_string(), "two".to_string()];
        let actual = vec!["one".to_string(), "three".to_string()];
        buffer.diff(&expected, &actual);
        assert!(buffer.lines.contains(&" one".to_string()));
        assert!(buffer.lines.contains(&"-two".to_string()));
        assert!(buffer.lines.contains(&"+three".to_string()));
    }

    #[test]
    fn messages_are_indented_by_depth() {
        let mut buffer = BufferReporter::new();
        buffer.message(Channel::Progress, 2, "hello");
        assert_eq!(buffer.lines, vec!["........hello".to_string()]);
        assert_eq!(buffer.on(Channel::Progress), vec!["hello"]);
    }
}
