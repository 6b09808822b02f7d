//! File helpers shared by the engine and the driver.
//!
//! Captured output is compared as lines of bytes: a final line terminator does
//! not produce an extra empty line, but any further terminator does. Output is
//! never required to be valid UTF-8.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Ensures `dir` exists as a directory, creating it (but not its parents) if
/// needed.
pub fn ensure_dir(dir: &Path) -> bool {
    if dir.exists() {
        dir.is_dir()
    } else {
        fs::create_dir(dir).is_ok()
    }
}

/// True when `path` does not exist yet or is a writable regular file.
pub fn verify_writable(path: &Path) -> bool {
    match fs::metadata(path) {
        Ok(meta) => meta.is_file() && !meta.permissions().readonly(),
        Err(e) => e.kind() == io::ErrorKind::NotFound,
    }
}

/// Writes `lines` to `path`, each followed by a newline, replacing any
/// previous content.
pub fn write_lines<S: AsRef<str>>(path: &Path, lines: &[S]) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    for line in lines {
        writeln!(out, "{}", line.as_ref())?;
    }
    out.flush()
}

/// Reads the raw lines of `path`, without terminators. A `\r` before the
/// `\n` is part of the terminator. No encoding is assumed.
pub fn read_raw_lines(path: &Path) -> io::Result<Vec<Vec<u8>>> {
    raw_lines(File::open(path)?).collect()
}

/// Reads all lines of `path` for display. Bytes that are not valid UTF-8 are
/// replaced.
pub fn read_lines(path: &Path) -> io::Result<Vec<String>> {
    Ok(read_raw_lines(path)?
        .iter()
        .map(|line| String::from_utf8_lossy(line).into_owned())
        .collect())
}

/// Copies the lines of `from` into `to` byte for byte, normalizing line
/// terminators.
pub fn copy_lines(from: &Path, to: &Path) -> io::Result<()> {
    let lines = read_raw_lines(from)?;
    let mut out = BufWriter::new(File::create(to)?);
    for line in &lines {
        out.write_all(line)?;
        out.write_all(b"\n")?;
    }
    out.flush()
}

/// Compares two files line by line. They are equal when they yield the same
/// lines and run out at the same time.
pub fn same_content(left: &Path, right: &Path) -> io::Result<bool> {
    let mut left = raw_lines(File::open(left)?);
    let mut right = raw_lines(File::open(right)?);
    loop {
        match (left.next().transpose()?, right.next().transpose()?) {
            (None, None) => return Ok(true),
            (Some(l), Some(r)) if l == r => continue,
            _ => return Ok(false),
        }
    }
}

fn raw_lines(file: File) -> impl Iterator<Item = io::Result<Vec<u8>>> {
    BufReader::new(file).split(b'\n').map(|line| {
        line.map(|mut bytes| {
            if bytes.last() == Some(&b'\r') {
                bytes.pop();
            }
            bytes
        })
    })
}
