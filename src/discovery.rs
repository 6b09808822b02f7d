use std::path::Path;

use walkdir::WalkDir;

use crate::errors::TesterError;
use crate::syntax::is_name_char;
use crate::tree::ROOT_FILE;

/// Finds the suites stored directly under `home`.
///
/// A suite is a sub-directory holding a `tests` file whose name is usable as a
/// test name. The returned names are sorted to ensure deterministic execution
/// order.
pub fn discover_suites<P: AsRef<Path>>(home: P) -> Result<Vec<String>, TesterError> {
    let mut names = Vec::new();
    for entry in WalkDir::new(home)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry?;
        if !entry.file_type().is_dir() || !entry.path().join(ROOT_FILE).is_file() {
            continue;
        }
        let Some(name) = entry.file_name().to_str() else {
            continue;
        };
        if is_valid_name(name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// True for non-empty names made only of name characters.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name != ROOT_FILE && name.chars().all(is_name_char)
}
