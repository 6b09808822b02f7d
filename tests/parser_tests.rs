// tests/parser_tests.rs

use std::fs;
use std::path::{Path, PathBuf};

use tester::errors::{ParseErrorKind, TesterError};
use tester::syntax::parser::parse_suite;
use tester::syntax::{read_suite, read_suite_with, InMemoryLoader};
use tester::tree::{TestNode, MAX_NESTING};

// A helper to parse a root description that has no nested suites.
fn parse(source: &str) -> tester::Suite {
    parse_suite(&InMemoryLoader::new(), Path::new("root"), "root", source).unwrap()
}

fn parse_err(loader: &InMemoryLoader, name: &str) -> tester::ParseError {
    match read_suite_with(loader, Path::new(""), name) {
        Err(TesterError::Parse(e)) => *e,
        Err(other) => panic!("expected a parse error, got {other}"),
        Ok(_) => panic!("expected a parse error"),
    }
}

fn names(suite: &tester::Suite) -> Vec<&str> {
    suite.children().iter().map(TestNode::name).collect()
}

#[test]
fn test_parse_cases_in_declaration_order() {
    let suite = parse(
        "Checks the greeting tools.\n\
         \n\
         exec: hello echo hello world\n\
         says hello\n\
         .sh: script  sh -e\n\
         echo out\n\
         echo err 1>&2\n\
         exec: bye echo bye\n",
    );

    assert_eq!(suite.name(), "root");
    assert_eq!(suite.explain(), ["Checks the greeting tools.", ""]);
    assert_eq!(names(&suite), ["hello", "script", "bye"]);
    assert_eq!(suite.size(), 3);

    match &suite.children()[0] {
        TestNode::Exec(case) => {
            assert_eq!(case.command, "echo hello world");
            assert_eq!(case.context, ["says hello"]);
        }
        other => panic!("expected an exec case, got {other:?}"),
    }
    match &suite.children()[1] {
        TestNode::Code(case) => {
            assert_eq!(case.extension, ".sh");
            assert_eq!(case.command, "sh -e");
            assert_eq!(case.source, ["echo out", "echo err 1>&2"]);
            assert_eq!(case.file_name(), "script.sh");
        }
        other => panic!("expected a code case, got {other:?}"),
    }
}

#[test]
fn test_empty_description_is_an_empty_suite() {
    let suite = parse("");
    assert!(suite.explain().is_empty());
    assert!(suite.children().is_empty());
    assert_eq!(suite.size(), 0);
}

#[test]
fn test_nested_suite_is_loaded_from_its_directory() {
    let loader = InMemoryLoader::new()
        .with_suite("root", "intro\ntests: inner\n\n   \nexec: after true\n")
        .with_suite("root/inner", "Inner suite.\nexec: a echo a\nexec: b echo b\n");

    let suite = read_suite_with(&loader, Path::new(""), "root").unwrap();
    assert_eq!(names(&suite), ["inner", "after"]);
    assert_eq!(suite.size(), 3);

    let inner = suite.children()[0].as_suite().unwrap();
    assert_eq!(inner.name(), "inner");
    assert_eq!(inner.explain(), ["Inner suite."]);
    assert_eq!(names(inner), ["a", "b"]);
}

#[test]
fn test_text_after_nested_suite_is_rejected() {
    let loader = InMemoryLoader::new()
        .with_suite("root", "tests: inner\n\nstray words\n")
        .with_suite("root/inner", "");

    let err = parse_err(&loader, "root");
    assert_eq!(err.kind, ParseErrorKind::StrayText);
    assert_eq!(err.line, 3);
    assert_eq!(err.file, PathBuf::from("root").join("tests").display().to_string());
}

#[test]
fn test_missing_nested_file_is_reported_at_declaration() {
    let loader = InMemoryLoader::new().with_suite("root", "text\ntests: ghost\n");
    let err = parse_err(&loader, "root");
    assert_eq!(
        err.kind,
        ParseErrorKind::SuiteNotFound {
            name: "ghost".to_string()
        }
    );
    assert_eq!(err.line, 2);
    assert!(err.to_string().contains("line 2"));
}

#[test]
fn test_missing_name_and_command() {
    let loader = InMemoryLoader::new()
        .with_suite("noname", "exec:   \n")
        .with_suite("nocmd", "intro\n.c: prog   \n")
        .with_suite("badext", ".py:\n");

    let err = parse_err(&loader, "noname");
    assert_eq!(err.kind, ParseErrorKind::MissingName);
    assert_eq!(err.line, 1);

    let err = parse_err(&loader, "nocmd");
    assert_eq!(err.kind, ParseErrorKind::MissingCommand);
    assert_eq!(err.line, 2);

    let err = parse_err(&loader, "badext");
    assert_eq!(err.kind, ParseErrorKind::MissingName);
}

#[test]
fn test_errors_in_nested_files_name_the_nested_file() {
    let loader = InMemoryLoader::new()
        .with_suite("root", "tests: inner\n")
        .with_suite("root/inner", "ok\nexec: x\n");
    let err = parse_err(&loader, "root");
    assert_eq!(err.kind, ParseErrorKind::MissingCommand);
    assert_eq!(err.line, 2);
    assert!(err.file.contains("inner"));
}

/// Builds a chain of suites `s0/s1/.../s<levels>` where each declares the next.
fn nested_chain(levels: usize) -> InMemoryLoader {
    let mut loader = InMemoryLoader::new();
    let mut dir = PathBuf::from("s0");
    for level in 0..=levels {
        let source = if level < levels {
            format!("level {level}\ntests: s{}\n", level + 1)
        } else {
            "exec: leaf true\n".to_string()
        };
        loader = loader.with_suite(dir.clone(), source);
        dir = dir.join(format!("s{}", level + 1));
    }
    loader
}

#[test]
fn test_nesting_up_to_the_limit_is_accepted() {
    let loader = nested_chain(MAX_NESTING);
    let mut suite = read_suite_with(&loader, Path::new(""), "s0").unwrap();
    assert_eq!(suite.size(), 1);

    let mut depth = 0;
    while let Some(TestNode::Suite(inner)) = suite.children().first() {
        suite = inner.clone();
        depth += 1;
    }
    assert_eq!(depth, MAX_NESTING);
}

#[test]
fn test_nesting_beyond_the_limit_fails() {
    let loader = nested_chain(MAX_NESTING + 1);
    let err = parse_err(&loader, "s0");
    assert_eq!(err.kind, ParseErrorKind::NestingTooDeep { max: MAX_NESTING });
}

#[test]
fn test_parsing_is_deterministic() {
    let source = "exec: b true\nexec: a true\n.txt: c cat\nline\n";
    let first = parse(source);
    let second = parse(source);
    assert_eq!(names(&first), names(&second));
    assert_eq!(names(&first), ["b", "a", "c"]);
}

#[test]
fn test_duplicate_names_are_left_to_the_runner() {
    let suite = parse("exec: foo true\nexec: foo false\n");
    assert_eq!(names(&suite), ["foo", "foo"]);
    assert!(suite.name_conflict().is_some());
}

#[test]
fn test_read_suite_from_disk() {
    let home = tempfile::tempdir().unwrap();
    let root = home.path().join("root");
    fs::create_dir_all(root.join("inner")).unwrap();
    fs::write(root.join("tests"), "Root.\r\ntests: inner\r\nexec: x echo x\r\n").unwrap();
    fs::write(root.join("inner").join("tests"), "exec: y echo y\n").unwrap();

    let suite = read_suite(home.path(), "root").unwrap();
    assert_eq!(suite.explain(), ["Root."]);
    assert_eq!(names(&suite), ["inner", "x"]);
    assert_eq!(suite.size(), 2);
}

#[test]
fn test_missing_root_file() {
    let home = tempfile::tempdir().unwrap();
    match read_suite(home.path(), "absent") {
        Err(TesterError::SuiteNotFound { path, .. }) => {
            assert!(path.ends_with("absent/tests"));
        }
        other => panic!("expected a missing suite error, got {other:?}"),
    }
}

#[test]
fn test_unreadable_root_file_is_not_reported_as_missing() {
    let home = tempfile::tempdir().unwrap();
    let root = home.path().join("latin");
    fs::create_dir(&root).unwrap();
    fs::write(root.join("tests"), b"caf\xe9\nexec: x echo x\n").unwrap();

    match read_suite(home.path(), "latin") {
        Err(err @ TesterError::UnreadableSuite { .. }) => {
            assert!(err.to_string().contains("cannot read test file"));
        }
        other => panic!("expected an unreadable suite error, got {other:?}"),
    }
}
