//! History persistence across sessions

use std::fs;
use std::path::Path;

use pnr_repl::repl::console::{ScriptedConsole, ScriptedInput};
use pnr_repl::repl::{InteractiveREPL, LineEditor, Namespace, SessionConfig};
use pnr_repl::ScriptEngine;
use tempfile::TempDir;

fn session(
    inputs: Vec<ScriptedInput>,
    history_file: Option<&Path>,
    history_size: usize,
) -> InteractiveREPL<ScriptEngine, ScriptedConsole> {
    let mut config = SessionConfig::default().with_history_file(history_file.map(Path::to_path_buf));
    config.history_size = history_size;
    InteractiveREPL::new(
        ScriptEngine::new(),
        ScriptedConsole::new(inputs),
        Namespace::new(),
        config,
    )
}

#[test]
fn test_previous_history_is_loaded_before_the_first_prompt() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");
    fs::write(&path, "a = 1\nb = 2\n").unwrap();

    let repl = session(Vec::new(), Some(&path), 100);
    assert_eq!(repl.console().editor().history(), vec!["a = 1", "b = 2"]);
}

#[test]
fn test_new_lines_are_appended_and_capped() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");
    fs::write(&path, "a = 1\nb = 2\nc = 3\n").unwrap();

    let mut repl = session(vec!["d = 4".into(), "e = 5".into()], Some(&path), 4);
    repl.exec().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "b = 2\nc = 3\nd = 4\ne = 5\n"
    );
}

#[test]
fn test_history_file_is_created_with_its_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("state").join("pnr-repl").join("history");

    let mut repl = session(
        vec!["if True:".into(), "    pass".into(), ScriptedInput::Interrupt],
        Some(&path),
        100,
    );
    repl.exec().unwrap();

    assert_eq!(
        fs::read_to_string(&path).unwrap(),
        "if True:\n    pass\n"
    );
}

#[test]
fn test_unreadable_history_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    // a directory cannot be read or written as a history file
    let path = dir.path().to_path_buf();

    let mut repl = session(vec!["x = 1".into()], Some(&path), 100);
    assert!(repl.console().editor().history().is_empty());
    assert!(repl.exec().is_ok());
    assert!(repl.namespace().contains("x"));
    assert!(path.is_dir());
}

#[test]
fn test_no_history_file_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let mut repl = session(vec!["x = 1".into()], None, 100);
    repl.exec().unwrap();

    assert_eq!(repl.console().editor().history(), vec!["x = 1"]);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_history_survives_two_sessions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");

    let mut first = session(vec!["net = 'clk'".into()], Some(&path), 100);
    first.exec().unwrap();

    let mut second = session(vec!["net".into()], Some(&path), 100);
    assert_eq!(second.console().editor().history(), vec!["net = 'clk'"]);
    second.exec().unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "net = 'clk'\nnet\n");
}
