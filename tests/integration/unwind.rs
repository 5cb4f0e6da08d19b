//! Exit paths: panics and console failures still say goodbye and save history

use std::fs;
use std::io;
use std::panic::{self, AssertUnwindSafe};

use pnr_repl::repl::engine::FAREWELL;
use pnr_repl::repl::console::{Channel, ScriptedConsole};
use pnr_repl::repl::line::MemoryEditor;
use pnr_repl::repl::{
    Console, ConsoleError, Evaluation, InteractiveREPL, LineEditor, LoopState, Namespace,
    REPLBackend, ReplError, SessionConfig,
};
use pnr_repl::ScriptEngine;
use tempfile::TempDir;

/// Panics on the statement `boom`, otherwise evaluates normally
struct FragileBackend(ScriptEngine);

impl REPLBackend for FragileBackend {
    fn run_source(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation {
        if source.trim() == "boom" {
            panic!("backend crashed");
        }
        self.0.run_source(source, namespace)
    }

    fn builtin_names(&self) -> Vec<String> {
        self.0.builtin_names()
    }
}

#[test]
fn test_panic_in_backend_still_runs_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");
    let config = SessionConfig::default().with_history_file(Some(path.clone()));

    let mut repl = InteractiveREPL::new(
        FragileBackend(ScriptEngine::new()),
        ScriptedConsole::from_lines(&["a = 1", "boom", "never"]),
        Namespace::new(),
        config,
    );
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| repl.exec()));

    assert!(outcome.is_err());
    assert_eq!(repl.state(), LoopState::Terminated);
    let farewells = repl
        .console()
        .lines(Channel::Out)
        .into_iter()
        .filter(|l| l == FAREWELL)
        .count();
    assert_eq!(farewells, 1);
    assert_eq!(repl.console().pending(), 1);
    assert_eq!(fs::read_to_string(&path).unwrap(), "a = 1\nboom\n");
}

/// Prompts fail with an I/O error after a fixed number of lines
#[derive(Default)]
struct BrokenPipeConsole {
    lines: Vec<String>,
    out: Vec<String>,
    editor: MemoryEditor,
}

impl Console for BrokenPipeConsole {
    fn prompt(
        &mut self,
        _prompt: &str,
    ) -> Result<String, ConsoleError> {
        if self.lines.is_empty() {
            return Err(ConsoleError::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "terminal went away",
            )));
        }
        let line = self.lines.remove(0);
        self.editor.record(&line);
        Ok(line)
    }

    fn print_end(
        &mut self,
        message: &str,
        end: &str,
    ) {
        self.out.push(format!("{}{}", message, end));
    }

    fn warn(
        &mut self,
        message: &str,
    ) {
        self.out.push(message.to_string());
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        self.out.push(message.to_string());
    }

    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        Some(&mut self.editor)
    }
}

#[test]
fn test_console_failure_is_returned_after_shutdown() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("history");
    let config = SessionConfig::default().with_history_file(Some(path.clone()));

    let console = BrokenPipeConsole {
        lines: vec!["route = 1".to_string()],
        ..Default::default()
    };
    let mut repl = InteractiveREPL::new(ScriptEngine::new(), console, Namespace::new(), config);

    let result = repl.exec();
    assert!(matches!(result, Err(ReplError::Console(ConsoleError::Io(_)))));
    assert_eq!(repl.state(), LoopState::Terminated);
    assert_eq!(
        repl.console().out.last().map(String::as_str),
        Some("Exiting REPL, goodbye!\n")
    );
    assert_eq!(fs::read_to_string(&path).unwrap(), "route = 1\n");
}
