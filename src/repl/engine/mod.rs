//! Interactive loop engine
//!
//! Drives the prompt / read / evaluate / print cycle over a [`Console`] and a
//! [`REPLBackend`], keeps the session namespace, and owns the completion
//! snapshot and history persistence.
//!
//! # States
//!
//! ```text
//! AwaitingStatement ──incomplete──▶ AwaitingContinuation
//!        ▲                                  │
//!        └────complete / error / Ctrl-C ────┘
//! any ──end of input / unwind──▶ Terminated
//! ```

use std::cell::RefCell;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::repl::backend_trait::{EvalResult, Evaluation, REPLBackend, ScriptError};
use crate::repl::console::{Console, ConsoleError};
use crate::repl::error::ReplError;
use crate::repl::line::{REPLCompleter, SharedCompleter};
use crate::repl::namespace::Namespace;
use crate::util::config::ReplConfig;

/// Shown when the operator cancels a line
pub const INTERRUPT_NOTICE: &str = "\nKeyboardInterrupt";

/// Shown when the loop exits
pub const FAREWELL: &str = "Exiting REPL, goodbye!";

/// Loop state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Primary prompt
    AwaitingStatement,
    /// Continuation prompt; a statement is pending
    AwaitingContinuation,
    /// The loop has exited and history has been written
    Terminated,
}

/// Loop engine settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub prompt: String,
    pub continuation_prompt: String,
    /// Where history is loaded from and saved to; `None` disables persistence
    pub history_file: Option<PathBuf>,
    pub history_size: usize,
    /// Product version for the banner
    pub version: String,
    /// Architecture name for the banner
    pub arch: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::from_repl_config(&ReplConfig::default())
    }
}

impl SessionConfig {
    pub fn from_repl_config(config: &ReplConfig) -> Self {
        Self {
            prompt: config.prompt.clone(),
            continuation_prompt: config.continuation_prompt.clone(),
            history_file: config.history_file.clone(),
            history_size: config.history_size,
            version: crate::VERSION.to_string(),
            arch: "generic".to_string(),
        }
    }

    pub fn with_history_file(
        mut self,
        path: Option<PathBuf>,
    ) -> Self {
        self.history_file = path;
        self
    }

    pub fn with_banner(
        mut self,
        version: &str,
        arch: &str,
    ) -> Self {
        self.version = version.to_string();
        self.arch = arch.to_string();
        self
    }
}

/// Interactive REPL
pub struct InteractiveREPL<B: REPLBackend, C: Console> {
    backend: B,
    console: C,
    namespace: Namespace,
    /// Lines of the pending statement
    buffer: Vec<String>,
    state: LoopState,
    completer: SharedCompleter,
    config: SessionConfig,
}

impl<B: REPLBackend, C: Console> InteractiveREPL<B, C> {
    /// Attach to `console` over a pre-seeded namespace
    ///
    /// Loads history if the history file exists and registers the completer
    /// with the console's line editor. An unreadable history file is logged
    /// and the session starts with empty history.
    pub fn new(
        backend: B,
        console: C,
        namespace: Namespace,
        config: SessionConfig,
    ) -> Self {
        let completer = REPLCompleter::from_namespace(&namespace, backend.builtin_names());
        let mut repl = Self {
            backend,
            console,
            namespace,
            buffer: Vec::new(),
            state: LoopState::AwaitingStatement,
            completer: Rc::new(RefCell::new(completer)),
            config,
        };
        repl.attach_line_editor();
        repl
    }

    fn attach_line_editor(&mut self) {
        let Some(editor) = self.console.line_editor() else {
            tracing::debug!("console has no line editor, history and completion disabled");
            return;
        };

        editor.set_history_length(self.config.history_size);
        if let Some(path) = &self.config.history_file {
            if path.exists() {
                match editor.load_history(path) {
                    Ok(()) => tracing::debug!("loaded history from {}", path.display()),
                    Err(e) => tracing::warn!("{}", e),
                }
            } else {
                tracing::debug!("no history at {}", path.display());
            }
        }
        editor.set_completer(self.completer.clone());
    }

    /// Prompt for the current state
    pub fn current_prompt(&self) -> &str {
        match self.state {
            LoopState::AwaitingContinuation => &self.config.continuation_prompt,
            _ => &self.config.prompt,
        }
    }

    /// Feed one line; returns `true` when the statement needs more input
    pub fn push(
        &mut self,
        line: &str,
    ) -> bool {
        self.buffer.push(line.to_string());
        let source = self.buffer.join("\n");
        let evaluation = self.backend.run_source(&source, &mut self.namespace);
        let more = self.report(evaluation);
        if more {
            self.transition(LoopState::AwaitingContinuation);
        } else {
            self.finish_statement();
        }
        more
    }

    /// Print what an evaluation produced; returns `true` if it is incomplete
    fn report(
        &mut self,
        evaluation: Evaluation,
    ) -> bool {
        for line in &evaluation.output {
            self.console.print(line);
        }
        match evaluation.result {
            EvalResult::Complete => false,
            EvalResult::Incomplete => true,
            EvalResult::Error(e) => {
                tracing::debug!(category = %e.category, name = %e.name, "statement failed");
                self.console.error(&e.to_string());
                false
            }
        }
    }

    fn transition(
        &mut self,
        state: LoopState,
    ) {
        if self.state != state {
            tracing::debug!("repl state {:?} -> {:?}", self.state, state);
            self.state = state;
        }
    }

    fn finish_statement(&mut self) {
        self.buffer.clear();
        self.transition(LoopState::AwaitingStatement);
        self.refresh_completer();
    }

    fn refresh_completer(&mut self) {
        match self.completer.try_borrow_mut() {
            Ok(mut completer) => completer.refresh(&self.namespace),
            Err(_) => tracing::warn!("completer busy, refresh skipped"),
        }
    }

    /// Discard the pending statement
    pub fn reset_buffer(&mut self) {
        self.buffer.clear();
        self.transition(LoopState::AwaitingStatement);
    }

    /// Run the interactive loop until end of input
    ///
    /// The farewell and the history save happen on every exit path: a normal
    /// return, a console failure, or a panic unwinding out of the loop body
    /// (which is resumed afterwards).
    pub fn exec(&mut self) -> Result<(), ReplError> {
        if self.state == LoopState::Terminated {
            return Ok(());
        }
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| self.interact()));
        self.shutdown();
        match outcome {
            Ok(result) => result,
            Err(payload) => panic::resume_unwind(payload),
        }
    }

    fn interact(&mut self) -> Result<(), ReplError> {
        self.console
            .print_banner(&self.config.version, &self.config.arch);
        loop {
            let prompt = self.current_prompt().to_string();
            match self.console.prompt(&prompt) {
                Ok(line) => {
                    self.push(&line);
                }
                Err(ConsoleError::Eof) => {
                    self.console.print("");
                    break;
                }
                Err(ConsoleError::Interrupted) => {
                    self.console.print(INTERRUPT_NOTICE);
                    self.reset_buffer();
                }
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn shutdown(&mut self) {
        if self.state == LoopState::Terminated {
            return;
        }
        self.transition(LoopState::Terminated);
        self.console.print(FAREWELL);
        self.save_history();
    }

    fn save_history(&mut self) {
        let Some(path) = &self.config.history_file else {
            return;
        };
        let Some(editor) = self.console.line_editor() else {
            return;
        };
        match editor.save_history(path) {
            Ok(()) => tracing::debug!("saved history to {}", path.display()),
            Err(e) => tracing::warn!("{}", e),
        }
    }

    /// Run statements before the banner; errors are reported, never fatal
    pub fn run_startup(
        &mut self,
        statements: &[String],
    ) {
        for statement in statements {
            let _ = self.run_code(statement);
        }
    }

    /// Evaluate a whole script into the session namespace
    ///
    /// Output and errors go through the console; the error is also returned.
    pub fn run_code(
        &mut self,
        source: &str,
    ) -> Result<(), ScriptError> {
        let evaluation = self.backend.run_script(source, &mut self.namespace);
        let result = match &evaluation.result {
            EvalResult::Error(e) => Err(e.clone()),
            _ => Ok(()),
        };
        self.report(evaluation);
        self.refresh_completer();
        result
    }

    /// Evaluate a script file; a missing or unreadable file is an error
    pub fn run_file(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError> {
        let source = fs::read_to_string(path).map_err(|source| ReplError::Script {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("running {}", path.display());
        self.run_code(&source)?;
        Ok(())
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Lines of the pending statement
    pub fn pending(&self) -> &[String] {
        &self.buffer
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn namespace_mut(&mut self) -> &mut Namespace {
        &mut self.namespace
    }

    pub fn completer(&self) -> &SharedCompleter {
        &self.completer
    }

    /// Complete `text` against the session snapshot
    pub fn complete(
        &self,
        text: &str,
        state: usize,
    ) -> Option<String> {
        self.completer.try_borrow_mut().ok()?.complete(text, state)
    }

    pub fn console(&self) -> &C {
        &self.console
    }

    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn into_console(self) -> C {
        self.console
    }
}
