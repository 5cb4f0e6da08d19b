//! Line editing facility
//!
//! The history and completion surface the loop engine needs from a line
//! editor, with a rustyline implementation for terminals and an in-memory
//! one for scripted sessions.

use std::path::Path;

use rustyline::completion::{Completer, Pair};
use rustyline::config::Config;
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::{DefaultHistory, History};
use rustyline::validate::Validator;
use rustyline::{Cmd, CompletionType, EditMode, Editor, EventHandler, Helper, KeyCode, KeyEvent, Modifiers};

use crate::repl::error::ReplError;
use crate::util::config::EditMode as EditModeConfig;

mod completer;
mod history;

pub use completer::{complete_word, word_start, REPLCompleter, SharedCompleter, WORD_DELIMITERS};
pub use history::HistoryBuffer;

/// History and completion hooks of a line editor
pub trait LineEditor {
    /// Cap the number of retained entries
    fn set_history_length(
        &mut self,
        len: usize,
    );

    /// Append the entries of a history file
    fn load_history(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError>;

    /// Write the retained entries to a history file
    fn save_history(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError>;

    /// Use `completer` for the tab key
    fn set_completer(
        &mut self,
        completer: SharedCompleter,
    );

    /// Retained entries, oldest first
    fn history(&self) -> Vec<String>;
}

fn history_error(
    path: &Path,
    message: impl ToString,
) -> ReplError {
    ReplError::History {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// rustyline helper that forwards to the session completer
#[derive(Default)]
pub struct CompletionHelper {
    completer: Option<SharedCompleter>,
}

impl Completer for CompletionHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Self::Candidate>)> {
        let Some(completer) = &self.completer else {
            return Ok((pos, Vec::new()));
        };
        let (start, names) = complete_word(completer, line, pos);
        let candidates = names
            .into_iter()
            .map(|name| Pair {
                display: name.clone(),
                replacement: name,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CompletionHelper {
    type Hint = String;
}

impl Highlighter for CompletionHelper {}

impl Validator for CompletionHelper {}

impl Helper for CompletionHelper {}

/// Terminal line editor backed by rustyline
///
/// When stdin is not a terminal rustyline reads plain lines, so the same
/// editor serves piped input.
pub struct RustylineEditor {
    editor: Editor<CompletionHelper, DefaultHistory>,
}

impl RustylineEditor {
    pub fn new(edit_mode: EditModeConfig) -> Result<Self, ReadlineError> {
        let config = Config::builder()
            .completion_type(CompletionType::List)
            .edit_mode(match edit_mode {
                EditModeConfig::Emacs => EditMode::Emacs,
                EditModeConfig::Vi => EditMode::Vi,
            })
            .build();

        let mut editor = Editor::with_config(config)?;
        editor.set_helper(Some(CompletionHelper::default()));
        editor.bind_sequence(
            KeyEvent(KeyCode::Tab, Modifiers::NONE),
            EventHandler::Simple(Cmd::Complete),
        );
        Ok(Self { editor })
    }

    /// Read one line and record it in history
    pub fn readline(
        &mut self,
        prompt: &str,
    ) -> Result<String, ReadlineError> {
        let line = self.editor.readline(prompt)?;
        self.record(&line)?;
        Ok(line)
    }

    /// Record a submitted line; blank lines are skipped
    ///
    /// Auto-add is off, so this is the only place history grows, for typed
    /// and piped lines alike.
    pub fn record(
        &mut self,
        line: &str,
    ) -> Result<(), ReadlineError> {
        if !line.trim().is_empty() {
            self.editor.add_history_entry(line)?;
        }
        Ok(())
    }
}

impl LineEditor for RustylineEditor {
    fn set_history_length(
        &mut self,
        len: usize,
    ) {
        if let Err(e) = self.editor.history_mut().set_max_len(len) {
            tracing::warn!("cannot set history length: {}", e);
        }
    }

    fn load_history(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError> {
        self.editor
            .load_history(path)
            .map_err(|e| history_error(path, e))
    }

    fn save_history(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError> {
        if let Some(dir) = path.parent() {
            if !dir.as_os_str().is_empty() {
                std::fs::create_dir_all(dir).map_err(|e| history_error(path, e))?;
            }
        }
        self.editor
            .save_history(path)
            .map_err(|e| history_error(path, e))
    }

    fn set_completer(
        &mut self,
        completer: SharedCompleter,
    ) {
        if let Some(helper) = self.editor.helper_mut() {
            helper.completer = Some(completer);
        }
    }

    fn history(&self) -> Vec<String> {
        self.editor.history().iter().cloned().collect()
    }
}

/// In-memory line editor
#[derive(Debug, Default)]
pub struct MemoryEditor {
    history: HistoryBuffer,
    completer: Option<SharedCompleter>,
}

impl MemoryEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submitted line, as a terminal editor would
    pub fn record(
        &mut self,
        line: &str,
    ) {
        self.history.add(line);
    }

    /// Press tab with the cursor at `pos`
    pub fn complete(
        &self,
        line: &str,
        pos: usize,
    ) -> (usize, Vec<String>) {
        match &self.completer {
            Some(completer) => complete_word(completer, line, pos),
            None => (pos, Vec::new()),
        }
    }

    pub fn has_completer(&self) -> bool {
        self.completer.is_some()
    }
}

impl LineEditor for MemoryEditor {
    fn set_history_length(
        &mut self,
        len: usize,
    ) {
        self.history.set_max_len(len);
    }

    fn load_history(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError> {
        self.history.load(path).map_err(|e| history_error(path, e))
    }

    fn save_history(
        &mut self,
        path: &Path,
    ) -> Result<(), ReplError> {
        self.history.save(path).map_err(|e| history_error(path, e))
    }

    fn set_completer(
        &mut self,
        completer: SharedCompleter,
    ) {
        self.completer = Some(completer);
    }

    fn history(&self) -> Vec<String> {
        self.history.entries()
    }
}
