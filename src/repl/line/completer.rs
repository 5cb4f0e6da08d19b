//! REPL Completer
//!
//! Provides completion candidates from the session namespace, queried the
//! readline way: `complete(text, 0)`, `complete(text, 1)`, ... until `None`.

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexSet;

use crate::repl::namespace::Namespace;

/// Characters that end a completion word (GNU readline defaults)
pub const WORD_DELIMITERS: &str = " \t\n`~!@#$%^&*()-=+[{]}\\|;:'\",<>/?";

/// Completer shared between the loop engine and the line editor
pub type SharedCompleter = Rc<RefCell<REPLCompleter>>;

/// REPL Completer
///
/// Holds a snapshot of the namespace's names. The snapshot only grows:
/// [`refresh`](Self::refresh) adds names, it never drops them.
#[derive(Debug, Clone, Default)]
pub struct REPLCompleter {
    /// Known names
    env: IndexSet<String>,
    /// Candidates of the current attempt
    matches: Vec<String>,
}

impl REPLCompleter {
    /// Create a completer over a fixed set of names
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            env: names.into_iter().map(Into::into).collect(),
            matches: Vec::new(),
        }
    }

    /// Snapshot a namespace plus the backend's built-in names
    pub fn from_namespace(
        namespace: &Namespace,
        builtins: Vec<String>,
    ) -> Self {
        let mut completer = Self::new(builtins);
        completer.refresh(namespace);
        completer
    }

    /// Candidate `state` for `text`
    ///
    /// State `0` starts a new attempt and recomputes the sorted candidate
    /// list; later states index into it. Past the end yields `None`.
    pub fn complete(
        &mut self,
        text: &str,
        state: usize,
    ) -> Option<String> {
        if state == 0 {
            self.matches = self
                .env
                .iter()
                .filter(|name| name.starts_with(text))
                .cloned()
                .collect();
            self.matches.sort();
        }
        self.matches.get(state).cloned()
    }

    /// Every candidate for `text`, in order
    pub fn candidates(
        &mut self,
        text: &str,
    ) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(candidate) = self.complete(text, out.len()) {
            out.push(candidate);
        }
        out
    }

    /// Add the namespace's current names
    pub fn refresh(
        &mut self,
        namespace: &Namespace,
    ) {
        let before = self.env.len();
        self.env.extend(namespace.names().map(str::to_string));
        tracing::debug!(
            "completer refreshed: {} names ({} new)",
            self.env.len(),
            self.env.len() - before
        );
    }

    /// Whether `name` is known
    pub fn knows(
        &self,
        name: &str,
    ) -> bool {
        self.env.contains(name)
    }

    pub fn len(&self) -> usize {
        self.env.len()
    }

    pub fn is_empty(&self) -> bool {
        self.env.is_empty()
    }
}

/// Byte offset where the word ending at `pos` starts
pub fn word_start(
    line: &str,
    pos: usize,
) -> usize {
    line[..pos]
        .rfind(|c: char| WORD_DELIMITERS.contains(c))
        .map(|i| i + 1)
        .unwrap_or(0)
}

/// Complete the word before `pos` in `line`
///
/// Returns the replacement start and the candidates. A completer that is
/// already borrowed (a completion re-entered from inside another) yields no
/// candidates rather than failing the edit.
pub fn complete_word(
    completer: &SharedCompleter,
    line: &str,
    pos: usize,
) -> (usize, Vec<String>) {
    let pos = pos.min(line.len());
    if !line.is_char_boundary(pos) {
        return (pos, Vec::new());
    }
    let start = word_start(line, pos);
    let text = &line[start..pos];
    match completer.try_borrow_mut() {
        Ok(mut completer) => (start, completer.candidates(text)),
        Err(_) => {
            tracing::debug!("completer busy, no candidates");
            (start, Vec::new())
        }
    }
}
