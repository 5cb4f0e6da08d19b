//! Plain stream console

use std::io::{self, Write};

use crate::repl::console::{Console, ConsoleError};
use crate::repl::line::{LineEditor, RustylineEditor};
use crate::util::config::ReplConfig;

/// Console on stdout/stderr with a rustyline prompt
///
/// Output and warnings go to stdout, errors to stderr.
pub struct PlainConsole {
    editor: RustylineEditor,
}

impl PlainConsole {
    pub fn new(config: &ReplConfig) -> Result<Self, ConsoleError> {
        Ok(Self {
            editor: RustylineEditor::new(config.edit_mode)?,
        })
    }
}

/// Write and flush, ignoring a closed stream
pub(crate) fn emit(
    mut stream: impl Write,
    text: &str,
    end: &str,
) {
    let _ = write!(stream, "{}{}", text, end);
    let _ = stream.flush();
}

impl Console for PlainConsole {
    fn prompt(
        &mut self,
        prompt: &str,
    ) -> Result<String, ConsoleError> {
        Ok(self.editor.readline(prompt)?)
    }

    fn print_end(
        &mut self,
        message: &str,
        end: &str,
    ) {
        emit(io::stdout().lock(), message, end);
    }

    fn warn(
        &mut self,
        message: &str,
    ) {
        emit(io::stdout().lock(), message, "\n");
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        emit(io::stderr().lock(), message, "\n");
    }

    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        Some(&mut self.editor)
    }
}
