//! Console abstraction
//!
//! The capability surface the loop engine talks to: read a line under a
//! prompt, and write to the output, warning and error channels. The loop
//! engine depends only on [`Console`]; the variants decide where text goes.
//!
//! - [`PlainConsole`] - plain stdout/stderr with a rustyline prompt
//! - [`RichConsole`] - the same with coloured output
//! - [`ScriptedConsole`] - queued input and a captured transcript

use std::io;

use rustyline::error::ReadlineError;

use crate::repl::line::LineEditor;
use crate::util::config::{ConsoleKind, ReplConfig};

mod plain;
mod rich;
mod scripted;

pub use plain::PlainConsole;
pub use rich::RichConsole;
pub use scripted::{Channel, ScriptedConsole, ScriptedInput};

/// Why a prompt produced no line
#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// End of input (Ctrl-D, closed stdin, exhausted script)
    #[error("end of input")]
    Eof,
    /// The operator cancelled the line (Ctrl-C)
    #[error("interrupted")]
    Interrupted,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("line editor error: {0}")]
    Editor(String),
}

impl From<ReadlineError> for ConsoleError {
    fn from(error: ReadlineError) -> Self {
        match error {
            ReadlineError::Eof => ConsoleError::Eof,
            ReadlineError::Interrupted => ConsoleError::Interrupted,
            ReadlineError::Io(e) => ConsoleError::Io(e),
            other => ConsoleError::Editor(other.to_string()),
        }
    }
}

/// Banner lines for a product version and architecture name
pub fn banner_lines(
    version: &str,
    arch: &str,
) -> Vec<String> {
    vec![
        format!("{} scripting console ({})", crate::NAME, version),
        format!("Current architecture: {}", arch),
        format!(
            "\nGlobal context is present as '{}'",
            crate::host::CONTEXT_NAME
        ),
        "\nPress ^D (Ctrl-D) to exit this REPL session".to_string(),
    ]
}

/// Interactive I/O capability
pub trait Console {
    /// Read one line under `prompt`
    fn prompt(
        &mut self,
        prompt: &str,
    ) -> Result<String, ConsoleError>;

    /// Write `message` followed by `end` to the output channel
    fn print_end(
        &mut self,
        message: &str,
        end: &str,
    );

    /// Write a line to the output channel
    fn print(
        &mut self,
        message: &str,
    ) {
        self.print_end(message, "\n");
    }

    /// Write a line to the warning channel
    fn warn(
        &mut self,
        message: &str,
    );

    /// Write a line to the error channel
    fn error(
        &mut self,
        message: &str,
    );

    fn print_banner(
        &mut self,
        version: &str,
        arch: &str,
    ) {
        for line in banner_lines(version, arch) {
            self.print(&line);
        }
    }

    /// History and completion hooks, if the console edits lines
    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        None
    }
}

impl<C: Console + ?Sized> Console for &mut C {
    fn prompt(
        &mut self,
        prompt: &str,
    ) -> Result<String, ConsoleError> {
        (**self).prompt(prompt)
    }

    fn print_end(
        &mut self,
        message: &str,
        end: &str,
    ) {
        (**self).print_end(message, end)
    }

    fn print(
        &mut self,
        message: &str,
    ) {
        (**self).print(message)
    }

    fn warn(
        &mut self,
        message: &str,
    ) {
        (**self).warn(message)
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        (**self).error(message)
    }

    fn print_banner(
        &mut self,
        version: &str,
        arch: &str,
    ) {
        (**self).print_banner(version, arch)
    }

    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        (**self).line_editor()
    }
}

impl<C: Console + ?Sized> Console for Box<C> {
    fn prompt(
        &mut self,
        prompt: &str,
    ) -> Result<String, ConsoleError> {
        (**self).prompt(prompt)
    }

    fn print_end(
        &mut self,
        message: &str,
        end: &str,
    ) {
        (**self).print_end(message, end)
    }

    fn print(
        &mut self,
        message: &str,
    ) {
        (**self).print(message)
    }

    fn warn(
        &mut self,
        message: &str,
    ) {
        (**self).warn(message)
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        (**self).error(message)
    }

    fn print_banner(
        &mut self,
        version: &str,
        arch: &str,
    ) {
        (**self).print_banner(version, arch)
    }

    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        (**self).line_editor()
    }
}

/// Build the console selected by `kind`
pub fn get_console(
    kind: ConsoleKind,
    config: &ReplConfig,
) -> Result<Box<dyn Console>, ConsoleError> {
    tracing::debug!("using {:?} console", kind);
    let console: Box<dyn Console> = match kind {
        ConsoleKind::Plain => Box::new(PlainConsole::new(config)?),
        ConsoleKind::Rich => Box::new(RichConsole::new(config)?),
    };
    Ok(console)
}
