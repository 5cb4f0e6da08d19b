//! Coloured console

use std::io::{self, IsTerminal};

use owo_colors::OwoColorize;

use crate::repl::console::plain::emit;
use crate::repl::console::{banner_lines, Console, ConsoleError};
use crate::repl::line::{LineEditor, RustylineEditor};
use crate::util::config::ReplConfig;

/// Text style of a console channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Style {
    Plain,
    Title,
    Warning,
    Error,
}

/// Apply `style` when colours are on
pub fn paint(
    text: &str,
    style: Style,
    colors: bool,
) -> String {
    if !colors {
        return text.to_string();
    }
    match style {
        Style::Plain => text.to_string(),
        Style::Title => text.bold().to_string(),
        Style::Warning => text.yellow().to_string(),
        Style::Error => text.red().bold().to_string(),
    }
}

/// Console with a bold banner, yellow warnings and red errors on stderr
pub struct RichConsole {
    editor: RustylineEditor,
    colors: bool,
}

impl RichConsole {
    /// Colours follow `config.colors` and are dropped when stdout is not a
    /// terminal.
    pub fn new(config: &ReplConfig) -> Result<Self, ConsoleError> {
        Ok(Self {
            editor: RustylineEditor::new(config.edit_mode)?,
            colors: config.colors && io::stdout().is_terminal(),
        })
    }
}

impl Console for RichConsole {
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
        emit(
            io::stdout().lock(),
            &paint(message, Style::Warning, self.colors),
            "\n",
        );
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        emit(
            io::stderr().lock(),
            &paint(message, Style::Error, self.colors),
            "\n",
        );
    }

    fn print_banner(
        &mut self,
        version: &str,
        arch: &str,
    ) {
        for (i, line) in banner_lines(version, arch).iter().enumerate() {
            let style = if i == 0 { Style::Title } else { Style::Plain };
            self.print(&paint(line, style, self.colors));
        }
    }

    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        Some(&mut self.editor)
    }
}
