//! Scripted console
//!
//! Headless console fed from a queue of inputs. Everything written to it is
//! kept in a transcript, channel by channel.

use std::collections::VecDeque;

use crate::repl::console::{Console, ConsoleError};
use crate::repl::line::{LineEditor, MemoryEditor};

/// One queued operator action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScriptedInput {
    /// A submitted line
    Line(String),
    /// Ctrl-C at the prompt
    Interrupt,
    /// Ctrl-D at the prompt
    Eof,
}

impl From<&str> for ScriptedInput {
    fn from(line: &str) -> Self {
        ScriptedInput::Line(line.to_string())
    }
}

/// Transcript channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    Prompt,
    Out,
    Warn,
    Err,
}

#[derive(Debug, Default)]
pub struct ScriptedConsole {
    inputs: VecDeque<ScriptedInput>,
    transcript: Vec<(Channel, String)>,
    editor: MemoryEditor,
}

impl ScriptedConsole {
    pub fn new<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = ScriptedInput>,
    {
        Self {
            inputs: inputs.into_iter().collect(),
            transcript: Vec::new(),
            editor: MemoryEditor::new(),
        }
    }

    /// Queue plain lines; end of input follows the last one
    pub fn from_lines(lines: &[&str]) -> Self {
        Self::new(lines.iter().map(|line| ScriptedInput::from(*line)))
    }

    /// Queue one more input
    pub fn push(
        &mut self,
        input: impl Into<ScriptedInput>,
    ) {
        self.inputs.push_back(input.into());
    }

    /// Inputs not consumed yet
    pub fn pending(&self) -> usize {
        self.inputs.len()
    }

    /// Everything written, in order
    pub fn transcript(&self) -> &[(Channel, String)] {
        &self.transcript
    }

    /// Text written to one channel
    pub fn text(
        &self,
        channel: Channel,
    ) -> String {
        self.transcript
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, text)| text.as_str())
            .collect()
    }

    /// Lines written to one channel
    pub fn lines(
        &self,
        channel: Channel,
    ) -> Vec<String> {
        self.text(channel).lines().map(str::to_string).collect()
    }

    /// Prompts shown, in order
    pub fn prompts(&self) -> Vec<String> {
        self.transcript
            .iter()
            .filter(|(c, _)| *c == Channel::Prompt)
            .map(|(_, text)| text.clone())
            .collect()
    }

    pub fn editor(&self) -> &MemoryEditor {
        &self.editor
    }

    pub fn editor_mut(&mut self) -> &mut MemoryEditor {
        &mut self.editor
    }
}

impl Console for ScriptedConsole {
    fn prompt(
        &mut self,
        prompt: &str,
    ) -> Result<String, ConsoleError> {
        self.transcript.push((Channel::Prompt, prompt.to_string()));
        match self.inputs.pop_front() {
            Some(ScriptedInput::Line(line)) => {
                self.editor.record(&line);
                Ok(line)
            }
            Some(ScriptedInput::Interrupt) => Err(ConsoleError::Interrupted),
            Some(ScriptedInput::Eof) | None => Err(ConsoleError::Eof),
        }
    }

    fn print_end(
        &mut self,
        message: &str,
        end: &str,
    ) {
        self.transcript
            .push((Channel::Out, format!("{}{}", message, end)));
    }

    fn warn(
        &mut self,
        message: &str,
    ) {
        self.transcript
            .push((Channel::Warn, format!("{}\n", message)));
    }

    fn error(
        &mut self,
        message: &str,
    ) {
        self.transcript
            .push((Channel::Err, format!("{}\n", message)));
    }

    fn line_editor(&mut self) -> Option<&mut dyn LineEditor> {
        Some(&mut self.editor)
    }
}
