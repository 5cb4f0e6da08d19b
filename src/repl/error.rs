//! Session-level errors

use std::io;
use std::path::PathBuf;

use crate::host::HostError;
use crate::repl::backend_trait::ScriptError;
use crate::repl::console::ConsoleError;
use crate::util::config::ConfigError;

/// Session error
///
/// Interactive statement errors never surface here: they are reported
/// through the console and the session carries on. A failing script run with
/// `run_file` does.
#[derive(Debug, thiserror::Error)]
pub enum ReplError {
    /// The host namespace could not be located
    #[error(transparent)]
    Host(#[from] HostError),
    /// The console failed for a reason other than end of input or interrupt
    #[error("console failure: {0}")]
    Console(#[from] ConsoleError),
    #[error("history file {}: {message}", .path.display())]
    History { path: PathBuf, message: String },
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("can't open file '{}': {source}", .path.display())]
    Script { path: PathBuf, source: io::Error },
    /// A script stopped on a statement error
    #[error(transparent)]
    Statement(#[from] ScriptError),
}
