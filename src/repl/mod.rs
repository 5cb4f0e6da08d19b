//! REPL Module
//!
//! Interactive scripting console for a place-and-route host.
//!
//! This module contains:
//! - [`backend_trait::REPLBackend`] - Evaluation engine contract
//! - [`console::Console`] - Interactive I/O capability and its variants
//! - [`line::REPLCompleter`] - Namespace completion provider
//! - [`line::LineEditor`] - History and completion hooks of a line editor
//! - [`engine::InteractiveREPL`] - The prompt / evaluate / print loop
//! - [`session`] - Host lookup and namespace seeding

pub mod backend_trait;
pub mod console;
pub mod engine;
pub mod error;
pub mod line;
pub mod namespace;
pub mod session;

pub use backend_trait::{ErrorCategory, EvalResult, Evaluation, REPLBackend, ScriptError};
pub use console::{get_console, Console, ConsoleError};
pub use engine::{InteractiveREPL, LoopState, SessionConfig};
pub use error::ReplError;
pub use line::{LineEditor, REPLCompleter};
pub use namespace::{Namespace, Value};
pub use session::{host_namespace, open_session, start_session};
