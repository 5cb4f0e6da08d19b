//! Embedded scripting console for place-and-route tools
//!
//! An interactive read-eval-print loop that runs inside a host application
//! and gives the operator a live session against the host's design context.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use pnr_repl::host::GenericHost;
//! use pnr_repl::util::config::ReplConfig;
//!
//! fn main() -> Result<(), pnr_repl::ReplError> {
//!     let host = Arc::new(GenericHost::new("generic", "ice40"));
//!     pnr_repl::embed(host, None, &ReplConfig::default())
//! }
//! ```

#![warn(rust_2018_idioms)]

pub mod host;
pub mod repl;
pub mod script;

// Utility modules
pub mod util;

use std::sync::Arc;

// Re-exports
pub use repl::{InteractiveREPL, ReplError, SessionConfig};
pub use script::ScriptEngine;

use crate::host::{register_host, HostModule, HostObject};
use crate::repl::console::get_console;
use crate::util::config::ReplConfig;
use crate::util::dirs::AppDirs;

/// Console version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Console name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Exit status when the host namespace cannot be located
pub const HOST_UNAVAILABLE_EXIT_CODE: u8 = 3;

/// Session settings for `config`, defaulting the history file to
/// `<state dir>/history`
pub fn session_config(
    config: &ReplConfig,
    dirs: &AppDirs,
) -> SessionConfig {
    let history_file = config
        .history_file
        .clone()
        .unwrap_or_else(|| dirs.history_file());
    SessionConfig::from_repl_config(config).with_history_file(Some(history_file))
}

/// Run an interactive session from inside a host
///
/// Registers `host`, binds `ctx` (or the host's own context), and runs the
/// configured console with the reference script engine until end of input.
pub fn embed(
    host: Arc<dyn HostModule>,
    ctx: Option<Arc<dyn HostObject>>,
    config: &ReplConfig,
) -> Result<(), ReplError> {
    let name = host.name().to_string();
    register_host(host);

    let dirs = AppDirs::resolve(NAME);
    if let Err(e) = dirs.ensure_exists() {
        tracing::warn!("cannot create application directories: {}", e);
    }

    let console = get_console(config.console, config)?;
    repl::start_session(
        ScriptEngine::new(),
        console,
        &name,
        ctx,
        session_config(config, &dirs),
        &config.startup,
    )
}
