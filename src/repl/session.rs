//! Host sessions
//!
//! Locate the host, seed the namespace with its module, exports and context,
//! and hand everything to the loop engine.

use std::sync::Arc;

use crate::host::{locate_host, HostError, HostModule, HostObject, CONTEXT_NAME};
use crate::repl::backend_trait::REPLBackend;
use crate::repl::console::Console;
use crate::repl::engine::{InteractiveREPL, SessionConfig};
use crate::repl::error::ReplError;
use crate::repl::namespace::{Namespace, Value};

/// Namespace for a host session
///
/// The module is bound under its own name, its exports are imported, and the
/// context is bound as [`CONTEXT_NAME`].
pub fn host_namespace(
    host: &Arc<dyn HostModule>,
    ctx: Arc<dyn HostObject>,
) -> Namespace {
    let mut namespace = Namespace::new();
    namespace.insert(host.name(), Value::Module(host.clone()));
    for (name, value) in host.exports() {
        namespace.insert(name, value);
    }
    namespace.insert(CONTEXT_NAME, Value::Object(ctx));
    namespace
}

/// Build a loop engine attached to the host named `host_name`
///
/// `ctx` is the embedding host's live context; without one the host's own
/// context is used. Failing to locate the host (or a context) is reported
/// through the console's error channel and returned, and no session starts.
pub fn open_session<B, C>(
    backend: B,
    mut console: C,
    host_name: &str,
    ctx: Option<Arc<dyn HostObject>>,
    config: SessionConfig,
) -> Result<InteractiveREPL<B, C>, ReplError>
where
    B: REPLBackend,
    C: Console,
{
    let host = match locate_host(host_name) {
        Ok(host) => host,
        Err(e) => {
            console.error(&e.to_string());
            return Err(e.into());
        }
    };

    let Some(ctx) = ctx.or_else(|| host.context()) else {
        let e = HostError::NoContext {
            name: host_name.to_string(),
        };
        console.error(&e.to_string());
        return Err(e.into());
    };

    tracing::debug!(
        host = host.name(),
        version = host.version(),
        arch = host.arch(),
        "opening session"
    );
    let namespace = host_namespace(&host, ctx);
    let config = config.with_banner(host.version(), host.arch());
    Ok(InteractiveREPL::new(backend, console, namespace, config))
}

/// Open a host session, run the startup statements, then the interactive loop
pub fn start_session<B, C>(
    backend: B,
    console: C,
    host_name: &str,
    ctx: Option<Arc<dyn HostObject>>,
    config: SessionConfig,
    startup: &[String],
) -> Result<(), ReplError>
where
    B: REPLBackend,
    C: Console,
{
    let mut repl = open_session(backend, console, host_name, ctx, config)?;
    repl.run_startup(startup);
    repl.exec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{register_host, GenericHost};
    use crate::repl::console::{Channel, ScriptedConsole};
    use crate::script::ScriptEngine;

    #[test]
    fn test_host_namespace_binds_module_exports_and_ctx() {
        let host: Arc<dyn HostModule> = Arc::new(GenericHost::new("session_ns_host", "ice40"));
        let ctx = host.context().unwrap();
        let ns = host_namespace(&host, ctx);
        assert_eq!(
            ns.names().collect::<Vec<_>>(),
            vec!["session_ns_host", "PlaceStrength", "PortType", "ctx"]
        );
    }

    #[test]
    fn test_missing_host_is_reported_and_refused() {
        let mut console = ScriptedConsole::default();
        let refused = matches!(
            open_session(
                ScriptEngine::new(),
                &mut console,
                "no_such_host",
                None,
                SessionConfig::default(),
            ),
            Err(ReplError::Host(HostError::Unavailable { .. }))
        );
        assert!(refused);
        assert_eq!(
            console.lines(Channel::Err),
            vec!["Unable to import `no_such_host` API, this console may only be used inside no_such_host"]
        );
        assert!(console.prompts().is_empty());
    }

    #[test]
    fn test_banner_comes_from_host() {
        register_host(Arc::new(GenericHost::new("session_banner_host", "ecp5")));
        let mut console = ScriptedConsole::default();
        start_session(
            ScriptEngine::new(),
            &mut console,
            "session_banner_host",
            None,
            SessionConfig::default(),
            &["print(ctx.arch)".to_string()],
        )
        .unwrap();
        let out = console.lines(Channel::Out);
        assert_eq!(out[0], "ecp5");
        assert!(out.contains(&"Current architecture: ecp5".to_string()));
    }
}
