//! Sessions against embedding hosts

use std::sync::Arc;

use pnr_repl::host::{register_host, HostError, HostModule, HostObject};
use pnr_repl::repl::console::{Channel, ScriptedConsole};
use pnr_repl::repl::{open_session, start_session, ReplError, SessionConfig, Value};
use pnr_repl::ScriptEngine;

#[derive(Debug)]
struct RouterContext {
    iterations: i64,
}

impl HostObject for RouterContext {
    fn type_name(&self) -> &str {
        "RouterContext"
    }

    fn attr(
        &self,
        name: &str,
    ) -> Option<Value> {
        match name {
            "iterations" => Some(Value::Int(self.iterations)),
            _ => None,
        }
    }

    fn attr_names(&self) -> Vec<String> {
        vec!["iterations".to_string()]
    }
}

/// A host that expects the embedding tool to pass its context
#[derive(Debug)]
struct RouterHost {
    name: &'static str,
}

impl HostModule for RouterHost {
    fn name(&self) -> &str {
        self.name
    }

    fn version(&self) -> &str {
        "router 9.1"
    }

    fn arch(&self) -> &str {
        "xc7"
    }

    fn exports(&self) -> Vec<(String, Value)> {
        vec![("MAX_FANOUT".to_string(), Value::Int(32))]
    }
}

fn register(name: &'static str) {
    register_host(Arc::new(RouterHost { name }));
}

#[test]
fn test_embedding_context_is_shared_not_owned() {
    register("router_shared");
    let ctx = Arc::new(RouterContext { iterations: 12 });
    let shared: Arc<dyn HostObject> = ctx.clone();

    let mut console = ScriptedConsole::from_lines(&["print(ctx.iterations + MAX_FANOUT)"]);
    let mut repl = open_session(
        ScriptEngine::new(),
        &mut console,
        "router_shared",
        Some(shared),
        SessionConfig::default(),
    )
    .unwrap();
    assert!(Arc::strong_count(&ctx) > 1);

    repl.exec().unwrap();
    drop(repl);

    assert_eq!(Arc::strong_count(&ctx), 1);
    assert_eq!(ctx.iterations, 12);
    assert!(console.lines(Channel::Out).contains(&"44".to_string()));
}

#[test]
fn test_banner_uses_host_version_and_arch() {
    register("router_banner");
    let mut console = ScriptedConsole::default();
    start_session(
        ScriptEngine::new(),
        &mut console,
        "router_banner",
        Some(Arc::new(RouterContext { iterations: 0 })),
        SessionConfig::default(),
        &[],
    )
    .unwrap();

    let out = console.lines(Channel::Out);
    assert!(out[0].ends_with("(router 9.1)"));
    assert_eq!(out[1], "Current architecture: xc7");
}

#[test]
fn test_module_is_bound_under_its_name() {
    register("router_module");
    let mut console = ScriptedConsole::default();
    let mut repl = open_session(
        ScriptEngine::new(),
        &mut console,
        "router_module",
        Some(Arc::new(RouterContext { iterations: 0 })),
        SessionConfig::default(),
    )
    .unwrap();

    let names: Vec<String> = repl.namespace().names().map(str::to_string).collect();
    assert_eq!(names, vec!["router_module", "MAX_FANOUT", "ctx"]);
    assert!(matches!(
        repl.namespace().get("router_module"),
        Some(Value::Module(_))
    ));
    assert_eq!(repl.complete("MAX", 0), Some("MAX_FANOUT".to_string()));
    repl.push("ctx.missing");
    assert!(repl.console().lines(Channel::Err)[0].starts_with("AttributeError"));
}

#[test]
fn test_host_without_context_needs_one_from_the_embedder() {
    register("router_no_ctx");
    let mut console = ScriptedConsole::from_lines(&["1"]);
    let refused = matches!(
        open_session(
            ScriptEngine::new(),
            &mut console,
            "router_no_ctx",
            None,
            SessionConfig::default(),
        ),
        Err(ReplError::Host(HostError::NoContext { .. }))
    );
    assert!(refused);
    assert_eq!(
        console.lines(Channel::Err),
        vec!["Host `router_no_ctx` does not provide a context"]
    );
    assert_eq!(console.pending(), 1);
}

#[test]
fn test_unavailable_host_never_prompts() {
    let mut console = ScriptedConsole::from_lines(&["1"]);
    let result = start_session(
        ScriptEngine::new(),
        &mut console,
        "router_never_registered",
        None,
        SessionConfig::default(),
        &["print('startup')".to_string()],
    );
    assert!(matches!(
        result,
        Err(ReplError::Host(HostError::Unavailable { .. }))
    ));
    assert!(console.prompts().is_empty());
    assert!(console.lines(Channel::Out).is_empty());
    assert_eq!(console.lines(Channel::Err).len(), 1);
}
