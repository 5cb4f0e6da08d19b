//! Completion provider properties

use std::collections::BTreeSet;

use proptest::prelude::*;
use pnr_repl::repl::console::ScriptedConsole;
use pnr_repl::repl::{InteractiveREPL, Namespace, REPLCompleter, SessionConfig, Value};
use pnr_repl::ScriptEngine;

fn name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[a-z_][a-z0-9_]{0,6}",
        Just("ctx".to_string()),
        Just("cells".to_string()),
        Just("PlaceStrength".to_string()),
    ]
}

proptest! {
    #[test]
    fn candidates_are_sorted_prefix_matches(
        names in prop::collection::vec(name_strategy(), 0..24),
        prefix in "[a-zP_]{0,2}",
    ) {
        let mut completer = REPLCompleter::new(names.clone());

        let mut got = Vec::new();
        let mut state = 0;
        while let Some(candidate) = completer.complete(&prefix, state) {
            got.push(candidate);
            state += 1;
        }

        let expected: Vec<String> = names
            .iter()
            .filter(|n| n.starts_with(&prefix))
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        prop_assert_eq!(&got, &expected);
        prop_assert_eq!(completer.complete(&prefix, state), None);
        prop_assert_eq!(completer.complete(&prefix, state + 7), None);
    }

    #[test]
    fn refresh_never_forgets_names(
        first in prop::collection::vec("[a-z]{1,5}", 0..10),
        second in prop::collection::vec("[a-z]{1,5}", 0..10),
    ) {
        let mut completer = REPLCompleter::new(first.clone());
        let namespace: Namespace = second.iter().map(|n| (n.clone(), Value::None)).collect();
        completer.refresh(&namespace);

        for name in first.iter().chain(second.iter()) {
            prop_assert!(completer.knows(name));
        }
    }
}

fn session() -> InteractiveREPL<ScriptEngine, ScriptedConsole> {
    let namespace: Namespace = [("ctx", Value::None)].into_iter().collect();
    InteractiveREPL::new(
        ScriptEngine::new(),
        ScriptedConsole::default(),
        namespace,
        SessionConfig::default(),
    )
}

#[test]
fn test_builtins_are_completable() {
    let repl = session();
    assert_eq!(repl.complete("pri", 0), Some("print".to_string()));
    assert_eq!(repl.complete("pri", 1), None);
}

#[test]
fn test_tab_in_the_console_sees_new_names() {
    let mut repl = session();
    assert!(repl.console().editor().has_completer());
    assert_eq!(repl.console().editor().complete("print(cl", 8), (6, Vec::new()));

    repl.push("clk_net = 'clk'");
    repl.push("cells = []");

    assert_eq!(
        repl.console().editor().complete("print(c", 7),
        (6, vec!["cells".to_string(), "clk_net".to_string(), "ctx".to_string()])
    );
}

#[test]
fn test_deleted_names_stay_in_the_snapshot() {
    let mut repl = session();
    repl.push("tmp = 1");
    repl.push("del tmp");
    assert!(!repl.namespace().contains("tmp"));
    assert_eq!(repl.complete("tm", 0), Some("tmp".to_string()));
}
