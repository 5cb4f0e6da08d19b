//! Interactive loop scenarios
//!
//! Drive the loop engine with a scripted console and check prompts, channels
//! and namespace effects.

use pnr_repl::repl::console::{Channel, ScriptedConsole, ScriptedInput};
use pnr_repl::repl::engine::FAREWELL;
use pnr_repl::repl::{InteractiveREPL, LoopState, Namespace, SessionConfig, Value};
use pnr_repl::ScriptEngine;

fn session(inputs: Vec<ScriptedInput>) -> InteractiveREPL<ScriptEngine, ScriptedConsole> {
    let namespace: Namespace = [("x", Value::Int(1))].into_iter().collect();
    InteractiveREPL::new(
        ScriptEngine::new(),
        ScriptedConsole::new(inputs),
        namespace,
        SessionConfig::default(),
    )
}

#[test]
fn test_assignment_becomes_completable_after_it_runs() {
    let mut repl = session(Vec::new());
    assert_eq!(repl.complete("y", 0), None);

    assert!(!repl.push("y = x + 1"));
    assert!(repl.console().lines(Channel::Err).is_empty());
    assert_eq!(repl.namespace().get("y"), Some(&Value::Int(2)));

    assert_eq!(repl.complete("y", 0), Some("y".to_string()));
    assert_eq!(repl.complete("y", 1), None);
}

#[test]
fn test_block_header_switches_to_continuation_prompt() {
    let mut repl = session(vec!["if True:".into(), "    pass".into()]);
    repl.exec().unwrap();

    let console = repl.console();
    assert_eq!(console.prompts(), vec![">>> ", "... ", ">>> "]);
    assert!(console.lines(Channel::Err).is_empty());
    assert_eq!(repl.namespace().names().collect::<Vec<_>>(), vec!["x"]);
}

#[test]
fn test_interrupt_in_continuation_discards_pending_statement() {
    let mut repl = session(vec![
        "if True:".into(),
        ScriptedInput::Interrupt,
        "y = 2".into(),
    ]);
    repl.exec().unwrap();

    let console = repl.console();
    assert_eq!(console.prompts(), vec![">>> ", "... ", ">>> ", ">>> "]);
    assert!(console.lines(Channel::Out).contains(&"KeyboardInterrupt".to_string()));
    assert!(console.lines(Channel::Err).is_empty());
    assert_eq!(repl.namespace().get("y"), Some(&Value::Int(2)));
}

#[test]
fn test_interrupt_at_primary_prompt_keeps_session_alive() {
    let mut repl = session(vec![ScriptedInput::Interrupt, "x".into()]);
    repl.exec().unwrap();
    let out = repl.console().lines(Channel::Out);
    let notice = out.iter().position(|l| l == "KeyboardInterrupt").unwrap();
    let echo = out.iter().position(|l| l == "1").unwrap();
    assert!(notice < echo);
}

#[test]
fn test_end_of_input_terminates_cleanly() {
    let mut repl = session(vec![ScriptedInput::Eof, "never".into()]);
    assert!(repl.exec().is_ok());
    assert_eq!(repl.state(), LoopState::Terminated);

    let console = repl.console();
    assert_eq!(console.pending(), 1);
    assert!(console
        .text(Channel::Out)
        .ends_with(&format!("\n{}\n", FAREWELL)));
}

#[test]
fn test_end_of_input_in_continuation_terminates() {
    let mut repl = session(vec!["v = [1,".into()]);
    repl.exec().unwrap();
    assert_eq!(repl.console().prompts(), vec![">>> ", "... "]);
    assert_eq!(repl.state(), LoopState::Terminated);
    assert!(!repl.namespace().contains("v"));
}

#[test]
fn test_statement_errors_do_not_end_the_session() {
    let mut repl = session(vec!["z".into(), "1 +".into(), "w = 3".into(), "w".into()]);
    repl.exec().unwrap();

    let console = repl.console();
    assert_eq!(
        console.lines(Channel::Err),
        vec![
            "NameError: name 'z' is not defined",
            "SyntaxError: invalid syntax (line 1)",
        ]
    );
    assert!(console.lines(Channel::Out).contains(&"3".to_string()));
}

#[test]
fn test_bracket_continues_until_closed() {
    let mut repl = session(vec!["v = [1,".into(), " 2]".into(), "len(v)".into()]);
    repl.exec().unwrap();
    let console = repl.console();
    assert_eq!(console.prompts(), vec![">>> ", "... ", ">>> ", ">>> "]);
    assert!(console.lines(Channel::Out).contains(&"2".to_string()));
}

#[test]
fn test_blank_line_after_header_is_reported() {
    let mut repl = session(vec!["if True:".into(), "".into(), "x".into()]);
    repl.exec().unwrap();
    let console = repl.console();
    assert_eq!(
        console.lines(Channel::Err),
        vec!["SyntaxError: expected an indented block (line 2)"]
    );
    assert_eq!(console.prompts(), vec![">>> ", "... ", ">>> ", ">>> "]);
}

#[test]
fn test_empty_line_at_primary_prompt_is_a_no_op() {
    let mut repl = session(vec!["".into(), "   ".into()]);
    repl.exec().unwrap();
    assert_eq!(repl.console().prompts(), vec![">>> ", ">>> ", ">>> "]);
    assert!(repl.console().lines(Channel::Err).is_empty());
}

#[test]
fn test_print_output_goes_to_output_channel() {
    let mut repl = session(vec!["print('placed', 2, 'cells')".into()]);
    repl.exec().unwrap();
    assert!(repl
        .console()
        .lines(Channel::Out)
        .contains(&"placed 2 cells".to_string()));
}

#[test]
fn test_banner_precedes_first_prompt() {
    let mut repl = session(Vec::new());
    repl.exec().unwrap();
    let transcript = repl.console().transcript();
    let first_prompt = transcript
        .iter()
        .position(|(c, _)| *c == Channel::Prompt)
        .unwrap();
    assert!(transcript[0].1.contains("scripting console"));
    assert!(first_prompt > 0);
}

#[test]
fn test_startup_statements_run_without_echo() {
    let mut repl = session(Vec::new());
    repl.run_startup(&["a = x + 41".to_string(), "a".to_string(), "bad(".to_string()]);
    assert_eq!(repl.namespace().get("a"), Some(&Value::Int(42)));
    assert!(repl.console().lines(Channel::Out).is_empty());
    assert_eq!(
        repl.console().lines(Channel::Err),
        vec!["SyntaxError: unexpected EOF while parsing"]
    );
    assert_eq!(repl.state(), LoopState::AwaitingStatement);
}
