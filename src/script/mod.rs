//! Reference evaluation engine
//!
//! A small Python-flavoured statement language so the console can be used
//! and tested end to end without an embedding host interpreter.
//!
//! # Completeness
//!
//! A source is *incomplete* (the loop engine should ask for a continuation
//! line) when a bracket or triple-quoted string is still open, the last line
//! ends in a backslash, or the last logical line is a block header (`if x:`)
//! with no suite yet. A blank line after a bare block header is a syntax error.

pub mod ast;
pub mod interp;
pub mod lexer;
pub mod parser;

use crate::repl::backend_trait::{Evaluation, REPLBackend, ScriptError};
use crate::repl::namespace::Namespace;

use ast::Stmt;
use interp::{Interpreter, BUILTINS};
use lexer::{tokenize, TokenKind};

/// Outcome of compiling a pending source
#[derive(Debug, Clone, PartialEq)]
pub enum Compiled {
    /// Ready to run
    Ready(Vec<Stmt>),
    /// Needs at least one more line
    NeedsMore,
}

/// Compile a pending source, deciding whether it is complete
pub fn compile(source: &str) -> Result<Compiled, ScriptError> {
    if source.trim().is_empty() {
        return Ok(Compiled::Ready(Vec::new()));
    }

    let tokens = match tokenize(source) {
        Ok(tokens) => tokens,
        Err(e) if e.needs_more_input() => return Ok(Compiled::NeedsMore),
        Err(e) => return Err(ScriptError::syntax(e.to_string())),
    };

    let last_significant = tokens
        .iter()
        .rev()
        .find(|t| !matches!(t.kind, TokenKind::Newline | TokenKind::Dedent | TokenKind::Eof));
    if let Some(token) = last_significant {
        if token.kind == TokenKind::Op(":") {
            let blank_tail = source.lines().count() > 1
                && source.lines().last().map_or(true, |l| l.trim().is_empty());
            if blank_tail || source.ends_with('\n') {
                return Err(ScriptError::syntax(format!(
                    "expected an indented block (line {})",
                    token.line + 1
                )));
            }
            return Ok(Compiled::NeedsMore);
        }
    }

    parser::parse(tokens).map(Compiled::Ready)
}

/// The reference [`REPLBackend`]
#[derive(Debug, Default, Clone, Copy)]
pub struct ScriptEngine;

impl ScriptEngine {
    pub fn new() -> Self {
        Self
    }

    fn run(
        source: &str,
        namespace: &mut Namespace,
        echo: bool,
    ) -> Evaluation {
        let stmts = match compile(source) {
            Ok(Compiled::Ready(stmts)) => stmts,
            Ok(Compiled::NeedsMore) => return Evaluation::incomplete(),
            Err(e) => return Evaluation::error(e, Vec::new()),
        };

        let mut interp = Interpreter::new(namespace, echo);
        let result = interp.execute(&stmts);
        let output = interp.into_output();
        match result {
            Ok(()) => Evaluation::complete(output),
            Err(e) => Evaluation::error(e, output),
        }
    }
}

impl REPLBackend for ScriptEngine {
    fn run_source(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation {
        Self::run(source, namespace, true)
    }

    fn run_script(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation {
        match compile(source) {
            Ok(Compiled::NeedsMore) => Evaluation::error(
                ScriptError::syntax("unexpected EOF while parsing"),
                Vec::new(),
            ),
            _ => Self::run(source, namespace, false),
        }
    }

    fn builtin_names(&self) -> Vec<String> {
        BUILTINS.iter().map(|b| b.to_string()).collect()
    }
}
