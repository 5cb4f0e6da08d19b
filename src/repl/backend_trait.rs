//! REPL Backend Trait
//!
//! Defines the contract between the loop engine and the evaluation engine:
//! submit the pending source, get back "complete", "incomplete" or an error.

use std::fmt;

use crate::repl::namespace::Namespace;

/// Category of a statement error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The source could not be parsed
    Syntax,
    /// The source parsed but failed while running
    Runtime,
}

/// Error reported by the evaluation engine for one statement
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{name}: {message}")]
pub struct ScriptError {
    /// Syntax or runtime
    pub category: ErrorCategory,
    /// Error class name (`SyntaxError`, `NameError`, ...)
    pub name: String,
    /// Human readable message
    pub message: String,
}

impl ScriptError {
    pub fn syntax(message: impl Into<String>) -> Self {
        Self {
            category: ErrorCategory::Syntax,
            name: "SyntaxError".to_string(),
            message: message.into(),
        }
    }

    pub fn runtime(
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            category: ErrorCategory::Runtime,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_syntax(&self) -> bool {
        self.category == ErrorCategory::Syntax
    }
}

/// Evaluation result
#[derive(Debug, Clone, PartialEq)]
pub enum EvalResult {
    /// The statement ran to completion
    Complete,
    /// More input needed (incomplete statement)
    Incomplete,
    /// The statement failed; the session continues
    Error(ScriptError),
}

/// What one submission produced
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub result: EvalResult,
    /// Lines written by the statement (prints, echoed values)
    pub output: Vec<String>,
}

impl Evaluation {
    pub fn complete(output: Vec<String>) -> Self {
        Self {
            result: EvalResult::Complete,
            output,
        }
    }

    pub fn incomplete() -> Self {
        Self {
            result: EvalResult::Incomplete,
            output: Vec::new(),
        }
    }

    pub fn error(
        error: ScriptError,
        output: Vec<String>,
    ) -> Self {
        Self {
            result: EvalResult::Error(error),
            output,
        }
    }

    pub fn is_incomplete(&self) -> bool {
        matches!(self.result, EvalResult::Incomplete)
    }
}

/// REPL Backend Trait
///
/// The evaluation engine. The loop engine owns the namespace and lends it for
/// each submission; a backend must leave it untouched when it reports
/// [`EvalResult::Incomplete`].
pub trait REPLBackend {
    /// Evaluate the pending source (all lines of the statement so far)
    fn run_source(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation;

    /// Evaluate a whole script (a file or `-c` argument)
    ///
    /// Unlike [`run_source`](Self::run_source) there is no further input to
    /// wait for, so an unfinished statement is a syntax error.
    fn run_script(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation {
        let evaluation = self.run_source(source, namespace);
        if evaluation.is_incomplete() {
            return Evaluation::error(
                ScriptError::syntax("unexpected EOF while parsing"),
                evaluation.output,
            );
        }
        evaluation
    }

    /// Names that resolve without being bound in the namespace
    fn builtin_names(&self) -> Vec<String> {
        Vec::new()
    }
}

impl<B: REPLBackend + ?Sized> REPLBackend for Box<B> {
    fn run_source(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation {
        (**self).run_source(source, namespace)
    }

    fn run_script(
        &mut self,
        source: &str,
        namespace: &mut Namespace,
    ) -> Evaluation {
        (**self).run_script(source, namespace)
    }

    fn builtin_names(&self) -> Vec<String> {
        (**self).builtin_names()
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ErrorCategory::Syntax => write!(f, "syntax"),
            ErrorCategory::Runtime => write!(f, "runtime"),
        }
    }
}
