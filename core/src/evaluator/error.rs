//! Runtime evaluation errors.
//!
//! Every variant carries the span of the node that failed. Errors raised by
//! native functions are wrapped in [`EvalError::Backend`] with the original
//! [`BackendError`] kept intact as the error source.

use crate::api::{Diagnostic, Severity};
use crate::parser::Span;
use crate::values::{Arity, BackendError};

#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The name is bound neither in the variables nor in the namespace.
    #[error("name '{name}' is not defined")]
    UnboundName { name: String, span: Span },

    /// The name is bound both in the variables and in the namespace.
    #[error("name '{name}' is ambiguous: it is both a variable and a namespace binding")]
    AmbiguousName { name: String, span: Span },

    #[error("{message}")]
    TypeMismatch { message: String, span: Span },

    #[error("division by zero")]
    DivisionByZero { span: Span },

    /// Overflow or a result outside the operation's domain.
    #[error("{message}")]
    Arithmetic { message: String, span: Span },

    #[error("{function}() takes {expected} positional arguments but {found} were given")]
    ArityMismatch {
        function: String,
        expected: Arity,
        found: usize,
        span: Span,
    },

    #[error("{function}() raised: {error}")]
    Backend {
        function: String,
        #[source]
        error: BackendError,
        span: Span,
    },

    /// Evaluation recursion depth exceeded.
    #[error("evaluation stack overflow: depth {depth} exceeds maximum of {max_depth}")]
    StackOverflow {
        depth: usize,
        max_depth: usize,
        span: Span,
    },

    #[error("evaluation exceeded the limit of {limit} steps")]
    StepLimit { limit: usize, span: Span },

    /// A node outside the permitted subset reached the evaluator.
    #[error("{construct} cannot be evaluated")]
    Unsupported { construct: String, span: Span },
}

impl EvalError {
    pub fn span(&self) -> &Span {
        match self {
            EvalError::UnboundName { span, .. }
            | EvalError::AmbiguousName { span, .. }
            | EvalError::TypeMismatch { span, .. }
            | EvalError::DivisionByZero { span }
            | EvalError::Arithmetic { span, .. }
            | EvalError::ArityMismatch { span, .. }
            | EvalError::Backend { span, .. }
            | EvalError::StackOverflow { span, .. }
            | EvalError::StepLimit { span, .. }
            | EvalError::Unsupported { span, .. } => span,
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match self {
            EvalError::UnboundName { .. } => (
                "E001",
                vec!["Pass the name as a variable or export it from the namespace".to_string()],
            ),
            EvalError::AmbiguousName { .. } => (
                "E002",
                vec!["Rename the variable so it does not collide with the namespace".to_string()],
            ),
            EvalError::TypeMismatch { .. } => ("E003", vec![]),
            EvalError::DivisionByZero { .. } => ("E004", vec![]),
            EvalError::Arithmetic { .. } => ("E005", vec![]),
            EvalError::ArityMismatch { .. } => ("E006", vec![]),
            EvalError::Backend { .. } => ("E007", vec![]),
            EvalError::StackOverflow { .. } => (
                "E008",
                vec!["Simplify the expression or raise ExecutionOptions::max_depth".to_string()],
            ),
            EvalError::StepLimit { .. } => (
                "E009",
                vec!["Simplify the expression or raise ExecutionOptions::max_steps".to_string()],
            ),
            EvalError::Unsupported { .. } => ("E010", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            span: self.span().clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}
