//! Public error types.
//!
//! Every stage of the pipeline has its own error enum; [`Error`] unifies
//! them at the API boundary and every spanned error converts to a
//! [`Diagnostic`] for rendering.

use core::fmt;

use crate::evaluator::EvalError;
use crate::namespace::NamespaceError;
use crate::parser::{ParseError, Span};
use crate::validator::Rejection;

/// Public error type for all operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The namespace could not be built from its backing source.
    #[error("namespace error: {0}")]
    Namespace(#[from] NamespaceError),

    /// The text is not a well-formed expression.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// The expression uses a forbidden construct, or a call does not match
    /// the namespace.
    #[error("rejected: {0}")]
    Rejected(#[from] Rejection),

    /// Evaluation failed.
    #[error("evaluation error: {0}")]
    Evaluation(#[from] EvalError),
}

impl Error {
    /// Source location of the error, if it has one.
    pub fn span(&self) -> Option<&Span> {
        match self {
            Error::Namespace(_) => None,
            Error::Parse(err) => Some(&err.span),
            Error::Rejected(rejection) => Some(&rejection.span),
            Error::Evaluation(err) => Some(err.span()),
        }
    }

    pub fn to_diagnostic(&self) -> Option<Diagnostic> {
        match self {
            Error::Namespace(_) => None,
            Error::Parse(err) => Some(err.to_diagnostic()),
            Error::Rejected(rejection) => Some(rejection.to_diagnostic()),
            Error::Evaluation(err) => Some(err.to_diagnostic()),
        }
    }
}

/// A diagnostic message with source location.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source location of the primary issue.
    pub span: Span,

    /// Suggestions on how to fix the issue.
    pub help: Vec<String>,

    /// Error code (e.g., "E001").
    pub code: Option<String>,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}
