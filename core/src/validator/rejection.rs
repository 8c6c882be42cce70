use core::fmt;

use crate::api::{Diagnostic, Severity};
use crate::parser::{ComprehensionKind, Span};

/// A syntactic construct outside the permitted expression subset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Construct {
    AttributeAccess,
    Subscript,
    Slice,
    Lambda,
    Comprehension(ComprehensionKind),
    Assignment,
    AugmentedAssignment,
    NamedExpression,
    Statement(String),
    Starred,
    DoubleStarred,
    /// A call whose callee is anything other than a bare name.
    IndirectCall,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::AttributeAccess => write!(f, "attribute access"),
            Construct::Subscript => write!(f, "subscript"),
            Construct::Slice => write!(f, "slice"),
            Construct::Lambda => write!(f, "lambda"),
            Construct::Comprehension(ComprehensionKind::List) => write!(f, "list comprehension"),
            Construct::Comprehension(ComprehensionKind::Set) => write!(f, "set comprehension"),
            Construct::Comprehension(ComprehensionKind::Dict) => write!(f, "dict comprehension"),
            Construct::Comprehension(ComprehensionKind::Generator) => {
                write!(f, "generator expression")
            }
            Construct::Assignment => write!(f, "assignment"),
            Construct::AugmentedAssignment => write!(f, "augmented assignment"),
            Construct::NamedExpression => write!(f, "assignment expression"),
            Construct::Statement(keyword) => write!(f, "'{}' statement", keyword),
            Construct::Starred => write!(f, "starred unpacking"),
            Construct::DoubleStarred => write!(f, "double-starred unpacking"),
            Construct::IndirectCall => write!(f, "call of a non-name expression"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    Forbidden(Construct),
    UnknownFunction { name: String },
    UnknownKeyword { function: String, keyword: String },
    DuplicateKeyword { function: String, keyword: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::Forbidden(construct) => write!(f, "{} is not allowed", construct),
            RejectReason::UnknownFunction { name } => write!(f, "unknown function '{}'", name),
            RejectReason::UnknownKeyword { function, keyword } => write!(
                f,
                "'{}' got an unexpected keyword argument '{}'",
                function, keyword
            ),
            RejectReason::DuplicateKeyword { function, keyword } => write!(
                f,
                "keyword argument '{}' repeated in call to '{}'",
                keyword, function
            ),
        }
    }
}

/// Why a syntax tree was refused, and where.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{reason} at {span}")]
pub struct Rejection {
    pub reason: RejectReason,
    pub span: Span,
}

impl Rejection {
    pub fn new(reason: RejectReason, span: Span) -> Self {
        Self { reason, span }
    }

    pub fn forbidden(construct: Construct, span: Span) -> Self {
        Self::new(RejectReason::Forbidden(construct), span)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.reason {
            RejectReason::Forbidden(_) => (
                "V001",
                vec![
                    "Expressions may only use literals, operators, conditionals, names, \
                     calls of named functions and container displays"
                        .to_string(),
                ],
            ),
            RejectReason::UnknownFunction { .. } => (
                "V002",
                vec!["Only functions exported by the namespace can be called".to_string()],
            ),
            RejectReason::UnknownKeyword { .. } => ("V003", vec![]),
            RejectReason::DuplicateKeyword { .. } => ("V004", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.reason.to_string(),
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}
