//! Restricted expression compilation and evaluation.
//!
//! Expressions are written in a small, Python-flavoured language. Text is
//! parsed into an [`Expr`](parser::Expr), checked against the permitted
//! subset by the [`validator`], bound to a [`Namespace`] of host-exported
//! names and then evaluated with per-call [`Variables`].

pub mod api;
pub mod evaluator;
pub mod namespace;
pub mod parser;
pub mod stdlib;
pub mod validator;
pub mod values;

pub use api::{
    CompileOptions, CompiledExpression, Diagnostic, Error, ExecutionOptions, Severity, compile,
    evaluate,
};
pub use evaluator::{EvalError, Variables};
pub use namespace::{BackingSource, Binding, Module, Namespace, NamespaceError};
pub use values::{BackendError, NativeFunction, Signature, Value};
