//! Tree-walking evaluator for validated expressions.
//!
//! The evaluator walks a validated [`Expr`] and produces a [`Value`]. Names
//! are resolved against the caller's [`Variables`] first and the
//! [`Namespace`] second; a name bound in both is an error.
//!
//! ## Design Principles
//!
//! - **Never panic**: every failure is an [`EvalError`] carrying the span of
//!   the node that caused it
//! - **Bounded**: depth and step limits come from [`ExecutionOptions`]
//! - **Pure**: nothing but the variables and the namespace is consulted
//!
//! ## Example
//!
//! ```
//! use corral_core::{evaluator, parser, namespace::{Module, Namespace}};
//! use corral_core::api::ExecutionOptions;
//!
//! let mut module = Module::new("calc");
//! module.constant("k", 10).export(["k"]);
//! let namespace = Namespace::build(&module).unwrap();
//! let expr = parser::parse("k * x").unwrap();
//! let vars: evaluator::Variables = [("x", 4)].into_iter().collect();
//!
//! let result = evaluator::eval(&expr, &namespace, &vars, &ExecutionOptions::default()).unwrap();
//! assert_eq!(result.as_int(), Some(40));
//! ```

mod error;
mod eval;
pub(crate) mod operators;
mod variables;

#[cfg(test)]
mod eval_test;

pub use error::EvalError;
pub use variables::Variables;

use tracing::debug;

use crate::{api::ExecutionOptions, namespace::Namespace, parser::Expr, values::Value};

/// Evaluates `expr`, which must already have passed validation.
///
/// Nodes outside the permitted subset fail with [`EvalError::Unsupported`]
/// rather than being evaluated.
pub fn eval(
    expr: &Expr,
    namespace: &Namespace,
    variables: &Variables,
    options: &ExecutionOptions,
) -> Result<Value, EvalError> {
    let result = eval::Evaluator::new(namespace, variables, options).eval_expr(expr);
    match &result {
        Ok(value) => debug!(result = %value, "evaluated"),
        Err(error) => debug!(%error, span = %error.span(), "evaluation failed"),
    }
    result
}
