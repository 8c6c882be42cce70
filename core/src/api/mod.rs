//! Public API for compiling and evaluating restricted expressions.
//!
//! A host builds a [`Namespace`](crate::namespace::Namespace) once from the
//! names it chooses to export, compiles expression text against it, and then
//! evaluates the compiled expression with per-call variables.
//!
//! # Example
//!
//! ```
//! use corral_core::api::{CompileOptions, ExecutionOptions};
//! use corral_core::evaluator::Variables;
//! use corral_core::namespace::Namespace;
//! use corral_core::stdlib;
//!
//! let namespace = Namespace::build(&stdlib::math_module()).unwrap();
//! let expr = namespace
//!     .compile_with_options("sqrt(x) + abs(y)", &CompileOptions::default())
//!     .unwrap();
//!
//! let vars = Variables::new().with("x", 16).with("y", -1);
//! let result = expr
//!     .evaluate_with_options(&vars, &ExecutionOptions::default())
//!     .unwrap();
//! assert_eq!(result.as_float(), Some(5.0));
//! ```

pub mod error;
pub mod expression;
pub mod options;

pub use error::{Diagnostic, Error, Severity};
pub use expression::{CompiledExpression, compile, evaluate};
pub use options::{CompileOptions, ExecutionOptions};
