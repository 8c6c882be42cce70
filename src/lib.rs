//! Corral - safe evaluation of restricted Python-style expressions
//!
//! # Overview
//!
//! Corral evaluates single expressions written in a small subset of Python
//! against a namespace the host controls. Only the names a backing module
//! explicitly exports are visible, together with a fixed set of safe
//! builtins. Attribute access, subscripts, lambdas and comprehensions are
//! rejected before anything runs, so an expression cannot reach beyond what
//! it was given.
//!
//! Common use cases include:
//!
//! - Formulas in configuration files
//! - Pricing and scoring rules
//! - Filters typed in by users
//!
//! # Quick Start
//!
//! ```
//! use corral::{Namespace, Variables, stdlib};
//!
//! let namespace = Namespace::build(&stdlib::math_module()).unwrap();
//! let expr = namespace.compile("hypot(dx, dy)").unwrap();
//! assert_eq!(expr.free_variables(), ["dx", "dy"]);
//!
//! let vars = Variables::new().with("dx", 3).with("dy", 4);
//! assert_eq!(expr.evaluate(&vars).unwrap(), corral::Value::Float(5.0));
//! ```
//!
//! # Host functions
//!
//! Native functions are registered on a [`Module`] with a [`Signature`]
//! describing how arguments bind:
//!
//! ```
//! use corral::{BackendError, Module, Namespace, NativeFunction, Signature, Value, Variables};
//!
//! let mut module = Module::new("shop");
//! module
//!     .constant("vat", 0.25)
//!     .function(NativeFunction::new(
//!         "discount",
//!         Signature::new().required("price").optional("rate"),
//!         |args: &[Value]| {
//!             let price = args[0].as_float().ok_or_else(|| BackendError::new("price must be a number"))?;
//!             let rate = args[1].as_float().unwrap_or(0.1);
//!             Ok(Value::Float(price * (1.0 - rate)))
//!         },
//!     ))
//!     .export(["vat", "discount"]);
//!
//! let namespace = Namespace::build(&module).unwrap();
//! let expr = namespace.compile("discount(price, rate=0.5) * (1 + vat)").unwrap();
//! let total = expr.evaluate(&Variables::new().with("price", 100)).unwrap();
//! assert_eq!(total, Value::Float(62.5));
//! ```
//!
//! Errors carry source spans and render with [`render_error_to_string`].

mod error_renderer;

pub use corral_core::api::{
    CompileOptions, CompiledExpression, Diagnostic, Error, ExecutionOptions, Severity, compile,
    evaluate,
};
pub use corral_core::evaluator::{EvalError, Variables};
pub use corral_core::namespace::{BackingSource, Binding, Module, Namespace, NamespaceError};
pub use corral_core::parser::{ParseError, Span};
pub use corral_core::validator::{Construct, RejectReason, Rejection};
pub use corral_core::values::{BackendError, NativeFunction, Signature, Value};
pub use corral_core::{stdlib, values};

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
