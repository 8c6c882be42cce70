//! Standard library
//!
//! This module provides the functions a namespace can make available
//! without the host writing them:
//! - Builtins: a safe subset of general-purpose functions (`abs`, `len`,
//!   `min`, `sorted`, ...) added to every namespace unless disabled
//! - Math: a backing module with mathematical functions and constants
//!
//! Nothing here performs I/O or reaches outside its arguments.

mod builtins;
mod math;

pub use builtins::builtins;
pub use math::math_module;

use crate::evaluator::operators::OpError;
use crate::values::{BackendError, Value};

fn type_error(function: &str, expected: &str, value: &Value) -> BackendError {
    BackendError::new(format!(
        "{}() expected {}, got '{}'",
        function,
        expected,
        value.type_name()
    ))
}

fn int_arg(function: &str, value: &Value) -> Result<i64, BackendError> {
    value
        .as_int()
        .ok_or_else(|| type_error(function, "an integer", value))
}

fn float_arg(function: &str, value: &Value) -> Result<f64, BackendError> {
    value
        .as_float()
        .ok_or_else(|| type_error(function, "a number", value))
}

/// `Value::None` stands for an omitted optional argument.
fn optional<'v>(value: &'v Value) -> Option<&'v Value> {
    match value {
        Value::None => None,
        other => Some(other),
    }
}

fn op_failed(function: &str, error: OpError) -> BackendError {
    match error {
        OpError::DivisionByZero => BackendError::new(format!("{}(): division by zero", function)),
        OpError::TypeMismatch(message) | OpError::Arithmetic(message) => {
            BackendError::new(format!("{}(): {}", function, message))
        }
    }
}

#[cfg(test)]
mod builtins_test;
