//! Math module
//!
//! Constants: pi, e, tau, inf, nan
//! Functions: sqrt, exp, log, log2, log10, sin, cos, tan, asin, acos, atan,
//!            atan2, hypot, floor, ceil, trunc, fabs, degrees, radians,
//!            isclose, isfinite, isnan, gcd, factorial
//!
//! Domain errors are reported as function errors instead of producing NaN.

use core::f64::consts;

use super::{float_arg, int_arg, optional};
use crate::namespace::Module;
use crate::values::{BackendError, NativeFunction, Number, Signature, Value};

/// A backing module exporting every math constant and function.
pub fn math_module() -> Module {
    let mut module = Module::new("math");
    module
        .constant("pi", consts::PI)
        .constant("e", consts::E)
        .constant("tau", consts::TAU)
        .constant("inf", f64::INFINITY)
        .constant("nan", f64::NAN);

    for function in functions() {
        module.function(function);
    }
    module.export_all();
    module
}

fn unary(name: &'static str, f: fn(f64) -> Result<f64, BackendError>) -> NativeFunction {
    NativeFunction::new(name, Signature::positional(1), move |args: &[Value]| {
        f(float_arg(name, &args[0])?).map(Value::Float)
    })
}

fn functions() -> Vec<NativeFunction> {
    vec![
        unary("sqrt", |x| domain(x >= 0.0 || x.is_nan(), x.sqrt())),
        unary("exp", |x| range(x, x.exp())),
        NativeFunction::new(
            "log",
            Signature::new().required("x").optional("base").positional_only(2),
            math_log,
        ),
        unary("log2", |x| domain(x > 0.0 || x.is_nan(), x.log2())),
        unary("log10", |x| domain(x > 0.0 || x.is_nan(), x.log10())),
        // Trigonometry
        unary("sin", |x| domain(!x.is_infinite(), x.sin())),
        unary("cos", |x| domain(!x.is_infinite(), x.cos())),
        unary("tan", |x| domain(!x.is_infinite(), x.tan())),
        unary("asin", |x| domain((-1.0..=1.0).contains(&x) || x.is_nan(), x.asin())),
        unary("acos", |x| domain((-1.0..=1.0).contains(&x) || x.is_nan(), x.acos())),
        unary("atan", |x| Ok(x.atan())),
        NativeFunction::new("atan2", Signature::positional(2), |args: &[Value]| {
            let y = float_arg("atan2", &args[0])?;
            let x = float_arg("atan2", &args[1])?;
            Ok(Value::Float(y.atan2(x)))
        }),
        NativeFunction::new("hypot", Signature::new().variadic(), |args: &[Value]| {
            let mut total = 0.0f64;
            for arg in args {
                total = total.hypot(float_arg("hypot", arg)?);
            }
            Ok(Value::Float(total))
        }),
        // Rounding
        NativeFunction::new("floor", Signature::positional(1), |args: &[Value]| {
            to_integral("floor", &args[0], f64::floor)
        }),
        NativeFunction::new("ceil", Signature::positional(1), |args: &[Value]| {
            to_integral("ceil", &args[0], f64::ceil)
        }),
        NativeFunction::new("trunc", Signature::positional(1), |args: &[Value]| {
            to_integral("trunc", &args[0], f64::trunc)
        }),
        unary("fabs", |x| Ok(x.abs())),
        // Angles
        unary("degrees", |x| Ok(x.to_degrees())),
        unary("radians", |x| Ok(x.to_radians())),
        // Classification
        NativeFunction::new(
            "isclose",
            Signature::new()
                .required("a")
                .required("b")
                .optional("rel_tol")
                .optional("abs_tol")
                .positional_only(2),
            math_isclose,
        ),
        NativeFunction::new("isfinite", Signature::positional(1), |args: &[Value]| {
            Ok(Value::Bool(float_arg("isfinite", &args[0])?.is_finite()))
        }),
        NativeFunction::new("isnan", Signature::positional(1), |args: &[Value]| {
            Ok(Value::Bool(float_arg("isnan", &args[0])?.is_nan()))
        }),
        // Integers
        NativeFunction::new("gcd", Signature::new().variadic(), math_gcd),
        NativeFunction::new("factorial", Signature::positional(1), math_factorial),
    ]
}

fn domain(ok: bool, result: f64) -> Result<f64, BackendError> {
    if ok {
        Ok(result)
    } else {
        Err(BackendError::new("math domain error"))
    }
}

fn range(x: f64, result: f64) -> Result<f64, BackendError> {
    if result.is_infinite() && x.is_finite() {
        Err(BackendError::new("math range error"))
    } else {
        Ok(result)
    }
}

fn math_log(args: &[Value]) -> Result<Value, BackendError> {
    let x = float_arg("log", &args[0])?;
    let ln = domain(x > 0.0 || x.is_nan(), x.ln())?;
    match optional(&args[1]) {
        None => Ok(Value::Float(ln)),
        Some(base) => {
            let base = float_arg("log", base)?;
            let base_ln = domain(base > 0.0 || base.is_nan(), base.ln())?;
            if base_ln == 0.0 {
                return Err(BackendError::new("log(): division by zero"));
            }
            Ok(Value::Float(ln / base_ln))
        }
    }
}

/// Integers pass through unchanged; floats are rounded with `round`.
fn to_integral(function: &str, value: &Value, round: fn(f64) -> f64) -> Result<Value, BackendError> {
    match value.as_number() {
        Some(Number::Int(i)) => Ok(Value::Int(i)),
        Some(Number::Float(f)) => {
            let rounded = round(f);
            if !rounded.is_finite() {
                return Err(BackendError::new(format!(
                    "{}(): cannot convert float {} to integer",
                    function,
                    Value::Float(f)
                )));
            }
            if rounded < i64::MIN as f64 || rounded >= i64::MAX as f64 {
                return Err(BackendError::new(format!("{}(): integer overflow", function)));
            }
            Ok(Value::Int(rounded as i64))
        }
        None => Err(BackendError::new(format!(
            "{}() expected a number, got '{}'",
            function,
            value.type_name()
        ))),
    }
}

fn math_isclose(args: &[Value]) -> Result<Value, BackendError> {
    let a = float_arg("isclose", &args[0])?;
    let b = float_arg("isclose", &args[1])?;
    let rel_tol = match optional(&args[2]) {
        Some(v) => float_arg("isclose", v)?,
        None => 1e-9,
    };
    let abs_tol = match optional(&args[3]) {
        Some(v) => float_arg("isclose", v)?,
        None => 0.0,
    };
    if rel_tol < 0.0 || abs_tol < 0.0 {
        return Err(BackendError::new("isclose(): tolerances must be non-negative"));
    }

    if a == b {
        return Ok(Value::Bool(true));
    }
    if a.is_infinite() || b.is_infinite() {
        return Ok(Value::Bool(false));
    }
    let diff = (a - b).abs();
    let close = diff <= (rel_tol * b).abs() || diff <= (rel_tol * a).abs() || diff <= abs_tol;
    Ok(Value::Bool(close))
}

fn math_gcd(args: &[Value]) -> Result<Value, BackendError> {
    let mut result: u64 = 0;
    for arg in args {
        let mut a = result;
        let mut b = int_arg("gcd", arg)?.unsigned_abs();
        while b != 0 {
            (a, b) = (b, a % b);
        }
        result = a;
    }
    i64::try_from(result)
        .map(Value::Int)
        .map_err(|_| BackendError::new("gcd(): integer overflow"))
}

fn math_factorial(args: &[Value]) -> Result<Value, BackendError> {
    if let Value::Float(_) = args[0] {
        return Err(BackendError::new(
            "factorial() only accepts integral values",
        ));
    }
    let n = int_arg("factorial", &args[0])?;
    if n < 0 {
        return Err(BackendError::new(
            "factorial() not defined for negative values",
        ));
    }
    (2..=n)
        .try_fold(1i64, |acc, k| acc.checked_mul(k))
        .map(Value::Int)
        .ok_or_else(|| BackendError::new("factorial(): integer overflow"))
}
