//! Builtin functions.
//!
//! abs all any bin bool chr float hex int len max min oct ord pow range
//! round sorted str sum

use core::cmp::Ordering;

use super::{float_arg, int_arg, op_failed, optional, type_error};
use crate::evaluator::operators;
use crate::parser::BinaryOp;
use crate::values::{BackendError, MAX_SEQUENCE_LEN, NativeFunction, Number, Signature, Value};

/// Every builtin function, in alphabetical order.
pub fn builtins() -> Vec<NativeFunction> {
    vec![
        NativeFunction::new("abs", Signature::positional(1), builtin_abs),
        NativeFunction::new("all", Signature::positional(1), builtin_all),
        NativeFunction::new("any", Signature::positional(1), builtin_any),
        NativeFunction::new("bin", Signature::positional(1), |args: &[Value]| {
            radix_string("bin", &args[0], 2, "0b")
        }),
        NativeFunction::new(
            "bool",
            Signature::new().optional("x").positional_only(1),
            builtin_bool,
        ),
        NativeFunction::new("chr", Signature::positional(1), builtin_chr),
        NativeFunction::new(
            "float",
            Signature::new().optional("x").positional_only(1),
            builtin_float,
        ),
        NativeFunction::new("hex", Signature::positional(1), |args: &[Value]| {
            radix_string("hex", &args[0], 16, "0x")
        }),
        NativeFunction::new(
            "int",
            Signature::new().optional("x").optional("base").positional_only(1),
            builtin_int,
        ),
        NativeFunction::new("len", Signature::positional(1), builtin_len),
        NativeFunction::new("max", Signature::new().variadic(), |args: &[Value]| {
            extremum("max", args, Ordering::Greater)
        }),
        NativeFunction::new("min", Signature::new().variadic(), |args: &[Value]| {
            extremum("min", args, Ordering::Less)
        }),
        NativeFunction::new("oct", Signature::positional(1), |args: &[Value]| {
            radix_string("oct", &args[0], 8, "0o")
        }),
        NativeFunction::new("ord", Signature::positional(1), builtin_ord),
        NativeFunction::new(
            "pow",
            Signature::new()
                .required("base")
                .required("exp")
                .optional("mod"),
            builtin_pow,
        ),
        NativeFunction::new(
            "range",
            Signature::new()
                .required("start")
                .optional("stop")
                .optional("step")
                .positional_only(3),
            builtin_range,
        ),
        NativeFunction::new(
            "round",
            Signature::new().required("number").optional("ndigits"),
            builtin_round,
        ),
        NativeFunction::new(
            "sorted",
            Signature::new()
                .required("iterable")
                .optional("reverse")
                .positional_only(1),
            builtin_sorted,
        ),
        NativeFunction::new(
            "str",
            Signature::new().optional("object").positional_only(1),
            |args: &[Value]| {
                Ok(Value::Str(
                    optional(&args[0]).map(Value::to_plain_string).unwrap_or_default(),
                ))
            },
        ),
        NativeFunction::new(
            "sum",
            Signature::new()
                .required("iterable")
                .optional("start")
                .positional_only(1),
            builtin_sum,
        ),
    ]
}

// ============================================================================
// Numbers
// ============================================================================

fn builtin_abs(args: &[Value]) -> Result<Value, BackendError> {
    match args[0].as_number() {
        Some(Number::Int(i)) => i
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| BackendError::new("abs(): integer overflow")),
        Some(Number::Float(f)) => Ok(Value::Float(f.abs())),
        None => Err(type_error("abs", "a number", &args[0])),
    }
}

/// `bin`, `oct` and `hex`: sign, prefix, then the magnitude in `radix`.
fn radix_string(
    function: &str,
    value: &Value,
    radix: u32,
    prefix: &str,
) -> Result<Value, BackendError> {
    let n = int_arg(function, value)?;
    let magnitude = n.unsigned_abs();
    let digits = match radix {
        2 => format!("{:b}", magnitude),
        8 => format!("{:o}", magnitude),
        _ => format!("{:x}", magnitude),
    };
    let sign = if n < 0 { "-" } else { "" };
    Ok(Value::Str(format!("{}{}{}", sign, prefix, digits)))
}

fn builtin_pow(args: &[Value]) -> Result<Value, BackendError> {
    let Some(modulus) = optional(&args[2]) else {
        return operators::binary(BinaryOp::Pow, args[0].clone(), args[1].clone())
            .map_err(|e| op_failed("pow", e));
    };
    let base = int_arg("pow", &args[0])?;
    let exp = int_arg("pow", &args[1])?;
    let modulus = int_arg("pow", modulus)?;
    if modulus == 0 {
        return Err(BackendError::new("pow() 3rd argument cannot be 0"));
    }
    if exp < 0 {
        return Err(BackendError::new(
            "pow() 2nd argument cannot be negative when 3rd argument specified",
        ));
    }

    let m = i128::from(modulus);
    let mut result: i128 = 1;
    let mut base = i128::from(base).rem_euclid(m);
    let mut exp = exp;
    while exp > 0 {
        if exp & 1 == 1 {
            result = (result * base).rem_euclid(m);
        }
        base = (base * base).rem_euclid(m);
        exp >>= 1;
    }
    // Python gives the result the sign of the modulus.
    let result = if m < 0 && result > 0 { result + m } else { result };
    Ok(Value::Int(result as i64))
}

fn builtin_round(args: &[Value]) -> Result<Value, BackendError> {
    let ndigits = optional(&args[1])
        .map(|v| int_arg("round", v))
        .transpose()?;
    match (args[0].as_number(), ndigits) {
        (Some(Number::Int(i)), None) => Ok(Value::Int(i)),
        (Some(Number::Int(i)), Some(nd)) if nd >= 0 => Ok(Value::Int(i)),
        (Some(Number::Int(i)), Some(nd)) => {
            let scale = nd
                .checked_neg()
                .and_then(|e| u32::try_from(e).ok())
                .and_then(|e| 10i64.checked_pow(e));
            let Some(scale) = scale else {
                return Ok(Value::Int(0));
            };
            let (q, r) = (i.div_euclid(scale), i.rem_euclid(scale));
            let q = match (2 * i128::from(r)).cmp(&i128::from(scale)) {
                Ordering::Greater => q + 1,
                Ordering::Equal if q % 2 != 0 => q + 1,
                _ => q,
            };
            q.checked_mul(scale)
                .map(Value::Int)
                .ok_or_else(|| BackendError::new("round(): integer overflow"))
        }
        (Some(Number::Float(f)), None) => float_to_int("round", f.round_ties_even()),
        (Some(Number::Float(f)), Some(nd)) => {
            if !f.is_finite() {
                return Ok(Value::Float(f));
            }
            let scale = 10f64.powi(nd.clamp(-308, 308) as i32);
            let rounded = (f * scale).round_ties_even() / scale;
            Ok(Value::Float(if rounded.is_finite() { rounded } else { f }))
        }
        (None, _) => Err(type_error("round", "a number", &args[0])),
    }
}

fn float_to_int(function: &str, f: f64) -> Result<Value, BackendError> {
    if f.is_nan() {
        return Err(BackendError::new(format!(
            "{}(): cannot convert float NaN to integer",
            function
        )));
    }
    if f.is_infinite() {
        return Err(BackendError::new(format!(
            "{}(): cannot convert float infinity to integer",
            function
        )));
    }
    // i64::MAX as f64 rounds up to 2^63, which is already out of range.
    if f < i64::MIN as f64 || f >= i64::MAX as f64 {
        return Err(BackendError::new(format!("{}(): integer overflow", function)));
    }
    Ok(Value::Int(f as i64))
}

// ============================================================================
// Conversions
// ============================================================================

fn builtin_bool(args: &[Value]) -> Result<Value, BackendError> {
    Ok(Value::Bool(args[0].is_truthy()))
}

fn builtin_chr(args: &[Value]) -> Result<Value, BackendError> {
    let code = int_arg("chr", &args[0])?;
    u32::try_from(code)
        .ok()
        .and_then(char::from_u32)
        .map(|c| Value::Str(c.to_string()))
        .ok_or_else(|| BackendError::new("chr() arg not in range(0x110000)"))
}

fn builtin_ord(args: &[Value]) -> Result<Value, BackendError> {
    let Some(s) = args[0].as_str() else {
        return Err(type_error("ord", "a string", &args[0]));
    };
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
        _ => Err(BackendError::new(format!(
            "ord() expected a character, but string of length {} found",
            s.chars().count()
        ))),
    }
}

fn builtin_float(args: &[Value]) -> Result<Value, BackendError> {
    let Some(value) = optional(&args[0]) else {
        return Ok(Value::Float(0.0));
    };
    if let Some(s) = value.as_str() {
        return parse_float(s)
            .map(Value::Float)
            .ok_or_else(|| BackendError::new(format!("could not convert string to float: {}", value)));
    }
    float_arg("float", value).map(Value::Float)
}

fn parse_float(text: &str) -> Option<f64> {
    let text = text.trim();
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, text.strip_prefix('+').unwrap_or(text)),
    };
    let magnitude = match body.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => f64::INFINITY,
        "nan" => f64::NAN,
        _ if body.starts_with(|c| c == '+' || c == '-') => return None,
        _ => body.replace('_', "").parse::<f64>().ok()?,
    };
    Some(sign * magnitude)
}

fn builtin_int(args: &[Value]) -> Result<Value, BackendError> {
    let base = optional(&args[1]).map(|b| int_arg("int", b)).transpose()?;
    let Some(value) = optional(&args[0]) else {
        return match base {
            None => Ok(Value::Int(0)),
            Some(_) => Err(BackendError::new("int() missing string argument")),
        };
    };
    match (value, base) {
        (Value::Str(s), base) => parse_int(s, base.unwrap_or(10)).map(Value::Int),
        (_, Some(_)) => Err(BackendError::new(
            "int() can't convert non-string with explicit base",
        )),
        (other, None) => match other.as_number() {
            Some(Number::Int(i)) => Ok(Value::Int(i)),
            Some(Number::Float(f)) => float_to_int("int", f.trunc()),
            None => Err(type_error("int", "a string or a number", other)),
        },
    }
}

fn parse_int(text: &str, base: i64) -> Result<i64, BackendError> {
    let invalid = || {
        BackendError::new(format!(
            "invalid literal for int() with base {}: {}",
            base,
            Value::Str(text.to_string())
        ))
    };
    if base != 0 && !(2..=36).contains(&base) {
        return Err(BackendError::new("int() base must be >= 2 and <= 36, or 0"));
    }

    let trimmed = text.trim();
    let (negative, body) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };
    let lower = body.to_ascii_lowercase();
    let prefixed = |prefix: &str, radix: i64| {
        lower
            .strip_prefix(prefix)
            .filter(|_| base == 0 || base == radix)
            .map(|digits| (digits.to_string(), radix))
    };
    let (digits, radix) = prefixed("0x", 16)
        .or_else(|| prefixed("0o", 8))
        .or_else(|| prefixed("0b", 2))
        .unwrap_or_else(|| (lower.clone(), if base == 0 { 10 } else { base }));

    if digits.is_empty()
        || digits.starts_with(|c| c == '_' || c == '+' || c == '-')
        || digits.ends_with('_')
        || digits.contains("__")
    {
        return Err(invalid());
    }
    let digits = digits.replace('_', "");
    let signed = if negative { format!("-{}", digits) } else { digits };
    i64::from_str_radix(&signed, radix as u32).map_err(|_| invalid())
}

// ============================================================================
// Iterables
// ============================================================================

fn builtin_len(args: &[Value]) -> Result<Value, BackendError> {
    match args[0].len() {
        Some(n) => Ok(Value::Int(n as i64)),
        None => Err(BackendError::new(format!(
            "object of type '{}' has no len()",
            args[0].type_name()
        ))),
    }
}

fn builtin_all(args: &[Value]) -> Result<Value, BackendError> {
    Ok(Value::Bool(args[0].iter_items()?.iter().all(Value::is_truthy)))
}

fn builtin_any(args: &[Value]) -> Result<Value, BackendError> {
    Ok(Value::Bool(args[0].iter_items()?.iter().any(Value::is_truthy)))
}

/// `min` and `max`: a single argument is iterated, several are compared
/// directly. The first of equal candidates wins.
fn extremum(function: &str, args: &[Value], wanted: Ordering) -> Result<Value, BackendError> {
    let items = match args {
        [] => {
            return Err(BackendError::new(format!(
                "{}() expected at least 1 argument, got 0",
                function
            )));
        }
        [single] => single.iter_items()?,
        many => many.to_vec(),
    };
    let mut items = items.into_iter();
    let Some(mut best) = items.next() else {
        return Err(BackendError::new(format!(
            "{}() arg is an empty sequence",
            function
        )));
    };
    for item in items {
        if item.compare_order(&best)? == Some(wanted) {
            best = item;
        }
    }
    Ok(best)
}

fn builtin_range(args: &[Value]) -> Result<Value, BackendError> {
    let first = int_arg("range", &args[0])?;
    let (start, stop) = match optional(&args[1]) {
        Some(stop) => (first, int_arg("range", stop)?),
        None => (0, first),
    };
    let step = optional(&args[2])
        .map(|s| int_arg("range", s))
        .transpose()?
        .unwrap_or(1);
    if step == 0 {
        return Err(BackendError::new("range() arg 3 must not be zero"));
    }

    let (start, stop, step) = (i128::from(start), i128::from(stop), i128::from(step));
    let len = if step > 0 {
        (stop - start + step - 1).div_euclid(step).max(0)
    } else {
        (start - stop - step - 1).div_euclid(-step).max(0)
    };
    if len > MAX_SEQUENCE_LEN as i128 {
        return Err(BackendError::new(format!(
            "range() result exceeds the maximum sequence length of {}",
            MAX_SEQUENCE_LEN
        )));
    }
    Ok(Value::List(
        (0..len).map(|i| Value::Int((start + i * step) as i64)).collect(),
    ))
}

fn builtin_sorted(args: &[Value]) -> Result<Value, BackendError> {
    let mut items = args[0].iter_items()?;
    let reverse = args[1].is_truthy();

    let mut failure = None;
    // Equal items keep their input order in both directions.
    items.sort_by(|a, b| match a.compare_order(b) {
        Ok(ordering) => {
            let ordering = ordering.unwrap_or(Ordering::Equal);
            if reverse {
                ordering.reverse()
            } else {
                ordering
            }
        }
        Err(err) => {
            failure.get_or_insert(err);
            Ordering::Equal
        }
    });
    if let Some(err) = failure {
        return Err(err.into());
    }
    Ok(Value::List(items))
}

fn builtin_sum(args: &[Value]) -> Result<Value, BackendError> {
    let start = optional(&args[1]).cloned().unwrap_or(Value::Int(0));
    if matches!(start, Value::Str(_)) {
        return Err(BackendError::new(
            "sum() can't sum strings [use ''.join(seq) instead]",
        ));
    }
    args[0].iter_items()?.into_iter().try_fold(start, |total, item| {
        operators::binary(BinaryOp::Add, total, item).map_err(|e| op_failed("sum", e))
    })
}
