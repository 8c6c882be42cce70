//! Unary, binary and comparison operator implementations.
//!
//! Integer arithmetic is checked: overflow is reported instead of wrapping.
//! Floor division and modulo round toward negative infinity, and `/` always
//! produces a float.

use core::cmp::Ordering;

use crate::parser::{BinaryOp, CompareOp, UnaryOp};
use crate::values::{MAX_SEQUENCE_LEN, Number, Value, ValueError};

/// Operator failure without position; the evaluator attaches the span.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum OpError {
    DivisionByZero,
    TypeMismatch(String),
    Arithmetic(String),
}

impl From<ValueError> for OpError {
    fn from(err: ValueError) -> Self {
        OpError::TypeMismatch(err.to_string())
    }
}

fn overflow() -> OpError {
    OpError::Arithmetic("integer overflow".to_string())
}

fn too_long() -> OpError {
    OpError::Arithmetic(format!(
        "result exceeds the maximum sequence length of {}",
        MAX_SEQUENCE_LEN
    ))
}

fn unsupported(op: BinaryOp, left: &Value, right: &Value) -> OpError {
    OpError::TypeMismatch(format!(
        "unsupported operand type(s) for {}: '{}' and '{}'",
        op.symbol(),
        left.type_name(),
        right.type_name()
    ))
}

pub(crate) fn unary(op: UnaryOp, value: Value) -> Result<Value, OpError> {
    let bad_operand = |value: &Value| {
        OpError::TypeMismatch(format!(
            "bad operand type for unary {}: '{}'",
            op.symbol(),
            value.type_name()
        ))
    };
    match op {
        UnaryOp::Not => Ok(Value::Bool(!value.is_truthy())),
        UnaryOp::Neg => match value.as_number() {
            Some(Number::Int(i)) => i.checked_neg().map(Value::Int).ok_or_else(overflow),
            Some(Number::Float(f)) => Ok(Value::Float(-f)),
            None => Err(bad_operand(&value)),
        },
        UnaryOp::Pos => match value.as_number() {
            Some(Number::Int(i)) => Ok(Value::Int(i)),
            Some(Number::Float(f)) => Ok(Value::Float(f)),
            None => Err(bad_operand(&value)),
        },
        UnaryOp::Invert => match value.as_int() {
            Some(i) => Ok(Value::Int(!i)),
            None => Err(bad_operand(&value)),
        },
    }
}

pub(crate) fn binary(op: BinaryOp, left: Value, right: Value) -> Result<Value, OpError> {
    match (op, &left, &right) {
        (BinaryOp::Add, Value::Str(a), Value::Str(b)) => {
            if a.len() + b.len() > MAX_SEQUENCE_LEN {
                return Err(too_long());
            }
            Ok(Value::Str(format!("{}{}", a, b)))
        }
        (BinaryOp::Add, Value::List(a), Value::List(b)) => Ok(Value::List(concat(a, b)?)),
        (BinaryOp::Add, Value::Tuple(a), Value::Tuple(b)) => Ok(Value::Tuple(concat(a, b)?)),
        (BinaryOp::Mul, Value::Str(_) | Value::List(_) | Value::Tuple(_), _)
            if right.as_int().is_some() =>
        {
            repeat(&left, right.as_int().unwrap_or(0))
        }
        (BinaryOp::Mul, _, Value::Str(_) | Value::List(_) | Value::Tuple(_))
            if left.as_int().is_some() =>
        {
            repeat(&right, left.as_int().unwrap_or(0))
        }
        (BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Sub, Value::Set(a), Value::Set(b)) => {
            Ok(Value::Set(set_op(op, a, b)))
        }
        (BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor, Value::Bool(a), Value::Bool(b)) => {
            Ok(Value::Bool(match op {
                BinaryOp::BitAnd => a & b,
                BinaryOp::BitOr => a | b,
                _ => a ^ b,
            }))
        }
        (
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr,
            _,
            _,
        ) => match (left.as_int(), right.as_int()) {
            (Some(a), Some(b)) => bitwise(op, a, b),
            _ => Err(unsupported(op, &left, &right)),
        },
        _ => match (left.as_number(), right.as_number()) {
            (Some(Number::Int(a)), Some(Number::Int(b))) => int_arith(op, a, b),
            (Some(a), Some(b)) => float_arith(op, a.as_f64(), b.as_f64()),
            _ => Err(unsupported(op, &left, &right)),
        },
    }
}

fn concat(a: &[Value], b: &[Value]) -> Result<Vec<Value>, OpError> {
    if a.len() + b.len() > MAX_SEQUENCE_LEN {
        return Err(too_long());
    }
    let mut out = Vec::with_capacity(a.len() + b.len());
    out.extend_from_slice(a);
    out.extend_from_slice(b);
    Ok(out)
}

fn repeat(sequence: &Value, times: i64) -> Result<Value, OpError> {
    let times = usize::try_from(times).unwrap_or(0);
    let len = sequence.len().unwrap_or(0);
    match len.checked_mul(times) {
        Some(total) if total <= MAX_SEQUENCE_LEN => {}
        _ => return Err(too_long()),
    }
    Ok(match sequence {
        Value::Str(s) => Value::Str(s.repeat(times)),
        Value::List(items) => Value::List(repeat_items(items, times)),
        Value::Tuple(items) => Value::Tuple(repeat_items(items, times)),
        other => other.clone(),
    })
}

fn repeat_items(items: &[Value], times: usize) -> Vec<Value> {
    items
        .iter()
        .cloned()
        .cycle()
        .take(items.len() * times)
        .collect()
}

fn set_op(op: BinaryOp, a: &[Value], b: &[Value]) -> Vec<Value> {
    match op {
        BinaryOp::BitAnd => a.iter().filter(|x| b.contains(x)).cloned().collect(),
        BinaryOp::BitOr => a
            .iter()
            .cloned()
            .chain(b.iter().filter(|x| !a.contains(x)).cloned())
            .collect(),
        BinaryOp::BitXor => a
            .iter()
            .filter(|x| !b.contains(x))
            .chain(b.iter().filter(|x| !a.contains(x)))
            .cloned()
            .collect(),
        _ => a.iter().filter(|x| !b.contains(x)).cloned().collect(),
    }
}

fn bitwise(op: BinaryOp, a: i64, b: i64) -> Result<Value, OpError> {
    let result = match op {
        BinaryOp::BitAnd => a & b,
        BinaryOp::BitOr => a | b,
        BinaryOp::BitXor => a ^ b,
        BinaryOp::Shl | BinaryOp::Shr if b < 0 => {
            return Err(OpError::Arithmetic("negative shift count".to_string()));
        }
        BinaryOp::Shl if a == 0 => 0,
        BinaryOp::Shl => {
            if b >= 64 {
                return Err(overflow());
            }
            let shifted = a << b;
            if shifted >> b != a {
                return Err(overflow());
            }
            shifted
        }
        BinaryOp::Shr if b >= 64 => {
            if a < 0 {
                -1
            } else {
                0
            }
        }
        BinaryOp::Shr => a >> b,
        other => unreachable!("not a bitwise operator: {:?}", other),
    };
    Ok(Value::Int(result))
}

fn int_arith(op: BinaryOp, a: i64, b: i64) -> Result<Value, OpError> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b).ok_or_else(overflow)?,
        BinaryOp::Sub => a.checked_sub(b).ok_or_else(overflow)?,
        BinaryOp::Mul => a.checked_mul(b).ok_or_else(overflow)?,
        BinaryOp::Div => {
            if b == 0 {
                return Err(OpError::DivisionByZero);
            }
            return Ok(Value::Float(a as f64 / b as f64));
        }
        BinaryOp::FloorDiv => {
            if b == 0 {
                return Err(OpError::DivisionByZero);
            }
            let q = a.checked_div(b).ok_or_else(overflow)?;
            if a % b != 0 && ((a < 0) != (b < 0)) {
                q - 1
            } else {
                q
            }
        }
        BinaryOp::Mod => {
            if b == 0 {
                return Err(OpError::DivisionByZero);
            }
            let r = a.checked_rem(b).unwrap_or(0);
            if r != 0 && ((r < 0) != (b < 0)) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => {
            if b < 0 {
                if a == 0 {
                    return Err(OpError::DivisionByZero);
                }
                return Ok(Value::Float((a as f64).powf(b as f64)));
            }
            match a {
                0 if b > 0 => 0,
                1 | 0 => 1,
                -1 if b % 2 == 0 => 1,
                -1 => -1,
                _ => {
                    let exp = u32::try_from(b).map_err(|_| overflow())?;
                    a.checked_pow(exp).ok_or_else(overflow)?
                }
            }
        }
        other => unreachable!("not an arithmetic operator: {:?}", other),
    };
    Ok(Value::Int(result))
}

/// Floor division through the remainder, so the quotient agrees with `%`.
fn float_floor_div(a: f64, b: f64) -> f64 {
    let m = a % b;
    let mut div = (a - m) / b;
    if m != 0.0 && ((b < 0.0) != (m < 0.0)) {
        div -= 1.0;
    }
    if div == 0.0 {
        return 0.0_f64.copysign(a / b);
    }
    let floored = div.floor();
    if div - floored > 0.5 {
        floored + 1.0
    } else {
        floored
    }
}

fn float_arith(op: BinaryOp, a: f64, b: f64) -> Result<Value, OpError> {
    let result = match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        BinaryOp::Div => {
            if b == 0.0 {
                return Err(OpError::DivisionByZero);
            }
            a / b
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                return Err(OpError::DivisionByZero);
            }
            float_floor_div(a, b)
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                return Err(OpError::DivisionByZero);
            }
            let r = a % b;
            if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
                r + b
            } else {
                r
            }
        }
        BinaryOp::Pow => {
            if a == 0.0 && b < 0.0 {
                return Err(OpError::DivisionByZero);
            }
            if a < 0.0 && b.is_finite() && b.fract() != 0.0 {
                return Err(OpError::Arithmetic(
                    "negative number cannot be raised to a fractional power".to_string(),
                ));
            }
            let result = a.powf(b);
            if result.is_infinite() && a.is_finite() && b.is_finite() {
                return Err(OpError::Arithmetic("numerical result out of range".to_string()));
            }
            result
        }
        other => unreachable!("not an arithmetic operator: {:?}", other),
    };
    Ok(Value::Float(result))
}

pub(crate) fn compare(op: CompareOp, left: &Value, right: &Value) -> Result<bool, OpError> {
    let ordered = |accept: fn(Ordering) -> bool| -> Result<bool, OpError> {
        match left.compare_order(right) {
            Ok(Some(ordering)) => Ok(accept(ordering)),
            Ok(None) => Ok(false),
            Err(_) => Err(OpError::TypeMismatch(format!(
                "'{}' not supported between instances of '{}' and '{}'",
                op.symbol(),
                left.type_name(),
                right.type_name()
            ))),
        }
    };
    match op {
        CompareOp::Eq => Ok(left == right),
        CompareOp::Ne => Ok(left != right),
        CompareOp::Lt => ordered(Ordering::is_lt),
        CompareOp::Le => ordered(Ordering::is_le),
        CompareOp::Gt => ordered(Ordering::is_gt),
        CompareOp::Ge => ordered(Ordering::is_ge),
        CompareOp::In => Ok(right.contains(left)?),
        CompareOp::NotIn => Ok(!right.contains(left)?),
        CompareOp::Is => Ok(identical(left, right)),
        CompareOp::IsNot => Ok(!identical(left, right)),
    }
}

/// Values carry no object identity, so `is` holds between values of the
/// same type that are equal. Unlike `==`, `1 is True` and `1 is 1.0` are false.
fn identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
        _ => left.type_name() == right.type_name() && left == right,
    }
}
