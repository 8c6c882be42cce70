//! Tests for the builtin functions, called through compiled expressions.

use pretty_assertions::assert_eq;

use crate::api::Error;
use crate::evaluator::{EvalError, Variables};
use crate::namespace::{Module, Namespace};
use crate::validator::RejectReason;
use crate::values::Value;

fn eval(source: &str) -> Result<Value, Error> {
    let mut module = Module::new("empty");
    module.export(Vec::<String>::new());
    let namespace = Namespace::build(&module).expect("empty module should build");
    let expr = namespace.compile(source)?;
    expr.evaluate(&Variables::new())
}

/// Display form of the result, which also pins down its type.
fn show(source: &str) -> String {
    match eval(source) {
        Ok(value) => value.to_string(),
        Err(err) => panic!("'{}' failed: {}", source, err),
    }
}

fn backend_error(source: &str) -> String {
    match eval(source) {
        Err(Error::Evaluation(EvalError::Backend { error, .. })) => error.message,
        other => panic!("Expected a function error from '{}', got {:?}", source, other),
    }
}

#[test]
fn test_abs() {
    assert_eq!(show("abs(-3)"), "3");
    assert_eq!(show("abs(-2.5)"), "2.5");
    assert_eq!(show("abs(True)"), "1");
    assert_eq!(backend_error("abs('x')"), "abs() expected a number, got 'str'");
}

#[test]
fn test_all_any() {
    assert_eq!(show("all([1, 2])"), "True");
    assert_eq!(show("all([])"), "True");
    assert_eq!(show("any([0, ''])"), "False");
    assert_eq!(show("any('a')"), "True");
    assert_eq!(backend_error("all(1)"), "'int' object is not iterable");
}

#[test]
fn test_radix_strings() {
    assert_eq!(show("bin(5)"), "'0b101'");
    assert_eq!(show("bin(-5)"), "'-0b101'");
    assert_eq!(show("hex(255)"), "'0xff'");
    assert_eq!(show("oct(8)"), "'0o10'");
    assert_eq!(show("bin(0)"), "'0b0'");
}

#[test]
fn test_characters() {
    assert_eq!(show("chr(65)"), "'A'");
    assert_eq!(show("ord('A')"), "65");
    assert_eq!(show("ord('é')"), "233");
    assert_eq!(backend_error("chr(-1)"), "chr() arg not in range(0x110000)");
    assert_eq!(
        backend_error("ord('ab')"),
        "ord() expected a character, but string of length 2 found"
    );
}

#[test]
fn test_bool_and_str() {
    assert_eq!(show("bool()"), "False");
    assert_eq!(show("bool([0])"), "True");
    assert_eq!(show("str(12)"), "'12'");
    assert_eq!(show("str()"), "''");
    assert_eq!(show("str([1, 'a'])"), "\"[1, 'a']\"");
}

#[test]
fn test_float() {
    assert_eq!(show("float('1.5')"), "1.5");
    assert_eq!(show("float(' -inf ')"), "-inf");
    assert_eq!(show("float(2)"), "2.0");
    assert_eq!(show("float()"), "0.0");
    assert_eq!(
        backend_error("float('abc')"),
        "could not convert string to float: 'abc'"
    );
}

#[test]
fn test_int() {
    assert_eq!(show("int('42')"), "42");
    assert_eq!(show("int('ff', 16)"), "255");
    assert_eq!(show("int('0x1f', 0)"), "31");
    assert_eq!(show("int(' -1_000 ')"), "-1000");
    assert_eq!(show("int(3.9)"), "3");
    assert_eq!(show("int(-3.9)"), "-3");
    assert_eq!(show("int()"), "0");
    assert_eq!(
        backend_error("int('12a')"),
        "invalid literal for int() with base 10: '12a'"
    );
    assert_eq!(
        backend_error("int(float('inf'))"),
        "int(): cannot convert float infinity to integer"
    );
    assert_eq!(
        backend_error("int(5, 2)"),
        "int() can't convert non-string with explicit base"
    );
}

#[test]
fn test_len() {
    assert_eq!(show("len('héllo')"), "5");
    assert_eq!(show("len({1: 2})"), "1");
    assert_eq!(show("len((1, 2, 3))"), "3");
    assert_eq!(backend_error("len(3)"), "object of type 'int' has no len()");
}

#[test]
fn test_min_max() {
    assert_eq!(show("max(1, 5, 3)"), "5");
    assert_eq!(show("max([2, 8])"), "8");
    assert_eq!(show("min('b', 'a')"), "'a'");
    assert_eq!(show("min(1, 1.0)"), "1");
    assert_eq!(backend_error("max([])"), "max() arg is an empty sequence");
    assert_eq!(
        backend_error("max(1, 'a')"),
        "ordering not supported between instances of 'str' and 'int'"
    );
}

#[test]
fn test_pow() {
    assert_eq!(show("pow(2, 10)"), "1024");
    assert_eq!(show("pow(2, -1)"), "0.5");
    assert_eq!(show("pow(3, 4, 5)"), "1");
    assert_eq!(show("pow(3, 2, -5)"), "-1");
    assert_eq!(show("pow(base=2, exp=3)"), "8");
    assert_eq!(backend_error("pow(2, 3, 0)"), "pow() 3rd argument cannot be 0");
    assert_eq!(backend_error("pow(10, 100)"), "pow(): integer overflow");
}

#[test]
fn test_range() {
    assert_eq!(show("range(5)"), "[0, 1, 2, 3, 4]");
    assert_eq!(show("range(1, 10, 3)"), "[1, 4, 7]");
    assert_eq!(show("range(5, 0, -2)"), "[5, 3, 1]");
    assert_eq!(show("range(0)"), "[]");
    assert_eq!(show("range(3, 1)"), "[]");
    assert_eq!(backend_error("range(1, 2, 0)"), "range() arg 3 must not be zero");
    assert_eq!(
        backend_error("range(10**9)"),
        "range() result exceeds the maximum sequence length of 1048576"
    );
}

#[test]
fn test_round_ties_to_even() {
    assert_eq!(show("round(2.5)"), "2");
    assert_eq!(show("round(3.5)"), "4");
    assert_eq!(show("round(-0.5)"), "0");
    assert_eq!(show("round(1.25, 1)"), "1.2");
    assert_eq!(show("round(7)"), "7");
    assert_eq!(show("round(1234, -2)"), "1200");
    assert_eq!(show("round(1250, -2)"), "1200");
    assert_eq!(show("round(1350, -2)"), "1400");
    assert_eq!(
        backend_error("round(float('nan'))"),
        "round(): cannot convert float NaN to integer"
    );
}

#[test]
fn test_sorted() {
    assert_eq!(show("sorted([3, 1, 2])"), "[1, 2, 3]");
    assert_eq!(show("sorted('cab')"), "['a', 'b', 'c']");
    assert_eq!(show("sorted([1, 3, 2], reverse=True)"), "[3, 2, 1]");
    assert_eq!(show("sorted({2: 'x', 1: 'y'})"), "[1, 2]");
    // Equal items keep their input order, reversed or not.
    assert_eq!(show("sorted([1, 1.0, True])"), "[1, 1.0, True]");
    assert_eq!(show("sorted([1, 1.0, True], reverse=True)"), "[1, 1.0, True]");
    assert_eq!(show("sorted([0, 1, 1.0, 2], reverse=True)"), "[2, 1, 1.0, 0]");
    assert!(backend_error("sorted([1, 'a'])").starts_with("ordering not supported"));
}

#[test]
fn test_sum() {
    assert_eq!(show("sum([1, 2, 3])"), "6");
    assert_eq!(show("sum([0.5, 1])"), "1.5");
    assert_eq!(show("sum([[1], [2]], [])"), "[1, 2]");
    assert_eq!(show("sum([], 10)"), "10");
    assert_eq!(
        backend_error("sum(['a'], '')"),
        "sum() can't sum strings [use ''.join(seq) instead]"
    );
}

#[test]
fn test_positional_only_parameters_reject_keywords() {
    let err = eval("sorted(iterable=[1])").unwrap_err();
    let Error::Rejected(rejection) = err else {
        panic!("Expected a compile-time rejection, got {:?}", err);
    };
    assert_eq!(
        rejection.reason,
        RejectReason::UnknownKeyword {
            function: "sorted".to_string(),
            keyword: "iterable".to_string(),
        }
    );
}

#[test]
fn test_arity_is_checked_at_call_time() {
    match eval("len()") {
        Err(Error::Evaluation(EvalError::ArityMismatch { function, found, .. })) => {
            assert_eq!(function, "len");
            assert_eq!(found, 0);
        }
        other => panic!("Expected an arity mismatch, got {:?}", other),
    }
    assert!(matches!(
        eval("abs(1, 2)"),
        Err(Error::Evaluation(EvalError::ArityMismatch { found: 2, .. }))
    ));
}
