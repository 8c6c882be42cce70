//! Tests for Value equality, display, ordering and serde support.

use core::cmp::Ordering;

use pretty_assertions::assert_eq;

use crate::values::{Value, ValueError};

fn list(items: Vec<Value>) -> Value {
    Value::List(items)
}

#[test]
fn test_numeric_cross_equality() {
    assert_eq!(Value::Int(1), Value::Float(1.0));
    assert_eq!(Value::Bool(true), Value::Int(1));
    assert_eq!(Value::Bool(false), Value::Float(0.0));
    assert_ne!(Value::Int(1), Value::from("1"));
    assert_ne!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_ne!(list(vec![]), Value::Tuple(vec![]));
}

#[test]
fn test_dict_and_set_equality_ignores_order() {
    let a = Value::dict([(Value::from("a"), Value::Int(1)), (Value::from("b"), Value::Int(2))]).unwrap();
    let b = Value::dict([(Value::from("b"), Value::Int(2)), (Value::from("a"), Value::Int(1))]).unwrap();
    assert_eq!(a, b);

    let s1 = Value::set([Value::Int(1), Value::Int(2)]).unwrap();
    let s2 = Value::set([Value::Int(2), Value::Int(1), Value::Int(2)]).unwrap();
    assert_eq!(s1, s2);
    assert_eq!(s2.len(), Some(2));
}

#[test]
fn test_dict_repeated_key_keeps_last_value() {
    let d = Value::dict([
        (Value::Int(1), Value::from("a")),
        (Value::Int(2), Value::from("b")),
        (Value::Float(1.0), Value::from("c")),
    ])
    .unwrap();
    assert_eq!(d.to_string(), "{1: 'c', 2: 'b'}");
}

#[test]
fn test_unhashable_keys() {
    assert_eq!(
        Value::dict([(list(vec![]), Value::Int(1))]),
        Err(ValueError::Unhashable { type_name: "list" })
    );
    assert!(Value::set([Value::Tuple(vec![Value::Int(1)])]).is_ok());
    assert!(Value::set([Value::Tuple(vec![list(vec![])])]).is_err());
}

#[test]
fn test_display() {
    let cases = [
        (Value::None, "None"),
        (Value::Bool(true), "True"),
        (Value::Int(-100), "-100"),
        (Value::Float(3.0), "3.0"),
        (Value::Float(0.1), "0.1"),
        (Value::Float(1e20), "1e+20"),
        (Value::Float(1.5e-7), "1.5e-07"),
        (Value::Float(f64::INFINITY), "inf"),
        (Value::Float(f64::NAN), "nan"),
        (Value::from("hi"), "'hi'"),
        (Value::from("it's"), "\"it's\""),
        (Value::from("a\nb"), "'a\\nb'"),
        (list(vec![Value::Int(1), Value::from("x")]), "[1, 'x']"),
        (Value::Tuple(vec![Value::Int(1)]), "(1,)"),
        (Value::Tuple(vec![]), "()"),
        (Value::Set(vec![]), "set()"),
    ];
    for (value, expected) in cases {
        assert_eq!(value.to_string(), expected);
    }
    assert_eq!(Value::from("plain").to_plain_string(), "plain");
}

#[test]
fn test_truthiness() {
    assert!(!Value::None.is_truthy());
    assert!(!Value::Int(0).is_truthy());
    assert!(!Value::Float(0.0).is_truthy());
    assert!(!Value::from("").is_truthy());
    assert!(!list(vec![]).is_truthy());
    assert!(Value::from("0").is_truthy());
    assert!(Value::Tuple(vec![Value::None]).is_truthy());
}

#[test]
fn test_ordering() {
    assert_eq!(Value::Int(1).compare_order(&Value::Float(1.5)), Ok(Some(Ordering::Less)));
    assert_eq!(
        Value::from("b").compare_order(&Value::from("a")),
        Ok(Some(Ordering::Greater))
    );
    assert_eq!(
        list(vec![Value::Int(1), Value::Int(2)]).compare_order(&list(vec![Value::Int(1)])),
        Ok(Some(Ordering::Greater))
    );
    assert_eq!(Value::Float(f64::NAN).compare_order(&Value::Int(1)), Ok(None));
    assert_eq!(
        Value::from("a").compare_order(&Value::Int(1)),
        Err(ValueError::Unorderable {
            left: "str",
            right: "int"
        })
    );
}

#[test]
fn test_contains() {
    assert_eq!(Value::from("hello").contains(&Value::from("ell")), Ok(true));
    assert!(Value::from("hello").contains(&Value::Int(1)).is_err());
    assert_eq!(list(vec![Value::Int(1)]).contains(&Value::Float(1.0)), Ok(true));
    let d = Value::dict([(Value::from("k"), Value::Int(0))]).unwrap();
    assert_eq!(d.contains(&Value::from("k")), Ok(true));
    assert_eq!(d.contains(&Value::Int(0)), Ok(false));
    assert_eq!(
        Value::Int(3).contains(&Value::Int(3)),
        Err(ValueError::NotIterable { type_name: "int" })
    );
}

#[test]
fn test_serde_json() {
    let value: Value = serde_json::from_str(r#"{"a": [1, 2.5, null, true], "b": "x"}"#).unwrap();
    let expected = Value::dict([
        (
            Value::from("a"),
            list(vec![Value::Int(1), Value::Float(2.5), Value::None, Value::Bool(true)]),
        ),
        (Value::from("b"), Value::from("x")),
    ])
    .unwrap();
    assert_eq!(value, expected);

    let tuple = Value::Tuple(vec![Value::Int(1), Value::from("two")]);
    assert_eq!(serde_json::to_string(&tuple).unwrap(), r#"[1,"two"]"#);

    let int_keys = Value::dict([(Value::Int(1), Value::Bool(false))]).unwrap();
    assert_eq!(serde_json::to_string(&int_keys).unwrap(), r#"{"1":false}"#);
}
