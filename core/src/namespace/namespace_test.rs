use pretty_assertions::assert_eq;

use crate::namespace::{BackingSource, Binding, Module, Namespace, NamespaceError, is_identifier};
use crate::values::{NativeFunction, Signature, Value};

fn identity() -> NativeFunction {
    NativeFunction::new("identity", Signature::positional(1), |args: &[Value]| {
        Ok(args[0].clone())
    })
}

/// A backing source without an export list.
struct Unlisted;

impl BackingSource for Unlisted {
    fn export_list(&self) -> Option<Vec<&str>> {
        None
    }

    fn resolve(&self, _name: &str) -> Option<Binding> {
        Some(Binding::Value(Value::None))
    }
}

#[test]
fn test_build_from_export_list() {
    let mut module = Module::new("host");
    module
        .constant("limit", 10)
        .constant("hidden", 1)
        .function(identity())
        .export(["limit", "identity"]);

    let namespace = Namespace::builder(&module)
        .with_builtins(false)
        .build()
        .unwrap();
    assert_eq!(namespace.exports(), ["limit", "identity"]);
    assert_eq!(namespace.names(), vec!["identity", "limit"]);
    assert_eq!(
        namespace.lookup("limit").and_then(Binding::as_value),
        Some(&Value::Int(10))
    );
    assert!(namespace.lookup("identity").and_then(Binding::as_function).is_some());
    assert!(!namespace.contains("hidden"), "unexported names stay hidden");
}

#[test]
fn test_missing_export_list() {
    assert_eq!(
        Namespace::build(&Unlisted).unwrap_err(),
        NamespaceError::MissingExportList
    );
    assert_eq!(
        Namespace::build(&Module::new("empty")).unwrap_err(),
        NamespaceError::MissingExportList
    );
}

#[test]
fn test_unbound_export() {
    let mut module = Module::new("host");
    module.constant("a", 1).export(["a", "b"]);
    assert_eq!(
        Namespace::build(&module).unwrap_err(),
        NamespaceError::UnboundExport {
            name: "b".to_string()
        }
    );
}

#[test]
fn test_duplicate_export() {
    let mut module = Module::new("host");
    module.constant("a", 1).export(["a"]).export(["a"]);
    assert_eq!(
        Namespace::build(&module).unwrap_err(),
        NamespaceError::DuplicateExport {
            name: "a".to_string()
        }
    );
}

#[test]
fn test_unsafe_and_invalid_names() {
    let mut module = Module::new("host");
    module.constant("eval", 1).export(["eval"]);
    assert_eq!(
        Namespace::build(&module).unwrap_err(),
        NamespaceError::UnsafeName {
            name: "eval".to_string()
        }
    );

    for name in ["2x", "a-b", "lambda", ""] {
        let mut module = Module::new("host");
        module.constant(name, 1).export([name]);
        assert_eq!(
            Namespace::build(&module).unwrap_err(),
            NamespaceError::InvalidName {
                name: name.to_string()
            },
            "name: {:?}",
            name
        );
    }
}

#[test]
fn test_is_identifier() {
    assert!(is_identifier("x"));
    assert!(is_identifier("_private"));
    assert!(is_identifier("add_d2"));
    assert!(!is_identifier("9lives"));
    assert!(!is_identifier("True"));
    assert!(!is_identifier("naïve"));
}

#[test]
fn test_builtins_are_added_by_default() {
    let mut module = Module::new("host");
    module.export(Vec::<String>::new());

    let namespace = Namespace::build(&module).unwrap();
    assert!(namespace.exports().is_empty());
    for name in ["abs", "len", "max", "min", "sorted", "sum"] {
        assert!(namespace.contains(name), "missing builtin {}", name);
    }

    let bare = Namespace::builder(&module).with_builtins(false).build().unwrap();
    assert!(bare.is_empty());
}

#[test]
fn test_builtin_allowlist() {
    let mut module = Module::new("host");
    module.export(Vec::<String>::new());

    let namespace = Namespace::builder(&module)
        .allow_builtins(["abs", "len"])
        .build()
        .unwrap();
    assert_eq!(namespace.names(), vec!["abs", "len"]);

    assert_eq!(
        Namespace::builder(&module)
            .allow_builtins(["print"])
            .build()
            .unwrap_err(),
        NamespaceError::UnknownBuiltin {
            name: "print".to_string()
        }
    );
    assert_eq!(
        Namespace::builder(&module)
            .allow_builtins(["open"])
            .build()
            .unwrap_err(),
        NamespaceError::UnsafeName {
            name: "open".to_string()
        }
    );
}

#[test]
fn test_exports_override_builtins() {
    let mut module = Module::new("host");
    module
        .register(
            "oct",
            NativeFunction::new("oct", Signature::positional(1), |_: &[Value]| {
                Ok(Value::from("overridden"))
            }),
        )
        .export(["oct"]);

    let namespace = Namespace::build(&module).unwrap();
    let oct = namespace.lookup("oct").and_then(Binding::as_function).unwrap();
    assert_eq!(oct.call(&[Value::Int(8)]).unwrap(), Value::from("overridden"));
}

#[test]
fn test_export_all_is_sorted() {
    let mut module = Module::new("host");
    module.constant("b", 2).constant("a", 1).export_all();
    assert_eq!(module.export_list(), Some(vec!["a", "b"]));
    assert_eq!(module.name(), "host");
}
