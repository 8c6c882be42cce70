//! Unit tests for the evaluator.

use std::error::Error as _;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pretty_assertions::assert_eq;

use super::*;
use crate::{
    api::ExecutionOptions,
    namespace::{Module, Namespace},
    parser::{self, Span},
    values::{Arity, BackendError, NativeFunction, Signature, Value},
};

fn add(args: &[Value]) -> Result<Value, BackendError> {
    let a = args[0].as_int().ok_or_else(|| BackendError::new("x must be an int"))?;
    let b = args[1].as_int().ok_or_else(|| BackendError::new("y must be an int"))?;
    Ok(Value::Int(a + b))
}

fn test_module() -> Module {
    let mut module = Module::new("test");
    module
        .constant("k", 10)
        .function(NativeFunction::new(
            "add",
            Signature::new().required("x").required("y"),
            add,
        ))
        .function(NativeFunction::new(
            "add_d",
            Signature::new().required("x").implied("d"),
            add,
        ))
        .function(NativeFunction::new(
            "count",
            Signature::new().variadic(),
            |args: &[Value]| Ok(Value::Int(args.len() as i64)),
        ))
        .function(NativeFunction::new(
            "fail",
            Signature::new(),
            |_: &[Value]| {
                Err(BackendError::with_source(
                    "backend exploded",
                    std::io::Error::other("disk on fire"),
                ))
            },
        ))
        .export(["k", "add", "add_d", "count", "fail"]);
    module
}

struct Runner {
    namespace: Namespace,
}

impl Runner {
    fn new() -> Self {
        Self::with_module(&test_module())
    }

    fn with_module(module: &Module) -> Self {
        Self {
            namespace: Namespace::build(module).expect("test namespace should build"),
        }
    }

    fn run(&self, input: &str, variables: &Variables) -> Result<Value, EvalError> {
        self.run_with_options(input, variables, &ExecutionOptions::default())
    }

    fn run_with_options(
        &self,
        input: &str,
        variables: &Variables,
        options: &ExecutionOptions,
    ) -> Result<Value, EvalError> {
        let expr = parser::parse(input).expect("parsing failed");
        eval(&expr, &self.namespace, variables, options)
    }

    fn value(&self, input: &str) -> Value {
        self.run(input, &Variables::new())
            .unwrap_or_else(|e| panic!("'{}' failed: {}", input, e))
    }

    /// Display form, which distinguishes `2` from `2.0`.
    fn show(&self, input: &str) -> String {
        self.value(input).to_string()
    }

    fn error(&self, input: &str) -> EvalError {
        match self.run(input, &Variables::new()) {
            Ok(value) => panic!("Expected '{}' to fail, got {}", input, value),
            Err(err) => err,
        }
    }
}

// ============================================================================
// Literals and operators
// ============================================================================

#[test]
fn test_literals() {
    let r = Runner::new();
    assert_eq!(r.show("42"), "42");
    assert_eq!(r.show("0x1f"), "31");
    assert_eq!(r.show("2.5"), "2.5");
    assert_eq!(r.show("'hi'"), "'hi'");
    assert_eq!(r.show("None"), "None");
    assert_eq!(r.show("True"), "True");
}

#[test]
fn test_arithmetic() {
    let r = Runner::new();
    assert_eq!(r.show("1 + 2 * 3"), "7");
    assert_eq!(r.show("(2**4 - 10) / 2"), "3.0");
    assert_eq!(r.show("7 // 2"), "3");
    assert_eq!(r.show("-7 // 2"), "-4");
    assert_eq!(r.show("-7 % 3"), "2");
    assert_eq!(r.show("2 ** -1"), "0.5");
    assert_eq!(r.show("-2 ** 2"), "-4");
    assert_eq!(r.show("True + True"), "2");
    assert_eq!(r.show("1 + 0.5"), "1.5");
    assert_eq!(r.show("6 & 3 | 8"), "10");
    assert_eq!(r.show("'ab' * 2 + 'c'"), "'ababc'");
    assert_eq!(r.show("[1] + [2]"), "[1, 2]");
}

#[test]
fn test_arithmetic_errors_carry_spans() {
    let r = Runner::new();
    match r.error("1 + 1/0") {
        EvalError::DivisionByZero { span } => assert_eq!(span, Span::new(4, 7)),
        other => panic!("Expected DivisionByZero, got {:?}", other),
    }
    assert!(matches!(
        r.error("9223372036854775807 + 1"),
        EvalError::Arithmetic { .. }
    ));
    assert!(matches!(r.error("1 << -1"), EvalError::Arithmetic { .. }));
    match r.error("'a' - 1") {
        EvalError::TypeMismatch { message, .. } => {
            assert_eq!(message, "unsupported operand type(s) for -: 'str' and 'int'")
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_unary() {
    let r = Runner::new();
    assert_eq!(r.show("-(3)"), "-3");
    assert_eq!(r.show("+2.5"), "2.5");
    assert_eq!(r.show("~0"), "-1");
    assert_eq!(r.show("not 0"), "True");
    assert_eq!(r.show("not [1]"), "False");
    assert!(matches!(r.error("-'a'"), EvalError::TypeMismatch { .. }));
}

// ============================================================================
// Boolean logic and comparisons
// ============================================================================

#[test]
fn test_bool_ops_return_deciding_operand() {
    let r = Runner::new();
    assert_eq!(r.show("0 or 'x'"), "'x'");
    assert_eq!(r.show("3 and 4"), "4");
    assert_eq!(r.show("[] and 1"), "[]");
    assert_eq!(r.show("None or 0"), "0");
}

#[test]
fn test_bool_ops_short_circuit() {
    let r = Runner::new();
    assert_eq!(r.show("0 and missing"), "0");
    assert_eq!(r.show("1 or missing"), "1");
    assert_eq!(r.show("True or 1/0"), "True");
    assert!(matches!(r.error("1 and missing"), EvalError::UnboundName { .. }));
}

#[test]
fn test_comparisons() {
    let r = Runner::new();
    assert_eq!(r.show("1 == 1.0 == True"), "True");
    assert_eq!(r.show("1 < 2 < 3"), "True");
    assert_eq!(r.show("1 < 3 < 2"), "False");
    assert_eq!(r.show("'a' < 'b'"), "True");
    assert_eq!(r.show("[1, 2] < [1, 3]"), "True");
    assert_eq!(r.show("2 in {1: 'a', 2: 'b'}"), "True");
    assert_eq!(r.show("'ell' in 'hello'"), "True");
    assert_eq!(r.show("3 not in (1, 2)"), "True");
    assert_eq!(r.show("3 > 5 < missing"), "False");
    assert_eq!(r.show("{1, 2} == {2, 1}"), "True");
}

#[test]
fn test_identity_comparisons() {
    let r = Runner::new();
    let vars = Variables::new().with("x", Value::None).with("y", 0);
    let check = |input: &str| r.run(input, &vars).unwrap().to_string();
    assert_eq!(check("x is None"), "True");
    assert_eq!(check("y is None"), "False");
    assert_eq!(check("y is not None"), "True");
    assert_eq!(check("x is not None"), "False");
    assert_eq!(r.show("True is True"), "True");
    assert_eq!(r.show("1 is True"), "False");
    assert_eq!(r.show("None is None is not 0"), "True");
    assert_eq!(r.show("0 if None is None else 1"), "0");
}

#[test]
fn test_chained_comparison_evaluates_each_operand_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut module = Module::new("counting");
    module
        .function(NativeFunction::new(
            "tick",
            Signature::positional(1),
            move |args: &[Value]| {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(args[0].clone())
            },
        ))
        .export(["tick"]);
    let r = Runner::with_module(&module);

    assert_eq!(r.show("1 < tick(2) < 3"), "True");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ordering_mismatch() {
    let r = Runner::new();
    match r.error("1 < 'a'") {
        EvalError::TypeMismatch { message, span } => {
            assert_eq!(
                message,
                "'<' not supported between instances of 'int' and 'str'"
            );
            assert_eq!(span, Span::new(4, 7));
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_conditional_is_lazy() {
    let r = Runner::new();
    let vars = Variables::new().with("a", -5);
    assert_eq!(r.run("a if a > 0 else -a", &vars).unwrap(), Value::Int(5));
    assert_eq!(r.show("1 if True else 1/0"), "1");
    assert_eq!(r.show("missing if 0 else 'no'"), "'no'");
}

// ============================================================================
// Names
// ============================================================================

#[test]
fn test_variables_and_namespace_values() {
    let r = Runner::new();
    let vars = Variables::new().with("x", 4);
    assert_eq!(r.run("k * x", &vars).unwrap(), Value::Int(40));
}

#[test]
fn test_unbound_name() {
    let r = Runner::new();
    match r.error("1 + y") {
        EvalError::UnboundName { name, span } => {
            assert_eq!(name, "y");
            assert_eq!(span, Span::new(4, 5));
        }
        other => panic!("Expected UnboundName, got {:?}", other),
    }
}

#[test]
fn test_name_bound_twice_is_ambiguous() {
    let r = Runner::new();
    let vars = Variables::new().with("k", 1);
    match r.run("k + 1", &vars) {
        Err(EvalError::AmbiguousName { name, .. }) => assert_eq!(name, "k"),
        other => panic!("Expected AmbiguousName, got {:?}", other),
    }

    let vars = Variables::new().with("add", 1);
    assert!(matches!(
        r.run("add(1, 2)", &vars),
        Err(EvalError::AmbiguousName { .. })
    ));
}

#[test]
fn test_function_used_as_value() {
    let r = Runner::new();
    match r.error("add") {
        EvalError::TypeMismatch { message, .. } => {
            assert_eq!(message, "function 'add' can only be called")
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

// ============================================================================
// Containers
// ============================================================================

#[test]
fn test_containers() {
    let r = Runner::new();
    assert_eq!(r.show("[1, 'a', None]"), "[1, 'a', None]");
    assert_eq!(r.show("(1,)"), "(1,)");
    assert_eq!(r.show("()"), "()");
    assert_eq!(r.show("{1, 2, 1}"), "{1, 2}");
    assert_eq!(r.show("{'a': 1, 'b': 2, 'a': 3}"), "{'a': 3, 'b': 2}");
    assert_eq!(r.show("{}"), "{}");
    assert_eq!(r.show("{(1, 2): 'pair'}"), "{(1, 2): 'pair'}");
}

#[test]
fn test_sequence_repetition() {
    let r = Runner::new();
    assert_eq!(r.show("[1, 2] * 2"), "[1, 2, 1, 2]");
    assert_eq!(r.show("(1,) * 3"), "(1, 1, 1)");
    assert_eq!(r.show("2 * [[0]]"), "[[0], [0]]");
    assert_eq!(r.show("[1] * -1"), "[]");
}

#[test]
fn test_unhashable_keys() {
    let r = Runner::new();
    match r.error("{[1]: 2}") {
        EvalError::TypeMismatch { message, span } => {
            assert_eq!(message, "unhashable type: 'list'");
            assert_eq!(span, Span::new(0, 8));
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
    assert!(matches!(r.error("{{1}}"), EvalError::TypeMismatch { .. }));
}

// ============================================================================
// Calls
// ============================================================================

#[test]
fn test_calls() {
    let r = Runner::new();
    let vars = Variables::new().with("b", 1).with("d", 2);
    assert_eq!(r.run("add(b, d)", &vars).unwrap(), Value::Int(3));
    assert_eq!(r.run("add(x=2, y=1)", &vars).unwrap(), Value::Int(3));
    assert_eq!(r.run("add(2, y=b)", &vars).unwrap(), Value::Int(3));
    assert_eq!(r.show("count()"), "0");
    assert_eq!(r.show("count(1, 2, 3)"), "3");
    assert_eq!(r.show("(add)(1, 1)"), "2");
}

#[test]
fn test_implied_argument_comes_from_variables() {
    let r = Runner::new();
    let vars = Variables::new().with("d", 5);
    assert_eq!(r.run("add_d(10)", &vars).unwrap(), Value::Int(15));

    match r.error("add_d(10)") {
        EvalError::UnboundName { name, .. } => assert_eq!(name, "d"),
        other => panic!("Expected UnboundName, got {:?}", other),
    }
}

#[test]
fn test_arity_mismatch() {
    let r = Runner::new();
    match r.error("add(1)") {
        EvalError::ArityMismatch {
            function,
            expected,
            found,
            ..
        } => {
            assert_eq!(function, "add");
            assert_eq!(expected, Arity { min: 2, max: Some(2) });
            assert_eq!(found, 1);
        }
        other => panic!("Expected ArityMismatch, got {:?}", other),
    }
    match r.error("add(1, 2, 3)") {
        EvalError::ArityMismatch { found, .. } => assert_eq!(found, 3),
        other => panic!("Expected ArityMismatch, got {:?}", other),
    }
    let vars = Variables::new().with("d", 1);
    assert_eq!(
        r.run("add_d()", &vars).unwrap_err().to_string(),
        "add_d() takes 1 positional arguments but 0 were given"
    );
}

#[test]
fn test_keyword_binding_errors() {
    let r = Runner::new();
    match r.error("add(1, x=2)") {
        EvalError::TypeMismatch { message, .. } => {
            assert_eq!(message, "add() got multiple values for argument 'x'")
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
}

#[test]
fn test_calling_a_value() {
    let r = Runner::new();
    match r.error("k(1)") {
        EvalError::TypeMismatch { message, span } => {
            assert_eq!(message, "'int' object is not callable");
            assert_eq!(span, Span::new(0, 1));
        }
        other => panic!("Expected TypeMismatch, got {:?}", other),
    }
    let vars = Variables::new().with("v", "text");
    assert!(matches!(
        r.run("v()", &vars),
        Err(EvalError::TypeMismatch { .. })
    ));
}

#[test]
fn test_backend_error_is_preserved() {
    crate::test_utils::init_test_logging();
    let r = Runner::new();
    let err = r.error("1 + fail()");
    let EvalError::Backend {
        function,
        error,
        span,
    } = &err
    else {
        panic!("Expected Backend, got {:?}", err);
    };
    assert_eq!(function, "fail");
    assert_eq!(error.message, "backend exploded");
    assert_eq!(span, &Span::new(4, 10));

    let source = std::error::Error::source(&err).expect("backend error is the source");
    assert_eq!(source.to_string(), "backend exploded");
    let root = source.source().expect("original cause is kept");
    assert_eq!(root.to_string(), "disk on fire");
}

// ============================================================================
// Limits and unsupported nodes
// ============================================================================

#[test]
fn test_stack_overflow() {
    let r = Runner::new();
    let input = format!("{}1{}", "(".repeat(40), ")".repeat(40));
    let options = ExecutionOptions {
        max_depth: 20,
        max_steps: None,
    };
    match r.run_with_options(&input, &Variables::new(), &options) {
        Err(EvalError::StackOverflow { depth, max_depth, .. }) => {
            assert_eq!(depth, 20);
            assert_eq!(max_depth, 20);
        }
        other => panic!("Expected StackOverflow, got {:?}", other),
    }
    assert_eq!(r.value(&input), Value::Int(1));
}

#[test]
fn test_step_limit() {
    crate::test_utils::init_test_logging();
    let r = Runner::new();
    let options = ExecutionOptions {
        max_depth: 1000,
        max_steps: Some(5),
    };
    let vars = Variables::new();
    assert_eq!(
        r.run_with_options("1 + 2", &vars, &options).unwrap(),
        Value::Int(3)
    );
    assert!(matches!(
        r.run_with_options("1 + 2 + 3 + 4", &vars, &options),
        Err(EvalError::StepLimit { limit: 5, .. })
    ));
}

#[test]
fn test_forbidden_nodes_are_not_evaluated() {
    let r = Runner::new();
    let vars = Variables::new().with("x", 1);
    match r.run("x.real", &vars) {
        Err(EvalError::Unsupported { construct, .. }) => assert_eq!(construct, "attribute access"),
        other => panic!("Expected Unsupported, got {:?}", other),
    }
    assert!(matches!(
        r.run("[y for y in x]", &vars),
        Err(EvalError::Unsupported { .. })
    ));
    match r.run("[1][0](2)", &vars) {
        Err(EvalError::Unsupported { construct, .. }) => {
            assert_eq!(construct, "call of a non-name expression")
        }
        other => panic!("Expected Unsupported, got {:?}", other),
    }
}

#[test]
fn test_error_diagnostics() {
    let r = Runner::new();
    let diagnostic = r.error("1/0").to_diagnostic();
    assert_eq!(diagnostic.code.as_deref(), Some("E004"));
    assert_eq!(diagnostic.message, "division by zero");
    assert_eq!(diagnostic.span, Span::new(0, 3));
}
