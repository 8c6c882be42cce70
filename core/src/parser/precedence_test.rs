use pretty_assertions::assert_eq;

use super::parser::parse;

// Helper function to parse an expression and render its tree.
//
// We test precedence by comparing whether two expressions parenthesized in
// different ways render the same fully parenthesized form.
fn ast(source: &str) -> String {
    parse(source)
        .unwrap_or_else(|e| panic!("Expression parsing failed: {}\n{}", source, e))
        .to_string()
}

#[test]
fn test_addition_vs_subtraction() {
    assert_eq!(ast("a + b - c"), ast("(a + b) - c"));
    assert_eq!(ast("a - b + c"), ast("(a - b) + c"));
    assert_eq!(
        ast("a + b - c + d - e + f"),
        ast("((((a + b) - c) + d) - e) + f")
    );
}

#[test]
fn test_multiplicative_operators() {
    assert_eq!(ast("a * b / c"), ast("(a * b) / c"));
    assert_eq!(ast("a // b % c * d"), ast("((a // b) % c) * d"));
    assert_eq!(ast("a + b * c"), ast("a + (b * c)"));
    assert_eq!(ast("a % b - c"), ast("(a % b) - c"));
}

#[test]
fn test_and_vs_or() {
    assert_eq!(ast("a and b or c"), ast("(a and b) or c"));
    assert_eq!(ast("a or b and c"), ast("a or (b and c)"));
}

#[test]
fn test_not_vs_comparison() {
    assert_eq!(ast("not a == b"), ast("not (a == b)"));
    assert_eq!(ast("not a and b"), ast("(not a) and b"));
    assert_eq!(ast("a or not b"), ast("a or (not b)"));
}

#[test]
fn test_unary_vs_binary() {
    assert_eq!(ast("--a"), ast("-(-a)"));
    assert_eq!(ast("-a + b"), ast("(-a) + b"));
    assert_eq!(ast("a + -b"), ast("a + (-b)"));
    assert_eq!(ast("~a * b"), ast("(~a) * b"));
}

#[test]
fn test_exponentiation() {
    assert_eq!(ast("a ** b ** c"), ast("a ** (b ** c)"));
    assert_eq!(ast("-a ** b"), ast("-(a ** b)"));
    assert_eq!(ast("a ** -b"), ast("a ** (-b)"));
    assert_eq!(ast("a * b ** c"), ast("a * (b ** c)"));
}

#[test]
fn test_bitwise_levels() {
    assert_eq!(ast("a | b ^ c & d"), ast("a | (b ^ (c & d))"));
    assert_eq!(ast("a & b << c"), ast("a & (b << c)"));
    assert_eq!(ast("a << b + c"), ast("a << (b + c)"));
    assert_eq!(ast("a | b == c"), ast("(a | b) == c"));
}

#[test]
fn test_chained_comparison() {
    assert_eq!(ast("a < b <= c"), "(a < b <= c)");
    assert_eq!(ast("a == b != c in d"), "(a == b != c in d)");
    // Parentheses break the chain.
    assert_eq!(ast("(a < b) < c"), "((a < b) < c)");
    assert_eq!(ast("a not in b"), "(a not in b)");
}

#[test]
fn test_identity_comparison() {
    assert_eq!(ast("a is None"), "(a is None)");
    assert_eq!(ast("a is not None"), "(a is not None)");
    assert_eq!(ast("a is not_b"), "(a is not_b)");
    assert_eq!(ast("a is not b == c"), "(a is not b == c)");
    assert_eq!(ast("not a is b"), ast("not (a is b)"));
    assert_eq!(ast("a + 1 is b or c"), ast("((a + 1) is b) or c"));
}

#[test]
fn test_conditional_expression() {
    assert_eq!(ast("a if b else c"), "(a if b else c)");
    assert_eq!(
        ast("a if b else c if d else e"),
        ast("a if b else (c if d else e)")
    );
    assert_eq!(ast("a or b if c else d"), ast("(a or b) if c else d"));
    assert_eq!(ast("a if b or c else d"), "(a if (b or c) else d)");
}

#[test]
fn test_postfix_binds_tightest() {
    assert_eq!(ast("-f(x)"), "(-f(x))");
    assert_eq!(ast("a.b(c)[d]"), "a.b(c)[d]");
    assert_eq!(ast("-a ** b.c"), ast("-(a ** (b.c))"));
}

#[test]
fn test_lambda_is_lowest() {
    assert_eq!(ast("lambda x: x + 1"), "(lambda x: (x + 1))");
    assert_eq!(
        ast("lambda x: a if x else b"),
        "(lambda x: (a if x else b))"
    );
}
