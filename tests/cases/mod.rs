use once_cell::sync::Lazy;

pub struct TestCase {
    pub name: &'static str,
    pub expr: &'static str,
    /// Python repr of the result, or the error code when evaluation fails.
    pub expected: &'static str,
}

pub static TEST_CASES: Lazy<Vec<TestCase>> = Lazy::new(|| {
    vec![
        TestCase {
            name: "closed_arithmetic",
            expr: "(2**4 - 10) / 2 == 3.0",
            expected: "True",
        },
        TestCase {
            name: "true_division_is_float",
            expr: "7 / 2",
            expected: "3.5",
        },
        TestCase {
            name: "floor_division_rounds_down",
            expr: "-7 // 2",
            expected: "-4",
        },
        TestCase {
            name: "modulo_takes_divisor_sign",
            expr: "-7 % 3",
            expected: "2",
        },
        TestCase {
            name: "chained_comparison",
            expr: "1 < x <= 3 != 4",
            expected: "True",
        },
        TestCase {
            name: "conditional",
            expr: "'big' if x > 2 else 'small'",
            expected: "'small'",
        },
        TestCase {
            name: "membership",
            expr: "x in [1, 2, 3] and 'a' not in 'xyz'",
            expected: "True",
        },
        TestCase {
            name: "string_repeat",
            expr: "'ab' * x",
            expected: "'abab'",
        },
        TestCase {
            name: "containers",
            expr: "[(x, {x: 'v'}), {1, 1, 2}]",
            expected: "[(2, {2: 'v'}), {1, 2}]",
        },
        TestCase {
            name: "builtins_and_math",
            expr: "round(sqrt(sum(range(x, 10))), 2)",
            expected: "6.63",
        },
        TestCase {
            name: "keyword_argument",
            expr: "sorted([3, 1, 2], reverse=True)",
            expected: "[3, 2, 1]",
        },
        TestCase {
            name: "division_by_zero",
            expr: "x / (x - 2)",
            expected: "E004",
        },
        TestCase {
            name: "unbound_name",
            expr: "x + y",
            expected: "E001",
        },
        TestCase {
            name: "attribute_access",
            expr: "x.real",
            expected: "V001",
        },
        TestCase {
            name: "unknown_function",
            expr: "open('f')",
            expected: "V002",
        },
        TestCase {
            name: "lambda",
            expr: "(lambda: 1)()",
            expected: "V001",
        },
        TestCase {
            name: "syntax_error",
            expr: "x +* 2",
            expected: "P001",
        },
    ]
});
