use crate::api::{Diagnostic, Severity};
use crate::parser::{Rule, Span};

/// Parser error with the source range it refers to.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} at {span}", self.message())]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// Specific kinds of parse errors
#[derive(Debug, Clone, PartialEq)]
pub enum ParseErrorKind {
    /// Unexpected token
    UnexpectedToken { expected: String, found: String },
    /// Invalid number literal (e.g. an integer that does not fit in 64 bits)
    InvalidNumber { text: String },
    /// Malformed `\x` or `\u` escape in a string literal
    InvalidEscape { text: String },
    /// Maximum nesting depth exceeded
    MaxDepthExceeded { depth: usize, max_depth: usize },
    /// `f(x=1, 2)`
    PositionalAfterKeyword,
    /// Other parse errors (catch-all for Pest errors we don't specifically handle)
    Other { message: String },
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        Self { kind, span }
    }

    pub fn message(&self) -> String {
        match &self.kind {
            ParseErrorKind::UnexpectedToken { expected, found } => {
                format!("Expected {}, found {}", expected, found)
            }
            ParseErrorKind::InvalidNumber { text } => format!("Invalid number literal '{}'", text),
            ParseErrorKind::InvalidEscape { text } => {
                format!("Invalid escape sequence '{}' in string literal", text)
            }
            ParseErrorKind::MaxDepthExceeded { max_depth, .. } => format!(
                "Expression nesting depth exceeds maximum of {} levels",
                max_depth
            ),
            ParseErrorKind::PositionalAfterKeyword => {
                "Positional argument follows keyword argument".to_string()
            }
            ParseErrorKind::Other { message } => message.clone(),
        }
    }

    /// Convert to a Diagnostic for API boundary
    pub fn to_diagnostic(&self) -> Diagnostic {
        let (code, help) = match &self.kind {
            ParseErrorKind::UnexpectedToken { .. } => ("P001", vec![]),
            ParseErrorKind::InvalidNumber { .. } => (
                "P002",
                vec!["Integer literals must fit in a signed 64-bit integer".to_string()],
            ),
            ParseErrorKind::InvalidEscape { .. } => (
                "P003",
                vec!["Use \\xNN or \\uNNNN with hexadecimal digits".to_string()],
            ),
            ParseErrorKind::MaxDepthExceeded { .. } => (
                "P004",
                vec!["Reduce nesting or simplify the expression".to_string()],
            ),
            ParseErrorKind::PositionalAfterKeyword => (
                "P005",
                vec!["Move positional arguments before keyword arguments".to_string()],
            ),
            ParseErrorKind::Other { .. } => ("P999", vec![]),
        };

        Diagnostic {
            severity: Severity::Error,
            message: self.message(),
            span: self.span.clone(),
            help,
            code: Some(code.to_string()),
        }
    }
}

/// Convert Pest error to human-readable ParseError
pub fn convert_pest_error(err: pest::error::Error<Rule>, source: &str) -> ParseError {
    use pest::error::ErrorVariant;

    let span = match err.location {
        pest::error::InputLocation::Pos(pos) => Span(pos..pos),
        pest::error::InputLocation::Span((start, end)) => Span(start..end),
    };

    let kind = match err.variant {
        ErrorVariant::ParsingError {
            positives,
            negatives,
        } => ParseErrorKind::UnexpectedToken {
            expected: format_expected_rules(&positives),
            found: if span.start() >= source.len() {
                "end of input".to_string()
            } else if negatives.is_empty() {
                format_found_text(source.get(span.start()..).unwrap_or_default())
            } else {
                format_found_rules(&negatives)
            },
        },
        ErrorVariant::CustomError { message } => ParseErrorKind::Other { message },
    };

    ParseError::new(kind, span)
}

/// Format expected rules in a human-readable way
fn format_expected_rules(rules: &[Rule]) -> String {
    let mut concepts: Vec<&str> = Vec::new();

    for rule in rules {
        let concept = match rule {
            Rule::integer | Rule::float | Rule::boolean | Rule::string | Rule::none => "literal",
            Rule::ident => "identifier",
            Rule::EOI => "end of input",
            Rule::walrus
            | Rule::ternary_op
            | Rule::or
            | Rule::and
            | Rule::not_in
            | Rule::in_op
            | Rule::is_not
            | Rule::is_op
            | Rule::eq
            | Rule::ne
            | Rule::le
            | Rule::ge
            | Rule::shl
            | Rule::shr
            | Rule::lt
            | Rule::gt
            | Rule::bit_or
            | Rule::bit_xor
            | Rule::bit_and
            | Rule::add
            | Rule::sub
            | Rule::pow
            | Rule::mul
            | Rule::floordiv
            | Rule::div
            | Rule::modulo => "operator",
            Rule::call_op | Rule::subscript_op | Rule::attr_op => "operator",
            Rule::assign_op => "operator",
            _ => "expression",
        };
        if !concepts.contains(&concept) {
            concepts.push(concept);
        }
    }

    match concepts.split_last() {
        None => "something else".to_string(),
        Some((only, [])) => only.to_string(),
        Some((last, rest)) => format!("{} or {}", rest.join(", "), last),
    }
}

/// The token at the error position, as the user wrote it.
fn format_found_text(rest: &str) -> String {
    let token: String = match rest.chars().next() {
        Some(c) if c.is_alphanumeric() || c == '_' => rest
            .chars()
            .take_while(|c| c.is_alphanumeric() || *c == '_')
            .collect(),
        Some(c) => c.to_string(),
        None => return "end of input".to_string(),
    };
    format!("'{}'", token)
}

/// Format found rules in a human-readable way
fn format_found_rules(rules: &[Rule]) -> String {
    match rules.first() {
        None => "unexpected token".to_string(),
        Some(Rule::ident) => "identifier".to_string(),
        Some(Rule::integer) => "integer".to_string(),
        Some(Rule::float) => "floating-point number".to_string(),
        Some(Rule::boolean) => "boolean".to_string(),
        Some(Rule::string) => "string".to_string(),
        Some(Rule::EOI) => "end of input".to_string(),
        Some(rule) => format!("{:?}", rule),
    }
}
