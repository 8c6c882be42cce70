use lazy_static::lazy_static;
use pest::Parser;
use pest::iterators::{Pair, Pairs};
use pest::pratt_parser::{Assoc, Op, PrattParser};
use pest_derive::Parser;
use tracing::trace;

use crate::parser::error::convert_pest_error;
use crate::parser::{
    Argument, AssignOp, BinaryOp, BoolOp, CompareOp, ComprehensionFor, ComprehensionKind, Expr,
    ExprKind, Literal, ParseError, ParseErrorKind, Span, UnaryOp,
};

lazy_static! {
    // Note: precedence is defined lowest to highest.
    static ref PRATT_PARSER: PrattParser<Rule> = PrattParser::new()
        // (lowest precedence)
        .op(Op::prefix(Rule::lambda_op))                 // `lambda x:`
        .op(Op::infix(Rule::walrus, Assoc::Right))       // `:=`
        .op(Op::infix(Rule::ternary_op, Assoc::Right))   // `if ... else`

        // Logical operators.
        .op(Op::infix(Rule::or, Assoc::Left))            // `or`
        .op(Op::infix(Rule::and, Assoc::Left))           // `and`
        .op(Op::prefix(Rule::not))                       // `not`

        // Comparisons all share one level and chain.
        .op(
            Op::infix(Rule::eq, Assoc::Left) |
            Op::infix(Rule::ne, Assoc::Left) |
            Op::infix(Rule::lt, Assoc::Left) |
            Op::infix(Rule::le, Assoc::Left) |
            Op::infix(Rule::gt, Assoc::Left) |
            Op::infix(Rule::ge, Assoc::Left) |
            Op::infix(Rule::in_op, Assoc::Left) |
            Op::infix(Rule::not_in, Assoc::Left) |
            Op::infix(Rule::is_op, Assoc::Left) |
            Op::infix(Rule::is_not, Assoc::Left)
        )

        // Bitwise operators.
        .op(Op::infix(Rule::bit_or, Assoc::Left))        // `|`
        .op(Op::infix(Rule::bit_xor, Assoc::Left))       // `^`
        .op(Op::infix(Rule::bit_and, Assoc::Left))       // `&`
        .op(
            Op::infix(Rule::shl, Assoc::Left) |
            Op::infix(Rule::shr, Assoc::Left)
        )                                                // `<<`, `>>`

        // Arithmetic operators.
        .op(
            Op::infix(Rule::add, Assoc::Left) |
            Op::infix(Rule::sub, Assoc::Left)
        )                                                // `+`, `-`
        .op(
            Op::infix(Rule::mul, Assoc::Left) |
            Op::infix(Rule::div, Assoc::Left) |
            Op::infix(Rule::floordiv, Assoc::Left) |
            Op::infix(Rule::modulo, Assoc::Left)
        )                                                // `*`, `/`, `//`, `%`
        .op(
            Op::prefix(Rule::neg) |
            Op::prefix(Rule::pos) |
            Op::prefix(Rule::invert)
        )                                                // `-`, `+`, `~`
        .op(Op::infix(Rule::pow, Assoc::Right))          // `**` (right-assoc)

        // Postfix operators.
        .op(
            Op::postfix(Rule::call_op) |
            Op::postfix(Rule::subscript_op) |
            Op::postfix(Rule::attr_op)
        )                                                // `()`, `[]`, `.`
        // (highest precedence)
        ;
}

#[derive(Parser)]
#[grammar = "parser/expression.pest"]
pub struct ExpressionParser;

/// Default limit for both bracket nesting and syntax tree height.
pub const DEFAULT_MAX_DEPTH: usize = 256;

pub fn parse(source: &str) -> Result<Expr, ParseError> {
    parse_with_max_depth(source, DEFAULT_MAX_DEPTH)
}

pub fn parse_with_max_depth(source: &str, max_depth: usize) -> Result<Expr, ParseError> {
    check_bracket_nesting(source, max_depth)?;

    let mut pairs = ExpressionParser::parse(Rule::main, source).map_err(|e| convert_pest_error(e, source))?;
    let main = next_pair(&mut pairs, Span::new(0, source.len()), "expression")?;
    check_operator_depth(main.clone(), 0, max_depth)?;
    let expr = parse_main(main)?;

    let depth = expr.depth();
    if depth > max_depth {
        return Err(ParseError::new(
            ParseErrorKind::MaxDepthExceeded { depth, max_depth },
            expr.span.clone(),
        ));
    }
    trace!(depth, "parsed expression");
    Ok(expr)
}

/// Rejects deeply nested brackets before pest recurses into them.
fn check_bracket_nesting(source: &str, max_depth: usize) -> Result<(), ParseError> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut chars = source.char_indices();

    while let Some((pos, c)) = chars.next() {
        if let Some(q) = quote {
            match c {
                '\\' => {
                    chars.next();
                }
                '\n' => quote = None,
                _ if c == q => quote = None,
                _ => {}
            }
            continue;
        }
        match c {
            '"' | '\'' => quote = Some(c),
            '#' => {
                for (_, c) in chars.by_ref() {
                    if c == '\n' {
                        break;
                    }
                }
            }
            '(' | '[' | '{' => {
                depth += 1;
                if depth > max_depth {
                    return Err(ParseError::new(
                        ParseErrorKind::MaxDepthExceeded { depth, max_depth },
                        Span::new(pos, pos + 1),
                    ));
                }
            }
            ')' | ']' | '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }
    Ok(())
}

/// Operator runs are flat in the parse tree, but the Pratt parser recurses
/// once per prefix operator and right-associative infix. Bounds the height
/// of the tree to be built, counting every operator of an expression as one
/// level, so the limit holds before any of that recursion happens.
fn check_operator_depth(
    pair: Pair<Rule>,
    above: usize,
    max_depth: usize,
) -> Result<(), ParseError> {
    let own = match pair.as_rule() {
        Rule::expression => {
            1 + pair
                .clone()
                .into_inner()
                .filter(|p| is_operator(p.as_rule()))
                .count()
        }
        Rule::assignment
        | Rule::slice
        | Rule::starred
        | Rule::double_starred
        | Rule::call_generator => 1,
        _ => 0,
    };
    let depth = above + own;
    if depth > max_depth {
        return Err(ParseError::new(
            ParseErrorKind::MaxDepthExceeded { depth, max_depth },
            pair.as_span().into(),
        ));
    }
    for child in pair.into_inner() {
        check_operator_depth(child, depth, max_depth)?;
    }
    Ok(())
}

fn is_operator(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::lambda_op
            | Rule::not
            | Rule::neg
            | Rule::pos
            | Rule::invert
            | Rule::walrus
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
            | Rule::modulo
            | Rule::call_op
            | Rule::subscript_op
            | Rule::attr_op
    )
}

fn missing(span: Span, what: &str) -> ParseError {
    ParseError::new(
        ParseErrorKind::Other {
            message: format!("missing {} in parse tree", what),
        },
        span,
    )
}

fn next_pair<'i>(
    pairs: &mut Pairs<'i, Rule>,
    span: Span,
    what: &str,
) -> Result<Pair<'i, Rule>, ParseError> {
    pairs.next().ok_or_else(|| missing(span, what))
}

/// Keyword tokens such as `if` or `for` appear in the parse tree but carry
/// nothing beyond their position.
fn is_keyword_token(rule: Rule) -> bool {
    matches!(
        rule,
        Rule::lambda_kw | Rule::if_kw
            | Rule::else_kw
            | Rule::for_kw
            | Rule::in_kw
            | Rule::not_kw
            | Rule::is_kw
    )
}

fn significant<'i>(pair: Pair<'i, Rule>) -> impl Iterator<Item = Pair<'i, Rule>> {
    pair.into_inner().filter(|p| !is_keyword_token(p.as_rule()))
}

fn parse_main(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let body = next_pair(&mut inner, span.clone(), "expression")?;

    match body.as_rule() {
        Rule::statement => {
            let body_span = Span::from(body.as_span());
            let keyword = next_pair(&mut body.into_inner(), body_span.clone(), "keyword")?;
            Ok(Expr::new(
                ExprKind::Statement {
                    keyword: keyword.as_str().to_string(),
                },
                body_span,
            ))
        }
        Rule::assignment => {
            let body_span = Span::from(body.as_span());
            let mut parts = body.into_inner();
            let target = parse_expression(next_pair(&mut parts, body_span.clone(), "target")?)?;
            let op = parse_assign_op(next_pair(&mut parts, body_span.clone(), "operator")?)?;
            let value = parse_expression(next_pair(&mut parts, body_span.clone(), "value")?)?;
            Ok(Expr::new(
                ExprKind::Assign {
                    target: Box::new(target),
                    op,
                    value: Box::new(value),
                },
                body_span,
            ))
        }
        _ => parse_expression(body),
    }
}

fn parse_assign_op(pair: Pair<Rule>) -> Result<AssignOp, ParseError> {
    let op = match pair.as_str() {
        "=" => AssignOp::Assign,
        "+=" => AssignOp::Augmented(BinaryOp::Add),
        "-=" => AssignOp::Augmented(BinaryOp::Sub),
        "*=" => AssignOp::Augmented(BinaryOp::Mul),
        "/=" => AssignOp::Augmented(BinaryOp::Div),
        "//=" => AssignOp::Augmented(BinaryOp::FloorDiv),
        "%=" => AssignOp::Augmented(BinaryOp::Mod),
        "**=" => AssignOp::Augmented(BinaryOp::Pow),
        "&=" => AssignOp::Augmented(BinaryOp::BitAnd),
        "|=" => AssignOp::Augmented(BinaryOp::BitOr),
        "^=" => AssignOp::Augmented(BinaryOp::BitXor),
        "<<=" => AssignOp::Augmented(BinaryOp::Shl),
        ">>=" => AssignOp::Augmented(BinaryOp::Shr),
        "@=" => AssignOp::MatMul,
        other => {
            return Err(ParseError::new(
                ParseErrorKind::Other {
                    message: format!("unknown assignment operator '{}'", other),
                },
                pair.as_span().into(),
            ));
        }
    };
    Ok(op)
}

fn parse_expression(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    PRATT_PARSER
        .map_primary(parse_primary)
        .map_prefix(|op, rhs| {
            let rhs = rhs?;
            let span = Span::new(op.as_span().start(), rhs.span.end());
            let kind = match op.as_rule() {
                Rule::neg => ExprKind::Unary {
                    op: UnaryOp::Neg,
                    operand: Box::new(rhs),
                },
                Rule::pos => ExprKind::Unary {
                    op: UnaryOp::Pos,
                    operand: Box::new(rhs),
                },
                Rule::invert => ExprKind::Unary {
                    op: UnaryOp::Invert,
                    operand: Box::new(rhs),
                },
                Rule::not => ExprKind::Unary {
                    op: UnaryOp::Not,
                    operand: Box::new(rhs),
                },
                Rule::lambda_op => {
                    let params = significant(op)
                        .filter(|p| p.as_rule() == Rule::lambda_params)
                        .flat_map(|p| p.into_inner())
                        .map(|p| p.as_str().to_string())
                        .collect();
                    ExprKind::Lambda {
                        params,
                        body: Box::new(rhs),
                    }
                }
                rule => unreachable!("Unknown prefix operator: {:?}", rule),
            };
            Ok(Expr::new(kind, span))
        })
        .map_infix(|lhs, op, rhs| {
            let lhs = lhs?;
            let rhs = rhs?;
            let span = Span::combine(&lhs.span, &rhs.span);

            let binary = |op: BinaryOp, lhs: Expr, rhs: Expr| ExprKind::Binary {
                op,
                left: Box::new(lhs),
                right: Box::new(rhs),
            };
            let compare = |op: CompareOp, lhs: Expr, rhs: Expr| match lhs.kind {
                ExprKind::Compare {
                    left,
                    mut comparisons,
                } => {
                    comparisons.push((op, rhs));
                    ExprKind::Compare { left, comparisons }
                }
                _ => ExprKind::Compare {
                    left: Box::new(lhs),
                    comparisons: vec![(op, rhs)],
                },
            };

            let kind = match op.as_rule() {
                Rule::add => binary(BinaryOp::Add, lhs, rhs),
                Rule::sub => binary(BinaryOp::Sub, lhs, rhs),
                Rule::mul => binary(BinaryOp::Mul, lhs, rhs),
                Rule::div => binary(BinaryOp::Div, lhs, rhs),
                Rule::floordiv => binary(BinaryOp::FloorDiv, lhs, rhs),
                Rule::modulo => binary(BinaryOp::Mod, lhs, rhs),
                Rule::pow => binary(BinaryOp::Pow, lhs, rhs),
                Rule::bit_and => binary(BinaryOp::BitAnd, lhs, rhs),
                Rule::bit_or => binary(BinaryOp::BitOr, lhs, rhs),
                Rule::bit_xor => binary(BinaryOp::BitXor, lhs, rhs),
                Rule::shl => binary(BinaryOp::Shl, lhs, rhs),
                Rule::shr => binary(BinaryOp::Shr, lhs, rhs),
                Rule::eq => compare(CompareOp::Eq, lhs, rhs),
                Rule::ne => compare(CompareOp::Ne, lhs, rhs),
                Rule::lt => compare(CompareOp::Lt, lhs, rhs),
                Rule::le => compare(CompareOp::Le, lhs, rhs),
                Rule::gt => compare(CompareOp::Gt, lhs, rhs),
                Rule::ge => compare(CompareOp::Ge, lhs, rhs),
                Rule::in_op => compare(CompareOp::In, lhs, rhs),
                Rule::not_in => compare(CompareOp::NotIn, lhs, rhs),
                Rule::is_op => compare(CompareOp::Is, lhs, rhs),
                Rule::is_not => compare(CompareOp::IsNot, lhs, rhs),
                Rule::and => ExprKind::BoolOp {
                    op: BoolOp::And,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                Rule::or => ExprKind::BoolOp {
                    op: BoolOp::Or,
                    left: Box::new(lhs),
                    right: Box::new(rhs),
                },
                Rule::ternary_op => {
                    let op_span = Span::from(op.as_span());
                    let cond = significant(op)
                        .next()
                        .ok_or_else(|| missing(op_span, "condition"))?;
                    ExprKind::IfElse {
                        cond: Box::new(parse_expression(cond)?),
                        then_branch: Box::new(lhs),
                        else_branch: Box::new(rhs),
                    }
                }
                Rule::walrus => ExprKind::NamedExpr {
                    target: Box::new(lhs),
                    value: Box::new(rhs),
                },
                rule => unreachable!("Unknown binary operator: {:?}", rule),
            };
            Ok(Expr::new(kind, span))
        })
        .map_postfix(|lhs, op| {
            let lhs = lhs?;
            let span = Span::new(lhs.span.start(), op.as_span().end());
            let kind = match op.as_rule() {
                Rule::call_op => ExprKind::Call {
                    callee: Box::new(lhs),
                    args: parse_arguments(op)?,
                },
                Rule::subscript_op => {
                    let op_span = Span::from(op.as_span());
                    let index = next_pair(&mut op.into_inner(), op_span, "index")?;
                    let index = match index.as_rule() {
                        Rule::slice => parse_slice(index)?,
                        _ => parse_expression(index)?,
                    };
                    ExprKind::Subscript {
                        value: Box::new(lhs),
                        index: Box::new(index),
                    }
                }
                Rule::attr_op => {
                    let op_span = Span::from(op.as_span());
                    let attr = next_pair(&mut op.into_inner(), op_span, "attribute name")?;
                    ExprKind::Attribute {
                        value: Box::new(lhs),
                        attr: attr.as_str().to_string(),
                    }
                }
                rule => unreachable!("Unknown postfix operator: {:?}", rule),
            };
            Ok(Expr::new(kind, span))
        })
        .parse(pair.into_inner())
}

fn parse_arguments(op: Pair<Rule>) -> Result<Vec<Argument>, ParseError> {
    let mut args = Vec::new();
    let mut seen_keyword = false;

    for pair in op.into_inner() {
        let span = Span::from(pair.as_span());
        match pair.as_rule() {
            Rule::call_generator => {
                let kind = parse_comprehension(pair, ComprehensionKind::Generator)?;
                args.push(Argument::Positional(Expr::new(kind, span)));
            }
            Rule::keyword_arg => {
                seen_keyword = true;
                let mut inner = pair.into_inner();
                let name = next_pair(&mut inner, span.clone(), "keyword name")?;
                let value = next_pair(&mut inner, span.clone(), "keyword value")?;
                args.push(Argument::Keyword {
                    name: name.as_str().to_string(),
                    value: parse_expression(value)?,
                    span,
                });
            }
            Rule::double_starred => {
                seen_keyword = true;
                args.push(Argument::Positional(parse_starred(pair, true)?));
            }
            Rule::starred => args.push(Argument::Positional(parse_starred(pair, false)?)),
            _ => {
                if seen_keyword {
                    return Err(ParseError::new(ParseErrorKind::PositionalAfterKeyword, span));
                }
                args.push(Argument::Positional(parse_expression(pair)?));
            }
        }
    }
    Ok(args)
}

fn parse_slice(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = Span::from(pair.as_span());
    let (mut lower, mut upper, mut step) = (None, None, None);

    for part in pair.into_inner() {
        let part_span = Span::from(part.as_span());
        let rule = part.as_rule();
        let value = next_pair(&mut part.into_inner(), part_span, "slice bound")?;
        let value = Some(Box::new(parse_expression(value)?));
        match rule {
            Rule::slice_lower => lower = value,
            Rule::slice_upper => upper = value,
            _ => step = value,
        }
    }
    Ok(Expr::new(ExprKind::Slice { lower, upper, step }, span))
}

fn parse_starred(pair: Pair<Rule>, double: bool) -> Result<Expr, ParseError> {
    let span = Span::from(pair.as_span());
    let value = next_pair(&mut pair.into_inner(), span.clone(), "starred value")?;
    Ok(Expr::new(
        ExprKind::Starred {
            value: Box::new(parse_expression(value)?),
            double,
        },
        span,
    ))
}

/// An item of a list, tuple or set display.
fn parse_element(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    match pair.as_rule() {
        Rule::starred => parse_starred(pair, false),
        _ => parse_expression(pair),
    }
}

fn parse_dict_entry(pair: Pair<Rule>) -> Result<(Expr, Expr), ParseError> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let key = parse_expression(next_pair(&mut inner, span.clone(), "dict key")?)?;
    let value = parse_expression(next_pair(&mut inner, span, "dict value")?)?;
    Ok((key, value))
}

fn parse_comp_for(pair: Pair<Rule>) -> Result<ComprehensionFor, ParseError> {
    let span = Span::from(pair.as_span());
    let mut targets = Vec::new();
    let mut iter = None;
    let mut conditions = Vec::new();

    for part in significant(pair) {
        match part.as_rule() {
            Rule::comp_target => {
                targets = part.into_inner().map(|p| p.as_str().to_string()).collect();
            }
            Rule::comp_if => {
                let if_span = Span::from(part.as_span());
                let cond = significant(part)
                    .next()
                    .ok_or_else(|| missing(if_span, "condition"))?;
                conditions.push(parse_expression(cond)?);
            }
            _ => iter = Some(parse_expression(part)?),
        }
    }

    Ok(ComprehensionFor {
        targets,
        iter: iter.ok_or_else(|| missing(span, "iterable"))?,
        conditions,
    })
}

fn parse_comprehension(pair: Pair<Rule>, kind: ComprehensionKind) -> Result<ExprKind, ParseError> {
    let span = Span::from(pair.as_span());
    let mut inner = pair.into_inner();
    let head = next_pair(&mut inner, span, "comprehension element")?;

    let (element, value) = match kind {
        ComprehensionKind::Dict => {
            let (key, value) = parse_dict_entry(head)?;
            (key, Some(Box::new(value)))
        }
        _ => (parse_expression(head)?, None),
    };
    let clauses = inner.map(parse_comp_for).collect::<Result<_, _>>()?;

    Ok(ExprKind::Comprehension {
        kind,
        element: Box::new(element),
        value,
        clauses,
    })
}

fn parse_primary(pair: Pair<Rule>) -> Result<Expr, ParseError> {
    let span = Span::from(pair.as_span());
    let kind = match pair.as_rule() {
        Rule::integer => ExprKind::Literal(Literal::Int(parse_integer(&pair)?)),
        Rule::float => {
            let text = pair.as_str().replace('_', "");
            let value = text.parse::<f64>().map_err(|_| {
                ParseError::new(
                    ParseErrorKind::InvalidNumber {
                        text: pair.as_str().to_string(),
                    },
                    span.clone(),
                )
            })?;
            ExprKind::Literal(Literal::Float(value))
        }
        Rule::string => ExprKind::Literal(Literal::Str(unescape(&pair)?)),
        Rule::boolean => ExprKind::Literal(Literal::Bool(pair.as_str() == "True")),
        Rule::none => ExprKind::Literal(Literal::None),
        Rule::ident => ExprKind::Name(pair.as_str().to_string()),
        Rule::grouped => {
            let inner = next_pair(&mut pair.into_inner(), span.clone(), "expression")?;
            ExprKind::Paren(Box::new(parse_expression(inner)?))
        }
        Rule::tuple => {
            ExprKind::Tuple(pair.into_inner().map(parse_element).collect::<Result<_, _>>()?)
        }
        Rule::list => {
            ExprKind::List(pair.into_inner().map(parse_element).collect::<Result<_, _>>()?)
        }
        Rule::set => ExprKind::Set(pair.into_inner().map(parse_element).collect::<Result<_, _>>()?),
        Rule::dict => ExprKind::Dict(
            pair.into_inner()
                .map(parse_dict_entry)
                .collect::<Result<_, _>>()?,
        ),
        Rule::generator => parse_comprehension(pair, ComprehensionKind::Generator)?,
        Rule::list_comp => parse_comprehension(pair, ComprehensionKind::List)?,
        Rule::set_comp => parse_comprehension(pair, ComprehensionKind::Set)?,
        Rule::dict_comp => parse_comprehension(pair, ComprehensionKind::Dict)?,
        rule => {
            return Err(ParseError::new(
                ParseErrorKind::Other {
                    message: format!("Unhandled rule: {:?}", rule),
                },
                span,
            ));
        }
    };
    Ok(Expr::new(kind, span))
}

fn parse_integer(pair: &Pair<Rule>) -> Result<i64, ParseError> {
    let text = pair.as_str().replace('_', "");
    let (digits, radix) = match text.get(..2) {
        Some("0x" | "0X") => (&text[2..], 16),
        Some("0o" | "0O") => (&text[2..], 8),
        Some("0b" | "0B") => (&text[2..], 2),
        _ => (text.as_str(), 10),
    };
    i64::from_str_radix(digits, radix).map_err(|_| {
        ParseError::new(
            ParseErrorKind::InvalidNumber {
                text: pair.as_str().to_string(),
            },
            pair.as_span().into(),
        )
    })
}

/// Decodes the escapes of a quoted string literal.
fn unescape(pair: &Pair<Rule>) -> Result<String, ParseError> {
    let raw = pair.as_str();
    let base = pair.as_span().start() + 1;
    let body = &raw[1..raw.len() - 1];

    let mut out = String::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((pos, c)) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some((_, escaped)) = chars.next() else {
            out.push('\\');
            break;
        };
        match escaped {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            '0' => out.push('\0'),
            'a' => out.push('\x07'),
            'b' => out.push('\x08'),
            'f' => out.push('\x0c'),
            'v' => out.push('\x0b'),
            '\\' | '\'' | '"' => out.push(escaped),
            '\n' => {}
            'x' | 'u' | 'U' => {
                let width = match escaped {
                    'x' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let mut hex = String::with_capacity(width);
                while hex.len() < width {
                    match chars.peek() {
                        Some(&(_, h)) if h.is_ascii_hexdigit() => {
                            hex.push(h);
                            chars.next();
                        }
                        _ => break,
                    }
                }
                let end = base + pos + 2 + hex.len();
                let decoded = (hex.len() == width)
                    .then(|| u32::from_str_radix(&hex, 16).ok())
                    .flatten()
                    .and_then(char::from_u32);
                match decoded {
                    Some(ch) => out.push(ch),
                    None => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidEscape {
                                text: format!("\\{}{}", escaped, hex),
                            },
                            Span::new(base + pos, end),
                        ));
                    }
                }
            }
            other => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    Ok(out)
}
