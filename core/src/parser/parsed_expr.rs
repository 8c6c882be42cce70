use core::fmt;

use crate::parser::{AssignOp, BinaryOp, BoolOp, CompareOp, ComprehensionKind, Span, UnaryOp};

/// A syntax node together with the source range it was parsed from.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(String),
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    BoolOp {
        op: BoolOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `a < b <= c` is a single node holding every link of the chain.
    Compare {
        left: Box<Expr>,
        comparisons: Vec<(CompareOp, Expr)>,
    },
    IfElse {
        cond: Box<Expr>,
        then_branch: Box<Expr>,
        else_branch: Box<Expr>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Argument>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<(Expr, Expr)>),
    Paren(Box<Expr>),

    // Shapes below are recognised by the parser but never accepted by the
    // validator.
    Attribute {
        value: Box<Expr>,
        attr: String,
    },
    Subscript {
        value: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    Lambda {
        params: Vec<String>,
        body: Box<Expr>,
    },
    Comprehension {
        kind: ComprehensionKind,
        element: Box<Expr>,
        /// Value part of a dict comprehension.
        value: Option<Box<Expr>>,
        clauses: Vec<ComprehensionFor>,
    },
    Starred {
        value: Box<Expr>,
        double: bool,
    },
    NamedExpr {
        target: Box<Expr>,
        value: Box<Expr>,
    },
    Assign {
        target: Box<Expr>,
        op: AssignOp,
        value: Box<Expr>,
    },
    Statement {
        keyword: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Argument {
    Positional(Expr),
    Keyword { name: String, value: Expr, span: Span },
}

impl Argument {
    pub fn value(&self) -> &Expr {
        match self {
            Argument::Positional(expr) => expr,
            Argument::Keyword { value, .. } => value,
        }
    }
}

/// One `for targets in iter if cond...` clause of a comprehension.
#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensionFor {
    pub targets: Vec<String>,
    pub iter: Expr,
    pub conditions: Vec<Expr>,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Strips any number of enclosing parentheses.
    pub fn peel_parens(&self) -> &Expr {
        let mut expr = self;
        while let ExprKind::Paren(inner) = &expr.kind {
            expr = inner;
        }
        expr
    }

    /// Direct sub-expressions, left to right.
    pub fn children(&self) -> Vec<&Expr> {
        match &self.kind {
            ExprKind::Literal(_) | ExprKind::Name(_) | ExprKind::Statement { .. } => vec![],
            ExprKind::Unary { operand, .. } => vec![operand],
            ExprKind::Binary { left, right, .. } | ExprKind::BoolOp { left, right, .. } => {
                vec![left, right]
            }
            ExprKind::Compare { left, comparisons } => {
                let mut out: Vec<&Expr> = vec![left];
                out.extend(comparisons.iter().map(|(_, e)| e));
                out
            }
            ExprKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => vec![then_branch, cond, else_branch],
            ExprKind::Call { callee, args } => {
                let mut out: Vec<&Expr> = vec![callee];
                out.extend(args.iter().map(Argument::value));
                out
            }
            ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => {
                items.iter().collect()
            }
            ExprKind::Dict(entries) => entries.iter().flat_map(|(k, v)| [k, v]).collect(),
            ExprKind::Paren(inner) => vec![inner],
            ExprKind::Attribute { value, .. } => vec![value],
            ExprKind::Subscript { value, index } => vec![value, index],
            ExprKind::Slice { lower, upper, step } => [lower, upper, step]
                .into_iter()
                .flatten()
                .map(|e| e.as_ref())
                .collect(),
            ExprKind::Lambda { body, .. } => vec![body],
            ExprKind::Comprehension {
                element,
                value,
                clauses,
                ..
            } => {
                let mut out: Vec<&Expr> = vec![element];
                out.extend(value.as_deref());
                for clause in clauses {
                    out.push(&clause.iter);
                    out.extend(clause.conditions.iter());
                }
                out
            }
            ExprKind::Starred { value, .. } => vec![value],
            ExprKind::NamedExpr { target, value } | ExprKind::Assign { target, value, .. } => {
                vec![target, value]
            }
        }
    }

    /// Height of the tree, computed without recursion.
    pub fn depth(&self) -> usize {
        let mut max = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((expr, depth)) = stack.pop() {
            max = max.max(depth);
            stack.extend(expr.children().into_iter().map(|c| (c, depth + 1)));
        }
        max
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{i}"),
            Literal::Float(x) => write!(f, "{x:?}"),
            Literal::Str(s) => write!(f, "{s:?}"),
        }
    }
}

fn write_list(f: &mut fmt::Formatter<'_>, items: &[Expr]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Fully parenthesised rendering. Grouping parentheses from the source are
/// dropped, so two trees print the same exactly when they associate the same.
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ExprKind::Literal(lit) => write!(f, "{lit}"),
            ExprKind::Name(name) => write!(f, "{name}"),
            ExprKind::Unary { op, operand } => match op {
                UnaryOp::Not => write!(f, "(not {operand})"),
                _ => write!(f, "({}{operand})", op.symbol()),
            },
            ExprKind::Binary { op, left, right } => {
                write!(f, "({left} {} {right})", op.symbol())
            }
            ExprKind::BoolOp { op, left, right } => {
                let kw = match op {
                    BoolOp::And => "and",
                    BoolOp::Or => "or",
                };
                write!(f, "({left} {kw} {right})")
            }
            ExprKind::Compare { left, comparisons } => {
                write!(f, "({left}")?;
                for (op, right) in comparisons {
                    write!(f, " {} {right}", op.symbol())?;
                }
                write!(f, ")")
            }
            ExprKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => write!(f, "({then_branch} if {cond} else {else_branch})"),
            ExprKind::Call { callee, args } => {
                write!(f, "{callee}(")?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    match arg {
                        Argument::Positional(value) => write!(f, "{value}")?,
                        Argument::Keyword { name, value, .. } => write!(f, "{name}={value}")?,
                    }
                }
                write!(f, ")")
            }
            ExprKind::List(items) => {
                write!(f, "[")?;
                write_list(f, items)?;
                write!(f, "]")
            }
            ExprKind::Tuple(items) => {
                write!(f, "(")?;
                write_list(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            ExprKind::Set(items) => {
                write!(f, "{{")?;
                write_list(f, items)?;
                write!(f, "}}")
            }
            ExprKind::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            ExprKind::Paren(inner) => write!(f, "{inner}"),
            ExprKind::Attribute { value, attr } => write!(f, "{value}.{attr}"),
            ExprKind::Subscript { value, index } => write!(f, "{value}[{index}]"),
            ExprKind::Slice { lower, upper, step } => {
                if let Some(lower) = lower {
                    write!(f, "{lower}")?;
                }
                write!(f, ":")?;
                if let Some(upper) = upper {
                    write!(f, "{upper}")?;
                }
                if let Some(step) = step {
                    write!(f, ":{step}")?;
                }
                Ok(())
            }
            ExprKind::Lambda { params, body } => {
                write!(f, "(lambda {}: {body})", params.join(", "))
            }
            ExprKind::Comprehension {
                kind,
                element,
                value,
                clauses,
            } => {
                let (open, close) = match kind {
                    ComprehensionKind::List => ("[", "]"),
                    ComprehensionKind::Set | ComprehensionKind::Dict => ("{", "}"),
                    ComprehensionKind::Generator => ("(", ")"),
                };
                write!(f, "{open}{element}")?;
                if let Some(value) = value {
                    write!(f, ": {value}")?;
                }
                for clause in clauses {
                    write!(f, " for {} in {}", clause.targets.join(", "), clause.iter)?;
                    for cond in &clause.conditions {
                        write!(f, " if {cond}")?;
                    }
                }
                write!(f, "{close}")
            }
            ExprKind::Starred { value, double } => {
                write!(f, "{}{value}", if *double { "**" } else { "*" })
            }
            ExprKind::NamedExpr { target, value } => write!(f, "({target} := {value})"),
            ExprKind::Assign { target, op, value } => {
                let op = match op {
                    AssignOp::Assign => "=".to_string(),
                    AssignOp::Augmented(op) => format!("{}=", op.symbol()),
                    AssignOp::MatMul => "@=".to_string(),
                };
                write!(f, "{target} {op} {value}")
            }
            ExprKind::Statement { keyword } => write!(f, "{keyword} ..."),
        }
    }
}
