use tracing::trace;

use crate::parser::{Argument, AssignOp, Expr, ExprKind};
use crate::validator::{Construct, Rejection};

/// Checks that every node of `expr` belongs to the permitted subset.
///
/// Nodes are visited in pre-order, left to right, and the first offending
/// node is reported. No namespace is consulted.
pub fn validate(expr: &Expr) -> Result<(), Rejection> {
    check(expr).inspect_err(|rejection| {
        trace!(reason = %rejection.reason, span = %rejection.span, "expression rejected");
    })
}

fn check_all<'a>(exprs: impl IntoIterator<Item = &'a Expr>) -> Result<(), Rejection> {
    exprs.into_iter().try_for_each(check)
}

fn forbid(construct: Construct, expr: &Expr) -> Result<(), Rejection> {
    Err(Rejection::forbidden(construct, expr.span.clone()))
}

fn check(expr: &Expr) -> Result<(), Rejection> {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Name(_) => Ok(()),
        ExprKind::Unary { operand, .. } => check(operand),
        ExprKind::Binary { left, right, .. } | ExprKind::BoolOp { left, right, .. } => {
            check(left)?;
            check(right)
        }
        ExprKind::Compare { left, comparisons } => {
            check(left)?;
            check_all(comparisons.iter().map(|(_, e)| e))
        }
        ExprKind::IfElse {
            cond,
            then_branch,
            else_branch,
        } => {
            check(then_branch)?;
            check(cond)?;
            check(else_branch)
        }
        ExprKind::Call { callee, args } => {
            check(callee)?;
            if !matches!(callee.peel_parens().kind, ExprKind::Name(_)) {
                return forbid(Construct::IndirectCall, callee);
            }
            for arg in args {
                match arg {
                    Argument::Positional(value) => check(value)?,
                    Argument::Keyword { value, .. } => check(value)?,
                }
            }
            Ok(())
        }
        ExprKind::List(items) | ExprKind::Tuple(items) | ExprKind::Set(items) => check_all(items),
        ExprKind::Dict(entries) => check_all(entries.iter().flat_map(|(k, v)| [k, v])),
        ExprKind::Paren(inner) => check(inner),

        ExprKind::Attribute { .. } => forbid(Construct::AttributeAccess, expr),
        ExprKind::Subscript { .. } => forbid(Construct::Subscript, expr),
        ExprKind::Slice { .. } => forbid(Construct::Slice, expr),
        ExprKind::Lambda { .. } => forbid(Construct::Lambda, expr),
        ExprKind::Comprehension { kind, .. } => forbid(Construct::Comprehension(*kind), expr),
        ExprKind::Starred { double: false, .. } => forbid(Construct::Starred, expr),
        ExprKind::Starred { double: true, .. } => forbid(Construct::DoubleStarred, expr),
        ExprKind::NamedExpr { .. } => forbid(Construct::NamedExpression, expr),
        ExprKind::Assign {
            op: AssignOp::Assign,
            ..
        } => forbid(Construct::Assignment, expr),
        ExprKind::Assign { .. } => forbid(Construct::AugmentedAssignment, expr),
        ExprKind::Statement { keyword } => forbid(Construct::Statement(keyword.clone()), expr),
    }
}
