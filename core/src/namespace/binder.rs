//! Compile-time checks that tie a validated expression to a namespace.

use hashbrown::HashSet;
use tracing::trace;

use crate::namespace::{Binding, Namespace};
use crate::parser::{Argument, Expr, ExprKind};
use crate::validator::{RejectReason, Rejection};

/// Every call must name a binding in `namespace`, and every keyword argument
/// must be accepted by the callee's signature.
///
/// Variables never hold callables, so a callee missing from the namespace
/// can only ever fail; it is reported here instead of at evaluation time.
pub(crate) fn check_calls(expr: &Expr, namespace: &Namespace) -> Result<(), Rejection> {
    if let ExprKind::Call { callee, args } = &expr.kind {
        check_call(callee, args, namespace)?;
    }
    expr.children()
        .into_iter()
        .try_for_each(|child| check_calls(child, namespace))
}

fn check_call(callee: &Expr, args: &[Argument], namespace: &Namespace) -> Result<(), Rejection> {
    let ExprKind::Name(name) = &callee.peel_parens().kind else {
        return Ok(());
    };

    let function = match namespace.lookup(name) {
        None => {
            trace!(name = %name, "call to unknown function");
            return Err(Rejection::new(
                RejectReason::UnknownFunction { name: name.clone() },
                callee.span.clone(),
            ));
        }
        Some(Binding::Value(_)) => return Ok(()),
        Some(Binding::Function(function)) => function,
    };

    let mut seen = HashSet::new();
    for arg in args {
        let Argument::Keyword { name: keyword, span, .. } = arg else {
            continue;
        };
        if !seen.insert(keyword.as_str()) {
            return Err(Rejection::new(
                RejectReason::DuplicateKeyword {
                    function: name.clone(),
                    keyword: keyword.clone(),
                },
                span.clone(),
            ));
        }
        if !function.signature().accepts_keyword(keyword) {
            return Err(Rejection::new(
                RejectReason::UnknownKeyword {
                    function: name.clone(),
                    keyword: keyword.clone(),
                },
                span.clone(),
            ));
        }
    }
    Ok(())
}

/// Names referenced by `expr`, in order of first appearance.
pub(crate) fn collect_names(expr: &Expr) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut stack = vec![expr];
    while let Some(expr) = stack.pop() {
        if let ExprKind::Name(name) = &expr.kind {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        stack.extend(expr.children().into_iter().rev());
    }
    names
}
