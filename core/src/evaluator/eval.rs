//! Core evaluation logic.

use tracing::trace;

use crate::{
    api::ExecutionOptions,
    evaluator::{EvalError, Variables, operators::OpError},
    namespace::{Binding, Namespace},
    parser::{Argument, BoolOp, Expr, ExprKind, Literal, Span},
    validator::{Construct, RejectReason, validate},
    values::{BindError, NativeFunction, Value, ValueError},
};

use super::operators;

/// Evaluator for validated expressions.
pub(crate) struct Evaluator<'a> {
    options: &'a ExecutionOptions,
    namespace: &'a Namespace,
    variables: &'a Variables,
    depth: usize,
    steps: usize,
}

impl<'a> Evaluator<'a> {
    pub(crate) fn new(
        namespace: &'a Namespace,
        variables: &'a Variables,
        options: &'a ExecutionOptions,
    ) -> Self {
        Self {
            options,
            namespace,
            variables,
            depth: 0,
            steps: 0,
        }
    }

    pub(crate) fn eval_expr(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        if self.depth >= self.options.max_depth {
            return Err(EvalError::StackOverflow {
                depth: self.depth,
                max_depth: self.options.max_depth,
                span: expr.span.clone(),
            });
        }
        self.steps += 1;
        if let Some(limit) = self.options.max_steps {
            if self.steps > limit {
                return Err(EvalError::StepLimit {
                    limit,
                    span: expr.span.clone(),
                });
            }
        }

        self.depth += 1;
        let result = self.eval_expr_inner(expr);
        self.depth -= 1;

        result
    }

    fn eval_expr_inner(&mut self, expr: &Expr) -> Result<Value, EvalError> {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::None => Value::None,
                Literal::Bool(b) => Value::Bool(*b),
                Literal::Int(i) => Value::Int(*i),
                Literal::Float(f) => Value::Float(*f),
                Literal::Str(s) => Value::Str(s.clone()),
            }),

            ExprKind::Name(name) => self.resolve(name, &expr.span),

            ExprKind::Paren(inner) => self.eval_expr(inner),

            ExprKind::Unary { op, operand } => {
                let value = self.eval_expr(operand)?;
                operators::unary(*op, value).map_err(|e| op_error(e, &expr.span))
            }

            ExprKind::Binary { op, left, right } => {
                let left = self.eval_expr(left)?;
                let right = self.eval_expr(right)?;
                operators::binary(*op, left, right).map_err(|e| op_error(e, &expr.span))
            }

            ExprKind::BoolOp { op, left, right } => {
                // The deciding operand is returned as is, not converted to a bool.
                let left = self.eval_expr(left)?;
                match (op, left.is_truthy()) {
                    (BoolOp::And, false) | (BoolOp::Or, true) => Ok(left),
                    _ => self.eval_expr(right),
                }
            }

            ExprKind::Compare { left, comparisons } => {
                let mut current = self.eval_expr(left)?;
                for (op, right) in comparisons {
                    let next = self.eval_expr(right)?;
                    let holds = operators::compare(*op, &current, &next)
                        .map_err(|e| op_error(e, &right.span))?;
                    if !holds {
                        return Ok(Value::Bool(false));
                    }
                    current = next;
                }
                Ok(Value::Bool(true))
            }

            ExprKind::IfElse {
                cond,
                then_branch,
                else_branch,
            } => {
                if self.eval_expr(cond)?.is_truthy() {
                    self.eval_expr(then_branch)
                } else {
                    self.eval_expr(else_branch)
                }
            }

            ExprKind::Call { callee, args } => self.call(expr, callee, args),

            ExprKind::List(items) => Ok(Value::List(self.eval_all(items)?)),
            ExprKind::Tuple(items) => Ok(Value::Tuple(self.eval_all(items)?)),
            ExprKind::Set(items) => {
                let items = self.eval_all(items)?;
                Value::set(items).map_err(|e| value_error(e, &expr.span))
            }
            ExprKind::Dict(entries) => {
                let mut pairs = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = self.eval_expr(key)?;
                    let value = self.eval_expr(value)?;
                    pairs.push((key, value));
                }
                Value::dict(pairs).map_err(|e| value_error(e, &expr.span))
            }

            ExprKind::Attribute { .. }
            | ExprKind::Subscript { .. }
            | ExprKind::Slice { .. }
            | ExprKind::Lambda { .. }
            | ExprKind::Comprehension { .. }
            | ExprKind::Starred { .. }
            | ExprKind::NamedExpr { .. }
            | ExprKind::Assign { .. }
            | ExprKind::Statement { .. } => Err(unsupported(expr)),
        }
    }

    fn eval_all(&mut self, items: &[Expr]) -> Result<Vec<Value>, EvalError> {
        items.iter().map(|item| self.eval_expr(item)).collect()
    }

    /// Looks `name` up in the variables, then in the namespace.
    fn resolve(&self, name: &str, span: &Span) -> Result<Value, EvalError> {
        match (self.variables.get(name), self.namespace.lookup(name)) {
            (Some(_), Some(_)) => Err(EvalError::AmbiguousName {
                name: name.to_string(),
                span: span.clone(),
            }),
            (Some(value), None) | (None, Some(Binding::Value(value))) => Ok(value.clone()),
            (None, Some(Binding::Function(_))) => Err(EvalError::TypeMismatch {
                message: format!("function '{}' can only be called", name),
                span: span.clone(),
            }),
            (None, None) => Err(EvalError::UnboundName {
                name: name.to_string(),
                span: span.clone(),
            }),
        }
    }

    fn lookup_function(
        &self,
        name: &str,
        span: &Span,
    ) -> Result<&'a NativeFunction, EvalError> {
        let span = span.clone();
        match (self.variables.get(name), self.namespace.lookup(name)) {
            (Some(_), Some(_)) => Err(EvalError::AmbiguousName {
                name: name.to_string(),
                span,
            }),
            (_, Some(Binding::Function(function))) => Ok(function),
            (Some(value), None) | (None, Some(Binding::Value(value))) => {
                Err(EvalError::TypeMismatch {
                    message: format!("'{}' object is not callable", value.type_name()),
                    span,
                })
            }
            (None, None) => Err(EvalError::UnboundName {
                name: name.to_string(),
                span,
            }),
        }
    }

    fn call(&mut self, expr: &Expr, callee: &Expr, args: &[Argument]) -> Result<Value, EvalError> {
        let callee = callee.peel_parens();
        let ExprKind::Name(name) = &callee.kind else {
            return Err(EvalError::Unsupported {
                construct: Construct::IndirectCall.to_string(),
                span: callee.span.clone(),
            });
        };
        let function = self.lookup_function(name, &callee.span)?;

        let mut positional = Vec::with_capacity(args.len());
        let mut keywords = Vec::new();
        for arg in args {
            match arg {
                Argument::Positional(value) => positional.push(self.eval_expr(value)?),
                Argument::Keyword { name, value, .. } => {
                    keywords.push((name.clone(), self.eval_expr(value)?));
                }
            }
        }
        let found = positional.len() + keywords.len();

        let implied = function
            .signature()
            .implied_params()
            .map(|param| self.resolve(param, &expr.span))
            .collect::<Result<Vec<_>, _>>()?;

        let bound = function
            .signature()
            .bind(positional, keywords, implied)
            .map_err(|error| match error {
                BindError::TooMany { expected, found } => EvalError::ArityMismatch {
                    function: name.clone(),
                    expected,
                    found,
                    span: expr.span.clone(),
                },
                BindError::Missing { .. } => EvalError::ArityMismatch {
                    function: name.clone(),
                    expected: function.signature().arity(),
                    found,
                    span: expr.span.clone(),
                },
                other => EvalError::TypeMismatch {
                    message: format!("{}() {}", name, other),
                    span: expr.span.clone(),
                },
            })?;

        trace!(function = %name, args = bound.len(), "calling native function");
        function.call(&bound).map_err(|error| EvalError::Backend {
            function: name.clone(),
            error,
            span: expr.span.clone(),
        })
    }
}

fn op_error(error: OpError, span: &Span) -> EvalError {
    let span = span.clone();
    match error {
        OpError::DivisionByZero => EvalError::DivisionByZero { span },
        OpError::TypeMismatch(message) => EvalError::TypeMismatch { message, span },
        OpError::Arithmetic(message) => EvalError::Arithmetic { message, span },
    }
}

fn value_error(error: ValueError, span: &Span) -> EvalError {
    EvalError::TypeMismatch {
        message: error.to_string(),
        span: span.clone(),
    }
}

fn unsupported(expr: &Expr) -> EvalError {
    let construct = match validate(expr) {
        Err(rejection) => match rejection.reason {
            RejectReason::Forbidden(construct) => construct.to_string(),
            other => other.to_string(),
        },
        Ok(()) => "expression".to_string(),
    };
    EvalError::Unsupported {
        construct,
        span: expr.span.clone(),
    }
}
