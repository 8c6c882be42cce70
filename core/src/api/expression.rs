//! Compiled expressions.

use tracing::debug;

use super::{CompileOptions, Error, ExecutionOptions};
use crate::evaluator::{self, Variables};
use crate::namespace::{Binding, Namespace, check_calls, collect_names};
use crate::parser::{self, Expr, ExprKind};
use crate::validator;
use crate::values::Value;

/// A parsed, validated expression bound to a namespace.
///
/// Compiling does all the static work once: the text is parsed, checked
/// against the permitted subset and every call is matched to the namespace.
/// The result can then be evaluated any number of times, from any number
/// of threads, with different variables.
///
/// # Example
///
/// ```
/// use corral_core::api::{compile, evaluate};
/// use corral_core::evaluator::Variables;
/// use corral_core::namespace::{Module, Namespace};
/// use corral_core::values::Value;
///
/// let mut module = Module::new("host");
/// module.constant("rate", 0.5).export(["rate"]);
/// let namespace = Namespace::build(&module).unwrap();
///
/// let expr = compile("price * rate", &namespace).unwrap();
/// assert_eq!(expr.free_variables(), ["price"]);
///
/// let vars = Variables::new().with("price", 10);
/// assert_eq!(evaluate(&expr, &vars).unwrap(), Value::Float(5.0));
/// ```
#[derive(Debug, Clone)]
pub struct CompiledExpression<'ns> {
    source: String,
    expr: Expr,
    namespace: &'ns Namespace,
    referenced: Vec<String>,
    predefined: Vec<String>,
    free: Vec<String>,
}

impl<'ns> CompiledExpression<'ns> {
    /// Parses, validates and binds `text` to `namespace`.
    pub fn compile(
        text: &str,
        namespace: &'ns Namespace,
        options: &CompileOptions,
    ) -> Result<Self, Error> {
        let expr = parser::parse_with_max_depth(text, options.max_depth)?;
        validator::validate(&expr)?;
        check_calls(&expr, namespace)?;

        let mut referenced = collect_names(&expr);
        for name in implied_names(&expr, namespace) {
            if !referenced.contains(&name) {
                referenced.push(name);
            }
        }
        let (predefined, free): (Vec<String>, Vec<String>) = referenced
            .iter()
            .cloned()
            .partition(|name| namespace.contains(name));

        debug!(
            source = text,
            predefined = predefined.len(),
            free = ?free,
            "expression compiled"
        );
        Ok(Self {
            source: text.to_string(),
            expr,
            namespace,
            referenced,
            predefined,
            free,
        })
    }

    /// Evaluates the expression with default execution options.
    pub fn evaluate(&self, variables: &Variables) -> Result<Value, Error> {
        self.evaluate_with_options(variables, &ExecutionOptions::default())
    }

    pub fn evaluate_with_options(
        &self,
        variables: &Variables,
        options: &ExecutionOptions,
    ) -> Result<Value, Error> {
        Ok(evaluator::eval(
            &self.expr,
            self.namespace,
            variables,
            options,
        )?)
    }

    /// Names the caller must supply as variables.
    pub fn free_variables(&self) -> &[String] {
        &self.free
    }

    /// Names supplied by the namespace.
    pub fn predefined_names(&self) -> &[String] {
        &self.predefined
    }

    /// Every name the expression depends on, in order of first appearance.
    ///
    /// Implied parameters of called functions come after the names written
    /// in the text.
    pub fn referenced_names(&self) -> &[String] {
        &self.referenced
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn namespace(&self) -> &'ns Namespace {
        self.namespace
    }
}

/// Implied parameter names of every namespace function called in `expr`.
fn implied_names(expr: &Expr, namespace: &Namespace) -> Vec<String> {
    let mut names = Vec::new();
    let mut stack = vec![expr];
    while let Some(expr) = stack.pop() {
        if let ExprKind::Call { callee, .. } = &expr.kind {
            if let ExprKind::Name(name) = &callee.peel_parens().kind {
                if let Some(Binding::Function(function)) = namespace.lookup(name) {
                    names.extend(function.signature().implied_params().map(str::to_string));
                }
            }
        }
        stack.extend(expr.children().into_iter().rev());
    }
    names
}

/// Compiles `text` against `namespace` with default options.
pub fn compile<'ns>(text: &str, namespace: &'ns Namespace) -> Result<CompiledExpression<'ns>, Error> {
    namespace.compile(text)
}

/// Evaluates `expression` with `variables` and default options.
pub fn evaluate(expression: &CompiledExpression<'_>, variables: &Variables) -> Result<Value, Error> {
    expression.evaluate(variables)
}
