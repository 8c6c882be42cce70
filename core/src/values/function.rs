//! Native functions and their call signatures.
//!
//! A [`NativeFunction`] is a Rust closure registered by the host. Its
//! [`Signature`] describes which arguments it takes so that calls can be
//! checked at compile time (keyword names) and bound at run time
//! (positional, keyword, implied and variadic arguments).

use core::fmt;
use std::sync::Arc;

use super::{Value, ValueError};

/// Error raised by a native function. It is surfaced to the caller unchanged.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct BackendError {
    pub message: String,
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl BackendError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<ValueError> for BackendError {
    fn from(err: ValueError) -> Self {
        BackendError::new(err.to_string())
    }
}

/// Type alias for the closures that back native functions.
///
/// Arguments arrive already bound to the signature: one value per declared
/// parameter (unfilled optionals are `None`), then any variadic extras.
pub type NativeFn = dyn Fn(&[Value]) -> Result<Value, BackendError> + Send + Sync;

#[derive(Clone)]
pub struct NativeFunction {
    name: String,
    signature: Signature,
    func: Arc<NativeFn>,
}

impl NativeFunction {
    pub fn new<F>(name: impl Into<String>, signature: Signature, func: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, BackendError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            signature,
            func: Arc::new(func),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    pub fn call(&self, args: &[Value]) -> Result<Value, BackendError> {
        (self.func)(args)
    }
}

impl fmt::Debug for NativeFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeFunction")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    Required,
    /// Filled with `None` when the caller omits it.
    Optional,
    /// Never passed by the caller; looked up by name in the variables and
    /// namespace at call time.
    Implied,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: String,
    pub kind: ParamKind,
}

/// Number of positional arguments a function accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Arity {
    pub min: usize,
    pub max: Option<usize>,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{}", max),
            Some(max) => write!(f, "{} to {}", self.min, max),
            None => write!(f, "at least {}", self.min),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    #[error("takes {expected} positional arguments but {found} were given")]
    TooMany { expected: Arity, found: usize },

    #[error("missing required argument '{name}'")]
    Missing { name: String },

    #[error("got an unexpected keyword argument '{name}'")]
    UnexpectedKeyword { name: String },

    #[error("got multiple values for argument '{name}'")]
    DuplicateArgument { name: String },
}

/// Parameters of a native function, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    params: Vec<Param>,
    positional_only: usize,
    variadic: bool,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// `n` required parameters named `arg0..argN`, all positional-only.
    pub fn positional(n: usize) -> Self {
        let mut sig = Self::new();
        for i in 0..n {
            sig = sig.required(format!("arg{}", i));
        }
        sig.positional_only(n)
    }

    pub fn required(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::Required,
        });
        self
    }

    pub fn optional(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::Optional,
        });
        self
    }

    pub fn implied(mut self, name: impl Into<String>) -> Self {
        self.params.push(Param {
            name: name.into(),
            kind: ParamKind::Implied,
        });
        self
    }

    /// The first `n` parameters can only be passed positionally.
    pub fn positional_only(mut self, n: usize) -> Self {
        self.positional_only = n;
        self
    }

    /// Extra positional arguments are appended after the declared ones.
    pub fn variadic(mut self) -> Self {
        self.variadic = true;
        self
    }

    pub fn params(&self) -> &[Param] {
        &self.params
    }

    pub fn is_variadic(&self) -> bool {
        self.variadic
    }

    pub fn implied_params(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .filter(|p| p.kind == ParamKind::Implied)
            .map(|p| p.name.as_str())
    }

    pub fn arity(&self) -> Arity {
        let explicit = self.params.iter().filter(|p| p.kind != ParamKind::Implied);
        let min = explicit
            .clone()
            .filter(|p| p.kind == ParamKind::Required)
            .count();
        let max = (!self.variadic).then(|| explicit.count());
        Arity { min, max }
    }

    /// Whether `name` may be passed as `f(name=...)`.
    pub fn accepts_keyword(&self, name: &str) -> bool {
        !name.starts_with('_')
            && self
                .params
                .iter()
                .enumerate()
                .any(|(i, p)| p.name == name && i >= self.positional_only && p.kind != ParamKind::Implied)
    }

    /// Matches call arguments to parameters.
    ///
    /// `implied` holds one value per implied parameter, in declaration order.
    pub fn bind(
        &self,
        positional: Vec<Value>,
        keywords: Vec<(String, Value)>,
        implied: Vec<Value>,
    ) -> Result<Vec<Value>, BindError> {
        let mut slots: Vec<Option<Value>> = vec![None; self.params.len()];
        let mut extra = Vec::new();

        let explicit: Vec<usize> = (0..self.params.len())
            .filter(|&i| self.params[i].kind != ParamKind::Implied)
            .collect();
        let found = positional.len();
        for (n, value) in positional.into_iter().enumerate() {
            match explicit.get(n) {
                Some(&i) => slots[i] = Some(value),
                None if self.variadic => extra.push(value),
                None => {
                    return Err(BindError::TooMany {
                        expected: self.arity(),
                        found,
                    });
                }
            }
        }

        for (name, value) in keywords {
            if !self.accepts_keyword(&name) {
                return Err(BindError::UnexpectedKeyword { name });
            }
            let Some(i) = self.params.iter().position(|p| p.name == name) else {
                return Err(BindError::UnexpectedKeyword { name });
            };
            if slots[i].is_some() {
                return Err(BindError::DuplicateArgument { name });
            }
            slots[i] = Some(value);
        }

        let mut implied = implied.into_iter();
        let mut args = Vec::with_capacity(slots.len() + extra.len());
        for (param, slot) in self.params.iter().zip(slots) {
            let value = match (param.kind, slot) {
                (ParamKind::Implied, _) => implied.next(),
                (_, Some(value)) => Some(value),
                (ParamKind::Optional, None) => Some(Value::None),
                (ParamKind::Required, None) => None,
            };
            match value {
                Some(value) => args.push(value),
                None => {
                    return Err(BindError::Missing {
                        name: param.name.clone(),
                    });
                }
            }
        }
        args.extend(extra);
        Ok(args)
    }
}
