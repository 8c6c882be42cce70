//! Backing sources: where a namespace gets its exported bindings from.

use hashbrown::HashMap;

use crate::values::{NativeFunction, Value};

/// What a namespace name refers to.
#[derive(Debug, Clone)]
pub enum Binding {
    Value(Value),
    Function(NativeFunction),
}

impl Binding {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Binding::Value(value) => Some(value),
            Binding::Function(_) => None,
        }
    }

    pub fn as_function(&self) -> Option<&NativeFunction> {
        match self {
            Binding::Function(function) => Some(function),
            Binding::Value(_) => None,
        }
    }
}

impl From<Value> for Binding {
    fn from(value: Value) -> Self {
        Binding::Value(value)
    }
}

impl From<NativeFunction> for Binding {
    fn from(function: NativeFunction) -> Self {
        Binding::Function(function)
    }
}

/// A host-side collection of bindings plus the list of names it exports.
///
/// Only exported names ever reach a namespace; everything else the source
/// holds stays invisible to expressions.
pub trait BackingSource {
    /// The declared export list, or `None` when the source declares none.
    fn export_list(&self) -> Option<Vec<&str>>;

    /// Looks up a binding by name.
    fn resolve(&self, name: &str) -> Option<Binding>;
}

/// A registration-based [`BackingSource`].
///
/// # Example
///
/// ```
/// use corral_core::namespace::{Module, Namespace};
/// use corral_core::values::{NativeFunction, Signature, Value};
///
/// let mut module = Module::new("geometry");
/// module
///     .constant("unit", 1.0)
///     .function(NativeFunction::new(
///         "double",
///         Signature::positional(1),
///         |args| Ok(Value::Float(args[0].as_float().unwrap_or(0.0) * 2.0)),
///     ))
///     .export(["unit", "double"]);
///
/// let namespace = Namespace::build(&module).unwrap();
/// assert!(namespace.lookup("double").is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Module {
    name: String,
    bindings: HashMap<String, Binding>,
    exports: Option<Vec<String>>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: HashMap::new(),
            exports: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Registers a binding without exporting it.
    pub fn register(&mut self, name: impl Into<String>, binding: impl Into<Binding>) -> &mut Self {
        self.bindings.insert(name.into(), binding.into());
        self
    }

    pub fn constant(&mut self, name: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.register(name, value.into())
    }

    /// Registers a function under its own name.
    pub fn function(&mut self, function: NativeFunction) -> &mut Self {
        let name = function.name().to_string();
        self.register(name, function)
    }

    /// Appends names to the export list, creating it if needed.
    pub fn export<I, S>(&mut self, names: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exports
            .get_or_insert_with(Vec::new)
            .extend(names.into_iter().map(Into::into));
        self
    }

    /// Exports every name registered so far, in sorted order.
    pub fn export_all(&mut self) -> &mut Self {
        let mut names: Vec<String> = self.bindings.keys().cloned().collect();
        names.sort();
        self.exports = Some(names);
        self
    }
}

impl BackingSource for Module {
    fn export_list(&self) -> Option<Vec<&str>> {
        self.exports
            .as_ref()
            .map(|names| names.iter().map(String::as_str).collect())
    }

    fn resolve(&self, name: &str) -> Option<Binding> {
        self.bindings.get(name).cloned()
    }
}
