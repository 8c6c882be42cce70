//! The immutable set of host-declared names an expression may refer to.

mod binder;
mod error;
mod module;

pub(crate) use binder::{check_calls, collect_names};
pub use error::NamespaceError;
pub use module::{BackingSource, Binding, Module};

use hashbrown::HashMap;
use tracing::debug;

use crate::api::{CompileOptions, CompiledExpression, Error};
use crate::stdlib;

/// Names that are never exposed, whatever the backing source exports.
///
/// The grammar is what keeps expressions contained; this list only guards
/// against a host exporting something obviously dangerous by mistake.
pub const KNOWN_UNSAFE: &[&str] = &[
    "eval",
    "exec",
    "compile",
    "open",
    "__import__",
    "getattr",
    "setattr",
    "delattr",
    "vars",
    "globals",
    "locals",
    "dir",
    "type",
    "object",
    "super",
    "memoryview",
    "property",
    "staticmethod",
    "classmethod",
    "__build_class__",
    "__loader__",
    "input",
    "breakpoint",
    "help",
    "exit",
    "quit",
];

const KEYWORDS: &[&str] = &[
    "and", "or", "not", "in", "is", "if", "else", "elif", "lambda", "for", "True", "False",
    "None", "import", "from", "def", "class", "while", "with", "try", "except", "finally",
    "return", "yield", "del", "pass", "raise", "global", "nonlocal", "assert", "async", "await",
    "break", "continue", "as",
];

/// Whether `name` could appear as a name in an expression.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let starts_well = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    starts_well
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !KEYWORDS.contains(&name)
}

#[derive(Debug, Clone)]
enum BuiltinSelection {
    All,
    Nothing,
    Only(Vec<String>),
}

/// Configures how a [`Namespace`] is built from a backing source.
pub struct NamespaceBuilder<'a> {
    source: &'a dyn BackingSource,
    builtins: BuiltinSelection,
}

impl<'a> NamespaceBuilder<'a> {
    /// Whether to add the safe builtin functions (default: yes).
    pub fn with_builtins(mut self, enabled: bool) -> Self {
        self.builtins = if enabled {
            BuiltinSelection::All
        } else {
            BuiltinSelection::Nothing
        };
        self
    }

    /// Restricts the builtins to the given names.
    pub fn allow_builtins<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.builtins = BuiltinSelection::Only(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<Namespace, NamespaceError> {
        let exports = self
            .source
            .export_list()
            .ok_or(NamespaceError::MissingExportList)?;

        let mut bindings: HashMap<String, Binding> = HashMap::with_capacity(exports.len());
        for name in &exports {
            if !is_identifier(name) {
                return Err(NamespaceError::InvalidName {
                    name: name.to_string(),
                });
            }
            if KNOWN_UNSAFE.contains(name) {
                return Err(NamespaceError::UnsafeName {
                    name: name.to_string(),
                });
            }
            if bindings.contains_key(*name) {
                return Err(NamespaceError::DuplicateExport {
                    name: name.to_string(),
                });
            }
            let binding = self
                .source
                .resolve(name)
                .ok_or_else(|| NamespaceError::UnboundExport {
                    name: name.to_string(),
                })?;
            bindings.insert(name.to_string(), binding);
        }

        let available = stdlib::builtins();
        let selected: Vec<_> = match self.builtins {
            BuiltinSelection::All => available,
            BuiltinSelection::Nothing => Vec::new(),
            BuiltinSelection::Only(names) => {
                let mut selected = Vec::with_capacity(names.len());
                for name in names {
                    if KNOWN_UNSAFE.contains(&name.as_str()) {
                        return Err(NamespaceError::UnsafeName { name });
                    }
                    match available.iter().find(|f| f.name() == name) {
                        Some(function) => selected.push(function.clone()),
                        None => return Err(NamespaceError::UnknownBuiltin { name }),
                    }
                }
                selected
            }
        };

        let mut builtin_count = 0;
        for function in selected {
            // Exports shadow builtins of the same name.
            if !bindings.contains_key(function.name()) {
                builtin_count += 1;
                bindings.insert(function.name().to_string(), Binding::Function(function));
            }
        }

        debug!(
            exports = exports.len(),
            builtins = builtin_count,
            "namespace built"
        );
        Ok(Namespace {
            bindings,
            exports: exports.iter().map(|s| s.to_string()).collect(),
        })
    }
}

/// Immutable mapping from identifiers to bindings.
///
/// Built once from a backing source's export list (plus, optionally, the
/// safe builtins) and shared by every expression compiled against it.
#[derive(Debug, Clone)]
pub struct Namespace {
    bindings: HashMap<String, Binding>,
    exports: Vec<String>,
}

impl Namespace {
    /// Builds a namespace with the default builtins.
    pub fn build(source: &dyn BackingSource) -> Result<Self, NamespaceError> {
        Self::builder(source).build()
    }

    pub fn builder(source: &dyn BackingSource) -> NamespaceBuilder<'_> {
        NamespaceBuilder {
            source,
            builtins: BuiltinSelection::All,
        }
    }

    pub fn lookup(&self, name: &str) -> Option<&Binding> {
        self.bindings.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Names taken from the backing source's export list, in export order.
    pub fn exports(&self) -> &[String] {
        &self.exports
    }

    /// Every bound name, builtins included, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.bindings.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Compiles `text` against this namespace with default options.
    pub fn compile(&self, text: &str) -> Result<CompiledExpression<'_>, Error> {
        CompiledExpression::compile(text, self, &CompileOptions::default())
    }

    pub fn compile_with_options(
        &self,
        text: &str,
        options: &CompileOptions,
    ) -> Result<CompiledExpression<'_>, Error> {
        CompiledExpression::compile(text, self, options)
    }
}

#[cfg(test)]
mod namespace_test;
