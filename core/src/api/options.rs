//! Configuration options for compiling and evaluating expressions.

use crate::parser::DEFAULT_MAX_DEPTH;

/// Configuration options for compilation.
///
/// # Example
///
/// ```
/// use corral_core::api::CompileOptions;
///
/// let options = CompileOptions { max_depth: 64 };
/// ```
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Maximum nesting depth accepted by the parser.
    ///
    /// Default: 256
    pub max_depth: usize,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Configuration options for expression evaluation.
///
/// These options bound the resources a single evaluation may use.
///
/// # Example
///
/// ```
/// use corral_core::api::ExecutionOptions;
///
/// let options = ExecutionOptions {
///     max_depth: 500,
///     max_steps: Some(10_000),
/// };
/// ```
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Maximum evaluation stack depth.
    ///
    /// Default: 1000
    pub max_depth: usize,

    /// Maximum number of nodes visited in one evaluation (if Some).
    ///
    /// Default: None
    pub max_steps: Option<usize>,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        Self {
            max_depth: 1000,
            max_steps: None,
        }
    }
}
