pub mod function;
mod value_serde;
pub mod value;

pub use function::{Arity, BackendError, BindError, NativeFn, NativeFunction, Param, ParamKind, Signature};
pub use value::{MAX_SEQUENCE_LEN, Number, Value, ValueError};

#[cfg(test)]
mod value_test;
