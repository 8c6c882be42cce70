//! Static check that a parsed expression stays inside the permitted subset.

mod rejection;
mod validate;

pub use rejection::{Construct, RejectReason, Rejection};
pub use validate::validate;
