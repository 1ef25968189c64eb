//! Transfer primitives.

mod http;

pub use http::{HttpTransfer, PARTIAL_SUFFIX};
