//! Domain model types (pure).
//!
//! Parsed callouts, line ranges, operation requests and the error taxonomy.

pub mod callout;
pub mod error;
pub mod operation;

pub use callout::{Callout, Descendants, LineRange};
pub use operation::{Mode, OperationRequest, Scope, UnknownVariant};
