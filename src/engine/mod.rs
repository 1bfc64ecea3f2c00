//! Validation engine
//!
//! Orchestrates one construction call end to end:
//!
//! 1. Before-model validators normalize the raw mapping (single-shot gates)
//! 2. Every field resolves independently: lookup or default, before-field
//!    validators, coercion, constraint checks, after-field validators
//! 3. Field failures aggregate; all fields are checked even after one fails
//! 4. Values assemble in declaration order
//! 5. After-model validators adjust or reject the assembly (gates again)
//! 6. The result freezes into an immutable instance
//!
//! A failed call has no observable side effect beyond the returned error.

mod construct;
mod errors;

pub use construct::{construct, Engine};
pub use errors::{ConstructResult, ErrorAggregator, ErrorKind, FieldError, ValidationError};
