//! Model registry
//!
//! Holds model descriptors by name for the lifetime of a process and
//! backs them with on-disk model files.
//!
//! # Design Principles
//!
//! - Registered models are immutable; re-registering a name is an error
//! - Model files carry the data-only subset of a descriptor (types,
//!   aliases, literal defaults, constraints); validator functions and
//!   factory defaults are code and never persist
//! - Malformed model files fail the load outright

mod errors;
mod file;
mod store;

pub use errors::{RegistryError, RegistryErrorCode, RegistryResult, Severity};
pub use file::{ConstraintSpec, FieldSpec, ModelFile};
pub use store::ModelRegistry;
