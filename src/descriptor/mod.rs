//! Model and field descriptors
//!
//! Descriptors are the read-only definition of a record type: ordered
//! fields with declared types, default policies, alias policies,
//! constraints, and named validator lists. They are built once through
//! the builder API, structurally validated, and then shared read-only
//! across any number of construction calls.

mod errors;
mod field;
mod model;

pub use errors::DescriptorError;
pub use field::{
    AliasPolicy, Constraint, DeclaredType, DefaultPolicy, FieldBuilder, FieldDescriptor,
    FieldValidator,
};
pub use model::{ModelBuilder, ModelDescriptor, ModelValidator};
