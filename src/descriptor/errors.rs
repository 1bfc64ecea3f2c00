//! Descriptor construction errors
//!
//! These are setup-time errors: a builder produced a definition that can
//! never validate input coherently. They are distinct from the
//! construction-time `ValidationError`, which reports bad *input* against
//! a well-formed descriptor.

use thiserror::Error;

/// Result type for descriptor building
pub type DescriptorResult<T> = Result<T, DescriptorError>;

/// A model definition is structurally invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// Model name is empty
    #[error("model name must not be empty")]
    EmptyModelName,

    /// Field name is empty
    #[error("field name must not be empty")]
    EmptyFieldName,

    /// Two fields share one internal name
    #[error("duplicate field '{0}'")]
    DuplicateField(String),

    /// Two fields resolve to the same input key
    #[error("fields '{first}' and '{second}' share the input key '{key}'")]
    DuplicateInputKey {
        key: String,
        first: String,
        second: String,
    },

    /// An alias is present but empty
    #[error("field '{field}' has an empty alias")]
    EmptyAlias { field: String },

    /// A constraint cannot apply to the field's declared type
    #[error("constraint '{constraint}' does not apply to {declared} field '{field}'")]
    IncompatibleConstraint {
        field: String,
        constraint: &'static str,
        declared: String,
    },
}
