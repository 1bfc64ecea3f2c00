//! Construction error contract
//!
//! Field-level failures (missing, type mismatch, constraint violation,
//! validator rejection) are always aggregated, never thrown one at a
//! time. Model-level gate failures surface immediately as the sole error
//! for the call. Everything is returned as a value; a construction call
//! never panics on bad input.

use std::fmt;

use serde_json::Value;

use crate::instance::ValidatedInstance;

/// Result type for construction calls
pub type ConstructResult = Result<ValidatedInstance, ValidationError>;

/// Classification of a single failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Required value absent under the field's input key
    Missing,
    /// Value could not be coerced into the declared type
    TypeMismatch,
    /// Coerced value violated the named constraint
    ConstraintViolation(String),
    /// The named field validator rejected the value
    ValidatorRejected(String),
    /// The named model validator rejected the call (before/after gate)
    ModelPreconditionFailed(String),
}

impl ErrorKind {
    /// Returns the stable code for this kind.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::Missing => "MISSING",
            ErrorKind::TypeMismatch => "TYPE_MISMATCH",
            ErrorKind::ConstraintViolation(_) => "CONSTRAINT_VIOLATION",
            ErrorKind::ValidatorRejected(_) => "VALIDATOR_REJECTED",
            ErrorKind::ModelPreconditionFailed(_) => "MODEL_PRECONDITION_FAILED",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// One recorded failure.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldError {
    path: String,
    input: Option<Value>,
    kind: ErrorKind,
    message: String,
}

impl FieldError {
    /// A required value was absent.
    ///
    /// `input_key` is the key the lookup used, which differs from the
    /// field path when the field is aliased.
    pub fn missing(path: impl Into<String>, input_key: &str) -> Self {
        let path = path.into();
        let message = if path == input_key {
            "required value missing".to_string()
        } else {
            format!("required value missing (input key '{}')", input_key)
        };
        Self {
            path,
            input: None,
            kind: ErrorKind::Missing,
            message,
        }
    }

    /// A value failed coercion into its declared type.
    pub fn type_mismatch(
        path: impl Into<String>,
        input: Value,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            input: Some(input),
            kind: ErrorKind::TypeMismatch,
            message: message.into(),
        }
    }

    /// A coerced value violated a constraint.
    pub fn constraint(
        path: impl Into<String>,
        input: Value,
        constraint: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            input: Some(input),
            kind: ErrorKind::ConstraintViolation(constraint.to_string()),
            message: message.into(),
        }
    }

    /// A field validator rejected the value.
    pub fn rejected(
        path: impl Into<String>,
        input: Value,
        validator: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            input: Some(input),
            kind: ErrorKind::ValidatorRejected(validator.to_string()),
            message: message.into(),
        }
    }

    /// A model gate rejected the call.
    pub fn precondition(
        model: impl Into<String>,
        validator: &str,
        message: impl Into<String>,
    ) -> Self {
        Self {
            path: model.into(),
            input: None,
            kind: ErrorKind::ModelPreconditionFailed(validator.to_string()),
            message: message.into(),
        }
    }

    /// Returns the field path ("field", "field[2]", or the model name for
    /// gate failures).
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the offending input value, when one existed.
    pub fn input(&self) -> Option<&Value> {
        self.input.as_ref()
    }

    /// Returns the failure kind.
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// Returns the human-readable message.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind.code(), self.path, self.message)
    }
}

/// The full failure report for one construction call.
///
/// Field errors appear in field-declaration order, pipeline order within
/// one field. A gate failure is the sole entry.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

impl ValidationError {
    pub(crate) fn new(errors: Vec<FieldError>) -> Self {
        debug_assert!(!errors.is_empty());
        Self { errors }
    }

    pub(crate) fn single(error: FieldError) -> Self {
        Self {
            errors: vec![error],
        }
    }

    /// Returns all recorded failures in order.
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the number of recorded failures.
    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Returns the failures for one field path.
    pub fn for_path<'a>(&'a self, path: &'a str) -> impl Iterator<Item = &'a FieldError> {
        self.errors.iter().filter(move |e| e.path() == path)
    }

    /// Returns whether this call failed on a model gate rather than on
    /// field aggregation.
    pub fn is_model_precondition(&self) -> bool {
        matches!(
            self.errors.first().map(FieldError::kind),
            Some(ErrorKind::ModelPreconditionFailed(_))
        )
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "validation failed with {} error(s):", self.errors.len())?;
        for error in &self.errors {
            writeln!(f, "  {}", error)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// Collects field errors across a whole construction call.
///
/// Per-field short-circuiting happens before errors reach the aggregator;
/// the aggregator itself never drops or reorders anything.
#[derive(Debug, Default)]
pub struct ErrorAggregator {
    errors: Vec<FieldError>,
}

impl ErrorAggregator {
    /// Creates an empty aggregator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failure.
    pub fn push(&mut self, error: FieldError) {
        self.errors.push(error);
    }

    /// Records a batch of failures for one field.
    pub fn extend(&mut self, errors: Vec<FieldError>) {
        self.errors.extend(errors);
    }

    /// Returns whether anything has been recorded.
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded failures.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Produces the final error, if any failure was recorded.
    pub fn into_error(self) -> Option<ValidationError> {
        if self.errors.is_empty() {
            None
        } else {
            Some(ValidationError::new(self.errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_codes() {
        assert_eq!(ErrorKind::Missing.code(), "MISSING");
        assert_eq!(ErrorKind::TypeMismatch.code(), "TYPE_MISMATCH");
        assert_eq!(
            ErrorKind::ConstraintViolation("gt".into()).code(),
            "CONSTRAINT_VIOLATION"
        );
        assert_eq!(
            ErrorKind::ModelPreconditionFailed("check_time".into()).code(),
            "MODEL_PRECONDITION_FAILED"
        );
    }

    #[test]
    fn test_missing_mentions_aliased_input_key() {
        let plain = FieldError::missing("email", "email");
        assert!(!plain.message().contains("input key"));

        let aliased = FieldError::missing("email", "student_email");
        assert!(aliased.message().contains("student_email"));
    }

    #[test]
    fn test_aggregator_preserves_order() {
        let mut agg = ErrorAggregator::new();
        agg.push(FieldError::missing("name", "name"));
        agg.extend(vec![FieldError::type_mismatch(
            "age",
            json!("twenty"),
            "expected int, got string",
        )]);
        let err = agg.into_error().unwrap();
        assert_eq!(err.error_count(), 2);
        assert_eq!(err.errors()[0].path(), "name");
        assert_eq!(err.errors()[1].path(), "age");
    }

    #[test]
    fn test_empty_aggregator_yields_no_error() {
        assert!(ErrorAggregator::new().into_error().is_none());
    }

    #[test]
    fn test_display_lists_every_failure() {
        let err = ValidationError::new(vec![
            FieldError::missing("name", "name"),
            FieldError::constraint("price", json!(-10), "gt", "value -10 is not greater than 0"),
        ]);
        let display = format!("{}", err);
        assert!(display.contains("2 error(s)"));
        assert!(display.contains("[MISSING] name"));
        assert!(display.contains("[CONSTRAINT_VIOLATION] price"));
    }

    #[test]
    fn test_model_precondition_detection() {
        let gate = ValidationError::single(FieldError::precondition(
            "event",
            "check_time",
            "end_hour must be greater than start_hour",
        ));
        assert!(gate.is_model_precondition());

        let field = ValidationError::single(FieldError::missing("name", "name"));
        assert!(!field.is_model_precondition());
    }
}
