//! Registry error types
//!
//! Error codes:
//! - CAST_UNKNOWN_MODEL (REJECT)
//! - CAST_MODEL_IMMUTABLE (REJECT)
//! - CAST_CONSTRUCTION_FAILED (REJECT)
//! - CAST_MALFORMED_MODEL_FILE (FATAL)

use std::fmt;

use crate::engine::ValidationError;

/// Severity levels for registry errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// Caller request rejected
    Reject,
    /// The registry cannot be trusted (malformed files at load)
    Fatal,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Reject => write!(f, "REJECT"),
            Severity::Fatal => write!(f, "FATAL"),
        }
    }
}

/// Registry-specific error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryErrorCode {
    /// Model name not registered
    CastUnknownModel,
    /// Attempt to replace a registered model
    CastModelImmutable,
    /// Construction against a registered model failed
    CastConstructionFailed,
    /// Model file unreadable or structurally invalid
    CastMalformedModelFile,
}

impl RegistryErrorCode {
    /// Returns the stable string code.
    pub fn code(&self) -> &'static str {
        match self {
            RegistryErrorCode::CastUnknownModel => "CAST_UNKNOWN_MODEL",
            RegistryErrorCode::CastModelImmutable => "CAST_MODEL_IMMUTABLE",
            RegistryErrorCode::CastConstructionFailed => "CAST_CONSTRUCTION_FAILED",
            RegistryErrorCode::CastMalformedModelFile => "CAST_MALFORMED_MODEL_FILE",
        }
    }

    /// Returns the severity level for this error.
    pub fn severity(&self) -> Severity {
        match self {
            RegistryErrorCode::CastMalformedModelFile => Severity::Fatal,
            _ => Severity::Reject,
        }
    }
}

impl fmt::Display for RegistryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Registry error with full context
#[derive(Debug)]
pub struct RegistryError {
    code: RegistryErrorCode,
    message: String,
    model: Option<String>,
    validation: Option<ValidationError>,
}

impl RegistryError {
    /// Create an unknown model error.
    pub fn unknown_model(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: RegistryErrorCode::CastUnknownModel,
            message: format!("Model '{}' not found", model),
            model: Some(model),
            validation: None,
        }
    }

    /// Create a model immutable error.
    pub fn model_immutable(model: impl Into<String>) -> Self {
        let model = model.into();
        Self {
            code: RegistryErrorCode::CastModelImmutable,
            message: format!("Model '{}' is already registered and immutable", model),
            model: Some(model),
            validation: None,
        }
    }

    /// Create a construction failed error wrapping the validation report.
    pub fn construction_failed(model: impl Into<String>, validation: ValidationError) -> Self {
        let model = model.into();
        Self {
            code: RegistryErrorCode::CastConstructionFailed,
            message: format!(
                "Construction of '{}' failed with {} error(s)",
                model,
                validation.error_count()
            ),
            model: Some(model),
            validation: Some(validation),
        }
    }

    /// Create a malformed model file error.
    pub fn malformed_file(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: RegistryErrorCode::CastMalformedModelFile,
            message: format!("Malformed model file '{}': {}", path.into(), reason.into()),
            model: None,
            validation: None,
        }
    }

    /// Returns the error code.
    pub fn code(&self) -> RegistryErrorCode {
        self.code
    }

    /// Returns the severity level.
    pub fn severity(&self) -> Severity {
        self.code.severity()
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the model name if applicable.
    pub fn model(&self) -> Option<&str> {
        self.model.as_deref()
    }

    /// Returns the wrapped validation report if applicable.
    pub fn validation(&self) -> Option<&ValidationError> {
        self.validation.as_ref()
    }

    /// Returns whether this is a fatal error.
    pub fn is_fatal(&self) -> bool {
        self.severity() == Severity::Fatal
    }
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.code.severity(),
            self.code.code(),
            self.message
        )
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.validation
            .as_ref()
            .map(|v| v as &(dyn std::error::Error + 'static))
    }
}

/// Result type for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;
