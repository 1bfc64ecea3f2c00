//! Value coercion into declared field types
//!
//! Coercion rules:
//! - bool accepts bool only; lenient mode opts into "true"/"false" and 0/1
//! - int accepts integers, or a string that parses exactly as an integer
//! - float accepts integers, floats, or a numeric string
//! - string accepts strings only
//! - optional-of-T maps null to null, otherwise recurses into T
//! - list-of-T recurses elementwise; a bare non-list value is an error
//!
//! Coercion is a pure function of its inputs. Normalizing a scalar into a
//! one-element list is the job of before-field validators, never the coercer.

use serde_json::Value;
use thiserror::Error;

use crate::descriptor::DeclaredType;

/// Result type for coercion operations
pub type CoercionResult = Result<Value, CoercionError>;

/// A value could not be converted into its declared type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, got {actual}")]
pub struct CoercionError {
    /// Path within the value relative to the field, e.g. "[2]" for a list
    /// element. Empty at the top level.
    pub path: String,
    /// Name of the declared type that was expected
    pub expected: String,
    /// Shape of the value that was found
    pub actual: &'static str,
}

impl CoercionError {
    fn new(path: &str, expected: &DeclaredType, actual: &Value) -> Self {
        Self {
            path: path.to_string(),
            expected: expected.name(),
            actual: value_shape(actual),
        }
    }
}

/// Converts raw values into declared types.
///
/// Stateless apart from configuration; safe to share across calls.
#[derive(Debug, Clone, Copy, Default)]
pub struct Coercer {
    lenient_bool: bool,
}

impl Coercer {
    /// Creates a coercer with the strict default rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Opts into lenient bool coercion: the strings "true"/"false" and the
    /// integers 0/1 become bools. Off by default.
    pub fn lenient_bool(mut self, lenient: bool) -> Self {
        self.lenient_bool = lenient;
        self
    }

    /// Coerces a value into the declared type, or fails.
    pub fn coerce(&self, value: &Value, declared: &DeclaredType) -> CoercionResult {
        self.coerce_at(value, declared, "")
    }

    fn coerce_at(&self, value: &Value, declared: &DeclaredType, path: &str) -> CoercionResult {
        match declared {
            DeclaredType::String => match value {
                Value::String(_) => Ok(value.clone()),
                other => Err(CoercionError::new(path, declared, other)),
            },
            DeclaredType::Int => coerce_int(value, declared, path),
            DeclaredType::Float => coerce_float(value, declared, path),
            DeclaredType::Bool => self.coerce_bool(value, declared, path),
            DeclaredType::Optional { inner } => match value {
                Value::Null => Ok(Value::Null),
                other => self.coerce_at(other, inner, path),
            },
            DeclaredType::List { element } => {
                let items = match value.as_array() {
                    Some(items) => items,
                    None => return Err(CoercionError::new(path, declared, value)),
                };
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    let elem_path = format!("{}[{}]", path, i);
                    out.push(self.coerce_at(item, element, &elem_path)?);
                }
                Ok(Value::Array(out))
            }
        }
    }

    fn coerce_bool(&self, value: &Value, declared: &DeclaredType, path: &str) -> CoercionResult {
        match value {
            Value::Bool(_) => Ok(value.clone()),
            Value::String(s) if self.lenient_bool => match s.as_str() {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                _ => Err(CoercionError::new(path, declared, value)),
            },
            Value::Number(n) if self.lenient_bool => match n.as_i64() {
                Some(0) => Ok(Value::Bool(false)),
                Some(1) => Ok(Value::Bool(true)),
                _ => Err(CoercionError::new(path, declared, value)),
            },
            other => Err(CoercionError::new(path, declared, other)),
        }
    }
}

fn coerce_int(value: &Value, declared: &DeclaredType, path: &str) -> CoercionResult {
    match value {
        Value::Number(n) if n.is_i64() || n.is_u64() => Ok(value.clone()),
        Value::String(s) => match s.parse::<i64>() {
            Ok(parsed) => Ok(Value::from(parsed)),
            Err(_) => Err(CoercionError::new(path, declared, value)),
        },
        other => Err(CoercionError::new(path, declared, other)),
    }
}

fn coerce_float(value: &Value, declared: &DeclaredType, path: &str) -> CoercionResult {
    match value {
        Value::Number(n) => match n.as_f64() {
            Some(f) => Ok(Value::from(f)),
            None => Err(CoercionError::new(path, declared, value)),
        },
        Value::String(s) => match s.parse::<f64>() {
            Ok(parsed) if parsed.is_finite() => Ok(Value::from(parsed)),
            _ => Err(CoercionError::new(path, declared, value)),
        },
        other => Err(CoercionError::new(path, declared, other)),
    }
}

/// Returns the shape name of a raw value for error messages.
pub fn value_shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "int"
            } else {
                "float"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
