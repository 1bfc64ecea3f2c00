//! Validated instances
//!
//! A `ValidatedInstance` is the terminal product of a successful
//! construction call: an immutable, ordered mapping from internal field
//! names to values, tagged with the model it was built from. There is no
//! other way to obtain one, and no partially constructed instance is ever
//! exposed.

use serde_json::{Map, Value};

/// An immutable validated record.
///
/// Values are stored in field-declaration order. Note that a field whose
/// default bypassed validation may carry a value that does not match its
/// declared type; see the engine's default-policy rules.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedInstance {
    model: String,
    values: Map<String, Value>,
}

impl ValidatedInstance {
    pub(crate) fn new(model: impl Into<String>, values: Map<String, Value>) -> Self {
        Self {
            model: model.into(),
            values,
        }
    }

    /// Returns the name of the originating model.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Returns a field value by internal name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// Returns a field as a string slice, if it is one.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns a field as an i64, if it is one.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(Value::as_i64)
    }

    /// Returns a field as an f64, if it is numeric.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Returns a field as a bool, if it is one.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(Value::as_bool)
    }

    /// Iterates fields in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.values.iter()
    }

    /// Returns the full value mapping.
    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns whether the instance has no fields.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
