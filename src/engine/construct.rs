//! Model construction: the per-call validation pipeline.

use serde_json::{Map, Value};

use crate::coerce::{value_shape, Coercer};
use crate::descriptor::{DefaultPolicy, FieldDescriptor, ModelDescriptor};
use crate::instance::ValidatedInstance;

use super::errors::{ConstructResult, ErrorAggregator, FieldError, ValidationError};

/// Runs construction calls against one model descriptor.
///
/// The engine borrows the descriptor read-only and holds no per-call
/// state, so one engine (or one descriptor shared by many engines) can
/// serve concurrent calls.
pub struct Engine<'a> {
    model: &'a ModelDescriptor,
    coercer: Coercer,
}

impl<'a> Engine<'a> {
    /// Creates an engine with the strict default coercer.
    pub fn new(model: &'a ModelDescriptor) -> Self {
        Self {
            model,
            coercer: Coercer::new(),
        }
    }

    /// Creates an engine with a configured coercer.
    pub fn with_coercer(model: &'a ModelDescriptor, coercer: Coercer) -> Self {
        Self { model, coercer }
    }

    /// Constructs a validated instance from a raw mapping.
    ///
    /// The input must be a JSON object; anything else fails as a type
    /// mismatch at the root. All fields are checked even after one fails,
    /// so the error carries every field failure. Before/after model
    /// validators are single-shot gates whose rejection supersedes field
    /// aggregation.
    pub fn construct(&self, raw: &Value) -> ConstructResult {
        let raw_object = match raw.as_object() {
            Some(object) => object,
            None => {
                return Err(ValidationError::single(FieldError::type_mismatch(
                    "$root",
                    raw.clone(),
                    format!("expected object, got {}", value_shape(raw)),
                )))
            }
        };

        // Before-model gates run on a working copy; the caller's mapping
        // is never mutated.
        let mut working = raw_object.clone();
        for validator in self.model.before_validators() {
            if let Err(message) = validator.apply(&mut working) {
                return Err(ValidationError::single(FieldError::precondition(
                    self.model.name(),
                    validator.name(),
                    message,
                )));
            }
        }

        let mut aggregator = ErrorAggregator::new();
        let mut values: Map<String, Value> = Map::new();
        for field in self.model.fields() {
            match self.resolve_field(field, &working) {
                Ok(value) => {
                    values.insert(field.name().to_string(), value);
                }
                Err(errors) => aggregator.extend(errors),
            }
        }
        if let Some(error) = aggregator.into_error() {
            return Err(error);
        }

        for validator in self.model.after_validators() {
            if let Err(message) = validator.apply(&mut values) {
                return Err(ValidationError::single(FieldError::precondition(
                    self.model.name(),
                    validator.name(),
                    message,
                )));
            }
        }

        Ok(ValidatedInstance::new(self.model.name(), values))
    }

    /// Resolves one field: lookup or default, then the field pipeline.
    fn resolve_field(
        &self,
        field: &FieldDescriptor,
        input: &Map<String, Value>,
    ) -> Result<Value, Vec<FieldError>> {
        let raw = match input.get(field.input_key()) {
            Some(value) => value.clone(),
            None => match field.default_policy() {
                DefaultPolicy::NoDefault => {
                    return Err(vec![FieldError::missing(field.name(), field.input_key())])
                }
                DefaultPolicy::Value(value) => {
                    if !field.validate_default() {
                        // Unvalidated defaults skip the entire pipeline.
                        // The instance may carry a value that does not
                        // match the declared type; opting in is
                        // validate_default(true).
                        return Ok(value.clone());
                    }
                    value.clone()
                }
                DefaultPolicy::Factory(factory) => {
                    let value = factory();
                    if !field.validate_default() {
                        return Ok(value);
                    }
                    value
                }
            },
        };
        self.run_field_pipeline(field, raw)
    }

    /// Before-field validators, coercion, constraints, after-field
    /// validators, in that order.
    ///
    /// Validator rejection and coercion failure stop the field's pipeline;
    /// constraint violations are batched so every broken constraint is
    /// reported at once.
    fn run_field_pipeline(
        &self,
        field: &FieldDescriptor,
        raw: Value,
    ) -> Result<Value, Vec<FieldError>> {
        let mut value = raw;
        for validator in field.before_validators() {
            match validator.apply(&value) {
                Ok(next) => value = next,
                Err(message) => {
                    return Err(vec![FieldError::rejected(
                        field.name(),
                        value,
                        validator.name(),
                        message,
                    )])
                }
            }
        }

        let coerced = match self.coercer.coerce(&value, field.declared()) {
            Ok(coerced) => coerced,
            Err(error) => {
                let path = format!("{}{}", field.name(), error.path);
                return Err(vec![FieldError::type_mismatch(
                    path,
                    value,
                    error.to_string(),
                )]);
            }
        };

        // A null produced by an optional type has nothing to measure or
        // bound; constraints apply to present values.
        if !coerced.is_null() {
            let violations: Vec<FieldError> = field
                .constraints()
                .iter()
                .filter_map(|constraint| {
                    constraint.check(&coerced).err().map(|message| {
                        FieldError::constraint(
                            field.name(),
                            coerced.clone(),
                            constraint.name(),
                            message,
                        )
                    })
                })
                .collect();
            if !violations.is_empty() {
                return Err(violations);
            }
        }

        let mut value = coerced;
        for validator in field.after_validators() {
            match validator.apply(&value) {
                Ok(next) => value = next,
                Err(message) => {
                    return Err(vec![FieldError::rejected(
                        field.name(),
                        value,
                        validator.name(),
                        message,
                    )])
                }
            }
        }
        Ok(value)
    }
}

/// Constructs a validated instance with the default engine configuration.
pub fn construct(model: &ModelDescriptor, raw: &Value) -> ConstructResult {
    Engine::new(model).construct(raw)
}
