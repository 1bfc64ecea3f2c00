//! Model descriptors: ordered field collections plus model-level validators.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use super::errors::DescriptorError;
use super::field::{AliasPolicy, FieldBuilder, FieldDescriptor};

/// A named model-level validator.
///
/// Before-model validators see the raw input mapping (aliased keys) and
/// may normalize it across fields; after-model validators see the
/// assembled, coerced values (field names) and may adjust them. Both are
/// single-shot gates: a rejection aborts the whole construction call.
#[derive(Clone)]
pub struct ModelValidator {
    name: String,
    func: Arc<dyn Fn(&mut Map<String, Value>) -> Result<(), String> + Send + Sync>,
}

impl ModelValidator {
    /// Creates a named model validator.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut Map<String, Value>) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Arc::new(func),
        }
    }

    /// Returns the validator name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Applies the validator to the mapping in place.
    pub fn apply(&self, mapping: &mut Map<String, Value>) -> Result<(), String> {
        (self.func)(mapping)
    }
}

impl fmt::Debug for ModelValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ModelValidator({})", self.name)
    }
}

/// Complete definition of a record type.
///
/// Field order is significant: it fixes error ordering and serialization
/// order. Descriptors are immutable after build and safe to share across
/// concurrent construction calls.
#[derive(Debug, Clone)]
pub struct ModelDescriptor {
    name: String,
    description: Option<String>,
    fields: Vec<FieldDescriptor>,
    before: Vec<ModelValidator>,
    after: Vec<ModelValidator>,
}

impl ModelDescriptor {
    /// Starts building a model with the given name.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            description: None,
            fields: Vec::new(),
            before: Vec::new(),
            after: Vec::new(),
        }
    }

    /// Returns the model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the optional description.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Looks up a field by its internal name.
    pub fn field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Returns the ordered before-model validators.
    pub fn before_validators(&self) -> &[ModelValidator] {
        &self.before
    }

    /// Returns the ordered after-model validators.
    pub fn after_validators(&self) -> &[ModelValidator] {
        &self.after
    }
}

/// Builder for a model descriptor.
///
/// `build` performs structural validation; a descriptor that builds is
/// guaranteed internally coherent, so construction calls never have to
/// re-check it.
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    description: Option<String>,
    fields: Vec<FieldBuilder>,
    before: Vec<ModelValidator>,
    after: Vec<ModelValidator>,
}

impl ModelBuilder {
    /// Sets the model description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Appends a field definition.
    pub fn field(mut self, field: FieldBuilder) -> Self {
        self.fields.push(field);
        self
    }

    /// Appends a named before-model validator.
    pub fn before_model(
        mut self,
        name: impl Into<String>,
        func: impl Fn(&mut Map<String, Value>) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.before.push(ModelValidator::new(name, func));
        self
    }

    /// Appends a named after-model validator.
    pub fn after_model(
        mut self,
        name: impl Into<String>,
        func: impl Fn(&mut Map<String, Value>) -> Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.after.push(ModelValidator::new(name, func));
        self
    }

    /// Validates the definition and produces the descriptor.
    pub fn build(self) -> Result<ModelDescriptor, DescriptorError> {
        if self.name.is_empty() {
            return Err(DescriptorError::EmptyModelName);
        }

        let fields: Vec<FieldDescriptor> =
            self.fields.into_iter().map(FieldBuilder::into_descriptor).collect();

        let mut seen_names: HashSet<String> = HashSet::new();
        let mut seen_keys: HashMap<String, String> = HashMap::new();

        for field in &fields {
            if field.name().is_empty() {
                return Err(DescriptorError::EmptyFieldName);
            }
            if !seen_names.insert(field.name().to_string()) {
                return Err(DescriptorError::DuplicateField(field.name().to_string()));
            }

            match field.alias_policy() {
                AliasPolicy::None => {}
                AliasPolicy::General(alias) => {
                    if alias.is_empty() {
                        return Err(DescriptorError::EmptyAlias {
                            field: field.name().to_string(),
                        });
                    }
                }
                AliasPolicy::Split {
                    validation,
                    serialization,
                } => {
                    if validation.is_empty() || serialization.is_empty() {
                        return Err(DescriptorError::EmptyAlias {
                            field: field.name().to_string(),
                        });
                    }
                }
            }

            if let Some(first) =
                seen_keys.insert(field.input_key().to_string(), field.name().to_string())
            {
                return Err(DescriptorError::DuplicateInputKey {
                    key: field.input_key().to_string(),
                    first,
                    second: field.name().to_string(),
                });
            }

            for constraint in field.constraints() {
                if !constraint.applies_to(field.declared().base()) {
                    return Err(DescriptorError::IncompatibleConstraint {
                        field: field.name().to_string(),
                        constraint: constraint.name(),
                        declared: field.declared().name(),
                    });
                }
            }
        }

        Ok(ModelDescriptor {
            name: self.name,
            description: self.description,
            fields,
            before: self.before,
            after: self.after,
        })
    }
}
