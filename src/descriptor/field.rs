//! Field-level definitions: declared types, defaults, aliases, constraints,
//! and named field validators.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared field types
///
/// The data-only core of a field definition; serializable so model files
/// can carry it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum DeclaredType {
    /// UTF-8 string
    String,
    /// 64-bit signed integer
    Int,
    /// Boolean
    Bool,
    /// 64-bit floating point
    Float,
    /// Nullable wrapper around an inner type
    Optional {
        /// Inner type (boxed to allow recursion)
        inner: Box<DeclaredType>,
    },
    /// Homogeneous list with a single element type
    List {
        /// Element type (boxed to allow recursion)
        element: Box<DeclaredType>,
    },
}

impl DeclaredType {
    /// Wraps a type as optional.
    pub fn optional(inner: DeclaredType) -> Self {
        DeclaredType::Optional {
            inner: Box::new(inner),
        }
    }

    /// Wraps a type as a homogeneous list.
    pub fn list(element: DeclaredType) -> Self {
        DeclaredType::List {
            element: Box::new(element),
        }
    }

    /// Returns the type name for error messages.
    pub fn name(&self) -> String {
        match self {
            DeclaredType::String => "string".into(),
            DeclaredType::Int => "int".into(),
            DeclaredType::Bool => "bool".into(),
            DeclaredType::Float => "float".into(),
            DeclaredType::Optional { inner } => format!("optional<{}>", inner.name()),
            DeclaredType::List { element } => format!("list<{}>", element.name()),
        }
    }

    /// Returns the type with optional wrappers stripped.
    ///
    /// Constraints apply to present values, so compatibility is judged
    /// against the unwrapped type.
    pub fn base(&self) -> &DeclaredType {
        match self {
            DeclaredType::Optional { inner } => inner.base(),
            other => other,
        }
    }
}

/// Default policy for an absent field
#[derive(Clone)]
pub enum DefaultPolicy {
    /// Absent input is an error
    NoDefault,
    /// Absent input takes a fixed value
    Value(Value),
    /// Absent input takes a freshly produced value
    Factory(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl fmt::Debug for DefaultPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DefaultPolicy::NoDefault => write!(f, "NoDefault"),
            DefaultPolicy::Value(v) => write!(f, "Value({})", v),
            DefaultPolicy::Factory(_) => write!(f, "Factory(..)"),
        }
    }
}

/// Alias policy for a field's external names
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasPolicy {
    /// External name equals the field name
    None,
    /// One alias for both input and output
    General(String),
    /// Distinct input and output aliases; both must be non-empty
    Split {
        validation: String,
        serialization: String,
    },
}

/// A single value constraint, checked after coercion
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Minimum length of a string (chars) or list (elements)
    MinLength(usize),
    /// Maximum length of a string (chars) or list (elements)
    MaxLength(usize),
    /// Strictly greater than
    Gt(f64),
    /// Greater than or equal
    Ge(f64),
    /// Strictly less than
    Lt(f64),
    /// Less than or equal
    Le(f64),
    /// String must match the pattern
    Pattern(Regex),
}

impl Constraint {
    /// Returns the constraint name used in error reports.
    pub fn name(&self) -> &'static str {
        match self {
            Constraint::MinLength(_) => "min_length",
            Constraint::MaxLength(_) => "max_length",
            Constraint::Gt(_) => "gt",
            Constraint::Ge(_) => "ge",
            Constraint::Lt(_) => "lt",
            Constraint::Le(_) => "le",
            Constraint::Pattern(_) => "pattern",
        }
    }

    /// Returns whether the constraint can apply to the given base type.
    pub fn applies_to(&self, base: &DeclaredType) -> bool {
        match self {
            Constraint::MinLength(_) | Constraint::MaxLength(_) => matches!(
                base,
                DeclaredType::String | DeclaredType::List { .. }
            ),
            Constraint::Gt(_) | Constraint::Ge(_) | Constraint::Lt(_) | Constraint::Le(_) => {
                matches!(base, DeclaredType::Int | DeclaredType::Float)
            }
            Constraint::Pattern(_) => matches!(base, DeclaredType::String),
        }
    }

    /// Checks a coerced value against the constraint.
    ///
    /// Returns the violation message if the value breaks it.
    pub fn check(&self, value: &Value) -> Result<(), String> {
        match self {
            Constraint::MinLength(min) => match measured_length(value) {
                Some(len) if len < *min => {
                    Err(format!("length {} is shorter than minimum {}", len, min))
                }
                _ => Ok(()),
            },
            Constraint::MaxLength(max) => match measured_length(value) {
                Some(len) if len > *max => {
                    Err(format!("length {} is longer than maximum {}", len, max))
                }
                _ => Ok(()),
            },
            Constraint::Gt(bound) => check_bound(value, |v| v > *bound, "greater than", bound),
            Constraint::Ge(bound) => {
                check_bound(value, |v| v >= *bound, "greater than or equal to", bound)
            }
            Constraint::Lt(bound) => check_bound(value, |v| v < *bound, "less than", bound),
            Constraint::Le(bound) => {
                check_bound(value, |v| v <= *bound, "less than or equal to", bound)
            }
            Constraint::Pattern(re) => match value.as_str() {
                Some(s) if !re.is_match(s) => {
                    Err(format!("value does not match pattern '{}'", re.as_str()))
                }
                _ => Ok(()),
            },
        }
    }
}

fn measured_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(s) => Some(s.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}

fn check_bound<F: Fn(f64) -> bool>(
    value: &Value,
    ok: F,
    relation: &str,
    bound: &f64,
) -> Result<(), String> {
    match value.as_f64() {
        Some(v) if !ok(v) => Err(format!("value {} is not {} {}", v, relation, bound)),
        _ => Ok(()),
    }
}

/// A named field-level validator.
///
/// Before-field validators see the raw (possibly untyped) value and may
/// normalize it; after-field validators see the coerced value. Either may
/// reject with a message.
#[derive(Clone)]
pub struct FieldValidator {
    name: String,
    func: Arc<dyn Fn(&Value) -> Result<Value, String> + Send + Sync>,
}

impl FieldValidator {
    /// Creates a named validator from a transform/check function.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
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

    /// Applies the validator, returning the (possibly transformed) value.
    pub fn apply(&self, value: &Value) -> Result<Value, String> {
        (self.func)(value)
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FieldValidator({})", self.name)
    }
}

/// Complete definition of one field in a model
#[derive(Debug, Clone)]
pub struct FieldDescriptor {
    name: String,
    declared: DeclaredType,
    default: DefaultPolicy,
    validate_default: bool,
    alias: AliasPolicy,
    constraints: Vec<Constraint>,
    before: Vec<FieldValidator>,
    after: Vec<FieldValidator>,
}

impl FieldDescriptor {
    /// Returns the internal field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared type.
    pub fn declared(&self) -> &DeclaredType {
        &self.declared
    }

    /// Returns the default policy.
    pub fn default_policy(&self) -> &DefaultPolicy {
        &self.default
    }

    /// Returns whether defaults run the full field pipeline.
    pub fn validate_default(&self) -> bool {
        self.validate_default
    }

    /// Returns the alias policy.
    pub fn alias_policy(&self) -> &AliasPolicy {
        &self.alias
    }

    /// Returns the ordered constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Returns the ordered before-field validators.
    pub fn before_validators(&self) -> &[FieldValidator] {
        &self.before
    }

    /// Returns the ordered after-field validators.
    pub fn after_validators(&self) -> &[FieldValidator] {
        &self.after
    }

    /// Returns the key this field is read under.
    ///
    /// Validation alias wins over a general alias, which wins over the
    /// field name.
    pub fn input_key(&self) -> &str {
        match &self.alias {
            AliasPolicy::None => &self.name,
            AliasPolicy::General(alias) => alias,
            AliasPolicy::Split { validation, .. } => validation,
        }
    }

    /// Returns the key this field is written under when serializing with
    /// aliases.
    pub fn output_key(&self) -> &str {
        match &self.alias {
            AliasPolicy::None => &self.name,
            AliasPolicy::General(alias) => alias,
            AliasPolicy::Split { serialization, .. } => serialization,
        }
    }
}

/// Builder for one field definition.
///
/// Consumed by [`crate::descriptor::ModelBuilder::field`]; structural
/// validation happens when the model is built.
#[derive(Debug, Clone)]
pub struct FieldBuilder {
    inner: FieldDescriptor,
}

impl FieldBuilder {
    /// Starts a field with a name and declared type.
    pub fn new(name: impl Into<String>, declared: DeclaredType) -> Self {
        Self {
            inner: FieldDescriptor {
                name: name.into(),
                declared,
                default: DefaultPolicy::NoDefault,
                validate_default: false,
                alias: AliasPolicy::None,
                constraints: Vec::new(),
                before: Vec::new(),
                after: Vec::new(),
            },
        }
    }

    /// Sets a fixed default for absent input.
    pub fn default_value(mut self, value: Value) -> Self {
        self.inner.default = DefaultPolicy::Value(value);
        self
    }

    /// Sets a factory default for absent input.
    pub fn default_fn(mut self, factory: impl Fn() -> Value + Send + Sync + 'static) -> Self {
        self.inner.default = DefaultPolicy::Factory(Arc::new(factory));
        self
    }

    /// Opts the default value into the full field pipeline.
    ///
    /// Off by default: an unvalidated default is injected verbatim and may
    /// not even match the declared type. That mirrors the engine's
    /// documented only-validate-user-input rule; this switch is the
    /// explicit opt-in.
    pub fn validate_default(mut self, validate: bool) -> Self {
        self.inner.validate_default = validate;
        self
    }

    /// Sets one alias for both input and output.
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.inner.alias = AliasPolicy::General(alias.into());
        self
    }

    /// Sets distinct input (validation) and output (serialization) aliases.
    pub fn aliases(
        mut self,
        validation: impl Into<String>,
        serialization: impl Into<String>,
    ) -> Self {
        self.inner.alias = AliasPolicy::Split {
            validation: validation.into(),
            serialization: serialization.into(),
        };
        self
    }

    /// Adds a minimum length constraint.
    pub fn min_length(mut self, min: usize) -> Self {
        self.inner.constraints.push(Constraint::MinLength(min));
        self
    }

    /// Adds a maximum length constraint.
    pub fn max_length(mut self, max: usize) -> Self {
        self.inner.constraints.push(Constraint::MaxLength(max));
        self
    }

    /// Adds a strict greater-than bound.
    pub fn gt(mut self, bound: f64) -> Self {
        self.inner.constraints.push(Constraint::Gt(bound));
        self
    }

    /// Adds an inclusive greater-than-or-equal bound.
    pub fn ge(mut self, bound: f64) -> Self {
        self.inner.constraints.push(Constraint::Ge(bound));
        self
    }

    /// Adds a strict less-than bound.
    pub fn lt(mut self, bound: f64) -> Self {
        self.inner.constraints.push(Constraint::Lt(bound));
        self
    }

    /// Adds an inclusive less-than-or-equal bound.
    pub fn le(mut self, bound: f64) -> Self {
        self.inner.constraints.push(Constraint::Le(bound));
        self
    }

    /// Adds a pattern constraint.
    pub fn pattern(mut self, pattern: Regex) -> Self {
        self.inner.constraints.push(Constraint::Pattern(pattern));
        self
    }

    /// Appends a named before-field validator.
    pub fn before(
        mut self,
        name: impl Into<String>,
        func: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.inner.before.push(FieldValidator::new(name, func));
        self
    }

    /// Appends a named after-field validator.
    pub fn after(
        mut self,
        name: impl Into<String>,
        func: impl Fn(&Value) -> Result<Value, String> + Send + Sync + 'static,
    ) -> Self {
        self.inner.after.push(FieldValidator::new(name, func));
        self
    }

    pub(crate) fn into_descriptor(self) -> FieldDescriptor {
        self.inner
    }
}
