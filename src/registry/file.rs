//! On-disk model definitions
//!
//! A model file is the data-only subset of a descriptor: declared types,
//! aliases, literal defaults, and constraints. Validator functions and
//! factory defaults are code; a loaded model simply has none.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::descriptor::{
    AliasPolicy, Constraint, DeclaredType, DefaultPolicy, FieldBuilder, FieldDescriptor,
    ModelDescriptor,
};

/// Serializable form of a constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintSpec {
    MinLength(usize),
    MaxLength(usize),
    Gt(f64),
    Ge(f64),
    Lt(f64),
    Le(f64),
    /// Pattern source; recompiled at load
    Pattern(String),
}

impl ConstraintSpec {
    fn from_constraint(constraint: &Constraint) -> Self {
        match constraint {
            Constraint::MinLength(n) => ConstraintSpec::MinLength(*n),
            Constraint::MaxLength(n) => ConstraintSpec::MaxLength(*n),
            Constraint::Gt(b) => ConstraintSpec::Gt(*b),
            Constraint::Ge(b) => ConstraintSpec::Ge(*b),
            Constraint::Lt(b) => ConstraintSpec::Lt(*b),
            Constraint::Le(b) => ConstraintSpec::Le(*b),
            Constraint::Pattern(re) => ConstraintSpec::Pattern(re.as_str().to_string()),
        }
    }

    fn into_constraint(self) -> Result<Constraint, String> {
        Ok(match self {
            ConstraintSpec::MinLength(n) => Constraint::MinLength(n),
            ConstraintSpec::MaxLength(n) => Constraint::MaxLength(n),
            ConstraintSpec::Gt(b) => Constraint::Gt(b),
            ConstraintSpec::Ge(b) => Constraint::Ge(b),
            ConstraintSpec::Lt(b) => Constraint::Lt(b),
            ConstraintSpec::Le(b) => Constraint::Le(b),
            ConstraintSpec::Pattern(source) => Constraint::Pattern(
                Regex::new(&source).map_err(|e| format!("invalid pattern '{}': {}", source, e))?,
            ),
        })
    }
}

/// Serializable form of one field definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Internal field name
    pub name: String,
    /// Declared type
    #[serde(flatten)]
    pub declared: DeclaredType,
    /// Literal default value; `null` is a valid default and distinct from
    /// having no default at all
    #[serde(
        default,
        deserialize_with = "some_value",
        skip_serializing_if = "Option::is_none"
    )]
    pub default: Option<Value>,
    /// Whether the default runs the full field pipeline
    #[serde(default)]
    pub validate_default: bool,
    /// General alias (input and output)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Input-only alias; requires `serialization_alias`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation_alias: Option<String>,
    /// Output-only alias; requires `validation_alias`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization_alias: Option<String>,
    /// Ordered constraints
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<ConstraintSpec>,
}

/// A present key always deserializes to `Some`, even when its value is
/// `null`. An absent key hits `#[serde(default)]` and stays `None`.
fn some_value<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl FieldSpec {
    fn from_field(field: &FieldDescriptor) -> Self {
        let (alias, validation_alias, serialization_alias) = match field.alias_policy() {
            AliasPolicy::None => (None, None, None),
            AliasPolicy::General(alias) => (Some(alias.clone()), None, None),
            AliasPolicy::Split {
                validation,
                serialization,
            } => (None, Some(validation.clone()), Some(serialization.clone())),
        };
        Self {
            name: field.name().to_string(),
            declared: field.declared().clone(),
            default: match field.default_policy() {
                DefaultPolicy::Value(value) => Some(value.clone()),
                _ => None,
            },
            validate_default: field.validate_default(),
            alias,
            validation_alias,
            serialization_alias,
            constraints: field
                .constraints()
                .iter()
                .map(ConstraintSpec::from_constraint)
                .collect(),
        }
    }

    fn into_builder(self) -> Result<FieldBuilder, String> {
        let mut builder = FieldBuilder::new(self.name.clone(), self.declared);

        if let Some(default) = self.default {
            builder = builder.default_value(default);
        }
        builder = builder.validate_default(self.validate_default);

        builder = match (self.alias, self.validation_alias, self.serialization_alias) {
            (None, None, None) => builder,
            (Some(alias), None, None) => builder.alias(alias),
            (None, Some(validation), Some(serialization)) => {
                builder.aliases(validation, serialization)
            }
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(format!(
                    "field '{}' mixes a general alias with split aliases",
                    self.name
                ))
            }
            (None, Some(_), None) | (None, None, Some(_)) => {
                return Err(format!(
                    "field '{}' needs both validation and serialization aliases",
                    self.name
                ))
            }
        };

        for spec in self.constraints {
            let constraint = spec.into_constraint()?;
            builder = match constraint {
                Constraint::MinLength(n) => builder.min_length(n),
                Constraint::MaxLength(n) => builder.max_length(n),
                Constraint::Gt(b) => builder.gt(b),
                Constraint::Ge(b) => builder.ge(b),
                Constraint::Lt(b) => builder.lt(b),
                Constraint::Le(b) => builder.le(b),
                Constraint::Pattern(re) => builder.pattern(re),
            };
        }

        Ok(builder)
    }
}

/// A complete persisted model definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelFile {
    /// Model name
    pub model: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Field definitions in declaration order
    pub fields: Vec<FieldSpec>,
}

impl ModelFile {
    /// Captures the data-only subset of a descriptor.
    ///
    /// Factory defaults and validator functions are not representable and
    /// are omitted.
    pub fn from_model(model: &ModelDescriptor) -> Self {
        Self {
            model: model.name().to_string(),
            description: model.description().map(String::from),
            fields: model.fields().iter().map(FieldSpec::from_field).collect(),
        }
    }

    /// Rebuilds a descriptor from the persisted definition.
    pub fn into_model(self) -> Result<ModelDescriptor, String> {
        let mut builder = ModelDescriptor::builder(self.model);
        if let Some(description) = self.description {
            builder = builder.description(description);
        }
        for spec in self.fields {
            builder = builder.field(spec.into_builder()?);
        }
        builder.build().map_err(|e| e.to_string())
    }
}
