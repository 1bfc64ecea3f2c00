//! Instance serialization
//!
//! Projects a validated instance back to an ordered mapping. Keys are
//! internal field names, or each field's effective output key when
//! serializing with aliases (serialization alias, else general alias,
//! else field name). Output order is always field-declaration order.
//!
//! Round-tripping through aliased serialization re-validates to an equal
//! instance only when a model's validation and serialization aliases
//! agree; with split aliases the output keys are not readable as input.

use serde_json::{Map, Value};

use crate::descriptor::ModelDescriptor;
use crate::instance::ValidatedInstance;

/// Serializes an instance of the given model.
///
/// The instance must originate from `model`; passing a foreign instance
/// is a caller bug.
pub fn serialize(
    model: &ModelDescriptor,
    instance: &ValidatedInstance,
    use_aliases: bool,
) -> Map<String, Value> {
    debug_assert_eq!(model.name(), instance.model());
    let mut out = Map::new();
    for field in model.fields() {
        if let Some(value) = instance.get(field.name()) {
            let key = if use_aliases {
                field.output_key()
            } else {
                field.name()
            };
            out.insert(key.to_string(), value.clone());
        }
    }
    out
}
