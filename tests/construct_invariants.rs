//! Construction Invariant Tests
//!
//! End-to-end checks of the engine's contract:
//! - Every invalid field is reported, in declaration order
//! - Aliases resolve with validation/serialization precedence
//! - Defaults bypass validation unless explicitly opted in
//! - Constraint bounds are explicit about inclusivity
//! - Model gates short-circuit; field errors aggregate

use formcast::descriptor::{DeclaredType, FieldBuilder, ModelDescriptor};
use formcast::engine::{construct, ErrorKind};
use formcast::serialize::serialize;
use serde_json::{json, Value};

// =============================================================================
// Helper Models
// =============================================================================

fn product_model() -> ModelDescriptor {
    ModelDescriptor::builder("product")
        .field(FieldBuilder::new("name", DeclaredType::String).min_length(1).max_length(50))
        .field(FieldBuilder::new("price", DeclaredType::Float).gt(0.0))
        .field(
            FieldBuilder::new("description", DeclaredType::optional(DeclaredType::String))
                .default_value(json!(null))
                .max_length(300),
        )
        .build()
        .unwrap()
}

// =============================================================================
// Aggregation Tests
// =============================================================================

/// Two invalid fields produce two field errors, never fewer.
#[test]
fn test_all_invalid_fields_reported() {
    let model = product_model();

    let err = construct(&model, &json!({"name": "", "price": -10})).unwrap_err();
    assert_eq!(err.error_count(), 2);
    assert_eq!(err.errors()[0].path(), "name");
    assert_eq!(err.errors()[1].path(), "price");
}

/// Errors come back in field-declaration order regardless of input order.
#[test]
fn test_errors_follow_declaration_order() {
    let model = ModelDescriptor::builder("user")
        .field(FieldBuilder::new("name", DeclaredType::String))
        .field(FieldBuilder::new("age", DeclaredType::Int))
        .field(FieldBuilder::new("is_active", DeclaredType::Bool))
        .build()
        .unwrap();

    // age fails coercion, name is absent, is_active fails coercion
    let err = construct(&model, &json!({"is_active": "nope", "age": "twenty"})).unwrap_err();
    let paths: Vec<&str> = err.errors().iter().map(|e| e.path()).collect();
    assert_eq!(paths, vec!["name", "age", "is_active"]);
    assert_eq!(err.errors()[0].kind(), &ErrorKind::Missing);
}

/// All violated constraints of one field are reported together.
#[test]
fn test_constraint_violations_batched_within_field() {
    let model = ModelDescriptor::builder("scores")
        .field(FieldBuilder::new("value", DeclaredType::Int).ge(0.0).le(100.0).gt(10.0))
        .build()
        .unwrap();

    let err = construct(&model, &json!({"value": 5})).unwrap_err();
    // 5 passes ge(0) and le(100) but fails gt(10); only that one reports
    assert_eq!(err.error_count(), 1);
    assert_eq!(
        err.errors()[0].kind(),
        &ErrorKind::ConstraintViolation("gt".into())
    );

    let err = construct(&model, &json!({"value": -3})).unwrap_err();
    // -3 fails ge(0) and gt(10) at once
    assert_eq!(err.error_count(), 2);
}

// =============================================================================
// Alias Precedence Tests
// =============================================================================

fn split_alias_model() -> ModelDescriptor {
    ModelDescriptor::builder("record")
        .field(FieldBuilder::new("a", DeclaredType::String).aliases("a_in", "a_out"))
        .build()
        .unwrap()
}

/// Input is read under the validation alias only.
#[test]
fn test_split_alias_reads_validation_alias() {
    let model = split_alias_model();
    let instance = construct(&model, &json!({"a_in": "value"})).unwrap();
    assert_eq!(instance.get_str("a"), Some("value"));
}

/// The serialization alias is not accepted as input.
#[test]
fn test_split_alias_rejects_output_key_as_input() {
    let model = split_alias_model();
    let err = construct(&model, &json!({"a_out": "value"})).unwrap_err();
    assert_eq!(err.errors()[0].kind(), &ErrorKind::Missing);
}

/// The internal field name is not accepted as input when aliased.
#[test]
fn test_split_alias_rejects_field_name_as_input() {
    let model = split_alias_model();
    let err = construct(&model, &json!({"a": "value"})).unwrap_err();
    assert_eq!(err.errors()[0].kind(), &ErrorKind::Missing);
}

/// Aliased serialization writes the serialization alias.
#[test]
fn test_split_alias_serializes_output_key() {
    let model = split_alias_model();
    let instance = construct(&model, &json!({"a_in": "value"})).unwrap();
    let out = serialize(&model, &instance, true);
    assert_eq!(out.get("a_out"), Some(&json!("value")));
    assert!(out.get("a_in").is_none());
}

/// A general alias serves both directions.
#[test]
fn test_general_alias_round_trip() {
    let model = ModelDescriptor::builder("package")
        .field(FieldBuilder::new("weight", DeclaredType::Float).alias("pkg_weight_kg"))
        .field(FieldBuilder::new("destination", DeclaredType::String).alias("pkg_dest"))
        .field(FieldBuilder::new("is_fragile", DeclaredType::Bool).alias("pkg_is_fragile"))
        .build()
        .unwrap();

    let raw = json!({"pkg_weight_kg": 4.5, "pkg_is_fragile": true, "pkg_dest": "Singapore"});
    let package = construct(&model, &raw).unwrap();
    assert_eq!(package.get_f64("weight"), Some(4.5));
    assert_eq!(package.get_str("destination"), Some("Singapore"));

    let dumped = serialize(&model, &package, true);
    let again = construct(&model, &Value::Object(dumped)).unwrap();
    assert_eq!(package, again);
}

// =============================================================================
// Default Policy Tests
// =============================================================================

/// An unvalidated default is injected verbatim, even when it does not
/// match the declared type. Documented behavior, not a bug.
#[test]
fn test_default_bypasses_validation() {
    let model = ModelDescriptor::builder("flaw_user")
        .field(FieldBuilder::new("age", DeclaredType::Int).default_value(json!("twelve")))
        .build()
        .unwrap();

    let instance = construct(&model, &json!({})).unwrap();
    assert_eq!(instance.get("age"), Some(&json!("twelve")));
}

/// Opting in with validate_default runs the default through the full
/// pipeline, where the bad value fails coercion.
#[test]
fn test_validate_default_enforces_type() {
    let model = ModelDescriptor::builder("proper_user")
        .field(
            FieldBuilder::new("age", DeclaredType::Int)
                .default_value(json!("twelve"))
                .validate_default(true),
        )
        .build()
        .unwrap();

    let err = construct(&model, &json!({})).unwrap_err();
    assert_eq!(err.error_count(), 1);
    assert_eq!(err.errors()[0].path(), "age");
    assert_eq!(err.errors()[0].kind(), &ErrorKind::TypeMismatch);
}

/// A validated default also runs constraint checks.
#[test]
fn test_validate_default_enforces_constraints() {
    let model = ModelDescriptor::builder("m")
        .field(
            FieldBuilder::new("count", DeclaredType::Int)
                .gt(0.0)
                .default_value(json!(0))
                .validate_default(true),
        )
        .build()
        .unwrap();

    let err = construct(&model, &json!({})).unwrap_err();
    assert_eq!(
        err.errors()[0].kind(),
        &ErrorKind::ConstraintViolation("gt".into())
    );
}

/// Provided input always overrides the default.
#[test]
fn test_input_overrides_default() {
    let model = ModelDescriptor::builder("book")
        .field(FieldBuilder::new("in_stock", DeclaredType::Bool).default_value(json!(true)))
        .build()
        .unwrap();

    let defaulted = construct(&model, &json!({})).unwrap();
    assert_eq!(defaulted.get_bool("in_stock"), Some(true));

    let explicit = construct(&model, &json!({"in_stock": false})).unwrap();
    assert_eq!(explicit.get_bool("in_stock"), Some(false));
}

// =============================================================================
// Constraint Boundary Tests
// =============================================================================

/// gt is strict: the bound itself is rejected.
#[test]
fn test_gt_is_strict() {
    let model = product_model();

    assert!(construct(&model, &json!({"name": "Laptop", "price": 0})).is_err());
    assert!(construct(&model, &json!({"name": "Laptop", "price": -10})).is_err());

    let ok = construct(&model, &json!({"name": "Laptop", "price": 0.01})).unwrap();
    assert_eq!(ok.get_f64("price"), Some(0.01));
}

/// Optional fields enforce constraints on present values and skip them
/// for null.
#[test]
fn test_optional_constraint_applies_to_present_values() {
    let model = ModelDescriptor::builder("m")
        .field(
            FieldBuilder::new("note", DeclaredType::optional(DeclaredType::String))
                .default_value(json!(null))
                .max_length(5),
        )
        .build()
        .unwrap();

    assert!(construct(&model, &json!({})).is_ok());
    assert!(construct(&model, &json!({"note": null})).is_ok());
    assert!(construct(&model, &json!({"note": "ok"})).is_ok());
    assert!(construct(&model, &json!({"note": "far too long"})).is_err());
}

// =============================================================================
// Model Gate Tests
// =============================================================================

/// A before-model validator can normalize the raw mapping across fields.
#[test]
fn test_before_model_gate_swaps_reversed_fields() {
    let model = ModelDescriptor::builder("delivery")
        .field(FieldBuilder::new("pickup", DeclaredType::Int))
        .field(FieldBuilder::new("drop", DeclaredType::Int))
        .before_model("swap_if_reversed", |data| {
            let pickup = data.get("pickup").and_then(Value::as_i64);
            let drop = data.get("drop").and_then(Value::as_i64);
            if let (Some(p), Some(d)) = (pickup, drop) {
                if d < p {
                    data.insert("pickup".into(), json!(d));
                    data.insert("drop".into(), json!(p));
                }
            }
            Ok(())
        })
        .build()
        .unwrap();

    let order = construct(&model, &json!({"pickup": 15, "drop": 13})).unwrap();
    assert_eq!(order.get_i64("pickup"), Some(13));
    assert_eq!(order.get_i64("drop"), Some(15));
}

/// An after-model validator rejects a cross-field inconsistency even when
/// every field validates individually.
#[test]
fn test_after_model_gate_rejects_inconsistent_instance() {
    let model = ModelDescriptor::builder("event")
        .field(FieldBuilder::new("name", DeclaredType::String))
        .field(FieldBuilder::new("start_hour", DeclaredType::Int))
        .field(FieldBuilder::new("end_hour", DeclaredType::Int))
        .after_model("check_time", |values| {
            let start = values.get("start_hour").and_then(Value::as_i64).unwrap_or(0);
            let end = values.get("end_hour").and_then(Value::as_i64).unwrap_or(0);
            if end <= start {
                return Err("end_hour must be greater than start_hour".into());
            }
            Ok(())
        })
        .build()
        .unwrap();

    let err = construct(
        &model,
        &json!({"name": "Hackathon", "start_hour": 10, "end_hour": 9}),
    )
    .unwrap_err();
    assert!(err.is_model_precondition());
    assert_eq!(err.error_count(), 1);
    assert_eq!(
        err.errors()[0].kind(),
        &ErrorKind::ModelPreconditionFailed("check_time".into())
    );

    let ok = construct(
        &model,
        &json!({"name": "Hackathon", "start_hour": 10, "end_hour": 12}),
    );
    assert!(ok.is_ok());
}

/// A before-model rejection is the sole error, superseding field errors.
#[test]
fn test_before_model_rejection_supersedes_field_errors() {
    let model = ModelDescriptor::builder("m")
        .field(FieldBuilder::new("a", DeclaredType::Int))
        .before_model("require_token", |data| {
            if data.contains_key("token") {
                Ok(())
            } else {
                Err("token is required before any field checks".into())
            }
        })
        .build()
        .unwrap();

    // "a" is also missing, but the gate wins
    let err = construct(&model, &json!({})).unwrap_err();
    assert!(err.is_model_precondition());
    assert_eq!(err.error_count(), 1);
}

// =============================================================================
// Field Validator Tests
// =============================================================================

fn ensure_list(value: &Value) -> Result<Value, String> {
    if value.is_array() {
        Ok(value.clone())
    } else {
        Ok(json!([value]))
    }
}

/// A before-field validator normalizes scalars before list coercion.
#[test]
fn test_before_field_normalizes_scalar_to_list() {
    let model = ModelDescriptor::builder("ensure_list")
        .field(
            FieldBuilder::new("numbers", DeclaredType::list(DeclaredType::Int))
                .before("ensure_list", ensure_list),
        )
        .build()
        .unwrap();

    let scalar = construct(&model, &json!({"numbers": 2})).unwrap();
    assert_eq!(scalar.get("numbers"), Some(&json!([2])));

    let mixed = construct(&model, &json!({"numbers": [1, 3, "4"]})).unwrap();
    assert_eq!(mixed.get("numbers"), Some(&json!([1, 3, 4])));
}

/// Without normalization, a bare scalar never coerces into a list.
#[test]
fn test_bare_scalar_without_normalizer_fails() {
    let model = ModelDescriptor::builder("m")
        .field(FieldBuilder::new("numbers", DeclaredType::list(DeclaredType::Int)))
        .build()
        .unwrap();

    let err = construct(&model, &json!({"numbers": 2})).unwrap_err();
    assert_eq!(err.errors()[0].kind(), &ErrorKind::TypeMismatch);
}

/// An after-field validator sees the coerced value and may reject it.
#[test]
fn test_after_field_validator_rejects_coerced_value() {
    let model = ModelDescriptor::builder("product")
        .field(FieldBuilder::new("price", DeclaredType::Float).after("must_be_positive", |v| {
            match v.as_f64() {
                Some(p) if p <= 0.0 => Err("Price must be greater than 0".into()),
                _ => Ok(v.clone()),
            }
        }))
        .build()
        .unwrap();

    let err = construct(&model, &json!({"price": -10})).unwrap_err();
    assert_eq!(
        err.errors()[0].kind(),
        &ErrorKind::ValidatorRejected("must_be_positive".into())
    );

    assert!(construct(&model, &json!({"price": 99.5})).is_ok());
}

// =============================================================================
// Determinism Tests
// =============================================================================

/// The same input constructs or fails identically every time.
#[test]
fn test_construction_is_deterministic() {
    let model = product_model();
    let good = json!({"name": "Laptop", "price": 999.99, "description": "Very cool laptop"});
    let bad = json!({"name": "", "price": -10});

    let first = construct(&model, &good).unwrap();
    for _ in 0..100 {
        assert_eq!(construct(&model, &good).unwrap(), first);
        assert_eq!(construct(&model, &bad).unwrap_err().error_count(), 2);
    }
}
