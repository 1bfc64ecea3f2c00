//! formcast - a strict, declarative record validation and coercion engine
//!
//! Raw untyped mappings become validated, immutable, typed instances:
//! descriptors declare fields with types, defaults, aliases, constraints,
//! and ordered validator phases; the engine runs the full pipeline per
//! call and aggregates every field failure into one structured report.

pub mod coerce;
pub mod descriptor;
pub mod engine;
pub mod instance;
pub mod observability;
pub mod registry;
pub mod serialize;
