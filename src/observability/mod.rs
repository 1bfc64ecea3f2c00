//! Observability for formcast
//!
//! Structured JSON logging for the registry's load and register paths.
//!
//! # Principles
//!
//! 1. One log line = one event
//! 2. Deterministic key ordering
//! 3. Synchronous, no buffering, no background threads
//! 4. The engine itself never logs: construction failures are returned as
//!    values and the caller decides what to do with them

mod logger;

pub use logger::{Logger, Severity};
