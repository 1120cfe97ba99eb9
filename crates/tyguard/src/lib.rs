//! Tyguard: runtime structural type checking
//!
//! This crate checks dynamic values against JSDoc-style type expressions:
//! - **Expressions**: `string|number`, `{x:number, y:number}`, `Point[]`,
//!   `Object.<string, number>`, `A & {extra:string}` (`compiler` module)
//! - **Results**: structured, nested failure reports (`result` module)
//! - **Registry**: named types, aliases and the built-ins (`registry` module)
//! - **Config**: types declared in `tyguard.toml` (`config` module)
//!
//! # Example
//!
//! ```rust,ignore
//! use tyguard::{TypeRegistry, Value};
//!
//! let mut types = TypeRegistry::new();
//! types.define_type("Point", "{x:number, y:number}")?;
//!
//! let point = Value::object([("x", 1), ("y", 2)]);
//! assert!(types.test(&point, "Point")?);
//!
//! let bad = Value::object([("x", Value::from(1)), ("y", Value::from("2"))]);
//! let result = types.check(&bad, "Point")?;
//! println!("{}", result);
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// ============================================================================
// Core Modules
// ============================================================================

pub mod aggregate;
pub mod class;
pub mod compiled;
pub mod compiler;
pub mod error;
pub mod evaluator;
pub mod registry;
pub mod result;
pub mod stringify;
pub mod value;

// ============================================================================
// Configuration
// ============================================================================

pub mod config;

// ============================================================================
// Re-exports
// ============================================================================

pub use class::{instance_test, property_types_of, Class};
pub use compiled::{CompiledTest, Definition, Predicate, PredicateError, ShapeProperty, ShapeTest};
pub use compiler::Compiler;
pub use config::{ConfigError, RegistryConfig, RegistrySettings, TypeSpec};
pub use error::{TypeError, TypeResult};
pub use evaluator::evaluate;
pub use registry::{shared, TypeOptions, TypeRegistry};
pub use result::{Outcome, TestResult};
pub use stringify::{stringify, stringify_with, StringifyOptions};
pub use value::{is_promise, Array, ErrorValue, Function, Object, Symbol, Value};
