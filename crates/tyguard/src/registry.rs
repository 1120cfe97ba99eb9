//! Type registry
//!
//! Maps type names to compiled tests and is the public entry point for
//! checking values. Built-in types are registered lazily on first use
//! unless just-in-time bootstrapping is turned off.
//!
//! ```ignore
//! let mut types = TypeRegistry::new();
//! types.define_type("Point", "{x:number, y:number}")?;
//! assert!(types.test(&point, "Point[]|Point")?);
//! ```

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use crate::compiled::{CompiledTest, Definition, Predicate, ShapeTest};
use crate::compiler::Compiler;
use crate::error::{TypeError, TypeResult};
use crate::evaluator::evaluate;
use crate::result::{Outcome, TestResult};
use crate::stringify::stringify;
use crate::value::{is_promise, Value};

/// Per-type options, fixed at definition time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeOptions {
    /// Tolerate object properties the shape does not declare
    pub accept_undefined_properties: bool,
}

impl TypeOptions {
    /// Default options
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether undeclared properties are tolerated
    pub fn accept_undefined_properties(mut self, accept: bool) -> Self {
        self.accept_undefined_properties = accept;
        self
    }
}

/// Error-family type names, most general first
const ERROR_KINDS: &[&str] = &[
    "Error",
    "EvalError",
    "RangeError",
    "ReferenceError",
    "SyntaxError",
    "TypeError",
    "URIError",
    "AggregateError",
];

/// Built-in aliases: (alias, target)
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("String", "string"),
    ("Number", "number"),
    ("Boolean", "boolean"),
    ("Symbol", "symbol"),
    ("Function", "function"),
    ("Object", "object"),
    ("Array", "array"),
    ("Promise", "promise"),
    ("date", "Date"),
    ("error", "Error"),
];

/// Named type definitions plus the checking entry points
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    tests: FxHashMap<String, CompiledTest>,
    options: FxHashMap<String, TypeOptions>,
    defaults_defined: bool,
    define_defaults_just_in_time: bool,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    /// Create an empty registry; built-ins are registered on first use
    pub fn new() -> Self {
        Self {
            tests: FxHashMap::default(),
            options: FxHashMap::default(),
            defaults_defined: false,
            define_defaults_just_in_time: true,
        }
    }

    /// Create a registry with the built-in types already registered
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.define_defaults();
        registry
    }

    /// Register the built-ins now if just-in-time bootstrap is on and has
    /// not happened yet. `test`, `check`, `assert` and the `define_*` calls
    /// do this themselves; call it before using `compile` or `evaluate` on a
    /// registry that may not be bootstrapped.
    pub fn ensure_defaults(&mut self) {
        if self.define_defaults_just_in_time && !self.defaults_defined {
            self.define_defaults();
        }
    }

    // ========================================================================
    // Checking
    // ========================================================================

    /// Whether `value` matches `type_expr`.
    ///
    /// Errors only when the expression cannot be compiled.
    pub fn test(&mut self, value: &Value, type_expr: &str) -> TypeResult<bool> {
        self.check(value, type_expr).map(|result| result.passed())
    }

    /// Full result of checking `value` against `type_expr`
    pub fn check(&mut self, value: &Value, type_expr: &str) -> TypeResult<TestResult> {
        self.ensure_defaults();
        self.evaluate(value, type_expr)
    }

    /// Fail with `TypeError::Assertion` when `value` does not match
    pub fn assert(&mut self, value: &Value, type_expr: &str) -> TypeResult<()> {
        let result = self.check(value, type_expr)?;
        if result.passed() {
            return Ok(());
        }

        let message = match result.most_specific_description() {
            Some(description) => description.to_string(),
            None => format!("Value \"{}\" is not \"{}\"", stringify(value), type_expr),
        };
        Err(TypeError::Assertion { message, result })
    }

    /// Compile an expression without bootstrapping built-ins
    pub fn compile(&self, type_expr: &str) -> TypeResult<CompiledTest> {
        Compiler::new(self).compile(type_expr)
    }

    /// Check a value without bootstrapping built-ins
    pub fn evaluate(&self, value: &Value, type_expr: &str) -> TypeResult<TestResult> {
        let test = self.compile(type_expr)?;
        Ok(evaluate(&test, value, type_expr))
    }

    // ========================================================================
    // Definitions
    // ========================================================================

    /// Define (or redefine) a named type
    pub fn define_type(&mut self, name: &str, definition: impl Into<Definition>) -> TypeResult<()> {
        self.define_type_with_options(name, definition, TypeOptions::default())
    }

    /// Define (or redefine) a named type with options
    pub fn define_type_with_options(
        &mut self,
        name: &str,
        definition: impl Into<Definition>,
        options: TypeOptions,
    ) -> TypeResult<()> {
        self.ensure_defaults();

        let name = name.trim();
        if name.is_empty() {
            return Err(TypeError::InvalidDefinition {
                name: name.to_string(),
                reason: "type name is empty".to_string(),
            });
        }

        let test = match definition.into() {
            Definition::Expression(expression) => Compiler::new(self)
                .compile_definition(&expression, options.accept_undefined_properties)?,
            Definition::Predicate(predicate) => CompiledTest::Predicate(predicate),
            Definition::Properties(properties) => {
                let mut shape = ShapeTest::new();
                for (key, expression) in properties {
                    let test = self.compile(&expression)?;
                    shape.insert(key, expression, test);
                }
                CompiledTest::Shape(shape)
            }
        };

        let test = match test {
            CompiledTest::Shape(shape) => {
                let accept = shape.accepts_undefined_properties() || options.accept_undefined_properties;
                CompiledTest::Shape(shape.with_accept_undefined_properties(accept))
            }
            other => other,
        };

        tracing::debug!(name, shape = test.is_shape(), "defined type");
        self.insert(name, test, options);
        Ok(())
    }

    /// Register `name` as another name for the already registered `target`
    pub fn define_alias(&mut self, name: &str, target: &str) -> TypeResult<()> {
        self.ensure_defaults();
        self.insert_alias(name, target)
    }

    fn insert_alias(&mut self, name: &str, target: &str) -> TypeResult<()> {
        let test = self
            .tests
            .get(target)
            .cloned()
            .ok_or_else(|| TypeError::UnknownAliasTarget {
                alias: name.to_string(),
                target: target.to_string(),
            })?;
        let options = self.options(target);
        tracing::debug!(alias = name, target, "defined alias");
        self.insert(name, test, options);
        Ok(())
    }

    fn insert(&mut self, name: &str, test: CompiledTest, options: TypeOptions) {
        self.tests.insert(name.to_string(), test);
        self.options.insert(name.to_string(), options);
    }

    /// Register the built-in types. Calling it again has no effect.
    pub fn define_defaults(&mut self) {
        if self.defaults_defined {
            return;
        }
        // set first so the inserts below cannot re-enter the bootstrap
        self.defaults_defined = true;
        tracing::debug!("defining built-in types");

        let primitives: [(&str, fn(&Value) -> bool); 11] = [
            ("string", Value::is_string),
            ("number", Value::is_number),
            ("boolean", Value::is_bool),
            ("undefined", Value::is_undefined),
            ("null", Value::is_null),
            ("symbol", Value::is_symbol),
            ("function", Value::is_function),
            ("Date", Value::is_date),
            ("array", Value::is_array),
            ("object", Value::is_object),
            ("promise", is_promise),
        ];
        for (name, check) in primitives {
            let predicate = Predicate::new(move |value| Ok(Outcome::Bool(check(value))));
            self.insert(name, CompiledTest::Predicate(predicate), TypeOptions::default());
        }

        for &kind in ERROR_KINDS {
            self.insert(kind, error_kind_test(kind), TypeOptions::default());
        }

        for &(alias, target) in DEFAULT_ALIASES {
            if let Err(error) = self.insert_alias(alias, target) {
                tracing::error!(%error, "failed to define built-in alias");
            }
        }
    }

    /// Forget every type and option, built-ins included
    pub fn reset_initial_state(&mut self) {
        tracing::debug!("resetting type registry");
        self.tests.clear();
        self.options.clear();
        self.defaults_defined = false;
    }

    /// Whether checks and definitions register the built-ins on first use
    pub fn set_define_defaults_just_in_time(&mut self, enabled: bool) {
        self.define_defaults_just_in_time = enabled;
    }

    /// Whether the built-ins are currently registered
    pub fn defaults_defined(&self) -> bool {
        self.defaults_defined
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Compiled test registered under `name`
    pub fn get(&self, name: &str) -> Option<&CompiledTest> {
        self.tests.get(name)
    }

    /// Whether `name` is registered
    pub fn contains(&self, name: &str) -> bool {
        self.tests.contains_key(name)
    }

    /// Registered names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tests.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Options `name` was defined with (defaults when unknown)
    pub fn options(&self, name: &str) -> TypeOptions {
        self.options.get(name).copied().unwrap_or_default()
    }
}

/// `Error` matches the whole family; every other kind matches itself
fn error_kind_test(kind: &'static str) -> CompiledTest {
    let predicate = Predicate::new(move |value| {
        let matches = match value {
            Value::Error(error) => kind == "Error" || error.kind() == kind,
            _ => false,
        };
        Ok(Outcome::Bool(matches))
    });
    CompiledTest::Predicate(predicate)
}

static SHARED: LazyLock<RwLock<TypeRegistry>> =
    LazyLock::new(|| RwLock::new(TypeRegistry::new()));

/// Process-wide registry for callers that do not own one
pub fn shared() -> &'static RwLock<TypeRegistry> {
    &SHARED
}
