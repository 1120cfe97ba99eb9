//! Compiled tests and type definitions
//!
//! A type expression compiles to one of two shapes: a predicate over values,
//! or a property map (object-shape literal) whose entries are themselves
//! compiled tests. The distinction is resolved once at compile time; the
//! evaluator matches on the tag instead of probing at runtime.

use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::result::Outcome;
use crate::value::Value;

/// Error returned by a failing custom predicate
pub type PredicateError = Box<dyn std::error::Error + Send + Sync>;

/// Signature of a predicate body
pub type PredicateFn = dyn Fn(&Value) -> Result<Outcome, PredicateError> + Send + Sync;

// ============================================================================
// Predicate
// ============================================================================

/// Shareable predicate over values
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wrap a predicate body
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<Outcome, PredicateError> + Send + Sync + 'static,
    {
        Predicate(Arc::new(f))
    }

    /// Predicate that passes every value
    pub fn always() -> Self {
        Predicate::new(|_| Ok(Outcome::Bool(true)))
    }

    /// Invoke the predicate body
    pub fn call(&self, value: &Value) -> Result<Outcome, PredicateError> {
        (self.0)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Predicate")
    }
}

// ============================================================================
// CompiledTest
// ============================================================================

/// Executable form of a type expression
#[derive(Debug, Clone)]
pub enum CompiledTest {
    /// A predicate over the whole value
    Predicate(Predicate),
    /// An object-shape literal: one test per property
    Shape(ShapeTest),
}

impl CompiledTest {
    /// Whether this is an object-shape test
    pub fn is_shape(&self) -> bool {
        matches!(self, CompiledTest::Shape(_))
    }
}

/// One property entry of a shape
#[derive(Debug, Clone)]
pub struct ShapeProperty {
    /// Type expression the property was declared with
    pub expression: String,
    /// Compiled form of `expression`
    pub test: CompiledTest,
}

/// Property map of an object-shape literal
#[derive(Debug, Clone, Default)]
pub struct ShapeTest {
    properties: IndexMap<String, ShapeProperty>,
    accept_undefined_properties: bool,
}

impl ShapeTest {
    /// Empty shape
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a property test
    pub fn insert(&mut self, key: impl Into<String>, expression: impl Into<String>, test: CompiledTest) {
        self.properties.insert(
            key.into(),
            ShapeProperty {
                expression: expression.into(),
                test,
            },
        );
    }

    /// Property test for `key`
    pub fn get(&self, key: &str) -> Option<&ShapeProperty> {
        self.properties.get(key)
    }

    /// Declared property names, in declaration order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.properties.keys().map(String::as_str)
    }

    /// Number of declared properties
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether no property is declared
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Whether keys missing from the shape are tolerated
    pub fn accepts_undefined_properties(&self) -> bool {
        self.accept_undefined_properties
    }

    /// Set whether keys missing from the shape are tolerated
    pub fn with_accept_undefined_properties(mut self, accept: bool) -> Self {
        self.accept_undefined_properties = accept;
        self
    }

    /// Fold `other` into `self`; properties of `other` win on conflicts
    pub fn merge(&mut self, other: &ShapeTest) {
        for (key, property) in &other.properties {
            self.properties.insert(key.clone(), property.clone());
        }
        self.accept_undefined_properties |= other.accept_undefined_properties;
    }
}

// ============================================================================
// Definition
// ============================================================================

/// Input accepted by `TypeRegistry::define_type`
#[derive(Debug, Clone)]
pub enum Definition {
    /// A type expression, e.g. `"{x:number, y:number}"`
    Expression(String),
    /// A raw predicate
    Predicate(Predicate),
    /// Property name -> type expression
    Properties(IndexMap<String, String>),
}

impl Definition {
    /// Definition from an infallible predicate returning `bool` or a `TestResult`
    pub fn predicate<F, O>(f: F) -> Self
    where
        F: Fn(&Value) -> O + Send + Sync + 'static,
        O: Into<Outcome>,
    {
        Definition::Predicate(Predicate::new(move |value| Ok(f(value).into())))
    }

    /// Definition from a predicate that may fail; errors become failed results
    pub fn fallible<F, O, E>(f: F) -> Self
    where
        F: Fn(&Value) -> Result<O, E> + Send + Sync + 'static,
        O: Into<Outcome>,
        E: Into<PredicateError>,
    {
        Definition::Predicate(Predicate::new(move |value| {
            f(value).map(Into::into).map_err(Into::into)
        }))
    }

    /// Definition from `(property, type expression)` pairs
    pub fn properties<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Definition::Properties(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<&str> for Definition {
    fn from(expression: &str) -> Self {
        Definition::Expression(expression.to_string())
    }
}

impl From<String> for Definition {
    fn from(expression: String) -> Self {
        Definition::Expression(expression)
    }
}

impl From<IndexMap<String, String>> for Definition {
    fn from(properties: IndexMap<String, String>) -> Self {
        Definition::Properties(properties)
    }
}

impl From<Predicate> for Definition {
    fn from(predicate: Predicate) -> Self {
        Definition::Predicate(predicate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always() -> CompiledTest {
        CompiledTest::Predicate(Predicate::always())
    }

    #[test]
    fn test_merge_is_last_write_wins() {
        let mut left = ShapeTest::new();
        left.insert("foo", "string", always());
        left.insert("a", "*", always());

        let mut right = ShapeTest::new();
        right.insert("foo", "number", always());

        left.merge(&right);
        assert_eq!(left.get("foo").map(|p| p.expression.as_str()), Some("number"));
        assert_eq!(left.keys().collect::<Vec<_>>(), vec!["foo", "a"]);
    }

    #[test]
    fn test_merge_accepts_undefined_if_any_side_does() {
        let mut left = ShapeTest::new();
        let right = ShapeTest::new().with_accept_undefined_properties(true);
        left.merge(&right);
        assert!(left.accepts_undefined_properties());
    }

    #[test]
    fn test_fallible_definition_maps_errors() {
        let def = Definition::fallible(|v: &Value| {
            if v.is_string() {
                Ok(true)
            } else {
                Err("not a string")
            }
        });
        let Definition::Predicate(p) = def else {
            panic!("expected predicate definition");
        };
        assert_eq!(p.call(&Value::string("x")).ok(), Some(Outcome::Bool(true)));
        let err = p.call(&Value::Null).err().map(|e| e.to_string());
        assert_eq!(err.as_deref(), Some("not a string"));
    }
}
