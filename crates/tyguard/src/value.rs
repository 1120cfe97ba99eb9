//! Dynamic value model
//!
//! `Value` is the universe of things a type expression can be tested
//! against. It mirrors the loose JavaScript value space the expressions were
//! designed for: primitives, functions, dates, error objects, arrays and
//! plain objects. Arrays and objects are shared and interior-mutable so that
//! self-referential structures can be built and handed to the checker.

use indexmap::IndexMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::class::Class;
use crate::stringify::stringify;

// ============================================================================
// Value
// ============================================================================

/// A dynamically typed value
#[derive(Clone)]
pub enum Value {
    /// The `undefined` value
    Undefined,
    /// The `null` value
    Null,
    /// A boolean
    Bool(bool),
    /// A number (IEEE 754 double precision, NaN included)
    Number(f64),
    /// A string
    String(String),
    /// A unique symbol
    Symbol(Symbol),
    /// A callable value
    Function(Function),
    /// A date, as milliseconds since the Unix epoch
    Date(f64),
    /// An error-family value (`Error`, `TypeError`, ...)
    Error(ErrorValue),
    /// An ordered list of values
    Array(Array),
    /// A property map, optionally an instance of a class
    Object(Object),
}

impl Value {
    // ========================================================================
    // Constructors
    // ========================================================================

    /// Create a string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(s.into())
    }

    /// Create a number value
    pub fn number(n: impl Into<f64>) -> Self {
        Value::Number(n.into())
    }

    /// Create an array value from its items
    pub fn array<I>(items: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        Value::Array(Array::from_iter(items.into_iter().map(Into::into)))
    }

    /// Create a plain object from `(key, value)` pairs, preserving order
    pub fn object<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let object = Object::new();
        for (key, value) in entries {
            object.set(key, value);
        }
        Value::Object(object)
    }

    /// Create a named function value
    pub fn function(name: impl Into<String>) -> Self {
        Value::Function(Function::new(name))
    }

    /// Create a fresh symbol with a description
    pub fn symbol(description: impl Into<String>) -> Self {
        Value::Symbol(Symbol::new(Some(description.into())))
    }

    /// Create a date from milliseconds since the Unix epoch
    pub fn date(millis: f64) -> Self {
        Value::Date(millis)
    }

    /// Create an error-family value, e.g. `Value::error("RangeError", "out of range")`
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Value::Error(ErrorValue::new(kind, message))
    }

    /// Create a promise-like value: an object whose `then` member is callable
    pub fn promise() -> Self {
        let object = Object::new();
        object.set("then", Value::function("then"));
        object.set("catch", Value::function("catch"));
        Value::Object(object)
    }

    // ========================================================================
    // Type checks
    // ========================================================================

    /// Name of the runtime kind of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Undefined => "undefined",
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Symbol(_) => "symbol",
            Value::Function(_) => "function",
            Value::Date(_) => "date",
            Value::Error(_) => "error",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// Check if value is `undefined`
    pub fn is_undefined(&self) -> bool {
        matches!(self, Value::Undefined)
    }

    /// Check if value is `null`
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if value is a boolean
    pub fn is_bool(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Check if value is a number (NaN counts)
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    /// Check if value is a string
    pub fn is_string(&self) -> bool {
        matches!(self, Value::String(_))
    }

    /// Check if value is a symbol
    pub fn is_symbol(&self) -> bool {
        matches!(self, Value::Symbol(_))
    }

    /// Check if value is callable
    pub fn is_function(&self) -> bool {
        matches!(self, Value::Function(_))
    }

    /// Check if value is a date
    pub fn is_date(&self) -> bool {
        matches!(self, Value::Date(_))
    }

    /// Check if value is an array
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// Check if value belongs to the error family
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// Loose object check: arrays, plain objects, functions, dates and
    /// errors are all objects; primitives are not.
    pub fn is_object(&self) -> bool {
        matches!(
            self,
            Value::Function(_) | Value::Date(_) | Value::Error(_) | Value::Array(_) | Value::Object(_)
        )
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Own enumerable keys: property names for objects, indices for arrays
    pub fn own_keys(&self) -> Vec<String> {
        match self {
            Value::Object(object) => object.keys(),
            Value::Array(array) => (0..array.len()).map(|i| i.to_string()).collect(),
            _ => Vec::new(),
        }
    }

    /// Own enumerable `(key, value)` pairs, in key order
    pub fn own_entries(&self) -> Vec<(String, Value)> {
        match self {
            Value::Object(object) => object.entries(),
            Value::Array(array) => array
                .to_vec()
                .into_iter()
                .enumerate()
                .map(|(i, item)| (i.to_string(), item))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Look up a member by key (object property or array index)
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Object(object) => object.get(key),
            Value::Array(array) => key.parse::<usize>().ok().and_then(|i| array.get(i)),
            _ => None,
        }
    }

    /// Identity of a shared container, used for cycle detection
    pub(crate) fn identity(&self) -> Option<usize> {
        match self {
            Value::Array(array) => Some(array.identity()),
            Value::Object(object) => Some(object.identity()),
            _ => None,
        }
    }
}

impl Default for Value {
    fn default() -> Self {
        Value::Undefined
    }
}

impl PartialEq for Value {
    /// Strict equality: primitives by value, containers by identity
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Undefined, Value::Undefined) | (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Symbol(a), Value::Symbol(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Date(a), Value::Date(b)) => a == b,
            (Value::Error(a), Value::Error(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a.identity() == b.identity(),
            (Value::Object(a), Value::Object(b)) => a.identity() == b.identity(),
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stringify(self))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", stringify(self))
    }
}

// ============================================================================
// Conversions
// ============================================================================

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Array(Array::from_iter(items))
    }
}

impl From<Array> for Value {
    fn from(array: Array) -> Self {
        Value::Array(array)
    }
}

impl From<Object> for Value {
    fn from(object: Object) -> Self {
        Value::Object(object)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::object(map),
        }
    }
}

/// Promise-like check: the value has a callable `then` member.
///
/// Shallow on purpose; nothing is awaited and the resolved value is not
/// inspected.
pub fn is_promise(value: &Value) -> bool {
    matches!(value.get("then"), Some(Value::Function(_)))
}

// ============================================================================
// Symbol / Function / ErrorValue
// ============================================================================

/// A unique symbol; two symbols are equal only if they are the same symbol
#[derive(Clone)]
pub struct Symbol(Rc<Option<String>>);

impl Symbol {
    /// Create a fresh symbol
    pub fn new(description: Option<String>) -> Self {
        Symbol(Rc::new(description))
    }

    /// The symbol's description, if any
    pub fn description(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// A callable value; identity matters, the body does not
#[derive(Clone)]
pub struct Function(Rc<String>);

impl Function {
    /// Create a function with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Function(Rc::new(name.into()))
    }

    /// Function name (may be empty for anonymous functions)
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// An error-family value
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorValue {
    kind: String,
    message: String,
}

impl ErrorValue {
    /// Create an error value of the given kind (`"Error"`, `"TypeError"`, ...)
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Kind name, e.g. `RangeError`
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Error message
    pub fn message(&self) -> &str {
        &self.message
    }
}

// ============================================================================
// Array
// ============================================================================

/// Shared, mutable list of values
#[derive(Clone, Default)]
pub struct Array(Rc<RefCell<Vec<Value>>>);

impl Array {
    /// Create an empty array
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item
    pub fn push(&self, item: impl Into<Value>) {
        self.0.borrow_mut().push(item.into());
    }

    /// Item at `index`, if present
    pub fn get(&self, index: usize) -> Option<Value> {
        self.0.borrow().get(index).cloned()
    }

    /// Number of items
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether the array is empty
    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Snapshot of the items
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().clone()
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

impl FromIterator<Value> for Array {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Array(Rc::new(RefCell::new(iter.into_iter().collect())))
    }
}

impl FromIterator<Value> for Value {
    fn from_iter<T: IntoIterator<Item = Value>>(iter: T) -> Self {
        Value::Array(Array::from_iter(iter))
    }
}

// ============================================================================
// Object
// ============================================================================

#[derive(Default)]
struct ObjectData {
    class: Option<Class>,
    properties: IndexMap<String, Value>,
}

/// Shared, mutable, insertion-ordered property map
#[derive(Clone, Default)]
pub struct Object(Rc<RefCell<ObjectData>>);

impl Object {
    /// Create an empty plain object
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty instance of `class`
    pub fn instance_of(class: &Class) -> Self {
        let object = Self::new();
        object.0.borrow_mut().class = Some(class.clone());
        object
    }

    /// Set (or overwrite) a property
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.borrow_mut().properties.insert(key.into(), value.into());
    }

    /// Remove a property, returning its previous value
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.0.borrow_mut().properties.shift_remove(key)
    }

    /// Property value, if present
    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Whether the object has its own property `key`
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().properties.contains_key(key)
    }

    /// Own property names in insertion order
    pub fn keys(&self) -> Vec<String> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// Own `(key, value)` pairs in insertion order
    pub fn entries(&self) -> Vec<(String, Value)> {
        self.0
            .borrow()
            .properties
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Number of own properties
    pub fn len(&self) -> usize {
        self.0.borrow().properties.len()
    }

    /// Whether the object has no own properties
    pub fn is_empty(&self) -> bool {
        self.0.borrow().properties.is_empty()
    }

    /// Class this object was instantiated from, if any
    pub fn class(&self) -> Option<Class> {
        self.0.borrow().class.clone()
    }

    pub(crate) fn identity(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_loose_object_check() {
        assert!(Value::array(Vec::<Value>::new()).is_object());
        assert!(Value::object(Vec::<(String, Value)>::new()).is_object());
        assert!(Value::function("f").is_object());
        assert!(Value::date(0.0).is_object());
        assert!(Value::error("Error", "boom").is_object());
        assert!(!Value::Null.is_object());
        assert!(!Value::string("x").is_object());
        assert!(!Value::Number(1.0).is_object());
    }

    #[test]
    fn test_own_keys_of_array_are_indices() {
        let value = Value::array(["a", "b"]);
        assert_eq!(value.own_keys(), vec!["0", "1"]);
        assert_eq!(value.get("1"), Some(Value::string("b")));
    }

    #[test]
    fn test_object_preserves_insertion_order() {
        let value = Value::object([("z", 1), ("a", 2), ("m", 3)]);
        assert_eq!(value.own_keys(), vec!["z", "a", "m"]);
    }

    #[test]
    fn test_container_equality_is_identity() {
        let a = Value::object([("x", 1)]);
        let b = Value::object([("x", 1)]);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_symbols_are_unique() {
        let a = Value::symbol("id");
        let b = Value::symbol("id");
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_json() {
        let json = serde_json::json!({"name": "x", "tags": ["a", 1], "ok": true, "none": null});
        let value = Value::from(json);
        assert!(value.get("name").is_some_and(|v| v.is_string()));
        assert!(value.get("tags").is_some_and(|v| v.is_array()));
        assert_eq!(value.get("ok"), Some(Value::Bool(true)));
        assert_eq!(value.get("none"), Some(Value::Null));
    }

    #[test]
    fn test_from_json_keeps_document_key_order() {
        let json: serde_json::Value = serde_json::from_str(r#"{"zeta":1,"alpha":2,"mid":3}"#).unwrap();
        let value = Value::from(json);
        assert_eq!(value.own_keys(), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_is_promise() {
        assert!(is_promise(&Value::promise()));
        assert!(!is_promise(&Value::object([("then", "later")])));
        assert!(!is_promise(&Value::Null));
    }

    #[test]
    fn test_self_reference_can_be_built() {
        let object = Object::new();
        object.set("self", Value::Object(object.clone()));
        let value = Value::Object(object);
        assert_eq!(value.get("self"), Some(value.clone()));
    }
}
