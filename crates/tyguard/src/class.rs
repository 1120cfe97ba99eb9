//! Class descriptors
//!
//! A `Class` is a named prototype: a set of members shared by its instances.
//! Two helpers turn a class into type definitions: `property_types_of`
//! describes the prototype as a property map (useful for interface-like
//! classes that are never instantiated), and `instance_test` matches values
//! created from exactly that class.

use indexmap::IndexMap;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::compiled::Definition;
use crate::value::Value;

static NEXT_CLASS_ID: AtomicU64 = AtomicU64::new(1);

/// A named class with prototype members
#[derive(Clone)]
pub struct Class {
    id: u64,
    name: Rc<str>,
    prototype: Rc<IndexMap<String, Value>>,
}

impl Class {
    /// Create a class from its prototype members
    pub fn new<I, K>(name: &str, prototype: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            id: NEXT_CLASS_ID.fetch_add(1, Ordering::Relaxed),
            name: Rc::from(name),
            prototype: Rc::new(prototype.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Class name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Prototype members in declaration order
    pub fn prototype(&self) -> &IndexMap<String, Value> {
        &self.prototype
    }

    /// Unique class identity
    pub fn id(&self) -> u64 {
        self.id
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl std::fmt::Debug for Class {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Class({})", self.name)
    }
}

/// Map every prototype member to the name of its built-in type.
///
/// Members that are not functions, arrays, objects, strings, numbers or
/// booleans (e.g. `undefined` placeholders) are left out.
pub fn property_types_of(class: &Class) -> IndexMap<String, String> {
    class
        .prototype()
        .iter()
        .filter_map(|(key, member)| {
            let ty = match member {
                Value::Function(_) => "function",
                Value::Array(_) => "array",
                v if v.is_object() => "object",
                Value::String(_) => "string",
                Value::Number(_) => "number",
                Value::Bool(_) => "boolean",
                _ => return None,
            };
            Some((key.clone(), ty.to_string()))
        })
        .collect()
}

/// Predicate definition matching instances of `class`
pub fn instance_test(class: &Class) -> Definition {
    let id = class.id();
    Definition::predicate(move |value: &Value| match value {
        Value::Object(object) => object.class().is_some_and(|c| c.id() == id),
        _ => false,
    })
}
