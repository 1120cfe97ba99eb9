//! Type expression compiler
//!
//! Recursive descent over the expression string. Constructs are tried in a
//! fixed order and the first match wins:
//!
//! 1. union `A|B`
//! 2. intersection `A&B`
//! 3. wildcard `*`
//! 4. `array<T>` / `Array.<T>`
//! 5. `T[]`
//! 6. `object<K,V>` / `Object.<K,V>`
//! 7. `{}`
//! 8. `{key:T, bare}`
//! 9. `promise<T>` / `Promise.<T>` (the result type is not checked)
//! 10. registered type name
//!
//! Separators (`|`, `&`, `,`, `:`) only count at bracket depth zero, so
//! `Object.<string, string>|{foo:string}` splits into two union operands and
//! `{a:{b:number}}` keeps its nested shape intact.

use crate::aggregate;
use crate::compiled::{CompiledTest, Predicate, ShapeTest};
use crate::error::{TypeError, TypeResult};
use crate::registry::TypeRegistry;
use crate::result::Outcome;

/// Compiles expressions against the named types of a registry
pub struct Compiler<'r> {
    registry: &'r TypeRegistry,
}

impl<'r> Compiler<'r> {
    /// Create a compiler resolving names through `registry`
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self { registry }
    }

    /// Compile a type expression
    pub fn compile(&self, expression: &str) -> TypeResult<CompiledTest> {
        let ty = expression.trim();
        tracing::trace!(expression = ty, "compiling type expression");

        if ty.is_empty() || !is_balanced(ty) {
            return Err(TypeError::unknown(ty));
        }

        let operands = split_top_level(ty, '|');
        if operands.len() > 1 {
            return self.compile_union(ty, &operands);
        }

        let operands = split_top_level(ty, '&');
        if operands.len() > 1 {
            return self.compile_intersection(ty, &operands);
        }

        if ty == "*" {
            return Ok(CompiledTest::Predicate(Predicate::always()));
        }

        if let Some(item) = generic_argument(ty, "array") {
            return self.compile_array(ty, item);
        }

        if let Some(item) = ty.strip_suffix("[]") {
            return self.compile_array(ty, item.trim());
        }

        if let Some(arguments) = generic_argument(ty, "object") {
            if let Some((key, value)) = split_once_top_level(arguments, ',') {
                return self.compile_map(ty, key.trim(), value.trim());
            }
        }

        if let Some(body) = enclosed(ty, '{', '}') {
            if body.is_empty() {
                return Ok(is_object());
            }
            return self.compile_shape(body);
        }

        if let Some(result_type) = generic_argument(ty, "promise") {
            tracing::warn!(
                result_type,
                "Tried to assert a promise with asynchronous result type \"{}\", which is ignored.",
                result_type
            );
            return self.compile("Promise");
        }

        if let Some(test) = self.registry.get(ty) {
            return Ok(test.clone());
        }

        Err(TypeError::unknown(ty))
    }

    /// Compile the expression of a named type.
    ///
    /// With `accept_undefined_properties`, the shapes the expression is made
    /// of tolerate undeclared properties: the expression itself when it is a
    /// shape, and the shape operands of its top-level unions and
    /// intersections. Shapes nested in properties, arrays or maps stay strict.
    pub fn compile_definition(
        &self,
        expression: &str,
        accept_undefined_properties: bool,
    ) -> TypeResult<CompiledTest> {
        if accept_undefined_properties {
            self.compile_loose(expression)
        } else {
            self.compile(expression)
        }
    }

    fn compile_loose(&self, expression: &str) -> TypeResult<CompiledTest> {
        let ty = expression.trim();
        if ty.is_empty() || !is_balanced(ty) {
            return Err(TypeError::unknown(ty));
        }

        for (sep, combine) in [('|', union as Combine), ('&', intersection as Combine)] {
            let operands = split_top_level(ty, sep);
            if operands.len() > 1 {
                let compiled = operands
                    .iter()
                    .map(|operand| {
                        let operand = operand.trim();
                        self.compile_loose(operand).map(|test| (operand.to_string(), test))
                    })
                    .collect::<TypeResult<Vec<_>>>()?;
                return Ok(combine(ty, compiled));
            }
        }

        Ok(match self.compile(ty)? {
            CompiledTest::Shape(shape) => CompiledTest::Shape(shape.with_accept_undefined_properties(true)),
            other => other,
        })
    }

    fn compile_union(&self, ty: &str, operands: &[&str]) -> TypeResult<CompiledTest> {
        Ok(union(ty, self.compile_operands(operands)?))
    }

    fn compile_intersection(&self, ty: &str, operands: &[&str]) -> TypeResult<CompiledTest> {
        Ok(intersection(ty, self.compile_operands(operands)?))
    }

    fn compile_operands(&self, operands: &[&str]) -> TypeResult<Vec<(String, CompiledTest)>> {
        operands
            .iter()
            .map(|operand| {
                let operand = operand.trim();
                self.compile(operand).map(|test| (operand.to_string(), test))
            })
            .collect()
    }

    fn compile_array(&self, ty: &str, item_type: &str) -> TypeResult<CompiledTest> {
        let item_test = self.compile(item_type)?;
        let item_type = item_type.to_string();
        let expression = ty.to_string();
        Ok(CompiledTest::Predicate(Predicate::new(move |value| {
            if !value.is_array() {
                return Ok(Outcome::Bool(false));
            }
            Ok(aggregate::every_array_item(value, &item_test, &item_type, &expression).into())
        })))
    }

    fn compile_map(&self, ty: &str, key_type: &str, value_type: &str) -> TypeResult<CompiledTest> {
        let key_test = self.compile(key_type)?;
        let value_test = self.compile(value_type)?;
        let key_type = key_type.to_string();
        let value_type = value_type.to_string();
        let expression = ty.to_string();
        Ok(CompiledTest::Predicate(Predicate::new(move |value| {
            if !value.is_object() {
                return Ok(Outcome::Bool(false));
            }
            Ok(aggregate::every_object_entry(
                value,
                (&key_test, &key_type),
                (&value_test, &value_type),
                &expression,
            )
            .into())
        })))
    }

    fn compile_shape(&self, body: &str) -> TypeResult<CompiledTest> {
        let mut shape = ShapeTest::new();
        for entry in split_top_level(body, ',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, property_type) = match split_once_top_level(entry, ':') {
                Some((key, property_type)) => (key.trim(), property_type.trim()),
                None => (entry, "*"),
            };
            let key = unquote(key);
            if key.is_empty() {
                return Err(TypeError::unknown(entry));
            }
            let test = self.compile(property_type)?;
            shape.insert(key, property_type, test);
        }
        Ok(CompiledTest::Shape(shape))
    }
}

fn is_object() -> CompiledTest {
    CompiledTest::Predicate(Predicate::new(|value| Ok(Outcome::Bool(value.is_object()))))
}

type Combine = fn(&str, Vec<(String, CompiledTest)>) -> CompiledTest;

fn union(ty: &str, branches: Vec<(String, CompiledTest)>) -> CompiledTest {
    let expression = ty.to_string();
    CompiledTest::Predicate(Predicate::new(move |value| {
        Ok(aggregate::any_branch(value, &branches, &expression).into())
    }))
}

/// Shape operands fold into one shape checked under the whole expression,
/// ahead of the other operands
fn intersection(ty: &str, compiled: Vec<(String, CompiledTest)>) -> CompiledTest {
    let expression = ty.to_string();

    let mut merged: Option<ShapeTest> = None;
    let mut others = Vec::new();
    for (operand, test) in compiled {
        match test {
            CompiledTest::Shape(shape) => match merged.as_mut() {
                Some(acc) => acc.merge(&shape),
                None => merged = Some(shape),
            },
            other => others.push((operand, other)),
        }
    }

    let mut branches = Vec::with_capacity(others.len() + 1);
    if let Some(shape) = merged {
        branches.push((expression.clone(), CompiledTest::Shape(shape)));
    }
    branches.extend(others);

    CompiledTest::Predicate(Predicate::new(move |value| {
        Ok(aggregate::every_branch(value, &branches, &expression).into())
    }))
}

// ============================================================================
// Lexical helpers
// ============================================================================

fn closing(open: char) -> Option<char> {
    match open {
        '<' => Some('>'),
        '{' => Some('}'),
        '(' => Some(')'),
        '[' => Some(']'),
        _ => None,
    }
}

fn is_closing(c: char) -> bool {
    matches!(c, '>' | '}' | ')' | ']')
}

/// Every bracket is closed by its own kind, in order
fn is_balanced(s: &str) -> bool {
    let mut stack = Vec::new();
    for c in s.chars() {
        if let Some(close) = closing(c) {
            stack.push(close);
        } else if is_closing(c) && stack.pop() != Some(c) {
            return false;
        }
    }
    stack.is_empty()
}

/// Split on `sep` where the bracket depth is zero. Input must be balanced.
fn split_top_level(s: &str, sep: char) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, c) in s.char_indices() {
        if closing(c).is_some() {
            depth += 1;
        } else if is_closing(c) {
            depth = depth.saturating_sub(1);
        } else if c == sep && depth == 0 {
            parts.push(&s[start..i]);
            start = i + c.len_utf8();
        }
    }
    parts.push(&s[start..]);
    parts
}

/// Split at the first top-level `sep`
fn split_once_top_level(s: &str, sep: char) -> Option<(&str, &str)> {
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if closing(c).is_some() {
            depth += 1;
        } else if is_closing(c) {
            depth = depth.saturating_sub(1);
        } else if c == sep && depth == 0 {
            return Some((&s[..i], &s[i + c.len_utf8()..]));
        }
    }
    None
}

/// Trimmed inside of `s` if `s` is exactly one `open ... close` group
fn enclosed(s: &str, open: char, close: char) -> Option<&str> {
    if !s.starts_with(open) || !s.ends_with(close) {
        return None;
    }
    let mut depth = 0usize;
    for (i, c) in s.char_indices() {
        if closing(c).is_some() {
            depth += 1;
        } else if is_closing(c) {
            depth = depth.saturating_sub(1);
            if depth == 0 {
                return (i + c.len_utf8() == s.len()).then(|| s[1..i].trim());
            }
        }
    }
    None
}

/// Argument of `keyword<...>`, `Keyword<...>`, `keyword.<...>` or `Keyword.<...>`
fn generic_argument<'a>(ty: &'a str, keyword: &str) -> Option<&'a str> {
    let mut capitalized = keyword.to_string();
    if let Some(first) = capitalized.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    let rest = ty
        .strip_prefix(keyword)
        .or_else(|| ty.strip_prefix(capitalized.as_str()))?
        .trim_start();
    let rest = rest.strip_prefix('.').map(str::trim_start).unwrap_or(rest);
    enclosed(rest, '<', '>')
}

fn unquote(key: &str) -> &str {
    for quote in ['"', '\''] {
        if key.len() >= 2 && key.starts_with(quote) && key.ends_with(quote) {
            return &key[1..key.len() - 1];
        }
    }
    key
}
