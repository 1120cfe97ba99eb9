//! Bounded, cycle-safe rendering of values for diagnostics
//!
//! Failure descriptions embed the offending value. Inputs can be huge or
//! self-referential, so rendering is limited three ways:
//!
//! - **depth**: containers nested deeper than `max_depth` render as
//!   `[Object]` / `[Array]`
//! - **repetition**: a container seen before renders as
//!   `{"$ref":"circular#<n>"}`, `n` being the order it was first seen in
//! - **length**: output longer than `max_length` characters keeps a head,
//!   a `...` marker and the last `tail_length` characters. Rendering stops
//!   early once the output is certain to be truncated, so the kept tail is
//!   then the end of what was rendered.

use crate::value::Value;
use rustc_hash::FxHashMap;

/// Limits applied by [`stringify_with`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Maximum container nesting rendered in full
    pub max_depth: usize,
    /// Maximum output length in characters
    pub max_length: usize,
    /// Characters kept from the end of truncated output
    pub tail_length: usize,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            max_depth: 8,
            max_length: 256,
            tail_length: 24,
        }
    }
}

const ELLIPSIS: &str = "...";

/// Render a value with the default limits
pub fn stringify(value: &Value) -> String {
    stringify_with(value, &StringifyOptions::default())
}

/// Render a value with explicit limits.
///
/// A top-level string is rendered as-is; strings nested in containers are
/// quoted.
pub fn stringify_with(value: &Value, options: &StringifyOptions) -> String {
    let rendered = match value {
        Value::String(s) => s.clone(),
        other => {
            let mut writer = Writer {
                options,
                seen: FxHashMap::default(),
                limit: (options.max_length + options.tail_length).saturating_mul(4),
                out: String::new(),
            };
            writer.write(other, 0);
            writer.out
        }
    };
    truncate(rendered, options)
}

fn truncate(s: String, options: &StringifyOptions) -> String {
    let len = s.chars().count();
    if len <= options.max_length {
        return s;
    }
    let tail = options.tail_length.min(options.max_length);
    let head = options
        .max_length
        .saturating_sub(tail)
        .saturating_sub(ELLIPSIS.len());
    let mut out: String = s.chars().take(head).collect();
    out.push_str(ELLIPSIS);
    out.extend(s.chars().skip(len - tail));
    out
}

/// Render a number the way JavaScript prints it
pub(crate) fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        let sign = if n > 0.0 { "" } else { "-" };
        format!("{}Infinity", sign)
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

struct Writer<'a> {
    options: &'a StringifyOptions,
    /// Container identity to the order it was first rendered in
    seen: FxHashMap<usize, usize>,
    /// Byte length past which the output holds more than `max_length` chars
    limit: usize,
    out: String,
}

impl Writer<'_> {
    fn full(&self) -> bool {
        self.out.len() > self.limit
    }

    fn write(&mut self, value: &Value, depth: usize) {
        if self.full() {
            return;
        }
        match value {
            Value::Undefined => self.out.push_str("undefined"),
            Value::Null => self.out.push_str("null"),
            Value::Bool(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Number(n) => self.out.push_str(&format_number(*n)),
            Value::String(s) => self.write_quoted(s),
            Value::Symbol(symbol) => {
                self.out.push_str("Symbol(");
                self.out.push_str(symbol.description().unwrap_or(""));
                self.out.push(')');
            }
            Value::Function(function) => {
                let name = if function.name().is_empty() {
                    "(anonymous)"
                } else {
                    function.name()
                };
                self.out.push_str(&format!("[Function {}]", name));
            }
            Value::Date(millis) => self.out.push_str(&format!("[Date {}]", format_number(*millis))),
            Value::Error(error) => {
                self.out.push_str(&format!("[{}: {}]", error.kind(), error.message()))
            }
            Value::Array(array) => {
                if self.enter(value, depth, "[Array]") {
                    self.out.push('[');
                    for (i, item) in array.to_vec().iter().enumerate() {
                        if self.full() {
                            return;
                        }
                        if i > 0 {
                            self.out.push(',');
                        }
                        self.write(item, depth + 1);
                    }
                    self.out.push(']');
                }
            }
            Value::Object(object) => {
                if self.enter(value, depth, "[Object]") {
                    self.out.push('{');
                    for (i, (key, item)) in object.entries().iter().enumerate() {
                        if self.full() {
                            return;
                        }
                        if i > 0 {
                            self.out.push(',');
                        }
                        self.write_quoted(key);
                        self.out.push(':');
                        self.write(item, depth + 1);
                    }
                    self.out.push('}');
                }
            }
        }
    }

    /// Returns `false` when a placeholder was written instead of the container
    fn enter(&mut self, value: &Value, depth: usize, placeholder: &str) -> bool {
        let Some(id) = value.identity() else {
            return true;
        };
        if let Some(index) = self.seen.get(&id) {
            self.out.push_str(&format!("{{\"$ref\":\"circular#{}\"}}", index));
            return false;
        }
        if depth >= self.options.max_depth {
            self.out.push_str(placeholder);
            return false;
        }
        let index = self.seen.len();
        self.seen.insert(id, index);
        true
    }

    fn write_quoted(&mut self, s: &str) {
        self.out
            .push_str(&serde_json::Value::String(s.to_string()).to_string());
    }
}
