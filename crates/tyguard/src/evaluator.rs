//! Evaluation of compiled tests
//!
//! The single place where a compiled test meets a value. Predicates written
//! by users are untrusted: both an `Err` return and a panic inside the body
//! are turned into a failed result instead of escaping to the caller.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::aggregate;
use crate::compiled::{CompiledTest, Predicate};
use crate::result::TestResult;
use crate::value::Value;

/// Run `test` against `value`; `type_expr` names the expression in
/// failure descriptions.
pub fn evaluate(test: &CompiledTest, value: &Value, type_expr: &str) -> TestResult {
    match test {
        CompiledTest::Shape(shape) => {
            if !value.is_object() {
                return TestResult::fail();
            }
            aggregate::every_object_property(value, shape, type_expr)
        }
        CompiledTest::Predicate(predicate) => run_predicate(predicate, value, type_expr),
    }
}

fn run_predicate(predicate: &Predicate, value: &Value, type_expr: &str) -> TestResult {
    match catch_unwind(AssertUnwindSafe(|| predicate.call(value))) {
        Ok(Ok(outcome)) => outcome.into_result(),
        Ok(Err(error)) => predicate_failed(type_expr, &error.to_string()),
        Err(payload) => predicate_failed(type_expr, &panic_message(payload.as_ref())),
    }
}

fn predicate_failed(type_expr: &str, message: &str) -> TestResult {
    tracing::error!(type_expr, "Test function failed with: {}", message);
    TestResult::fail_with(format!("Test function failed with: {}", message))
}

/// Text of a panic payload, as carried by `panic!` with a literal or format
pub fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
