//! Structural result aggregation
//!
//! Combines sub-results for containers, shapes, unions and intersections.
//! Every aggregate keeps only the failing sub-results, so the size of a
//! diagnostic follows the number of defects rather than the size of the
//! input.

use crate::compiled::{CompiledTest, ShapeTest};
use crate::evaluator::evaluate;
use crate::result::TestResult;
use crate::stringify::stringify;
use crate::value::Value;

/// Every item of `list` must satisfy `item_test`
pub fn every_array_item(
    list: &Value,
    item_test: &CompiledTest,
    item_type: &str,
    full_type: &str,
) -> TestResult {
    let items = match list {
        Value::Array(array) => array.to_vec(),
        _ => return TestResult::fail(),
    };

    let failed: Vec<TestResult> = items
        .iter()
        .map(|item| evaluate(item_test, item, item_type))
        .filter(|result| !result.passed())
        .collect();

    if failed.is_empty() {
        return TestResult::pass();
    }

    TestResult::aggregate(
        format!(
            "One in \"{}\" failed to test as \"{}\" in \"{}\"",
            stringify(list),
            item_type,
            full_type
        ),
        failed,
    )
}

/// Every own key must satisfy the key test and every value the value test.
///
/// Keys and values are checked independently and all failures are kept.
pub fn every_object_entry(
    object: &Value,
    (key_test, key_type): (&CompiledTest, &str),
    (value_test, value_type): (&CompiledTest, &str),
    full_type: &str,
) -> TestResult {
    let mut failed = Vec::new();

    for (key, value) in object.own_entries() {
        let key_result = evaluate(key_test, &Value::String(key), key_type);
        if !key_result.passed() {
            failed.push(key_result);
        }

        let value_result = evaluate(value_test, &value, value_type);
        if !value_result.passed() {
            failed.push(value_result);
        }
    }

    if failed.is_empty() {
        return TestResult::pass();
    }

    TestResult::aggregate(
        format!(
            "Object \"{}\" failed to test as \"{}\"",
            stringify(object),
            full_type
        ),
        failed,
    )
}

/// Check the own properties of `object` against a shape.
///
/// Driven by the keys present on the value: a declared property that is
/// absent from the value is not reported.
pub fn every_object_property(object: &Value, shape: &ShapeTest, type_expr: &str) -> TestResult {
    let mut rendered: Option<String> = None;
    let mut failed = Vec::new();

    for (key, value) in object.own_entries() {
        match shape.get(&key) {
            None if shape.accepts_undefined_properties() => {}
            None => {
                let object_str = rendered.get_or_insert_with(|| stringify(object));
                failed.push(TestResult::fail_with(format!(
                    "Property \"{}\" in \"{}\" was not defined in \"{}\"",
                    key, object_str, type_expr
                )));
            }
            Some(property) => {
                let result = evaluate(&property.test, &value, &property.expression);
                if !result.passed() {
                    let object_str = rendered.get_or_insert_with(|| stringify(object));
                    failed.push(TestResult::aggregate(
                        format!(
                            "Property \"{}\" in \"{}\" failed test in \"{}\"",
                            key, object_str, type_expr
                        ),
                        vec![result],
                    ));
                }
            }
        }
    }

    if failed.is_empty() {
        return TestResult::pass();
    }

    let object_str = rendered.get_or_insert_with(|| stringify(object));
    TestResult::aggregate(
        format!("Object \"{}\" failed to test as \"{}\"", object_str, type_expr),
        failed,
    )
}

/// At least one branch must pass. Every branch is evaluated.
pub fn any_branch(value: &Value, branches: &[(String, CompiledTest)], type_expr: &str) -> TestResult {
    let results: Vec<TestResult> = branches
        .iter()
        .map(|(expression, test)| evaluate(test, value, expression))
        .collect();

    if results.iter().any(TestResult::passed) {
        return TestResult::pass();
    }

    TestResult::aggregate(
        format!("Value \"{}\" did not match \"{}\"", stringify(value), type_expr),
        results,
    )
}

/// Every branch must pass. Every branch is evaluated.
pub fn every_branch(value: &Value, branches: &[(String, CompiledTest)], type_expr: &str) -> TestResult {
    let failed: Vec<TestResult> = branches
        .iter()
        .map(|(expression, test)| evaluate(test, value, expression))
        .filter(|result| !result.passed())
        .collect();

    if failed.is_empty() {
        return TestResult::pass();
    }

    TestResult::aggregate(
        format!("Value \"{}\" did not match \"{}\"", stringify(value), type_expr),
        failed,
    )
}
