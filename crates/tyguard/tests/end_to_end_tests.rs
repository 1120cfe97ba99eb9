//! End-to-end checking scenarios
//!
//! Each test models one caller workflow: define types once at startup,
//! then check (or assert) incoming values.

use tyguard::{stringify, Object, TypeError, TypeRegistry, Value};

fn point_registry() -> TypeRegistry {
    let mut registry = TypeRegistry::new();
    registry
        .define_type("Point", tyguard::Definition::properties([("x", "number"), ("y", "number")]))
        .unwrap();
    registry
}

#[test]
fn test_point_passes() {
    let mut registry = point_registry();
    let point = Value::object([("x", 1), ("y", 2)]);
    assert!(registry.test(&point, "Point").unwrap());
    assert!(registry.assert(&point, "Point").is_ok());
}

#[test]
fn test_point_failure_names_the_property() {
    let mut registry = point_registry();
    let point = Value::object([("x", Value::from(1)), ("y", Value::from("bad"))]);

    assert!(!registry.test(&point, "Point").unwrap());

    let result = registry.check(&point, "Point").unwrap();
    assert_eq!(
        result.description(),
        Some(r#"Object "{"x":1,"y":"bad"}" failed to test as "Point""#)
    );
    assert_eq!(result.failed().len(), 1);
    assert_eq!(
        result.failed()[0].description(),
        Some(r#"Property "y" in "{"x":1,"y":"bad"}" failed test in "Point""#)
    );

    let err = registry.assert(&point, "Point").unwrap_err();
    assert!(err.to_string().contains("Property \"y\""), "{err}");
    assert_eq!(err.result(), Some(&result));
}

#[test]
fn test_string_or_number() {
    let mut registry = TypeRegistry::new();
    assert!(registry.test(&Value::from("hi"), "string|number").unwrap());
    assert!(!registry.test(&Value::Bool(true), "string|number").unwrap());
}

#[test]
fn test_array_of_shapes() {
    let mut registry = TypeRegistry::new();
    let good = Value::array([Value::object([("v", 1)])]);
    let bad = Value::array([Value::object([("v", "x")])]);
    assert!(registry.test(&good, "array<{v:number}>").unwrap());
    assert!(!registry.test(&bad, "array<{v:number}>").unwrap());
}

#[test]
fn test_assert_errors_exactly_when_test_fails() {
    let mut registry = TypeRegistry::new();
    let cases = [
        (Value::from(1), "number"),
        (Value::from(1), "string"),
        (Value::array([1, 2]), "number[]"),
        (Value::array(["a"]), "number[]"),
        (Value::object([("a", 1)]), "{a:number}"),
        (Value::object([("b", 1)]), "{a:number}"),
        (Value::Null, "null|undefined"),
        (Value::from(false), "null|undefined"),
    ];
    for (value, type_expr) in cases {
        let passed = registry.test(&value, type_expr).unwrap();
        let asserted = registry.assert(&value, type_expr);
        assert_eq!(passed, asserted.is_ok(), "{value:?} as {type_expr}");
        if let Err(err) = asserted {
            assert!(err.is_assertion());
        }
    }
}

#[test]
fn test_assert_propagates_construction_errors() {
    let mut registry = TypeRegistry::new();
    let err = registry.assert(&Value::Null, "Missing").unwrap_err();
    assert!(!err.is_assertion());
    assert!(matches!(err, TypeError::UnknownType { .. }));
}

#[test]
fn test_deeply_nested_failure_is_reported_at_the_leaf() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Tag", "{name:string}").unwrap();
    registry.define_type("Post", "{title:string, tags:Tag[]}").unwrap();

    let post = Value::object([
        ("title", Value::from("hello")),
        (
            "tags",
            Value::array([Value::object([("name", "rust")]), Value::object([("name", 7)])]),
        ),
    ]);

    let result = registry.check(&post, "Post").unwrap();
    assert!(!result.passed());
    assert_eq!(result.leaf_failure_count(), 1);

    let err = registry.assert(&post, "Post").unwrap_err();
    assert_eq!(
        err.to_string(),
        r#"Assertion failed: Property "name" in "{"name":7}" failed test in "Tag""#
    );
}

#[test]
fn test_self_referential_value_is_checked_and_rendered() {
    let node = Object::new();
    node.set("id", 1);
    node.set("next", Value::Object(node.clone()));
    let node = Value::Object(node);

    assert_eq!(stringify(&node), r#"{"id":1,"next":{"$ref":"circular#0"}}"#);

    let mut registry = TypeRegistry::new();
    // the shape only inspects one level, so the cycle is never followed
    assert!(registry.test(&node, "{id:number, next:object}").unwrap());
    let result = registry.check(&node, "{id:string, next:object}").unwrap();
    assert!(result
        .description()
        .is_some_and(|d| d.contains("circular#0")));
}

#[test]
fn test_large_values_are_truncated_in_descriptions() {
    let mut registry = TypeRegistry::new();
    let big = Value::array((0..500).map(Value::from).collect::<Vec<_>>());
    let result = registry.check(&big, "string[]").unwrap();
    let description = result.description().unwrap_or_default();
    assert!(description.contains("..."));
    assert!(description.len() < 400, "{description}");
}

#[test]
fn test_result_serializes_to_json() {
    let mut registry = TypeRegistry::new();
    let result = registry.check(&Value::array([Value::from("x")]), "number[]").unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "value": false,
            "description": "One in \"[\"x\"]\" failed to test as \"number\" in \"number[]\"",
            "failed": [{"value": false}]
        })
    );
}

#[test]
fn test_json_input_values() {
    let mut registry = TypeRegistry::new();
    registry
        .define_type("Order", "{id:number, items:{sku:string, qty:number}[], note:string|null}")
        .unwrap();

    let order = Value::from(serde_json::json!({
        "id": 7,
        "items": [{"sku": "A1", "qty": 2}, {"sku": "B2", "qty": 1}],
        "note": null
    }));
    assert!(registry.test(&order, "Order").unwrap());

    let broken = Value::from(serde_json::json!({"id": 7, "items": [{"sku": 1}]}));
    assert!(!registry.test(&broken, "Order").unwrap());
}
