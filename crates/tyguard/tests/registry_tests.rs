//! Integration tests for named types, options and registry lifecycle

use tyguard::{
    instance_test, property_types_of, Class, Definition, Object, TestResult, TypeError, TypeOptions,
    TypeRegistry, Value,
};

#[test]
fn test_named_type_behaves_like_inline_literal() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Foo", "{value:string}").unwrap();

    let good = Value::object([("value", "x")]);
    let bad = Value::object([("value", 1)]);
    for type_expr in ["Foo", "{value:string}"] {
        assert!(registry.test(&good, type_expr).unwrap());
        assert!(!registry.test(&bad, type_expr).unwrap());
    }
}

#[test]
fn test_named_shape_merges_into_intersection() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Foo", "{value:string}").unwrap();

    let value = Value::object([("value", "x"), ("error", "boom")]);
    assert!(registry.test(&value, "Foo & {error:string}").unwrap());
    assert!(!registry.test(&value, "Foo").unwrap());

    let bad = Value::object([("value", Value::from("x")), ("error", Value::from(1))]);
    assert!(!registry.test(&bad, "Foo & {error:string}").unwrap());
}

#[test]
fn test_property_map_definition() {
    let mut registry = TypeRegistry::new();
    registry
        .define_type("User", Definition::properties([("name", "string"), ("tags", "string[]")]))
        .unwrap();

    let user = Value::object([
        ("name", Value::from("ann")),
        ("tags", Value::array(["admin"])),
    ]);
    assert!(registry.test(&user, "User").unwrap());
    assert!(registry.test(&Value::array([user]), "User[]").unwrap());
    assert!(!registry.test(&Value::object([("tags", "admin")]), "User").unwrap());
}

#[test]
fn test_property_map_with_unknown_type_fails_to_define() {
    let mut registry = TypeRegistry::new();
    let err = registry
        .define_type("User", Definition::properties([("role", "Role")]))
        .unwrap_err();
    assert_eq!(err, TypeError::UnknownType { expression: "Role".to_string() });
    assert!(!registry.contains("User"));
}

#[test]
fn test_accept_undefined_properties_option() {
    let mut registry = TypeRegistry::new();
    let options = TypeOptions::new().accept_undefined_properties(true);
    registry.define_type_with_options("Loose", "{foo:number}", options).unwrap();
    registry.define_type("Strict", "{foo:number}").unwrap();

    let value = Value::object([("foo", 1), ("bar", 2)]);
    assert!(registry.test(&value, "Loose").unwrap());
    assert!(!registry.test(&value, "Strict").unwrap());
    assert!(!registry.test(&value, "{foo:number}").unwrap());

    // declared properties are still checked
    let wrong = Value::object([("foo", Value::from("1")), ("bar", Value::from(2))]);
    assert!(!registry.test(&wrong, "Loose").unwrap());

    assert_eq!(registry.options("Loose"), options);
    assert_eq!(registry.options("Strict"), TypeOptions::default());
}

#[test]
fn test_loose_shape_keeps_flag_inside_other_expressions() {
    let mut registry = TypeRegistry::new();
    let options = TypeOptions::new().accept_undefined_properties(true);
    registry.define_type_with_options("Loose", "{foo:number}", options).unwrap();

    let list = Value::array([Value::object([("foo", Value::from(1)), ("extra", Value::Bool(true))])]);
    assert!(registry.test(&list, "Loose[]").unwrap());
    assert!(registry.test(&list, "array<Loose>").unwrap());
}

#[test]
fn test_accept_undefined_properties_applies_to_union_and_intersection_shapes() {
    let mut registry = TypeRegistry::new();
    let options = TypeOptions::new().accept_undefined_properties(true);
    registry.define_type_with_options("Either", "{a:number}|{b:number}", options).unwrap();
    registry.define_type_with_options("Both", "{a:number} & {b:number}", options).unwrap();
    registry.define_type("StrictEither", "{a:number}|{b:number}").unwrap();

    let value = Value::object([("a", Value::from(1)), ("extra", Value::from(2))]);
    assert!(registry.test(&value, "Either").unwrap());
    assert!(registry.test(&value, "Both").unwrap());
    assert!(!registry.test(&value, "StrictEither").unwrap());

    let wrong = Value::object([("a", Value::from("1")), ("extra", Value::from(2))]);
    assert!(!registry.test(&wrong, "Both").unwrap());
}

#[test]
fn test_predicate_definition() {
    let mut registry = TypeRegistry::new();
    registry
        .define_type(
            "Even",
            Definition::predicate(|v: &Value| matches!(v, Value::Number(n) if n % 2.0 == 0.0)),
        )
        .unwrap();

    assert!(registry.test(&Value::from(4), "Even").unwrap());
    assert!(!registry.test(&Value::from(3), "Even").unwrap());
    assert!(registry.test(&Value::array([2, 4, 6]), "Even[]").unwrap());
    assert!(registry.test(&Value::from("x"), "Even|string").unwrap());
}

#[test]
fn test_predicate_returning_detailed_result() {
    let mut registry = TypeRegistry::new();
    registry
        .define_type(
            "Port",
            Definition::predicate(|v: &Value| match v {
                Value::Number(n) if (1.0..=65535.0).contains(n) => TestResult::pass(),
                _ => TestResult::fail_with(format!("{} is not a port", v)),
            }),
        )
        .unwrap();

    let result = registry.check(&Value::from(70000), "Port").unwrap();
    assert_eq!(result.description(), Some("70000 is not a port"));

    let err = registry.assert(&Value::from(0), "Port").unwrap_err();
    assert_eq!(err.to_string(), "Assertion failed: 0 is not a port");
}

#[test]
fn test_failing_predicate_becomes_a_result() {
    let mut registry = TypeRegistry::new();
    registry
        .define_type(
            "Strict",
            Definition::fallible(|v: &Value| {
                if v.is_null() {
                    Err("null is not allowed")
                } else {
                    Ok(true)
                }
            }),
        )
        .unwrap();

    let result = registry.check(&Value::Null, "Strict").unwrap();
    assert!(!result.passed());
    assert_eq!(
        result.description(),
        Some("Test function failed with: null is not allowed")
    );
    assert!(!registry.test(&Value::Null, "Strict").unwrap());
    assert!(registry.test(&Value::from(1), "Strict").unwrap());
}

#[test]
fn test_panicking_predicate_becomes_a_result() {
    let mut registry = TypeRegistry::new();
    registry
        .define_type(
            "Fragile",
            Definition::predicate(|v: &Value| -> bool {
                if v.is_undefined() {
                    panic!("cannot inspect undefined");
                }
                true
            }),
        )
        .unwrap();

    let result = registry.check(&Value::Undefined, "Fragile").unwrap();
    assert_eq!(
        result.description(),
        Some("Test function failed with: cannot inspect undefined")
    );
}

#[test]
fn test_alias() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Point", "{x:number, y:number}").unwrap();
    registry.define_alias("Coordinate", "Point").unwrap();

    let point = Value::object([("x", 1), ("y", 2)]);
    assert!(registry.test(&point, "Coordinate").unwrap());

    let err = registry.define_alias("Vector", "Missing").unwrap_err();
    assert_eq!(
        err,
        TypeError::UnknownAliasTarget {
            alias: "Vector".to_string(),
            target: "Missing".to_string(),
        }
    );
}

#[test]
fn test_alias_binds_target_at_definition_time() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Id", "string").unwrap();
    registry.define_alias("Key", "Id").unwrap();
    registry.define_type("Id", "number").unwrap();

    assert!(registry.test(&Value::from("a"), "Key").unwrap());
    assert!(registry.test(&Value::from(1), "Id").unwrap());
}

#[test]
fn test_named_types_bind_at_definition_time() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Id", "string").unwrap();
    registry.define_type("Ids", "Id[]").unwrap();
    registry.define_type("Id", "number").unwrap();

    assert!(registry.test(&Value::array(["a"]), "Ids").unwrap());
    assert!(registry.test(&Value::array([1]), "Id[]").unwrap());
}

#[test]
fn test_reset_with_just_in_time_bootstrap() {
    let mut registry = TypeRegistry::new();
    registry.define_type("Foo", "string").unwrap();
    registry.reset_initial_state();

    assert!(!registry.defaults_defined());
    assert!(!registry.contains("Foo"));
    assert!(registry.test(&Value::from("x"), "string").unwrap());
    assert!(registry.defaults_defined());
    assert!(matches!(
        registry.test(&Value::from("x"), "Foo"),
        Err(TypeError::UnknownType { .. })
    ));
}

#[test]
fn test_reset_without_just_in_time_bootstrap() {
    let mut registry = TypeRegistry::new();
    registry.set_define_defaults_just_in_time(false);
    registry.define_defaults();
    assert!(registry.test(&Value::from("x"), "string").unwrap());

    registry.reset_initial_state();
    assert!(matches!(
        registry.test(&Value::from("x"), "string"),
        Err(TypeError::UnknownType { .. })
    ));
    assert!(registry.type_names().is_empty());

    registry.define_defaults();
    assert!(registry.test(&Value::from("x"), "string").unwrap());
}

#[test]
fn test_without_just_in_time_definitions_only_see_user_types() {
    let mut registry = TypeRegistry::new();
    registry.set_define_defaults_just_in_time(false);
    registry
        .define_type("Anything", Definition::predicate(|_: &Value| true))
        .unwrap();
    assert!(registry.test(&Value::Null, "Anything[]|Anything").unwrap());
    assert!(registry.define_type("Name", "string").is_err());
}

#[test]
fn test_type_names_are_sorted() {
    let mut registry = TypeRegistry::with_defaults();
    registry.define_type("Zebra", "string").unwrap();
    registry.define_type("Aardvark", "number").unwrap();
    let names = registry.type_names();
    let mut sorted = names.clone();
    sorted.sort_unstable();
    assert_eq!(names, sorted);
    assert!(names.contains(&"Zebra"));
    assert!(names.contains(&"AggregateError"));
}

#[test]
fn test_class_helpers() {
    let logger = Class::new(
        "Logger",
        [
            ("log", Value::function("log")),
            ("prefix", Value::from("app")),
            ("level", Value::from(1)),
        ],
    );

    let mut registry = TypeRegistry::new();
    registry.define_type("LoggerLike", property_types_of(&logger)).unwrap();
    registry.define_type("Logger", instance_test(&logger)).unwrap();

    let duck = Value::object([("log", Value::function("log")), ("prefix", Value::from("x"))]);
    assert!(registry.test(&duck, "LoggerLike").unwrap());
    assert!(!registry.test(&duck, "Logger").unwrap());

    let instance = Object::instance_of(&logger);
    instance.set("prefix", "svc");
    let instance = Value::Object(instance);
    assert!(registry.test(&instance, "Logger").unwrap());
    assert!(registry.test(&instance, "Logger & LoggerLike").unwrap());

    let other = Class::new("Logger", [("log", Value::function("log"))]);
    assert!(!registry.test(&Value::Object(Object::instance_of(&other)), "Logger").unwrap());
}

#[test]
fn test_shared_registry() {
    {
        let mut registry = tyguard::shared().write();
        registry.define_type("SharedRegistryPoint", "{x:number}").unwrap();
    }
    let registry = tyguard::shared().read();
    let point = Value::object([("x", 1)]);
    assert!(registry
        .evaluate(&point, "SharedRegistryPoint[]|SharedRegistryPoint")
        .unwrap()
        .passed());
}
