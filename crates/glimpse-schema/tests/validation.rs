//! Tests for schema validation.

use glimpse_schema::{
    ConfigError, ConfigValidator, SchemaConfig, SchemaRegistry, SchemaValidator, StrictValidator,
    TransformRegistry,
};
use serde_json::json;

fn schema(value: serde_json::Value) -> SchemaConfig {
    serde_json::from_value(value).expect("schema document")
}

#[test]
fn duplicate_class_is_rejected() {
    let cfg = schema(json!({
        "classes": [{ "name": "UIView" }, { "name": "UIView" }]
    }));

    let err = SchemaValidator.validate(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateClass(name) if name == "UIView"));
}

#[test]
fn duplicate_property_is_rejected() {
    let cfg = schema(json!({
        "classes": [{
            "name": "UIView",
            "properties": [
                { "name": "frame", "type": "CGRect" },
                { "name": "frame", "type": "CGRect" }
            ]
        }]
    }));

    let err = SchemaValidator.validate(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::DuplicateProperty { .. }));
}

#[test]
fn superclass_cycle_is_rejected() {
    let cfg = schema(json!({
        "classes": [
            { "name": "A", "superclass": "C" },
            { "name": "B", "superclass": "A" },
            { "name": "C", "superclass": "B" }
        ]
    }));

    let err = SchemaRegistry::from_config(&cfg, &TransformRegistry::builtin()).unwrap_err();
    assert!(matches!(err, ConfigError::SuperclassCycle(_)));
}

#[test]
fn two_parameters_are_rejected_before_compilation() {
    let cfg = schema(json!({
        "classes": [{
            "name": "UIBarButtonItem",
            "properties": [{
                "name": "backgroundImage",
                "type": "UIImage",
                "transform": "identity",
                "parameters": [{ "type": "UIControlState" }, { "type": "UIBarMetrics" }]
            }]
        }]
    }));

    let err = SchemaValidator.validate(&cfg).unwrap_err();
    match err {
        ConfigError::InClass { class, source } => {
            assert_eq!(class, "UIBarButtonItem");
            assert!(matches!(*source, ConfigError::TooManyParameters { count: 2, .. }));
        }
        other => panic!("expected InClass, got {other}"),
    }
}

#[test]
fn dangling_references_pass_structural_but_fail_strict() {
    let cfg = schema(json!({
        "classes": [{
            "name": "UIButton",
            "superclass": "UIControl",
            "properties": [{
                "name": "title",
                "type": "NSString",
                "parameters": [{ "type": "UIControlState" }]
            }]
        }]
    }));

    SchemaValidator.validate(&cfg).expect("structural validation passes");

    let err = StrictValidator.validate(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::UnknownSuperclass { .. }));
}

#[test]
fn empty_class_name_is_rejected() {
    let cfg = schema(json!({ "classes": [{ "name": "  " }] }));
    let err = SchemaValidator.validate(&cfg).unwrap_err();
    assert!(matches!(err, ConfigError::EmptyName("class")));
}
