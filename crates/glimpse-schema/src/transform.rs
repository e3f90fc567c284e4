//! Value transforms applied to property values before they land in a snapshot.
//!
//! A transform is a named function `&Value -> Option<Value>`. Returning `None`
//! means "no value", which makes the serializer omit the entry. Transforms are
//! looked up by name from a [`TransformRegistry`]; declared value types can be
//! bound to a default transform so schema files don't have to repeat it.

use std::fmt;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde_json::{Value, json};

type TransformFn = dyn Fn(&Value) -> Option<Value> + Send + Sync;

/// A named value transform.
#[derive(Clone)]
pub struct Transform {
    name: Arc<str>,
    func: Arc<TransformFn>,
}

impl Transform {
    pub fn new<F>(name: &str, func: F) -> Self
    where
        F: Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    {
        Self {
            name: Arc::from(name),
            func: Arc::new(func),
        }
    }

    /// The passthrough transform.
    pub fn identity() -> Self {
        Self::new("identity", |value| Some(value.clone()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn apply(&self, value: &Value) -> Option<Value> {
        (self.func)(value)
    }
}

impl fmt::Debug for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Transform").field(&self.name).finish()
    }
}

/// Registry of named transforms plus default bindings from type names.
#[derive(Debug, Clone, Default)]
pub struct TransformRegistry {
    transforms: FxHashMap<String, Transform>,
    type_bindings: FxHashMap<String, String>,
}

impl TransformRegistry {
    /// An empty registry with no transforms at all.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in transforms and their usual type bindings.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();

        registry.register(Transform::identity());
        registry.register(Transform::new("string", to_string));
        registry.register(Transform::new("bool", to_bool));
        registry.register(Transform::new("integer", to_integer));
        registry.register(Transform::new("number", to_number));
        registry.register(Transform::new("rect", to_rect));
        registry.register(Transform::new("point", to_point));
        registry.register(Transform::new("size", to_size));

        for ty in ["NSString", "String", "NSAttributedString"] {
            registry.bind_type(ty, "string");
        }
        for ty in ["BOOL", "Bool", "bool"] {
            registry.bind_type(ty, "bool");
        }
        for ty in ["NSInteger", "NSUInteger", "Int", "int", "long"] {
            registry.bind_type(ty, "integer");
        }
        for ty in ["CGFloat", "Float", "Double", "float", "double", "NSNumber"] {
            registry.bind_type(ty, "number");
        }
        registry.bind_type("CGRect", "rect");
        registry.bind_type("CGPoint", "point");
        registry.bind_type("CGSize", "size");
        for ty in ["NSArray", "NSSet", "Array", "Set"] {
            registry.bind_type(ty, "identity");
        }

        registry
    }

    /// Register (or replace) a transform under its own name.
    pub fn register(&mut self, transform: Transform) -> &mut Self {
        self.transforms
            .insert(transform.name().to_string(), transform);
        self
    }

    /// Make `transform` the default for properties declared with `type_name`.
    pub fn bind_type(&mut self, type_name: &str, transform: &str) -> &mut Self {
        self.type_bindings
            .insert(type_name.to_string(), transform.to_string());
        self
    }

    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    /// The transform bound to a declared type, if any.
    pub fn for_type(&self, type_name: &str) -> Option<&Transform> {
        self.type_bindings
            .get(type_name)
            .and_then(|name| self.transforms.get(name))
    }

    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

fn to_string(value: &Value) -> Option<Value> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(Value::String(s.clone())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        Value::Number(n) => Some(Value::String(n.to_string())),
        other => Some(Value::String(other.to_string())),
    }
}

fn to_bool(value: &Value) -> Option<Value> {
    match value {
        Value::Bool(b) => Some(Value::Bool(*b)),
        Value::Number(n) => n.as_f64().map(|f| Value::Bool(f != 0.0)),
        Value::String(s) => match s.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(Value::Bool(true)),
            "false" | "no" | "0" => Some(Value::Bool(false)),
            _ => None,
        },
        _ => None,
    }
}

fn to_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .map(Value::from),
        Value::Bool(b) => Some(Value::from(i64::from(*b))),
        Value::String(s) => s.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn to_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => n.as_f64().map(Value::from),
        Value::String(s) => s.trim().parse::<f64>().ok().map(Value::from),
        _ => None,
    }
}

/// Accepts `{x, y, width, height}`, `{origin, size}` or `[x, y, w, h]`.
fn to_rect(value: &Value) -> Option<Value> {
    let (x, y, w, h) = match value {
        Value::Array(items) if items.len() == 4 => (
            items[0].as_f64()?,
            items[1].as_f64()?,
            items[2].as_f64()?,
            items[3].as_f64()?,
        ),
        Value::Object(map) => match (map.get("origin"), map.get("size")) {
            (Some(origin), Some(size)) => (
                field(origin, "x")?,
                field(origin, "y")?,
                field(size, "width")?,
                field(size, "height")?,
            ),
            _ => (
                field(value, "x")?,
                field(value, "y")?,
                field(value, "width")?,
                field(value, "height")?,
            ),
        },
        _ => return None,
    };

    Some(json!({ "X": x, "Y": y, "Width": w, "Height": h }))
}

fn to_point(value: &Value) -> Option<Value> {
    let (x, y) = pair(value, "x", "y")?;
    Some(json!({ "X": x, "Y": y }))
}

fn to_size(value: &Value) -> Option<Value> {
    let (w, h) = pair(value, "width", "height")?;
    Some(json!({ "Width": w, "Height": h }))
}

fn pair(value: &Value, a: &str, b: &str) -> Option<(f64, f64)> {
    match value {
        Value::Array(items) if items.len() == 2 => Some((items[0].as_f64()?, items[1].as_f64()?)),
        Value::Object(_) => Some((field(value, a)?, field(value, b)?)),
        _ => None,
    }
}

fn field(value: &Value, key: &str) -> Option<f64> {
    value.get(key)?.as_f64()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_registry_resolves_type_bindings() {
        let registry = TransformRegistry::builtin();
        assert_eq!(registry.for_type("CGRect").unwrap().name(), "rect");
        assert_eq!(registry.for_type("NSArray").unwrap().name(), "identity");
        assert!(registry.for_type("UIView").is_none());
    }

    #[test]
    fn rect_accepts_flat_nested_and_array_forms() {
        let expected = json!({ "X": 1.0, "Y": 2.0, "Width": 30.0, "Height": 40.0 });

        assert_eq!(
            to_rect(&json!({ "x": 1, "y": 2, "width": 30, "height": 40 })),
            Some(expected.clone())
        );
        assert_eq!(
            to_rect(&json!({ "origin": { "x": 1, "y": 2 }, "size": { "width": 30, "height": 40 } })),
            Some(expected.clone())
        );
        assert_eq!(to_rect(&json!([1, 2, 30, 40])), Some(expected));
        assert_eq!(to_rect(&json!("not a rect")), None);
    }

    #[test]
    fn string_drops_null() {
        assert_eq!(to_string(&Value::Null), None);
        assert_eq!(to_string(&json!(3)), Some(json!("3")));
    }

    #[test]
    fn bool_and_integer_coercions() {
        assert_eq!(to_bool(&json!("YES")), Some(json!(true)));
        assert_eq!(to_bool(&json!(0)), Some(json!(false)));
        assert_eq!(to_bool(&json!("maybe")), None);
        assert_eq!(to_integer(&json!(4.9)), Some(json!(4)));
        assert_eq!(to_integer(&json!(" 12 ")), Some(json!(12)));
    }

    #[test]
    fn custom_transform_replaces_builtin() {
        let mut registry = TransformRegistry::builtin();
        registry.register(Transform::new("string", |_| Some(json!("redacted"))));
        assert_eq!(
            registry.get("string").unwrap().apply(&json!("secret")),
            Some(json!("redacted"))
        );
    }
}
