//! The live object model the serializer walks.
//!
//! Objects are shared trait objects ([`ObjectRef`]). Reading an attribute,
//! invoking an accessor, probing a delegate and reporting a content renderer
//! are all explicit capabilities with conservative defaults, so an object
//! only implements what its schema entry actually uses.
//!
//! Accessors can also be registered out of band in an [`AccessorTable`],
//! keyed by `(class, selector)` and resolved along the class hierarchy before
//! falling back to [`Introspect::invoke`].

use std::any::Any;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use glimpse_bridge::ContentRenderer;
use rustc_hash::FxHashMap;
use serde_json::Value;
use thiserror::Error;

/// A shared reference to a live object.
pub type ObjectRef = Arc<dyn Introspect>;

pub trait Introspect: Send + Sync + 'static {
    fn as_any(&self) -> &dyn Any;

    /// Class names from most-derived to root.
    fn class_hierarchy(&self) -> Vec<String>;

    /// Read an attribute directly. `None` means absent.
    fn read_attribute(&self, _name: &str) -> Option<RawValue> {
        None
    }

    /// Invoke an accessor with zero or one argument.
    fn invoke(&self, selector: &str, _args: &[Value]) -> Result<Option<RawValue>, InvokeError> {
        Err(InvokeError::NotImplemented(selector.to_string()))
    }

    /// Whether the object currently implements `selector`.
    fn responds_to(&self, _selector: &str) -> bool {
        false
    }

    /// Follow a named relationship such as `delegate`.
    fn relationship(&self, _name: &str) -> Option<ObjectRef> {
        None
    }

    /// Scalar stand-in used when the object is reached through a property
    /// whose declared type is not schema-backed.
    fn scalar_value(&self) -> Option<Value> {
        None
    }

    /// Embedded content renderer this object hosts, if any.
    fn content_renderer(&self) -> Option<ContentRenderer> {
        None
    }
}

/// A value read from a live object, before transformation.
#[derive(Clone)]
pub enum RawValue {
    Scalar(Value),
    Object(ObjectRef),
    /// Ordered collection.
    List(Vec<ObjectRef>),
    /// Unordered collection; duplicates by identity are collapsed.
    Set(Vec<ObjectRef>),
}

impl RawValue {
    /// `Scalar(null)` carries no value.
    pub fn is_absent(&self) -> bool {
        matches!(self, RawValue::Scalar(Value::Null))
    }
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        RawValue::Scalar(value)
    }
}

impl From<ObjectRef> for RawValue {
    fn from(object: ObjectRef) -> Self {
        RawValue::Object(object)
    }
}

impl fmt::Debug for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let classes = |objects: &[ObjectRef]| -> Vec<String> {
            objects
                .iter()
                .map(|o| o.class_hierarchy().into_iter().next().unwrap_or_default())
                .collect()
        };

        match self {
            RawValue::Scalar(value) => f.debug_tuple("Scalar").field(value).finish(),
            RawValue::Object(object) => f
                .debug_tuple("Object")
                .field(&object.class_hierarchy().first())
                .finish(),
            RawValue::List(objects) => f.debug_tuple("List").field(&classes(objects)).finish(),
            RawValue::Set(objects) => f.debug_tuple("Set").field(&classes(objects)).finish(),
        }
    }
}

/// Why one accessor invocation produced no value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvokeError {
    #[error("object does not implement '{0}'")]
    NotImplemented(String),

    #[error("'{selector}' takes {expected} argument(s), got {got}")]
    Arity {
        selector: String,
        expected: usize,
        got: usize,
    },

    #[error("'{selector}' is registered for a different concrete type")]
    WrongType { selector: String },

    #[error("'{selector}' failed: {reason}")]
    Failed { selector: String, reason: String },

    #[error("'{selector}' panicked")]
    Panicked { selector: String },
}

type AccessorFn = dyn Fn(&dyn Any, &[Value]) -> Result<Option<RawValue>, InvokeError> + Send + Sync;

struct Accessor {
    arity: usize,
    call: Box<AccessorFn>,
}

/// Accessors registered by `(class, selector)`.
///
/// ```
/// use std::any::Any;
/// use glimpse_graph::{AccessorTable, Introspect, RawValue};
/// use serde_json::json;
///
/// struct Button { titles: Vec<&'static str> }
///
/// impl Introspect for Button {
///     fn as_any(&self) -> &dyn Any { self }
///     fn class_hierarchy(&self) -> Vec<String> { vec!["UIButton".into()] }
/// }
///
/// let mut table = AccessorTable::new();
/// table.register("UIButton", "titleForState:", 1, |button: &Button, args| {
///     let state = args[0].as_u64().unwrap_or(0) as usize;
///     Ok(button.titles.get(state).map(|t| RawValue::Scalar(json!(t))))
/// });
///
/// let button = Button { titles: vec!["Buy", "Buying"] };
/// let title = table.invoke(&button, &["UIButton"], "titleForState:", &[json!(1)]);
/// assert!(matches!(title, Ok(Some(RawValue::Scalar(v))) if v == "Buying"));
/// ```
#[derive(Default)]
pub struct AccessorTable {
    classes: FxHashMap<String, FxHashMap<String, Accessor>>,
}

impl AccessorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an accessor for objects of concrete type `T` whose class
    /// hierarchy contains `class`.
    pub fn register<T, F>(&mut self, class: &str, selector: &str, arity: usize, accessor: F) -> &mut Self
    where
        T: Any,
        F: Fn(&T, &[Value]) -> Result<Option<RawValue>, InvokeError> + Send + Sync + 'static,
    {
        let name = selector.to_string();
        let call = move |target: &dyn Any, args: &[Value]| {
            let target = target
                .downcast_ref::<T>()
                .ok_or_else(|| InvokeError::WrongType {
                    selector: name.clone(),
                })?;
            accessor(target, args)
        };

        self.classes.entry(class.to_string()).or_default().insert(
            selector.to_string(),
            Accessor {
                arity,
                call: Box::new(call),
            },
        );
        self
    }

    pub fn contains(&self, class: &str, selector: &str) -> bool {
        self.lookup(&[class], selector).is_some()
    }

    pub fn len(&self) -> usize {
        self.classes.values().map(FxHashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<S: AsRef<str>>(&self, hierarchy: &[S], selector: &str) -> Option<&Accessor> {
        hierarchy.iter().find_map(|class| {
            self.classes
                .get(class.as_ref())
                .and_then(|selectors| selectors.get(selector))
        })
    }

    /// Invoke `selector` on `object`. The most-derived registered accessor
    /// wins; with none registered the object's own [`Introspect::invoke`]
    /// answers. Panics are caught and reported as [`InvokeError::Panicked`].
    pub fn invoke<S: AsRef<str>>(
        &self,
        object: &dyn Introspect,
        hierarchy: &[S],
        selector: &str,
        args: &[Value],
    ) -> Result<Option<RawValue>, InvokeError> {
        let accessor = self.lookup(hierarchy, selector);

        let outcome = catch_unwind(AssertUnwindSafe(|| match accessor {
            Some(accessor) if accessor.arity != args.len() => Err(InvokeError::Arity {
                selector: selector.to_string(),
                expected: accessor.arity,
                got: args.len(),
            }),
            Some(accessor) => (accessor.call)(object.as_any(), args),
            None => object.invoke(selector, args),
        }));

        outcome.unwrap_or_else(|_| {
            Err(InvokeError::Panicked {
                selector: selector.to_string(),
            })
        })
    }
}

impl fmt::Debug for AccessorTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessorTable")
            .field("accessors", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Label {
        text: &'static str,
    }

    impl Introspect for Label {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn class_hierarchy(&self) -> Vec<String> {
            vec!["UILabel".into(), "UIView".into()]
        }

        fn invoke(&self, selector: &str, _args: &[Value]) -> Result<Option<RawValue>, InvokeError> {
            match selector {
                "text" => Ok(Some(RawValue::Scalar(json!(self.text)))),
                other => Err(InvokeError::NotImplemented(other.to_string())),
            }
        }
    }

    struct Other;

    fn hierarchy() -> Vec<String> {
        vec!["UILabel".into(), "UIView".into()]
    }

    #[test]
    fn falls_back_to_object_invoke() {
        let table = AccessorTable::new();
        let label = Label { text: "hi" };
        let result = table.invoke(&label, &hierarchy(), "text", &[]);
        assert!(matches!(result, Ok(Some(RawValue::Scalar(v))) if v == "hi"));
    }

    #[test]
    fn ancestor_registration_applies_to_subclass() {
        let mut table = AccessorTable::new();
        table.register("UIView", "alpha", 0, |_: &Label, _| Ok(Some(RawValue::Scalar(json!(0.5)))));

        let label = Label { text: "hi" };
        let result = table.invoke(&label, &hierarchy(), "alpha", &[]);
        assert!(matches!(result, Ok(Some(RawValue::Scalar(v))) if v == 0.5));
    }

    #[test]
    fn arity_mismatch_is_reported() {
        let mut table = AccessorTable::new();
        table.register("UILabel", "textForState:", 1, |label: &Label, _| {
            Ok(Some(RawValue::Scalar(json!(label.text))))
        });

        let label = Label { text: "hi" };
        let result = table.invoke(&label, &hierarchy(), "textForState:", &[]);
        assert!(matches!(result, Err(InvokeError::Arity { expected: 1, got: 0, .. })));
    }

    #[test]
    fn wrong_concrete_type_is_reported() {
        let mut table = AccessorTable::new();
        table.register("UILabel", "text", 0, |_: &Other, _| Ok(None));

        let label = Label { text: "hi" };
        let result = table.invoke(&label, &hierarchy(), "text", &[]);
        assert!(matches!(result, Err(InvokeError::WrongType { .. })));
    }

    #[test]
    fn panics_are_contained() {
        let mut table = AccessorTable::new();
        table.register("UILabel", "explode", 0, |_: &Label, _| panic!("boom"));

        let label = Label { text: "hi" };
        let result = table.invoke(&label, &hierarchy(), "explode", &[]);
        assert!(matches!(result, Err(InvokeError::Panicked { .. })));
    }
}
