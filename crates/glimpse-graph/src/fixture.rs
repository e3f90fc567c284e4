//! Object graphs described as JSON.
//!
//! A fixture names its objects and the root:
//!
//! ```json
//! {
//!   "root": "window",
//!   "objects": {
//!     "window": {
//!       "class": ["UIWindow", "UIView"],
//!       "attributes": { "rootViewController": { "$ref": "home" } }
//!     },
//!     "home": {
//!       "class": ["HomeController", "UIViewController"],
//!       "attributes": { "view": { "$ref": "window" }, "tabs": { "$refs": [] } },
//!       "methods": {
//!         "titleForState:": { "cases": [{ "argument": 0, "returns": "Home" }] }
//!       }
//!     }
//!   }
//! }
//! ```
//!
//! Values are plain JSON, except that `{"$ref": name}` is another object,
//! `{"$refs": [names]}` an ordered collection and `{"$set": [names]}` an
//! unordered one. Objects may also declare `relationships` (for delegates),
//! `responds_to`, a `scalar` stand-in and a `renderer` hosting a document.

use std::any::Any;
use std::path::Path;
use std::sync::{Arc, Weak};
use std::time::Duration;

use glimpse_bridge::{
    ContentRenderer, Document, DocumentRenderer, Element, MessageRenderer, PollRenderer, Viewport,
};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::FixtureError;
use crate::object::{Introspect, InvokeError, ObjectRef, RawValue};

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FixtureSpec {
    pub root: String,
    pub objects: IndexMap<String, ObjectSpec>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ObjectSpec {
    /// Most-derived class first.
    pub class: Vec<String>,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(default)]
    pub methods: IndexMap<String, MethodSpec>,
    #[serde(default)]
    pub relationships: IndexMap<String, String>,
    #[serde(default)]
    pub responds_to: Vec<String>,
    #[serde(default)]
    pub scalar: Option<Value>,
    #[serde(default)]
    pub renderer: Option<RendererSpec>,
}

/// What an accessor answers. Per-argument `cases` win over `returns`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodSpec {
    #[serde(default)]
    pub returns: Option<Value>,
    #[serde(default)]
    pub cases: Vec<CaseSpec>,
    /// Every call fails with this reason.
    #[serde(default)]
    pub fails: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseSpec {
    pub argument: Value,
    pub returns: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererKind {
    Poll,
    Message,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RendererSpec {
    pub kind: RendererKind,
    pub path: String,
    pub viewport: Viewport,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub delay_ms: Option<u64>,
    #[serde(default)]
    pub silent: bool,
}

impl RendererSpec {
    fn build(&self) -> ContentRenderer {
        let document = self
            .elements
            .iter()
            .cloned()
            .fold(Document::new(&self.path, self.viewport), Document::with_child);

        let mut renderer = DocumentRenderer::new(document);
        if let Some(delay) = self.delay_ms {
            renderer = renderer.with_delivery_delay(Duration::from_millis(delay));
        }
        if self.silent {
            renderer = renderer.silent();
        }

        match self.kind {
            RendererKind::Poll => {
                let renderer: Arc<dyn PollRenderer> = Arc::new(renderer);
                ContentRenderer::Poll(renderer)
            }
            RendererKind::Message => {
                let renderer: Arc<dyn MessageRenderer> = Arc::new(renderer);
                ContentRenderer::Message(renderer)
            }
        }
    }
}

struct Arena {
    objects: IndexMap<String, Arc<FixtureObject>>,
}

/// A live object built from an [`ObjectSpec`].
pub struct FixtureObject {
    name: String,
    spec: ObjectSpec,
    renderer: Option<ContentRenderer>,
    arena: Weak<Arena>,
}

impl FixtureObject {
    pub fn name(&self) -> &str {
        &self.name
    }

    fn lookup(&self, name: &str) -> Option<ObjectRef> {
        let arena = self.arena.upgrade()?;
        let object: ObjectRef = arena.objects.get(name)?.clone();
        Some(object)
    }

    fn lookup_all(&self, names: &Value) -> Vec<ObjectRef> {
        names
            .as_array()
            .map(|names| {
                names
                    .iter()
                    .filter_map(Value::as_str)
                    .filter_map(|name| self.lookup(name))
                    .collect()
            })
            .unwrap_or_default()
    }

    fn decode(&self, value: &Value) -> RawValue {
        match reference(value) {
            Some(Reference::One(name)) => match self.lookup(name) {
                Some(object) => RawValue::Object(object),
                None => RawValue::Scalar(Value::Null),
            },
            Some(Reference::List(names)) => RawValue::List(self.lookup_all(names)),
            Some(Reference::Set(names)) => RawValue::Set(self.lookup_all(names)),
            None => RawValue::Scalar(value.clone()),
        }
    }
}

impl Introspect for FixtureObject {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn class_hierarchy(&self) -> Vec<String> {
        self.spec.class.clone()
    }

    fn read_attribute(&self, name: &str) -> Option<RawValue> {
        self.spec.attributes.get(name).map(|value| self.decode(value))
    }

    fn invoke(&self, selector: &str, args: &[Value]) -> Result<Option<RawValue>, InvokeError> {
        let method = self
            .spec
            .methods
            .get(selector)
            .ok_or_else(|| InvokeError::NotImplemented(selector.to_string()))?;

        if let Some(reason) = &method.fails {
            return Err(InvokeError::Failed {
                selector: selector.to_string(),
                reason: reason.clone(),
            });
        }

        let answer = match args {
            [] => method.returns.as_ref(),
            [argument] => method
                .cases
                .iter()
                .find(|case| &case.argument == argument)
                .map(|case| &case.returns)
                .or(method.returns.as_ref()),
            _ => {
                return Err(InvokeError::Arity {
                    selector: selector.to_string(),
                    expected: 1,
                    got: args.len(),
                });
            }
        };

        Ok(answer.map(|value| self.decode(value)))
    }

    fn responds_to(&self, selector: &str) -> bool {
        self.spec.responds_to.iter().any(|s| s == selector) || self.spec.methods.contains_key(selector)
    }

    fn relationship(&self, name: &str) -> Option<ObjectRef> {
        self.spec
            .relationships
            .get(name)
            .and_then(|target| self.lookup(target))
    }

    fn scalar_value(&self) -> Option<Value> {
        self.spec.scalar.clone()
    }

    fn content_renderer(&self) -> Option<ContentRenderer> {
        self.renderer.clone()
    }
}

/// An object graph built from a fixture. Objects stay alive as long as the
/// graph does.
pub struct FixtureGraph {
    arena: Arc<Arena>,
    root: String,
}

impl FixtureGraph {
    pub fn from_path(path: &Path) -> Result<Self, FixtureError> {
        let source = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&source)
    }

    pub fn from_json(source: &str) -> Result<Self, FixtureError> {
        Self::from_spec(serde_json::from_str(source)?)
    }

    pub fn from_spec(spec: FixtureSpec) -> Result<Self, FixtureError> {
        validate(&spec)?;

        let FixtureSpec { root, objects } = spec;
        let count = objects.len();

        let arena = Arc::new_cyclic(|arena: &Weak<Arena>| Arena {
            objects: objects
                .into_iter()
                .map(|(name, spec)| {
                    let renderer = spec.renderer.as_ref().map(RendererSpec::build);
                    let object = FixtureObject {
                        name: name.clone(),
                        spec,
                        renderer,
                        arena: arena.clone(),
                    };
                    (name, Arc::new(object))
                })
                .collect(),
        });

        debug!(objects = count, root = %root, "fixture graph built");
        Ok(Self { arena, root })
    }

    pub fn root(&self) -> ObjectRef {
        let root = &self.arena.objects[self.root.as_str()];
        root.clone()
    }

    pub fn object(&self, name: &str) -> Option<ObjectRef> {
        let object: ObjectRef = self.arena.objects.get(name)?.clone();
        Some(object)
    }

    pub fn len(&self) -> usize {
        self.arena.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.objects.is_empty()
    }
}

enum Reference<'v> {
    One(&'v str),
    List(&'v Value),
    Set(&'v Value),
}

fn reference(value: &Value) -> Option<Reference<'_>> {
    let map: &Map<String, Value> = value.as_object()?;
    if map.len() != 1 {
        return None;
    }
    let (key, target) = map.iter().next()?;
    match key.as_str() {
        "$ref" => target.as_str().map(Reference::One),
        "$refs" => Some(Reference::List(target)),
        "$set" => Some(Reference::Set(target)),
        _ => None,
    }
}

fn referenced_names(value: &Value) -> Vec<&str> {
    match reference(value) {
        Some(Reference::One(name)) => vec![name],
        Some(Reference::List(names) | Reference::Set(names)) => names
            .as_array()
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default(),
        None => Vec::new(),
    }
}

fn validate(spec: &FixtureSpec) -> Result<(), FixtureError> {
    if !spec.objects.contains_key(&spec.root) {
        return Err(FixtureError::UnknownRoot(spec.root.clone()));
    }

    for (name, object) in &spec.objects {
        if object.class.is_empty() {
            return Err(FixtureError::EmptyHierarchy(name.clone()));
        }

        let returned = object.methods.values().flat_map(|method| {
            method
                .returns
                .iter()
                .chain(method.cases.iter().map(|case| &case.returns))
        });
        let targets = object
            .attributes
            .values()
            .chain(returned)
            .flat_map(referenced_names)
            .chain(object.relationships.values().map(String::as_str));

        for target in targets {
            if !spec.objects.contains_key(target) {
                return Err(FixtureError::UnknownReference {
                    object: name.clone(),
                    target: target.to_string(),
                });
            }
        }
    }

    Ok(())
}
