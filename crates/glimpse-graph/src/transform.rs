//! Turning raw values into snapshot values.

use glimpse_schema::{PropertyDescriptor, SchemaRegistry};
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::context::TraversalContext;
use crate::object::{ObjectRef, RawValue};

/// Applies the transform priority to one raw value:
///
/// 1. an object already seen in this call becomes its identifier;
/// 2. an object whose declared type is schema-backed is queued and becomes
///    its identifier;
/// 3. a collection becomes the list of its elements' identifiers (queueing
///    new ones), then the property transform runs over that list;
/// 4. anything else runs through the property transform, an object with an
///    undescribed type contributing its scalar stand-in.
///
/// `None` means the value is absent and the property (or variation) is
/// left out.
#[derive(Clone, Copy)]
pub struct ValueTransformer<'r> {
    schema: &'r SchemaRegistry,
}

impl<'r> ValueTransformer<'r> {
    pub fn new(schema: &'r SchemaRegistry) -> Self {
        Self { schema }
    }

    pub fn transform(
        &self,
        property: &PropertyDescriptor,
        raw: Option<RawValue>,
        context: &mut TraversalContext<'_>,
    ) -> Option<Value> {
        let raw = raw.filter(|raw| !raw.is_absent())?;

        let value = match raw {
            RawValue::Object(object) => {
                if let Some(id) = context.visited(&object) {
                    return Some(Value::String(id.to_string()));
                }
                if self.schema.is_schema_backed(property.type_name()) {
                    return Some(Value::String(context.enqueue(&object).to_string()));
                }
                object.scalar_value()?
            }
            RawValue::List(objects) => identifiers(&objects, context),
            RawValue::Set(objects) => {
                let mut seen = FxHashSet::default();
                let unique: Vec<ObjectRef> = objects
                    .into_iter()
                    .filter(|object| seen.insert(context.identifier(object)))
                    .collect();
                identifiers(&unique, context)
            }
            RawValue::Scalar(value) => value,
        };

        property
            .transform()
            .apply(&value)
            .filter(|value| !value.is_null())
    }
}

fn identifiers(objects: &[ObjectRef], context: &mut TraversalContext<'_>) -> Value {
    Value::Array(
        objects
            .iter()
            .map(|object| Value::String(context.enqueue(object).to_string()))
            .collect(),
    )
}
