//! Reading declared properties off live objects.

use glimpse_schema::{
    AccessMode, PropertyDescriptor, ReadCondition, SchemaRegistry, SelectorDescriptor,
};
use serde_json::Value;
use tracing::trace;

use crate::context::TraversalContext;
use crate::object::{AccessorTable, ObjectRef, RawValue};
use crate::snapshot::{PropertyResult, Variation};
use crate::transform::ValueTransformer;

pub struct PropertyIntrospector<'r> {
    schema: &'r SchemaRegistry,
    accessors: &'r AccessorTable,
    transformer: ValueTransformer<'r>,
}

impl<'r> PropertyIntrospector<'r> {
    pub fn new(schema: &'r SchemaRegistry, accessors: &'r AccessorTable) -> Self {
        Self {
            schema,
            accessors,
            transformer: ValueTransformer::new(schema),
        }
    }

    /// Argument lists to invoke `selector` with.
    ///
    /// No parameter gives one empty list. A parameter bound to an enumeration
    /// gives one list per value; any other parameter type gives none.
    pub fn variations(&self, selector: &SelectorDescriptor) -> Vec<Vec<Value>> {
        let Some(parameter) = &selector.parameter else {
            return vec![Vec::new()];
        };

        match self.schema.enum_values(&parameter.type_name) {
            Some(values) => values.iter().map(|value| vec![value.clone()]).collect(),
            None => {
                trace!(
                    selector = %selector.selector,
                    type_name = %parameter.type_name,
                    "parameter type has no enumerable domain"
                );
                Vec::new()
            }
        }
    }

    /// Whether `object` meets the property's read condition. Properties
    /// without one are always read.
    pub fn should_read(
        &self,
        object: &ObjectRef,
        hierarchy: &[String],
        property: &PropertyDescriptor,
    ) -> bool {
        let Some(condition) = property.read_condition() else {
            return true;
        };

        let holds = match condition {
            ReadCondition::KindOf(class) => hierarchy.iter().any(|name| name == class),
            ReadCondition::Present(attribute) => object
                .read_attribute(attribute)
                .is_some_and(|raw| !raw.is_absent()),
            ReadCondition::Equals { attribute, value } => matches!(
                object.read_attribute(attribute),
                Some(RawValue::Scalar(actual)) if actual == *value
            ),
        };

        if !holds {
            trace!(property = property.name(), ?condition, "read condition not met");
        }
        holds
    }

    /// Read one property. `None` leaves the property out of the node.
    pub fn read(
        &self,
        object: &ObjectRef,
        hierarchy: &[String],
        property: &PropertyDescriptor,
        context: &mut TraversalContext<'_>,
    ) -> Option<PropertyResult> {
        match property.access() {
            AccessMode::Direct => {
                let raw = object.read_attribute(property.name());
                self.transformer
                    .transform(property, raw, context)
                    .map(|value| PropertyResult::Direct { value })
            }
            AccessMode::Invoke(selector) => {
                let values = self.invoke_all(object, hierarchy, property, selector, context);
                (!values.is_empty()).then_some(PropertyResult::Invoked { values })
            }
        }
    }

    fn invoke_all(
        &self,
        object: &ObjectRef,
        hierarchy: &[String],
        property: &PropertyDescriptor,
        selector: &SelectorDescriptor,
        context: &mut TraversalContext<'_>,
    ) -> Vec<Variation> {
        let mut values = Vec::new();

        for args in self.variations(selector) {
            match self
                .accessors
                .invoke(object.as_ref(), hierarchy, &selector.selector, &args)
            {
                Ok(raw) => {
                    if let Some(value) = self.transformer.transform(property, raw, context) {
                        values.push(Variation::new(args, value));
                    }
                }
                Err(err) => {
                    trace!(
                        class = hierarchy.first().map(String::as_str).unwrap_or_default(),
                        property = property.name(),
                        error = %err,
                        "variation skipped"
                    );
                }
            }
        }

        values
    }
}
