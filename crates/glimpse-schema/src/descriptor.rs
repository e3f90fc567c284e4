//! Class, property, delegate and enum descriptors.
//!
//! Descriptors are immutable once built. [`PropertyDescriptor`] can only be
//! obtained through its builder, which rejects the two configuration errors
//! the serializer must never see at traversal time: a missing value
//! transform and more than one accessor parameter.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ConfigError, Result};
use crate::transform::Transform;

/// Relationship accessor used when a delegate descriptor doesn't name one.
pub const DEFAULT_DELEGATE_RELATIONSHIP: &str = "delegate";

/// How a property's value is obtained from a live object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessMode {
    /// Read the named attribute directly.
    Direct,
    /// Invoke an accessor once per parameter variation.
    Invoke(SelectorDescriptor),
}

/// Accessor selector plus its (optional) single parameter slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectorDescriptor {
    pub selector: String,
    pub parameter: Option<ParameterDescriptor>,
}

/// One accessor parameter slot. `type_name` selects the domain of values the
/// accessor is invoked with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: Option<String>,
    pub type_name: String,
}

impl ParameterDescriptor {
    pub fn new(type_name: impl Into<String>) -> Self {
        Self {
            name: None,
            type_name: type_name.into(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Gate checked against an object before one of its properties is read.
///
/// Written in schema documents as `{ "kind_of": "UIButton" }`,
/// `{ "present": "window" }` or
/// `{ "equals": { "attribute": "hidden", "value": false } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadCondition {
    /// The object's class hierarchy contains this class.
    KindOf(String),
    /// The attribute reads as something other than null.
    Present(String),
    /// The attribute reads as exactly this scalar.
    Equals { attribute: String, value: Value },
}

impl ReadCondition {
    /// Attribute the condition reads, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            ReadCondition::KindOf(_) => None,
            ReadCondition::Present(attribute) | ReadCondition::Equals { attribute, .. } => {
                Some(attribute)
            }
        }
    }
}

/// A declared property of a class.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    type_name: String,
    access: AccessMode,
    transform: Transform,
    condition: Option<ReadCondition>,
}

impl PropertyDescriptor {
    /// Start building a descriptor for `name` with declared value type `type_name`.
    pub fn builder(name: impl Into<String>, type_name: impl Into<String>) -> PropertyDescriptorBuilder {
        PropertyDescriptorBuilder {
            name: name.into(),
            type_name: type_name.into(),
            selector: None,
            parameters: Vec::new(),
            transform: None,
            condition: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn access(&self) -> &AccessMode {
        &self.access
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn is_direct(&self) -> bool {
        matches!(self.access, AccessMode::Direct)
    }

    /// Condition an object must meet for this property to be read at all.
    pub fn read_condition(&self) -> Option<&ReadCondition> {
        self.condition.as_ref()
    }
}

/// Builder for [`PropertyDescriptor`].
#[derive(Debug)]
pub struct PropertyDescriptorBuilder {
    name: String,
    type_name: String,
    selector: Option<String>,
    parameters: Vec<ParameterDescriptor>,
    transform: Option<Transform>,
    condition: Option<ReadCondition>,
}

impl PropertyDescriptorBuilder {
    /// Switch to invoke-accessor mode using `selector`.
    pub fn invoke(mut self, selector: impl Into<String>) -> Self {
        self.selector = Some(selector.into());
        self
    }

    /// Declare an accessor parameter. Implies invoke mode with the property
    /// name as selector unless [`invoke`](Self::invoke) was called.
    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    /// Only read the property from objects meeting `condition`.
    pub fn when(mut self, condition: ReadCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    pub fn build(self) -> Result<PropertyDescriptor> {
        if self.name.trim().is_empty() {
            return Err(ConfigError::EmptyName("property"));
        }

        if let Some(condition) = &self.condition {
            let target = match condition {
                ReadCondition::KindOf(class) => class.as_str(),
                other => other.attribute().unwrap_or_default(),
            };
            if target.trim().is_empty() {
                return Err(ConfigError::EmptyName("read condition"));
            }
        }

        let transform = self.transform.ok_or_else(|| ConfigError::MissingTransform {
            property: self.name.clone(),
        })?;

        if self.parameters.len() > 1 {
            return Err(ConfigError::TooManyParameters {
                property: self.name,
                count: self.parameters.len(),
            });
        }

        let access = match (self.selector, self.parameters.into_iter().next()) {
            (None, None) => AccessMode::Direct,
            (selector, parameter) => AccessMode::Invoke(SelectorDescriptor {
                selector: selector.unwrap_or_else(|| self.name.clone()),
                parameter,
            }),
        };

        Ok(PropertyDescriptor {
            name: self.name,
            type_name: self.type_name,
            access,
            transform,
            condition: self.condition,
        })
    }
}

/// A delegate relationship and the methods the snapshot reports on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegateDescriptor {
    pub relationship: String,
    pub selectors: Vec<String>,
}

impl DelegateDescriptor {
    pub fn new<I, S>(selectors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            relationship: DEFAULT_DELEGATE_RELATIONSHIP.to_string(),
            selectors: selectors.into_iter().map(Into::into).collect(),
        }
    }

    pub fn via(mut self, relationship: impl Into<String>) -> Self {
        self.relationship = relationship.into();
        self
    }
}

/// A class as declared in the schema.
#[derive(Debug, Clone)]
pub struct ClassDescriptor {
    name: String,
    superclass: Option<String>,
    properties: Vec<PropertyDescriptor>,
    delegates: Vec<DelegateDescriptor>,
}

impl ClassDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            properties: Vec::new(),
            delegates: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_property(mut self, property: PropertyDescriptor) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_delegate(mut self, delegate: DelegateDescriptor) -> Self {
        self.delegates.push(delegate);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn superclass(&self) -> Option<&str> {
        self.superclass.as_deref()
    }

    /// Properties declared on this class only, in declaration order.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Delegate descriptors declared on this class only.
    pub fn delegates(&self) -> &[DelegateDescriptor] {
        &self.delegates
    }
}

/// A named, enumerable domain of parameter values.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDescriptor {
    pub name: String,
    pub values: Vec<Value>,
}

impl EnumDescriptor {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_defaults_to_direct_access() {
        let property = PropertyDescriptor::builder("frame", "CGRect")
            .transform(Transform::identity())
            .build()
            .unwrap();
        assert!(property.is_direct());
    }

    #[test]
    fn parameter_implies_invoke_with_property_name() {
        let property = PropertyDescriptor::builder("title", "NSString")
            .parameter(ParameterDescriptor::new("UIControlState"))
            .transform(Transform::identity())
            .build()
            .unwrap();

        match property.access() {
            AccessMode::Invoke(selector) => {
                assert_eq!(selector.selector, "title");
                assert_eq!(
                    selector.parameter.as_ref().unwrap().type_name,
                    "UIControlState"
                );
            }
            AccessMode::Direct => panic!("expected invoke access"),
        }
    }

    #[test]
    fn missing_transform_is_rejected() {
        let err = PropertyDescriptor::builder("frame", "CGRect")
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingTransform { .. }));
    }

    #[test]
    fn read_condition_is_kept_on_the_descriptor() {
        let property = PropertyDescriptor::builder("title", "NSString")
            .transform(Transform::identity())
            .when(ReadCondition::KindOf("UIButton".into()))
            .build()
            .unwrap();
        assert_eq!(
            property.read_condition(),
            Some(&ReadCondition::KindOf("UIButton".into()))
        );
        assert!(property.read_condition().unwrap().attribute().is_none());
    }

    #[test]
    fn blank_read_condition_is_rejected() {
        let err = PropertyDescriptor::builder("title", "NSString")
            .transform(Transform::identity())
            .when(ReadCondition::Present(" ".into()))
            .build()
            .unwrap_err();
        assert!(matches!(err, ConfigError::EmptyName("read condition")));
    }

    #[test]
    fn two_parameters_are_rejected() {
        let err = PropertyDescriptor::builder("titleFor", "NSString")
            .invoke("titleForState:barMetrics:")
            .parameter(ParameterDescriptor::new("UIControlState"))
            .parameter(ParameterDescriptor::new("UIBarMetrics"))
            .transform(Transform::identity())
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::TooManyParameters { count: 2, .. }
        ));
    }
}
