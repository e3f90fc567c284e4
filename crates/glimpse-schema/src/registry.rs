//! The compiled, read-only schema.
//!
//! A [`SchemaRegistry`] owns every class and enum descriptor and precomputes
//! the inherited view of each class so lookups during traversal never walk
//! superclass chains.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;
use serde_json::Value;

use crate::config::{AccessConfig, PropertyConfig, SchemaConfig};
use crate::descriptor::{
    ClassDescriptor, DelegateDescriptor, EnumDescriptor, ParameterDescriptor, PropertyDescriptor,
};
use crate::error::{ConfigError, Result};
use crate::transform::{Transform, TransformRegistry};
use crate::validation::{ConfigValidator, SchemaValidator, find_superclass_cycle};

/// A class with its inherited properties and delegates flattened.
#[derive(Debug, Clone)]
pub struct ResolvedClass {
    name: String,
    properties: Vec<PropertyDescriptor>,
    delegates: Vec<DelegateDescriptor>,
}

impl ResolvedClass {
    /// Name of the described class (not necessarily the object's most-derived class).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own properties first, then each ancestor's in chain order. A name
    /// declared lower in the chain shadows the same name further up.
    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    pub fn delegates(&self) -> &[DelegateDescriptor] {
        &self.delegates
    }
}

#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    classes: IndexMap<String, ClassDescriptor>,
    resolved: IndexMap<String, ResolvedClass>,
    enums: IndexMap<String, EnumDescriptor>,
}

impl SchemaRegistry {
    pub fn builder() -> SchemaRegistryBuilder {
        SchemaRegistryBuilder::default()
    }

    /// Validate and compile a schema document.
    ///
    /// Each property's transform is resolved in order: the explicitly named
    /// transform, the transform bound to its declared type, identity when the
    /// type is itself a declared class. Anything else is a configuration error.
    pub fn from_config(config: &SchemaConfig, transforms: &TransformRegistry) -> Result<Self> {
        SchemaValidator.validate(config)?;

        let declared: FxHashSet<&str> = config.classes.iter().map(|c| c.name.as_str()).collect();
        let mut builder = Self::builder();

        for enumeration in &config.enums {
            builder = builder.enumeration(EnumDescriptor::new(
                enumeration.name.clone(),
                enumeration.values.clone(),
            ));
        }

        for class in &config.classes {
            let mut descriptor = ClassDescriptor::new(class.name.clone());
            if let Some(superclass) = &class.superclass {
                descriptor = descriptor.with_superclass(superclass.clone());
            }

            for property in &class.properties {
                let compiled = compile_property(property, transforms, &declared)
                    .map_err(|err| err.in_class(&class.name))?;
                descriptor = descriptor.with_property(compiled);
            }

            for delegate in &class.delegates {
                descriptor = descriptor.with_delegate(
                    DelegateDescriptor::new(delegate.selectors.iter().cloned())
                        .via(delegate.relationship.clone()),
                );
            }

            builder = builder.class(descriptor);
        }

        builder.build()
    }

    /// Describe an object from its class hierarchy (most-derived first).
    /// The first class with a descriptor wins.
    pub fn describe<S: AsRef<str>>(&self, hierarchy: &[S]) -> Option<&ResolvedClass> {
        hierarchy
            .iter()
            .find_map(|class| self.resolved.get(class.as_ref()))
    }

    /// Inherited view of a declared class.
    pub fn resolved(&self, class: &str) -> Option<&ResolvedClass> {
        self.resolved.get(class)
    }

    /// The class as declared, without inherited members.
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.get(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &ClassDescriptor> {
        self.classes.values()
    }

    /// Whether values declared with `type_name` are nested objects to follow.
    pub fn is_schema_backed(&self, type_name: &str) -> bool {
        self.classes.contains_key(type_name)
    }

    /// Enumerable domain bound to `type_name`, if declared.
    pub fn enum_values(&self, type_name: &str) -> Option<&[Value]> {
        self.enums.get(type_name).map(|e| e.values.as_slice())
    }

    pub fn enumerations(&self) -> impl Iterator<Item = &EnumDescriptor> {
        self.enums.values()
    }

    pub fn class_count(&self) -> usize {
        self.classes.len()
    }

    pub fn enum_count(&self) -> usize {
        self.enums.len()
    }

    /// Number of properties declared across all classes (inherited copies not counted).
    pub fn property_count(&self) -> usize {
        self.classes.values().map(|c| c.properties().len()).sum()
    }
}

/// Programmatic construction of a [`SchemaRegistry`].
#[derive(Debug, Default)]
pub struct SchemaRegistryBuilder {
    classes: Vec<ClassDescriptor>,
    enums: Vec<EnumDescriptor>,
}

impl SchemaRegistryBuilder {
    pub fn class(mut self, class: ClassDescriptor) -> Self {
        self.classes.push(class);
        self
    }

    pub fn enumeration(mut self, enumeration: EnumDescriptor) -> Self {
        self.enums.push(enumeration);
        self
    }

    pub fn build(self) -> Result<SchemaRegistry> {
        let mut classes = IndexMap::with_capacity(self.classes.len());
        for class in self.classes {
            if class.name().trim().is_empty() {
                return Err(ConfigError::EmptyName("class"));
            }
            if classes.contains_key(class.name()) {
                return Err(ConfigError::DuplicateClass(class.name().to_string()));
            }
            classes.insert(class.name().to_string(), class);
        }

        let mut enums = IndexMap::with_capacity(self.enums.len());
        for enumeration in self.enums {
            if enums.contains_key(&enumeration.name) {
                return Err(ConfigError::DuplicateEnum(enumeration.name));
            }
            enums.insert(enumeration.name.clone(), enumeration);
        }

        if let Some(class) = find_superclass_cycle(
            classes
                .values()
                .map(|c: &ClassDescriptor| (c.name(), c.superclass())),
        ) {
            return Err(ConfigError::SuperclassCycle(class));
        }

        let resolved = classes
            .keys()
            .map(|name| (name.clone(), resolve(&classes, name)))
            .collect();

        tracing::debug!(
            classes = classes.len(),
            enums = enums.len(),
            "compiled schema registry"
        );

        Ok(SchemaRegistry {
            classes,
            resolved,
            enums,
        })
    }
}

fn resolve(classes: &IndexMap<String, ClassDescriptor>, name: &str) -> ResolvedClass {
    let mut properties: Vec<PropertyDescriptor> = Vec::new();
    let mut delegates = Vec::new();
    let mut seen = FxHashSet::default();

    let mut current = classes.get(name);
    while let Some(class) = current {
        for property in class.properties() {
            if seen.insert(property.name().to_string()) {
                properties.push(property.clone());
            }
        }
        delegates.extend(class.delegates().iter().cloned());
        current = class.superclass().and_then(|parent| classes.get(parent));
    }

    ResolvedClass {
        name: name.to_string(),
        properties,
        delegates,
    }
}

fn compile_property(
    property: &PropertyConfig,
    transforms: &TransformRegistry,
    declared_classes: &FxHashSet<&str>,
) -> Result<PropertyDescriptor> {
    let transform = resolve_transform(property, transforms, declared_classes)?;

    let mut builder = PropertyDescriptor::builder(property.name.clone(), property.type_name.clone())
        .transform(transform);

    if let Some(condition) = &property.when {
        builder = builder.when(condition.clone());
    }

    let invoke = property.access == AccessConfig::Invoke
        || property.selector.is_some()
        || !property.parameters.is_empty();
    if invoke {
        let selector = property
            .selector
            .clone()
            .unwrap_or_else(|| property.name.clone());
        builder = builder.invoke(selector);
    }

    for parameter in &property.parameters {
        let mut compiled = ParameterDescriptor::new(parameter.type_name.clone());
        if let Some(name) = &parameter.name {
            compiled = compiled.named(name.clone());
        }
        builder = builder.parameter(compiled);
    }

    builder.build()
}

fn resolve_transform(
    property: &PropertyConfig,
    transforms: &TransformRegistry,
    declared_classes: &FxHashSet<&str>,
) -> Result<Transform> {
    if let Some(name) = &property.transform {
        return transforms
            .get(name)
            .cloned()
            .ok_or_else(|| ConfigError::UnknownTransform {
                property: property.name.clone(),
                transform: name.clone(),
            });
    }

    if let Some(transform) = transforms.for_type(&property.type_name) {
        return Ok(transform.clone());
    }

    if declared_classes.contains(property.type_name.as_str()) {
        return Ok(Transform::identity());
    }

    Err(ConfigError::MissingTransform {
        property: property.name.clone(),
    })
}
