//! Pluggable schema validation strategies
//!
//! [`SchemaValidator`] enforces the structural rules every registry needs
//! (names, uniqueness, acyclic superclass chains). [`StrictValidator`] also
//! rejects references to classes and enums the document never declares,
//! which the structural pass only logs.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::config::SchemaConfig;
use crate::error::{ConfigError, Result};

/// Trait for pluggable schema validation strategies
pub trait ConfigValidator {
    fn validate(&self, config: &SchemaConfig) -> Result<()>;
}

/// Structural validation. Dangling references only produce a warning.
///
/// # Example
///
/// ```
/// use glimpse_schema::{ConfigValidator, SchemaConfig, SchemaValidator};
///
/// SchemaValidator.validate(&SchemaConfig::default()).unwrap();
/// ```
pub struct SchemaValidator;

impl ConfigValidator for SchemaValidator {
    fn validate(&self, config: &SchemaConfig) -> Result<()> {
        let mut class_names = FxHashSet::default();
        for class in &config.classes {
            if class.name.trim().is_empty() {
                return Err(ConfigError::EmptyName("class"));
            }
            if !class_names.insert(class.name.as_str()) {
                return Err(ConfigError::DuplicateClass(class.name.clone()));
            }

            let mut property_names = FxHashSet::default();
            for property in &class.properties {
                if property.name.trim().is_empty() {
                    return Err(ConfigError::EmptyName("property").in_class(&class.name));
                }
                if !property_names.insert(property.name.as_str()) {
                    return Err(ConfigError::DuplicateProperty {
                        class: class.name.clone(),
                        property: property.name.clone(),
                    });
                }
                if property.parameters.len() > 1 {
                    return Err(ConfigError::TooManyParameters {
                        property: property.name.clone(),
                        count: property.parameters.len(),
                    }
                    .in_class(&class.name));
                }
            }

            for delegate in &class.delegates {
                if delegate.relationship.trim().is_empty() {
                    return Err(ConfigError::EmptyName("delegate relationship").in_class(&class.name));
                }
            }
        }

        let mut enum_names = FxHashSet::default();
        for enumeration in &config.enums {
            if enumeration.name.trim().is_empty() {
                return Err(ConfigError::EmptyName("enum"));
            }
            if !enum_names.insert(enumeration.name.as_str()) {
                return Err(ConfigError::DuplicateEnum(enumeration.name.clone()));
            }
        }

        if let Some(class) = find_superclass_cycle(
            config
                .classes
                .iter()
                .map(|class| (class.name.as_str(), class.superclass.as_deref())),
        ) {
            return Err(ConfigError::SuperclassCycle(class));
        }

        for issue in dangling_references(config) {
            tracing::warn!("{issue}");
        }

        Ok(())
    }
}

/// Structural validation plus hard errors for dangling references.
pub struct StrictValidator;

impl ConfigValidator for StrictValidator {
    fn validate(&self, config: &SchemaConfig) -> Result<()> {
        SchemaValidator.validate(config)?;

        match dangling_references(config).into_iter().next() {
            Some(issue) => Err(issue),
            None => Ok(()),
        }
    }
}

/// Convenience function for structural validation
pub fn validate_schema(config: &SchemaConfig) -> Result<()> {
    SchemaValidator.validate(config)
}

/// Convenience function for strict validation
pub fn validate_strict(config: &SchemaConfig) -> Result<()> {
    StrictValidator.validate(config)
}

/// Returns the first class whose superclass chain revisits a class.
pub(crate) fn find_superclass_cycle<'a, I>(classes: I) -> Option<String>
where
    I: IntoIterator<Item = (&'a str, Option<&'a str>)>,
{
    let parents: FxHashMap<&str, Option<&str>> = classes.into_iter().collect();

    let mut names: Vec<&str> = parents.keys().copied().collect();
    names.sort_unstable();

    for start in names {
        let mut seen = FxHashSet::default();
        let mut current = Some(start);
        while let Some(name) = current {
            if !seen.insert(name) {
                return Some(start.to_string());
            }
            current = parents.get(name).copied().flatten();
        }
    }

    None
}

fn dangling_references(config: &SchemaConfig) -> Vec<ConfigError> {
    let classes: FxHashSet<&str> = config.classes.iter().map(|c| c.name.as_str()).collect();
    let enums: FxHashSet<&str> = config.enums.iter().map(|e| e.name.as_str()).collect();

    let mut issues = Vec::new();
    for class in &config.classes {
        if let Some(superclass) = &class.superclass {
            if !classes.contains(superclass.as_str()) {
                issues.push(ConfigError::UnknownSuperclass {
                    class: class.name.clone(),
                    superclass: superclass.clone(),
                });
            }
        }

        for property in &class.properties {
            for parameter in &property.parameters {
                if !enums.contains(parameter.type_name.as_str()) {
                    issues.push(ConfigError::UnknownParameterType {
                        property: format!("{}.{}", class.name, property.name),
                        type_name: parameter.type_name.clone(),
                    });
                }
            }
        }
    }
    issues
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_detection_finds_self_reference() {
        let cycle = find_superclass_cycle([("A", Some("A"))]);
        assert_eq!(cycle.as_deref(), Some("A"));
    }

    #[test]
    fn cycle_detection_ignores_dangling_parent() {
        let cycle = find_superclass_cycle([("UIButton", Some("UIControl")), ("UIControl", Some("NSObject"))]);
        assert!(cycle.is_none());
    }

    #[test]
    fn cycle_detection_finds_two_class_loop() {
        let cycle = find_superclass_cycle([("A", Some("B")), ("B", Some("A")), ("C", None)]);
        assert_eq!(cycle.as_deref(), Some("A"));
    }
}
