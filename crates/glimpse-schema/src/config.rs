//! Serde representation of a schema document.
//!
//! This is the shape read from `glimpse.schema.toml` / `glimpse.schema.json`.
//! It carries no behaviour; [`SchemaRegistry::from_config`](crate::SchemaRegistry::from_config)
//! compiles it into descriptors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::descriptor::{DEFAULT_DELEGATE_RELATIONSHIP, ReadCondition};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SchemaConfig {
    #[serde(default)]
    pub classes: Vec<ClassConfig>,

    #[serde(default)]
    pub enums: Vec<EnumConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClassConfig {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,

    #[serde(default)]
    pub properties: Vec<PropertyConfig>,

    #[serde(default)]
    pub delegates: Vec<DelegateConfig>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessConfig {
    #[default]
    Direct,
    Invoke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyConfig {
    pub name: String,

    /// Declared value type; drives the default transform and whether nested
    /// objects are followed.
    #[serde(rename = "type")]
    pub type_name: String,

    #[serde(default)]
    pub access: AccessConfig,

    /// Accessor name for invoke mode. Defaults to the property name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<String>,

    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,

    /// Named transform. Falls back to the transform bound to `type`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transform: Option<String>,

    /// Skip the property on objects that don't meet this condition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub when: Option<ReadCondition>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "type")]
    pub type_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DelegateConfig {
    #[serde(default = "default_relationship")]
    pub relationship: String,

    #[serde(default)]
    pub selectors: Vec<String>,
}

fn default_relationship() -> String {
    DEFAULT_DELEGATE_RELATIONSHIP.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EnumConfig {
    pub name: String,
    pub values: Vec<Value>,
}
