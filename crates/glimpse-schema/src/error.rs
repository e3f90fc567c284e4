//! Error types for schema loading and descriptor validation.
//!
//! Every variant here is a configuration error: it is raised while the
//! registry is being built, never in the middle of a traversal.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    // Schema file discovery/loading errors
    #[error("schema file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("no schema file found in {}", .0.display())]
    NothingDiscovered(PathBuf),

    #[error("unsupported schema format: {0}")]
    UnsupportedFormat(String),

    #[error("invalid schema value for '{field}': {hint}")]
    InvalidValue { field: String, hint: String },

    // Descriptor errors
    #[error("property '{property}' declares no value transform")]
    MissingTransform { property: String },

    #[error("property '{property}' names unknown value transform '{transform}'")]
    UnknownTransform { property: String, transform: String },

    #[error("property '{property}' declares {count} accessor parameters (at most 1 is supported)")]
    TooManyParameters { property: String, count: usize },

    #[error("descriptor has an empty {0} name")]
    EmptyName(&'static str),

    // Registry-level errors
    #[error("class '{0}' is declared more than once")]
    DuplicateClass(String),

    #[error("enum '{0}' is declared more than once")]
    DuplicateEnum(String),

    #[error("class '{class}' declares property '{property}' more than once")]
    DuplicateProperty { class: String, property: String },

    #[error("superclass chain of '{0}' loops back on itself")]
    SuperclassCycle(String),

    #[error("class '{class}' names undeclared superclass '{superclass}'")]
    UnknownSuperclass { class: String, superclass: String },

    #[error("parameter of '{property}' names undeclared enum '{type_name}'")]
    UnknownParameterType { property: String, type_name: String },

    #[error("in class '{class}': {source}")]
    InClass {
        class: String,
        #[source]
        source: Box<ConfigError>,
    },
}

impl ConfigError {
    /// Attach the owning class name to a descriptor-level error.
    pub fn in_class(self, class: impl Into<String>) -> Self {
        ConfigError::InClass {
            class: class.into(),
            source: Box::new(self),
        }
    }
}
