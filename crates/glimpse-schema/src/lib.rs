//! Schema registry for glimpse object-graph snapshots.
//!
//! The schema says which classes are worth describing, which of their
//! properties to read (directly or through an accessor invoked once per
//! parameter variation), how each value is transformed, and which delegate
//! methods to report. Everything is validated up front so the serializer
//! never meets a configuration error mid-traversal.

pub mod config;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod transform;
pub mod validation;

pub use config::*;
pub use descriptor::*;
pub use error::*;
pub use registry::{ResolvedClass, SchemaRegistry, SchemaRegistryBuilder};
pub use transform::{Transform, TransformRegistry};

pub use discovery::{SCHEMA_FILE_NAMES, SchemaDiscovery, load_registry, load_schema};
pub use validation::{
    ConfigValidator, SchemaValidator, StrictValidator, validate_schema, validate_strict,
};
