//! Miette diagnostic conversion for CLI errors.

use crate::error::CliError;
use glimpse_graph::{FixtureError, GraphError};
use glimpse_schema::ConfigError;
use miette::Report;

/// Convert CliError to miette Report
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Schema(e) => schema_error_to_miette(e),
        CliError::Fixture(e) => fixture_error_to_miette(e),
        CliError::Graph(GraphError::TooManyObjects { count, max }) => miette::miette!(
            "Object graph is too large: reached {} objects (max {})\n\nHint: Raise --max-objects or max_objects in glimpse.toml",
            count,
            max
        ),
        _ => miette::miette!("{}", err),
    }
}

/// Convert schema ConfigError to miette Report
pub fn schema_error_to_miette(err: ConfigError) -> Report {
    match err {
        ConfigError::NothingDiscovered(dir) => miette::miette!(
            "No schema found in {}\n\nHint: Add glimpse.schema.toml or pass --schema <file>",
            dir.display()
        ),
        ConfigError::MissingTransform { property } => miette::miette!(
            "Property '{}' has no value transform\n\nHint: Set 'transform' explicitly or use a type with a built-in transform",
            property
        ),
        ConfigError::InClass { class, source } => {
            miette::miette!("In class '{}': {}", class, source)
        }
        other => miette::miette!("Schema error: {}", other),
    }
}

/// Convert FixtureError to miette Report
pub fn fixture_error_to_miette(err: FixtureError) -> Report {
    match err {
        FixtureError::UnknownReference { object, target } => miette::miette!(
            "Object '{}' refers to '{}', which the fixture never declares\n\nHint: Add '{}' under \"objects\" or fix the reference",
            object,
            target,
            target
        ),
        other => miette::miette!("Fixture error: {}", other),
    }
}
