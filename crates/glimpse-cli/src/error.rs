//! Error handling for the glimpse CLI.
//!
//! Library errors convert into [`CliError`] via `#[from]`; `main` turns the
//! final error into a `miette` report (see [`miette`](self::miette)).

pub mod miette;

pub use self::miette::cli_error_to_miette;

use std::path::PathBuf;
use thiserror::Error;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Schema loading or validation failed
    #[error("Schema error: {0}")]
    Schema(#[from] glimpse_schema::ConfigError),

    /// CLI settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The fixture graph could not be built
    #[error("Fixture error: {0}")]
    Fixture(#[from] glimpse_graph::FixtureError),

    /// Serialization was aborted
    #[error("Snapshot error: {0}")]
    Graph(#[from] glimpse_graph::GraphError),

    /// Content extraction failed
    #[error("Content error: {0}")]
    Bridge(#[from] glimpse_bridge::BridgeError),

    /// Invalid command-line arguments or options
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Settings-specific errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Explicit settings file doesn't exist
    #[error("Settings file not found: {}\n\nHint: Create glimpse.toml or drop --config", .0.display())]
    NotFound(PathBuf),

    /// A settings source held a value of the wrong shape
    #[error("Invalid value for '{field}': {value}\n\nHint: {hint}")]
    InvalidValue {
        field: String,
        value: String,
        hint: String,
    },
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Attach a path to I/O failures.
pub trait ResultExt<T> {
    fn with_path(self, path: &std::path::Path) -> Result<T>;
}

impl<T> ResultExt<T> for std::result::Result<T, std::io::Error> {
    fn with_path(self, path: &std::path::Path) -> Result<T> {
        self.map_err(|e| {
            CliError::Io(std::io::Error::new(
                e.kind(),
                format!("{}: {}", path.display(), e),
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_errors_convert() {
        let err: CliError = glimpse_schema::ConfigError::NotFound(PathBuf::from("x.toml")).into();
        assert!(matches!(err, CliError::Schema(_)));
        assert!(err.to_string().contains("x.toml"));
    }

    #[test]
    fn io_errors_carry_path() {
        let result: std::result::Result<(), std::io::Error> =
            Err(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let err = result.with_path(std::path::Path::new("graph.json")).unwrap_err();
        assert!(err.to_string().contains("graph.json: gone"));
    }
}
