//! File-based schema discovery for CLI use
//!
//! Finds `glimpse.schema.toml` / `glimpse.schema.json` in a root directory,
//! or loads an explicit path, and compiles it into a [`SchemaRegistry`].

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format as _, Json, Toml},
};

use crate::config::SchemaConfig;
use crate::error::{ConfigError, Result};
use crate::registry::SchemaRegistry;
use crate::transform::TransformRegistry;

/// Conventional schema file names, in lookup order.
pub const SCHEMA_FILE_NAMES: [&str; 2] = ["glimpse.schema.toml", "glimpse.schema.json"];

/// Searches a directory for a schema file.
///
/// # Example
///
/// ```no_run
/// use glimpse_schema::{SchemaDiscovery, TransformRegistry};
///
/// let registry = SchemaDiscovery::new(".")
///     .load_registry(&TransformRegistry::builtin())
///     .unwrap();
/// println!("{} classes", registry.class_count());
/// ```
pub struct SchemaDiscovery {
    root: PathBuf,
}

impl SchemaDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// First conventional schema file that exists under the root.
    pub fn find(&self) -> Option<PathBuf> {
        SCHEMA_FILE_NAMES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.is_file())
    }

    /// Load the discovered schema document.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NothingDiscovered` if no schema file is found.
    pub fn load(&self) -> Result<SchemaConfig> {
        let path = self
            .find()
            .ok_or_else(|| ConfigError::NothingDiscovered(self.root.clone()))?;
        load_schema(&path)
    }

    /// Load and compile the discovered schema.
    pub fn load_registry(&self, transforms: &TransformRegistry) -> Result<SchemaRegistry> {
        SchemaRegistry::from_config(&self.load()?, transforms)
    }
}

/// Load a schema document from an explicit path. The format follows the
/// file extension (`.toml` or `.json`).
pub fn load_schema(path: &Path) -> Result<SchemaConfig> {
    if !path.is_file() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Figment::from(Toml::file(path)),
        Some("json") => Figment::from(Json::file(path)),
        other => {
            return Err(ConfigError::UnsupportedFormat(
                other.unwrap_or("<none>").to_string(),
            ));
        }
    };

    let config: SchemaConfig = figment.extract().map_err(|e| ConfigError::InvalidValue {
        field: "schema".to_string(),
        hint: e.to_string(),
    })?;

    tracing::debug!(
        path = %path.display(),
        classes = config.classes.len(),
        enums = config.enums.len(),
        "loaded schema"
    );

    Ok(config)
}

/// Load and compile a schema from an explicit path.
pub fn load_registry(path: &Path, transforms: &TransformRegistry) -> Result<SchemaRegistry> {
    SchemaRegistry::from_config(&load_schema(path)?, transforms)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn find_returns_none_when_no_schema() {
        let dir = TempDir::new().unwrap();
        assert!(SchemaDiscovery::new(dir.path()).find().is_none());
    }

    #[test]
    fn toml_wins_over_json() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("glimpse.schema.json"), "{}").unwrap();
        fs::write(dir.path().join("glimpse.schema.toml"), "").unwrap();

        let found = SchemaDiscovery::new(dir.path()).find().unwrap();
        assert!(found.ends_with("glimpse.schema.toml"));
    }

    #[test]
    fn load_reports_nothing_discovered() {
        let dir = TempDir::new().unwrap();
        let err = SchemaDiscovery::new(dir.path()).load().unwrap_err();
        assert!(matches!(err, ConfigError::NothingDiscovered(_)));
    }

    #[test]
    fn unsupported_extension_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("schema.yaml");
        fs::write(&path, "classes: []").unwrap();

        let err = load_schema(&path).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(ext) if ext == "yaml"));
    }
}
