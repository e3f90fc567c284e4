//! Shared utilities for command implementations.

use crate::error::{CliError, Result};
use glimpse_schema::{SchemaConfig, SchemaDiscovery, load_schema};
use std::path::{Path, PathBuf};

/// Resolve a path relative to a working directory.
pub fn resolve_path(path: &Path, cwd: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    }
}

/// Get the current working directory.
pub fn get_cwd() -> Result<PathBuf> {
    std::env::current_dir().map_err(|e| {
        CliError::InvalidArgument(format!("Cannot determine current directory: {e}"))
    })
}

/// Load the schema named on the command line, or the one discovered in `cwd`.
///
/// Returns the path that was read along with the parsed document.
pub fn load_schema_config(explicit: Option<&Path>, cwd: &Path) -> Result<(PathBuf, SchemaConfig)> {
    let path = match explicit {
        Some(path) => resolve_path(path, cwd),
        None => {
            let discovery = SchemaDiscovery::new(cwd);
            match discovery.find() {
                Some(path) => path,
                None => return Err(glimpse_schema::ConfigError::NothingDiscovered(cwd.to_path_buf()).into()),
            }
        }
    };

    tracing::debug!(path = %path.display(), "loading schema");
    let config = load_schema(&path)?;
    Ok((path, config))
}
