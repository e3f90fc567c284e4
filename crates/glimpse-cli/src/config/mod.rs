//! CLI settings with multi-source loading.
//!
//! Priority: CLI flags > `GLIMPSE_*` environment > `glimpse.toml` > defaults

mod loading;
#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use loading::{SETTINGS_FILE_NAME, SettingsOverrides};

/// Default wait for embedded content to report.
pub const DEFAULT_BRIDGE_TIMEOUT_MS: u64 = 2_000;

/// Settings shared by the snapshot and content commands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GlimpseSettings {
    /// How long a content bridge waits for a report, in milliseconds
    pub bridge_timeout_ms: u64,

    /// Upper bound on serialized objects
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_objects: Option<usize>,

    /// Pretty-print snapshot documents
    pub pretty: bool,
}

impl GlimpseSettings {
    pub fn bridge_timeout(&self) -> Duration {
        Duration::from_millis(self.bridge_timeout_ms)
    }
}

impl Default for GlimpseSettings {
    fn default() -> Self {
        Self {
            bridge_timeout_ms: DEFAULT_BRIDGE_TIMEOUT_MS,
            max_objects: None,
            pretty: true,
        }
    }
}
