use crate::config::GlimpseSettings;
use crate::error::{Result, SettingsError};
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};
use serde::Serialize;
use std::path::Path;

/// Settings file looked up in the working directory.
pub const SETTINGS_FILE_NAME: &str = "glimpse.toml";

const ENV_KEYS: [&str; 3] = ["bridge_timeout_ms", "max_objects", "pretty"];

/// Values given on the command line. Unset fields leave lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SettingsOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bridge_timeout_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_objects: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pretty: Option<bool>,
}

impl GlimpseSettings {
    /// Load settings from every source.
    ///
    /// `config_path` must exist when given; otherwise `glimpse.toml` in `cwd`
    /// is used if present.
    pub fn load(overrides: &SettingsOverrides, config_path: Option<&Path>, cwd: &Path) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Self::default()));

        let config_file = match config_path {
            Some(path) if !path.is_file() => {
                return Err(SettingsError::NotFound(path.to_path_buf()).into());
            }
            Some(path) => Some(path.to_path_buf()),
            None => {
                let default_path = cwd.join(SETTINGS_FILE_NAME);
                default_path.is_file().then_some(default_path)
            }
        };

        if let Some(path) = config_file {
            tracing::debug!(path = %path.display(), "loading settings file");
            figment = figment.merge(Toml::file(path));
        }

        // GLIMPSE_BRIDGE_TIMEOUT_MS, GLIMPSE_MAX_OBJECTS, GLIMPSE_PRETTY
        figment = figment.merge(Env::prefixed("GLIMPSE_").only(&ENV_KEYS));

        figment = figment.merge(Serialized::defaults(overrides.clone()));

        figment.extract().map_err(|e| {
            SettingsError::InvalidValue {
                field: e.path.join("."),
                value: e.to_string(),
                hint: "Check glimpse.toml and GLIMPSE_* variables".to_string(),
            }
            .into()
        })
    }
}
