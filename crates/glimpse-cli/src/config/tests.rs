use super::*;
use crate::error::{CliError, SettingsError};
use serial_test::serial;
use std::fs;
use tempfile::TempDir;

fn clear_env() {
    unsafe {
        std::env::remove_var("GLIMPSE_BRIDGE_TIMEOUT_MS");
        std::env::remove_var("GLIMPSE_MAX_OBJECTS");
        std::env::remove_var("GLIMPSE_PRETTY");
    }
}

#[test]
#[serial]
fn defaults_without_sources() {
    clear_env();
    let temp = TempDir::new().unwrap();

    let settings = GlimpseSettings::load(&SettingsOverrides::default(), None, temp.path()).unwrap();
    assert_eq!(settings, GlimpseSettings::default());
    assert_eq!(settings.bridge_timeout().as_millis(), 2_000);
}

#[test]
#[serial]
fn file_then_env_then_flags() {
    clear_env();
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join(SETTINGS_FILE_NAME),
        "bridge_timeout_ms = 500\nmax_objects = 10\npretty = false\n",
    )
    .unwrap();

    let from_file = GlimpseSettings::load(&SettingsOverrides::default(), None, temp.path()).unwrap();
    assert_eq!(from_file.bridge_timeout_ms, 500);
    assert_eq!(from_file.max_objects, Some(10));
    assert!(!from_file.pretty);

    unsafe { std::env::set_var("GLIMPSE_MAX_OBJECTS", "20") };
    let from_env = GlimpseSettings::load(&SettingsOverrides::default(), None, temp.path()).unwrap();
    assert_eq!(from_env.max_objects, Some(20));
    assert_eq!(from_env.bridge_timeout_ms, 500);

    let overrides = SettingsOverrides {
        max_objects: Some(30),
        ..SettingsOverrides::default()
    };
    let from_flags = GlimpseSettings::load(&overrides, None, temp.path()).unwrap();
    assert_eq!(from_flags.max_objects, Some(30));

    clear_env();
}

#[test]
#[serial]
fn explicit_missing_file_is_an_error() {
    clear_env();
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.toml");

    let err = GlimpseSettings::load(&SettingsOverrides::default(), Some(&missing), temp.path()).unwrap_err();
    assert!(matches!(err, CliError::Settings(SettingsError::NotFound(_))));
}

#[test]
#[serial]
fn wrong_type_names_the_field() {
    clear_env();
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(SETTINGS_FILE_NAME), "bridge_timeout_ms = \"soon\"\n").unwrap();

    let err = GlimpseSettings::load(&SettingsOverrides::default(), None, temp.path()).unwrap_err();
    let CliError::Settings(SettingsError::InvalidValue { field, .. }) = err else {
        panic!("expected invalid value, got {err:?}");
    };
    assert_eq!(field, "bridge_timeout_ms");
}
