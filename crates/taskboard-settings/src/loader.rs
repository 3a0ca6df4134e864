use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::errors::{Result, SettingsError};
use crate::types::TaskboardSettings;

/// Default settings file: `~/.taskboard/settings.json`.
pub fn settings_path() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join(".taskboard")
        .join("settings.json")
}

/// Recursively merge `overlay` into `base`. Objects merge key by key,
/// anything else in the overlay replaces the base value. `null` in the
/// overlay keeps the base value.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay {
                if value.is_null() {
                    continue;
                }
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, overlay) => overlay,
    }
}

/// Load from the default path. A missing file is not an error.
pub fn load_settings() -> Result<TaskboardSettings> {
    load_settings_from_path(&settings_path())
}

/// Defaults, then the file at `path` (if it exists), then `TASKBOARD_*`
/// environment overrides.
pub fn load_settings_from_path(path: &Path) -> Result<TaskboardSettings> {
    let file = read_file_layer(path)?;
    let mut settings = merge_over_defaults(file, path)?;
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok())?;
    Ok(settings)
}

fn read_file_layer(path: &Path) -> Result<Option<Value>> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(?path, "no settings file, using defaults");
            return Ok(None);
        }
        Err(source) => {
            return Err(SettingsError::Io {
                path: path.to_owned(),
                source,
            })
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|source| SettingsError::Parse {
            path: path.to_owned(),
            source,
        })
}

fn merge_over_defaults(file: Option<Value>, path: &Path) -> Result<TaskboardSettings> {
    let Some(file) = file else {
        return Ok(TaskboardSettings::default());
    };
    let defaults = serde_json::to_value(TaskboardSettings::default()).map_err(|source| {
        SettingsError::Parse {
            path: path.to_owned(),
            source,
        }
    })?;
    serde_json::from_value(deep_merge(defaults, file)).map_err(|source| SettingsError::Parse {
        path: path.to_owned(),
        source,
    })
}

/// Environment layer. `lookup` is injected so tests don't touch the
/// process environment.
pub fn apply_env_overrides(
    settings: &mut TaskboardSettings,
    lookup: impl Fn(&str) -> Option<String>,
) -> Result<()> {
    if let Some(url) = lookup("TASKBOARD_API_URL") {
        settings.api.base_url = url;
    }
    if let Some(path) = lookup("TASKBOARD_RESOURCE_PATH") {
        settings.api.resource_path = path;
    }
    if let Some(raw) = lookup("TASKBOARD_TIMEOUT_MS") {
        settings.api.timeout_ms = raw.trim().parse().map_err(|_| SettingsError::InvalidEnv {
            key: "TASKBOARD_TIMEOUT_MS",
            value: raw.clone(),
        })?;
    }
    if let Some(level) = lookup("TASKBOARD_LOG_LEVEL") {
        settings.logging.level = level;
    }
    if let Some(raw) = lookup("TASKBOARD_LOG_JSON") {
        settings.logging.json = match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" => true,
            "0" | "false" | "no" => false,
            _ => {
                return Err(SettingsError::InvalidEnv {
                    key: "TASKBOARD_LOG_JSON",
                    value: raw,
                })
            }
        };
    }
    Ok(())
}
