//! # taskboard-settings
//!
//! Settings are resolved from three layers (in priority order):
//! 1. **Compiled defaults**: [`TaskboardSettings::default()`]
//! 2. **Settings file**: `~/.taskboard/settings.json` or an explicit path,
//!    deep-merged over the defaults
//! 3. **Environment variables**: `TASKBOARD_*` overrides
//!
//! The resolved value is handed to whoever needs it; there is no global.

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{apply_env_overrides, deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;
