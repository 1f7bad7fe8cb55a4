//! # relay-settings
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`RelaySettings::default()`], which describe the
//!    three-stage car-launch pipeline
//! 2. **User file**: `~/.relay/settings.json` or `--config`, deep-merged
//!    over the defaults
//! 3. **Environment variables**: `RELAY_*` overrides (highest priority)

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_file_layers, load_settings, load_settings_from_path,
    settings_path,
};
pub use types::*;
