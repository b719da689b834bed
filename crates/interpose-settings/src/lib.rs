//! # interpose-settings
//!
//! Configuration for applications built on `interpose`.
//!
//! Settings are loaded from three layers (in priority order):
//! 1. **Compiled defaults**: [`InterposeSettings::default()`]
//! 2. **User file**: `~/.interpose/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `INTERPOSE_*` overrides (highest priority)
//!
//! # Usage
//!
//! ```no_run
//! use interpose_settings::get_settings;
//!
//! let settings = get_settings();
//! println!("log level: {}", settings.logging.level);
//! ```

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;
pub mod types;

pub use errors::{Result, SettingsError};
pub use loader::{deep_merge, load_settings, load_settings_from_path, settings_path};
pub use types::*;

use std::sync::OnceLock;

static SETTINGS: OnceLock<InterposeSettings> = OnceLock::new();

/// Get the global settings instance.
///
/// Loaded on first call; falls back to compiled defaults if loading fails.
pub fn get_settings() -> &'static InterposeSettings {
    SETTINGS.get_or_init(|| load_settings().unwrap_or_default())
}

/// Initialize the global settings with a specific value.
///
/// # Errors
///
/// Returns the provided settings back if the global was already initialized.
#[allow(clippy::result_large_err)]
pub fn init_settings(settings: InterposeSettings) -> std::result::Result<(), InterposeSettings> {
    SETTINGS.set(settings)
}
