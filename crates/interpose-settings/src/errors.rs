//! Errors raised while assembling [`InterposeSettings`](crate::InterposeSettings).

use thiserror::Error;

/// Why the interpose settings could not be produced.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The user settings file exists but could not be read.
    #[error("cannot read interpose settings file: {0}")]
    Io(#[from] std::io::Error),
    /// The settings file is not valid JSON, or the merged document does not
    /// fit the settings schema (for example an unknown log format).
    #[error("malformed interpose settings: {0}")]
    Json(#[from] serde_json::Error),
    /// The merged settings failed validation (unknown log level, empty deny
    /// token).
    #[error("rejected interpose setting: {0}")]
    InvalidValue(String),
}

/// Result alias for settings loading.
pub type Result<T> = std::result::Result<T, SettingsError>;
