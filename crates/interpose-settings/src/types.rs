//! Settings type definitions.
//!
//! All types use camelCase JSON field names and `#[serde(default)]`, so a
//! partial settings file only needs the fields it overrides.

use interpose::logging::LogFormat;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, SettingsError};

/// Log levels accepted by [`LoggingSettings::level`].
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

/// Root settings type.
///
/// ```json
/// {
///   "logging": { "level": "debug", "format": "json" },
///   "demo": { "denyToken": "blocked" }
/// }
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct InterposeSettings {
    /// Settings schema version.
    pub version: String,
    /// Logging configuration.
    pub logging: LoggingSettings,
    /// Demo chain configuration.
    pub demo: DemoSettings,
}

impl Default for InterposeSettings {
    fn default() -> Self {
        Self {
            version: "0.1.0".to_string(),
            logging: LoggingSettings::default(),
            demo: DemoSettings::default(),
        }
    }
}

impl InterposeSettings {
    /// Check values that deserialization alone cannot validate.
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.logging.level.as_str()) {
            return Err(SettingsError::InvalidValue(format!(
                "unknown log level: {}",
                self.logging.level
            )));
        }
        if self.demo.deny_token.is_empty() {
            return Err(SettingsError::InvalidValue(
                "demo.denyToken must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Logging configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level written to stderr. `RUST_LOG` still wins when set.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Compact,
        }
    }
}

/// Demo chain configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoSettings {
    /// First argument value the auth interceptor refuses.
    pub deny_token: String,
}

impl Default for DemoSettings {
    fn default() -> Self {
        Self {
            deny_token: "deny".to_string(),
        }
    }
}
