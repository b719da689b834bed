//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`InterposeSettings::default()`]
//! 2. If `~/.interpose/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//! 4. Validate the result
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use interpose::logging::LogFormat;
use serde_json::Value;
use tracing::debug;

use crate::errors::Result;
use crate::types::{InterposeSettings, LOG_LEVELS};

/// Resolve the path to the settings file (`~/.interpose/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".interpose").join("settings.json")
}

/// Load settings from the default path with env var overrides.
pub fn load_settings() -> Result<InterposeSettings> {
    load_settings_from_path(&settings_path())
}

/// Load settings from a specific path with env var overrides.
///
/// A missing file yields defaults. Invalid JSON or an invalid value is an
/// error.
pub fn load_settings_from_path(path: &Path) -> Result<InterposeSettings> {
    let defaults = serde_json::to_value(InterposeSettings::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut settings: InterposeSettings = serde_json::from_value(merged)?;
    apply_env_overrides(&mut settings);
    settings.validate()?;
    Ok(settings)
}

/// Recursive deep merge of two JSON values.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut target_map), Value::Object(source_map)) => {
            for (key, source_val) in source_map {
                if source_val.is_null() {
                    continue;
                }
                let merged = if let Some(target_val) = target_map.remove(&key) {
                    deep_merge(target_val, source_val)
                } else {
                    source_val
                };
                let _ = target_map.insert(key, merged);
            }
            Value::Object(target_map)
        }
        (_, source) => source,
    }
}

/// Apply environment variable overrides to loaded settings.
///
/// Invalid values are ignored with a warning (fall back to file/default).
pub fn apply_env_overrides(settings: &mut InterposeSettings) {
    if let Some(v) = read_env_log_level("INTERPOSE_LOG_LEVEL") {
        settings.logging.level = v;
    }
    if let Some(v) = read_env_log_format("INTERPOSE_LOG_FORMAT") {
        settings.logging.format = v;
    }
    if let Some(v) = read_env_string("INTERPOSE_DENY_TOKEN") {
        settings.demo.deny_token = v;
    }
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Normalize a log level name, or `None` if it is not one of [`LOG_LEVELS`].
pub fn parse_log_level(val: &str) -> Option<String> {
    let level = val.trim().to_ascii_lowercase();
    LOG_LEVELS.contains(&level.as_str()).then_some(level)
}

// ── Env var readers (thin wrappers) ─────────────────────────────────────────

fn read_env_string(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn read_env_log_level(name: &str) -> Option<String> {
    let val = std::env::var(name).ok()?;
    let result = parse_log_level(&val);
    if result.is_none() {
        tracing::warn!(key = name, value = %val, "invalid log level env var, ignoring");
    }
    result
}

fn read_env_log_format(name: &str) -> Option<LogFormat> {
    let val = std::env::var(name).ok()?;
    match val.parse() {
        Ok(format) => Some(format),
        Err(error) => {
            tracing::warn!(key = name, value = %val, %error, "invalid log format env var, ignoring");
            None
        }
    }
}
