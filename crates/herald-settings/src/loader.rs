//! Settings loading with deep merge and environment variable overrides.
//!
//! Loading flow:
//! 1. Start with compiled [`PushConfig::default()`]
//! 2. If `~/.herald/settings.json` exists, deep-merge user values over defaults
//! 3. Apply environment variable overrides (highest priority)
//!
//! Deep merge rules:
//! - Objects are merged recursively (source overrides target per-key)
//! - Arrays and primitives are replaced entirely by source
//! - Null values in source are skipped (preserving target)

use std::path::{Path, PathBuf};

use herald_core::PushConfig;
use serde_json::Value;
use tracing::{debug, warn};

use crate::errors::{Result, SettingsError};

/// Resolve the path to the settings file (`~/.herald/settings.json`).
pub fn settings_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".herald").join("settings.json")
}

/// Load configuration from the default path with env var overrides.
pub fn load_config() -> Result<PushConfig> {
    load_config_from_path(&settings_path())
}

/// Load configuration from a specific path with env var overrides.
///
/// If the file does not exist, returns defaults (plus overrides). If the
/// file contains invalid JSON, returns an error.
pub fn load_config_from_path(path: &Path) -> Result<PushConfig> {
    load_config_with_env(path, |name| std::env::var(name).ok())
}

/// Load configuration reading overrides through `env` instead of the
/// process environment.
pub fn load_config_with_env<F>(path: &Path, env: F) -> Result<PushConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let defaults = serde_json::to_value(PushConfig::default())?;

    let merged = if path.exists() {
        debug!(?path, "loading settings from file");
        let content = std::fs::read_to_string(path)?;
        let user: Value = serde_json::from_str(&content)?;
        deep_merge(defaults, user)
    } else {
        debug!(?path, "settings file not found, using defaults");
        defaults
    };

    let mut config: PushConfig = serde_json::from_value(merged)?;
    apply_env_overrides(&mut config, env);
    check(&config)?;
    Ok(config)
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

/// Apply environment variable overrides.
///
/// Invalid values are ignored with a warning (falling back to file/default).
pub fn apply_env_overrides<F>(config: &mut PushConfig, env: F)
where
    F: Fn(&str) -> Option<String>,
{
    let string = |name: &str| env(name).filter(|v| !v.is_empty());

    // ── Endpoint ────────────────────────────────────────────────────
    if let Some(v) = string("HERALD_HOST") {
        config.host = v;
    }
    if let Some(v) = string("HERALD_API_PATH") {
        config.api_path = v;
    }
    if let Some(v) = string("HERALD_ACCESS_TOKEN").or_else(|| string("EXPO_ACCESS_TOKEN")) {
        config.access_token = Some(v);
    }

    // ── Transport ───────────────────────────────────────────────────
    if let Some(v) = read_with(&env, "HERALD_GZIP", parse_bool) {
        config.gzip = v;
    }
    if let Some(v) = read_with(&env, "HERALD_TIMEOUT_MS", |s| parse_u64_range(s, 100, 600_000)) {
        config.request_timeout_ms = v;
    }
    if let Some(v) = read_with(&env, "HERALD_RECEIPT_DELAY_MS", |s| {
        parse_u64_range(s, 0, 86_400_000)
    }) {
        config.receipt_delay_ms = v;
    }

    // ── Retry ───────────────────────────────────────────────────────
    if let Some(v) = read_with(&env, "HERALD_MAX_RETRIES", |s| parse_u32_range(s, 0, 20)) {
        config.retry.max_retries = v;
    }
    if let Some(v) = read_with(&env, "HERALD_RETRY_INITIAL_MS", |s| {
        parse_u64_range(s, 1, 600_000)
    }) {
        config.retry.initial_interval_ms = v;
    }
    if let Some(v) = read_with(&env, "HERALD_RETRY_MAX_MS", |s| parse_u64_range(s, 1, 3_600_000)) {
        config.retry.max_interval_ms = v;
    }
}

fn check(config: &PushConfig) -> Result<()> {
    if config.host.is_empty() {
        return Err(SettingsError::InvalidValue("host must not be empty".into()));
    }
    let multiplier = config.retry.multiplier;
    if !multiplier.is_finite() || multiplier <= 0.0 {
        return Err(SettingsError::InvalidValue(format!(
            "retry multiplier must be a positive number, got {multiplier}"
        )));
    }
    Ok(())
}

// ── Pure parsing functions (testable without env vars) ──────────────────────

/// Parse a string as a boolean.
///
/// Accepts (case-insensitive): `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`.
pub fn parse_bool(val: &str) -> Option<bool> {
    match val.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a string as a `u32` within a range.
pub fn parse_u32_range(val: &str, min: u32, max: u32) -> Option<u32> {
    let n: u32 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

/// Parse a string as a `u64` within a range.
pub fn parse_u64_range(val: &str, min: u64, max: u64) -> Option<u64> {
    let n: u64 = val.parse().ok()?;
    (n >= min && n <= max).then_some(n)
}

fn read_with<F, T, P>(env: &F, name: &str, parse: P) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    P: Fn(&str) -> Option<T>,
{
    let val = env(name)?;
    let result = parse(&val);
    if result.is_none() {
        warn!(key = name, value = %val, "invalid settings env var, ignoring");
    }
    result
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
