//! # herald-settings
//!
//! Layered configuration for the Herald delivery client.
//!
//! A [`PushConfig`](herald_core::PushConfig) is built from three layers (in
//! priority order):
//! 1. **Compiled defaults**: `PushConfig::default()`
//! 2. **User file**: `~/.herald/settings.json` (deep-merged over defaults)
//! 3. **Environment variables**: `HERALD_*` overrides (highest priority)
//!
//! The loaded value is returned to the caller and passed explicitly into
//! the client; there is no process-wide settings instance.

#![deny(unsafe_code)]

pub mod errors;
pub mod loader;

pub use errors::{Result, SettingsError};
pub use loader::{
    apply_env_overrides, deep_merge, load_config, load_config_from_path, load_config_with_env,
    settings_path,
};
