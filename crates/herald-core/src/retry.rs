//! Retry configuration and backoff calculation.
//!
//! Provides the types and math for retry logic. The async executor that
//! sleeps between attempts lives in `herald-client`; this module holds the
//! portable, sync-only building blocks:
//!
//! - [`RetryConfig`]: Retry parameters (max retries, intervals, multiplier)
//! - [`RetryConfig::backoff_delay`]: Capped exponential backoff
//! - [`is_retryable_status`]: Which HTTP statuses are worth another attempt

use std::time::Duration;

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Default maximum retries (so up to 4 attempts in total).
pub const DEFAULT_MAX_RETRIES: u32 = 3;
/// Default initial interval in milliseconds.
pub const DEFAULT_INITIAL_INTERVAL_MS: u64 = 1000;
/// Default maximum interval in milliseconds.
pub const DEFAULT_MAX_INTERVAL_MS: u64 = 30_000;
/// Default backoff multiplier.
pub const DEFAULT_MULTIPLIER: f64 = 2.0;

/// HTTP statuses that are retried: 429, 500, 502, 503, 504.
pub const RETRYABLE_STATUS_CODES: [u16; 5] = [429, 500, 502, 503, 504];

/// Configuration for retry logic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Wait before the first retry in ms (default: 1000).
    #[serde(default = "default_initial_interval_ms")]
    pub initial_interval_ms: u64,
    /// Upper bound for any wait in ms (default: 30000).
    #[serde(default = "default_max_interval_ms")]
    pub max_interval_ms: u64,
    /// Growth factor between consecutive waits (default: 2.0).
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_max_retries() -> u32 {
    DEFAULT_MAX_RETRIES
}
fn default_initial_interval_ms() -> u64 {
    DEFAULT_INITIAL_INTERVAL_MS
}
fn default_max_interval_ms() -> u64 {
    DEFAULT_MAX_INTERVAL_MS
}
fn default_multiplier() -> f64 {
    DEFAULT_MULTIPLIER
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_interval_ms: DEFAULT_INITIAL_INTERVAL_MS,
            max_interval_ms: DEFAULT_MAX_INTERVAL_MS,
            multiplier: DEFAULT_MULTIPLIER,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Backoff calculation
// ─────────────────────────────────────────────────────────────────────────────

impl RetryConfig {
    /// Total number of attempts the executor may make.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Wait before attempt `attempt` in milliseconds.
    ///
    /// Formula: `initial` for attempt 0, otherwise
    /// `min(max, initial * multiplier^(attempt - 1))`.
    #[must_use]
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    pub fn backoff_delay_ms(&self, attempt: u32) -> u64 {
        if attempt == 0 {
            return self.initial_interval_ms;
        }

        let exponent = i32::try_from(attempt - 1).unwrap_or(i32::MAX);
        let scaled = (self.initial_interval_ms as f64) * self.multiplier.powi(exponent);
        let cap = self.max_interval_ms as f64;

        // NaN and infinity both land on the cap.
        if scaled.is_nan() || scaled >= cap {
            self.max_interval_ms
        } else {
            scaled.max(0.0) as u64
        }
    }

    /// Wait before attempt `attempt` as a [`Duration`].
    #[must_use]
    pub fn backoff_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.backoff_delay_ms(attempt))
    }
}

/// Whether a response with this status should be retried.
pub fn is_retryable_status(status: u16) -> bool {
    RETRYABLE_STATUS_CODES.contains(&status)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    // -- RetryConfig --

    #[test]
    fn retry_config_defaults() {
        let config = RetryConfig::default();
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.initial_interval_ms, 1000);
        assert_eq!(config.max_interval_ms, 30_000);
        assert!((config.multiplier - 2.0).abs() < f64::EPSILON);
        assert_eq!(config.max_attempts(), 4);
    }

    #[test]
    fn retry_config_serde_defaults() {
        let config: RetryConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, RetryConfig::default());
    }

    #[test]
    fn retry_config_serde_camel_case() {
        let config: RetryConfig =
            serde_json::from_str(r#"{"maxRetries": 1, "initialIntervalMs": 250}"#).unwrap();
        assert_eq!(config.max_retries, 1);
        assert_eq!(config.initial_interval_ms, 250);
        assert_eq!(config.max_interval_ms, DEFAULT_MAX_INTERVAL_MS);
    }

    // -- backoff_delay --

    #[test]
    fn backoff_attempt_zero_is_initial() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay(0), Duration::from_secs(1));
    }

    #[test]
    fn backoff_exponential_growth() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay_ms(1), 1000);
        assert_eq!(config.backoff_delay_ms(2), 2000);
        assert_eq!(config.backoff_delay_ms(3), 4000);
        assert_eq!(config.backoff_delay_ms(4), 8000);
    }

    #[test]
    fn backoff_caps_at_max() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay_ms(6), 30_000);
        assert_eq!(config.backoff_delay_ms(60), 30_000);
    }

    #[test]
    fn backoff_high_attempt_no_overflow() {
        let config = RetryConfig::default();
        assert_eq!(config.backoff_delay_ms(u32::MAX), 30_000);
    }

    #[test]
    fn backoff_fractional_multiplier() {
        let config = RetryConfig {
            initial_interval_ms: 1000,
            multiplier: 1.5,
            ..RetryConfig::default()
        };
        assert_eq!(config.backoff_delay_ms(3), 2250);
    }

    // -- is_retryable_status --

    #[test]
    fn retryable_statuses() {
        for status in [429, 500, 502, 503, 504] {
            assert!(is_retryable_status(status), "{status} should be retryable");
        }
    }

    #[test]
    fn non_retryable_statuses() {
        for status in [200, 201, 400, 401, 403, 404, 413, 501, 505] {
            assert!(!is_retryable_status(status), "{status} should not be retryable");
        }
    }

    proptest! {
        #[test]
        fn backoff_matches_formula(
            initial in 1u64..5_000,
            max in 1u64..120_000,
            multiplier in 1u32..4,
            attempt in 1u32..12,
        ) {
            let config = RetryConfig {
                max_retries: 3,
                initial_interval_ms: initial,
                max_interval_ms: max,
                multiplier: f64::from(multiplier),
            };
            let expected = initial
                .saturating_mul(u64::from(multiplier).saturating_pow(attempt - 1))
                .min(max);
            prop_assert_eq!(config.backoff_delay_ms(attempt), expected);
        }
    }
}
