//! Client configuration.
//!
//! [`PushConfig`] is a plain value: defaults are applied once when it is
//! built or deserialized, and it is never mutated after being handed to a
//! client.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::retry::RetryConfig;

/// Default service host.
pub const DEFAULT_HOST: &str = "https://exp.host";
/// Default API path prefix.
pub const DEFAULT_API_PATH: &str = "/--/api/v2";
/// Default per-request timeout in milliseconds.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;
/// Default wait between publishing and fetching receipts (15 minutes).
pub const DEFAULT_RECEIPT_DELAY_MS: u64 = 15 * 60 * 1000;

/// Configuration for a push client.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushConfig {
    /// Scheme and host of the push service.
    #[serde(default = "default_host")]
    pub host: String,
    /// Path prefix joined to `host`.
    #[serde(default = "default_api_path")]
    pub api_path: String,
    /// Bearer token for enhanced push security.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    /// Gzip-compress publish bodies.
    #[serde(default)]
    pub gzip: bool,
    /// Per-request timeout in ms, enforced by the transport.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Wait before fetching receipts in ms.
    #[serde(default = "default_receipt_delay_ms")]
    pub receipt_delay_ms: u64,
    /// Retry policy for publish requests.
    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}
fn default_api_path() -> String {
    DEFAULT_API_PATH.to_owned()
}
fn default_request_timeout_ms() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_MS
}
fn default_receipt_delay_ms() -> u64 {
    DEFAULT_RECEIPT_DELAY_MS
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            api_path: default_api_path(),
            access_token: None,
            gzip: false,
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            receipt_delay_ms: DEFAULT_RECEIPT_DELAY_MS,
            retry: RetryConfig::default(),
        }
    }
}

impl PushConfig {
    /// Endpoint for publishing notifications.
    pub fn send_url(&self) -> String {
        format!("{}{}/push/send", self.host, self.api_path)
    }

    /// Endpoint for fetching receipts.
    pub fn receipts_url(&self) -> String {
        format!("{}{}/push/getReceipts", self.host, self.api_path)
    }

    /// Per-request timeout.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Configured receipt delay for callers to pass to a reconcile, falling
    /// back to 15 minutes when configured as zero.
    pub fn receipt_delay(&self) -> Duration {
        effective_receipt_delay(Duration::from_millis(self.receipt_delay_ms))
    }

    /// Access token, ignoring an empty string.
    pub fn bearer_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// A zero delay means "use the default", never "don't wait".
pub fn effective_receipt_delay(delay: Duration) -> Duration {
    if delay.is_zero() {
        Duration::from_millis(DEFAULT_RECEIPT_DELAY_MS)
    } else {
        delay
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
