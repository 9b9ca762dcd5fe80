//! # Retry executor
//!
//! Runs one request action with exponential backoff.
//!
//! - Attempt 0 runs immediately; attempt `n` first waits
//!   [`RetryConfig::backoff_delay`]`(n)`.
//! - A transport failure or a status in the retryable set triggers another
//!   attempt; any other status is returned to the caller as a success.
//! - The backoff wait is raced against the caller's `CancellationToken`.
//!   An already-cancelled token wins without waiting.
//! - When attempts run out, the error of the last attempt is returned.

use std::future::Future;

use herald_core::{RetryConfig, is_retryable_status};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{PushError, Result, TransportError};
use crate::transport::TransportResponse;

/// Executes a request action under a [`RetryConfig`].
#[derive(Clone, Debug, Default)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    /// Create an executor with the given policy.
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// The active policy.
    pub fn config(&self) -> &RetryConfig {
        &self.config
    }

    /// Run `action` until it yields a non-retryable response or attempts
    /// are exhausted.
    ///
    /// The action is called once per attempt and must build a fresh
    /// request each time.
    pub async fn execute<F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut action: F,
    ) -> Result<TransportResponse>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = std::result::Result<TransportResponse, TransportError>>,
    {
        let max_retries = self.config.max_retries;
        let mut attempt = 0u32;

        loop {
            let failure = match action().await {
                Ok(response) if is_retryable_status(response.status) => {
                    let status = response.status;
                    drop(response);
                    metrics::counter!("push_retries_total", "reason" => "status").increment(1);
                    PushError::RetryableStatus { status }
                }
                Ok(response) => {
                    debug!(attempt, status = response.status, "push request completed");
                    return Ok(response);
                }
                Err(err) => {
                    metrics::counter!("push_retries_total", "reason" => "transport").increment(1);
                    PushError::Transport(err)
                }
            };

            if attempt >= max_retries {
                error!(
                    attempts = attempt + 1,
                    category = failure.category(),
                    error = %failure,
                    "push request failed, retries exhausted"
                );
                return Err(failure);
            }

            attempt += 1;
            let delay = self.config.backoff_delay(attempt);
            warn!(
                attempt,
                max_retries,
                delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                error = %failure,
                "push request failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempt, "retry wait cancelled");
                    return Err(PushError::Cancelled);
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
