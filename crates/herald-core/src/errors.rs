//! Validation error types.
//!
//! Everything in this module is detected before a request leaves the
//! process, so none of these errors are ever retried.

use thiserror::Error;

/// Errors raised while validating tokens, messages and batches.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A token string did not carry a recognised push-token prefix.
    #[error("malformed push token {token:?}: token should start with ExponentPushToken")]
    MalformedToken {
        /// The rejected input.
        token: String,
    },

    /// A message in the batch has no recipients.
    #[error("message {index} has no recipients")]
    EmptyRecipients {
        /// Position of the offending message in the batch.
        index: usize,
    },

    /// A recipient token is empty or malformed.
    #[error("invalid push token: {token:?}")]
    InvalidToken {
        /// The offending token.
        token: String,
    },

    /// The batch holds more entries than one request may carry.
    #[error("too many entries in batch: {count} (maximum is {max})")]
    BatchTooLarge {
        /// Number of entries submitted.
        count: usize,
        /// Limit for this call site.
        max: usize,
    },

    /// The estimated notification payload exceeds the service limit.
    #[error("message payload too large (estimated {estimated} bytes, maximum ~{max})")]
    PayloadTooLarge {
        /// Estimated payload size in bytes.
        estimated: usize,
        /// Limit in bytes.
        max: usize,
    },
}

/// Result type for validation.
pub type Result<T> = std::result::Result<T, ValidationError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
