//! Error types for publish and receipt operations.
//!
//! [`PushError`] aborts a whole call. [`DeliveryError`] is attached to a
//! single [`DeliveryResult`](crate::DeliveryResult) and never aborts a batch.

use herald_core::{ApiErrorObject, ErrorCode, ValidationError};

/// Result type alias for push operations.
pub type Result<T> = std::result::Result<T, PushError>;

/// Failure of the underlying transport (connect, timeout, I/O).
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Any other transport failure.
    #[error("{message}")]
    Other {
        /// Error description.
        message: String,
    },
}

impl TransportError {
    /// Convenience constructor for non-HTTP transport failures.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Errors that abort a publish, fetch or reconcile call.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// The batch was rejected before any request was made.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The client could not be configured (e.g. unusable access token).
    #[error("invalid client configuration: {message}")]
    Config {
        /// Error description.
        message: String,
    },

    /// The request body could not be serialized.
    #[error("failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    /// The request body could not be compressed.
    #[error("failed to compress request body: {0}")]
    Compression(#[from] std::io::Error),

    /// The transport failed and retries (if any) were exhausted.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// The service kept answering with a retryable status.
    #[error("retryable server error (status {status})")]
    RetryableStatus {
        /// Last status received.
        status: u16,
    },

    /// The service answered with a non-2xx status.
    #[error("invalid response ({status}): {body}")]
    InvalidResponse {
        /// HTTP status code.
        status: u16,
        /// Response body, truncated.
        body: String,
    },

    /// The service rejected the request as a whole.
    #[error("invalid request: {}", summarize(.errors))]
    InvalidRequest {
        /// Request-level errors reported by the service.
        errors: Vec<ApiErrorObject>,
    },

    /// The receipt endpoint reported request-level errors.
    #[error("error fetching receipts: {}", summarize(.errors))]
    ReceiptFetch {
        /// Request-level errors reported by the service.
        errors: Vec<ApiErrorObject>,
    },

    /// The response body could not be decoded.
    #[error("failed to decode server response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The response broke the service contract (missing data, count mismatch).
    #[error("invalid server response: {message}")]
    ServerContract {
        /// What was wrong.
        message: String,
    },

    /// The caller cancelled the operation during a wait.
    #[error("operation cancelled")]
    Cancelled,
}

impl PushError {
    /// Error category string for logs and metrics.
    pub fn category(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::Config { .. } | Self::Encode(_) | Self::Compression(_) => "client",
            Self::Transport(_) => "transport",
            Self::RetryableStatus { .. } | Self::InvalidResponse { .. } => "server",
            Self::InvalidRequest { .. }
            | Self::ReceiptFetch { .. }
            | Self::Decode(_)
            | Self::ServerContract { .. } => "contract",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether resubmitting the same request later may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::RetryableStatus { .. })
    }

    pub(crate) fn contract(message: impl Into<String>) -> Self {
        Self::ServerContract {
            message: message.into(),
        }
    }
}

fn summarize(errors: &[ApiErrorObject]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Per-notification failure attached to a delivery result.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    /// The service refused the notification when it was published.
    #[error("push ticket error: {message}")]
    Ticket {
        /// Message reported by the service, verbatim.
        message: String,
        /// Code from the ticket details.
        code: Option<ErrorCode>,
    },

    /// The platform provider reported a delivery failure.
    #[error("push receipt error: {message}")]
    Receipt {
        /// Message reported by the service, verbatim.
        message: String,
        /// Code from the receipt details.
        code: Option<ErrorCode>,
    },
}

impl DeliveryError {
    /// Error code reported by the service, if any.
    pub fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Ticket { code, .. } | Self::Receipt { code, .. } => code.as_ref(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn categories() {
        assert_eq!(
            PushError::from(ValidationError::EmptyRecipients { index: 0 }).category(),
            "validation"
        );
        assert_eq!(
            PushError::from(TransportError::other("reset")).category(),
            "transport"
        );
        assert_eq!(PushError::RetryableStatus { status: 503 }.category(), "server");
        assert_eq!(PushError::contract("count mismatch").category(), "contract");
        assert_eq!(PushError::Cancelled.category(), "cancelled");
    }

    #[test]
    fn only_transport_and_retryable_status_are_retryable() {
        assert!(PushError::from(TransportError::other("timeout")).is_retryable());
        assert!(PushError::RetryableStatus { status: 429 }.is_retryable());
        assert!(
            !PushError::InvalidResponse {
                status: 400,
                body: String::new()
            }
            .is_retryable()
        );
        assert!(!PushError::contract("x").is_retryable());
        assert!(!PushError::Cancelled.is_retryable());
    }

    #[test]
    fn invalid_request_lists_errors() {
        let err = PushError::InvalidRequest {
            errors: vec![
                ApiErrorObject {
                    code: "VALIDATION_ERROR".into(),
                    message: "\"to\" is required".into(),
                    details: None,
                },
                ApiErrorObject {
                    code: "UNAUTHORIZED".into(),
                    message: "bad token".into(),
                    details: None,
                },
            ],
        };
        assert_eq!(
            err.to_string(),
            "invalid request: VALIDATION_ERROR: \"to\" is required; UNAUTHORIZED: bad token"
        );
    }

    #[test]
    fn delivery_error_display_and_code() {
        let err = DeliveryError::Receipt {
            message: "device gone".into(),
            code: Some(ErrorCode::DeviceNotRegistered),
        };
        assert_eq!(err.to_string(), "push receipt error: device gone");
        assert_eq!(err.code(), Some(&ErrorCode::DeviceNotRegistered));
    }
}
