//! Push tickets, push receipts and the service's error vocabulary.
//!
//! A ticket acknowledges one (message, recipient) submission. A receipt is
//! the later, authoritative delivery outcome for a ticket ID. Both share the
//! same `{ status, message, details }` shape on the wire.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Structured detail map attached to tickets and receipts.
pub type Details = HashMap<String, String>;

/// Key in [`Details`] carrying the machine-readable error code.
pub const DETAILS_ERROR_KEY: &str = "error";

/// Outcome status of a ticket or receipt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PushStatus {
    /// Accepted / delivered.
    Ok,
    /// Rejected; see `message` and `details`.
    Error,
}

impl fmt::Display for PushStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Ok => "ok",
            Self::Error => "error",
        })
    }
}

/// Per-notification error codes reported in `details.error`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// The device can no longer receive notifications; stop sending to it.
    DeviceNotRegistered,
    /// The payload exceeded the 4096-byte limit.
    MessageTooBig,
    /// Messages are being sent to the device too frequently.
    MessageRateExceeded,
    /// Push credentials do not match the sender.
    MismatchSenderId,
    /// Push credentials are invalid.
    InvalidCredentials,
    /// A code this client does not know, preserved verbatim.
    Other(String),
}

impl ErrorCode {
    /// Wire spelling of the code.
    pub fn as_str(&self) -> &str {
        match self {
            Self::DeviceNotRegistered => "DeviceNotRegistered",
            Self::MessageTooBig => "MessageTooBig",
            Self::MessageRateExceeded => "MessageRateExceeded",
            Self::MismatchSenderId => "MismatchSenderId",
            Self::InvalidCredentials => "InvalidCredentials",
            Self::Other(code) => code,
        }
    }
}

impl From<&str> for ErrorCode {
    fn from(code: &str) -> Self {
        match code {
            "DeviceNotRegistered" => Self::DeviceNotRegistered,
            "MessageTooBig" => Self::MessageTooBig,
            "MessageRateExceeded" => Self::MessageRateExceeded,
            "MismatchSenderId" => Self::MismatchSenderId,
            "InvalidCredentials" => Self::InvalidCredentials,
            other => Self::Other(other.to_owned()),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immediate acknowledgment of one (message, recipient) submission.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushTicket {
    /// Ticket ID used to fetch the receipt. Present only on success.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Ticket status.
    pub status: PushStatus,
    /// Human-readable error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

impl PushTicket {
    /// Whether the service accepted the notification.
    pub fn is_ok(&self) -> bool {
        self.status == PushStatus::Ok
    }

    /// Non-empty ticket ID, if any.
    pub fn receipt_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    /// Error code from `details.error`.
    pub fn error_code(&self) -> Option<ErrorCode> {
        error_code(self.details.as_ref())
    }
}

/// Delivery outcome for a previously issued ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushReceipt {
    /// Receipt status.
    pub status: PushStatus,
    /// Human-readable error description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Structured error details.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Details>,
}

impl PushReceipt {
    /// Whether the notification was handed to the platform provider.
    pub fn is_ok(&self) -> bool {
        self.status == PushStatus::Ok
    }

    /// Error code from `details.error`.
    pub fn error_code(&self) -> Option<ErrorCode> {
        error_code(self.details.as_ref())
    }

    /// Whether the device is permanently gone.
    pub fn is_device_not_registered(&self) -> bool {
        self.error_code() == Some(ErrorCode::DeviceNotRegistered)
    }
}

fn error_code(details: Option<&Details>) -> Option<ErrorCode> {
    details
        .and_then(|d| d.get(DETAILS_ERROR_KEY))
        .map(|code| ErrorCode::from(code.as_str()))
}

// ─────────────────────────────────────────────────────────────────────────────
// Request-level errors
// ─────────────────────────────────────────────────────────────────────────────

/// Request-level error codes returned in the `errors` array.
pub mod request_error {
    /// Too many requests from this client.
    pub const TOO_MANY_REQUESTS: &str = "TOO_MANY_REQUESTS";
    /// The batch mixed tokens from several projects.
    pub const PUSH_TOO_MANY_EXPERIENCE_IDS: &str = "PUSH_TOO_MANY_EXPERIENCE_IDS";
    /// More than 100 notifications in one request.
    pub const PUSH_TOO_MANY_NOTIFICATIONS: &str = "PUSH_TOO_MANY_NOTIFICATIONS";
    /// More than 1000 receipt IDs in one request.
    pub const PUSH_TOO_MANY_RECEIPTS: &str = "PUSH_TOO_MANY_RECEIPTS";
    /// Missing or invalid access token.
    pub const UNAUTHORIZED: &str = "UNAUTHORIZED";
}

/// One entry of the request-level `errors` array.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorObject {
    /// Machine-readable code, see [`request_error`].
    #[serde(default)]
    pub code: String,
    /// Human-readable description.
    #[serde(default)]
    pub message: String,
    /// Any extra fields the service attached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl fmt::Display for ApiErrorObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ticket_ok_deserializes() {
        let ticket: PushTicket =
            serde_json::from_value(json!({"status": "ok", "id": "XXXX-1"})).unwrap();
        assert!(ticket.is_ok());
        assert_eq!(ticket.receipt_id(), Some("XXXX-1"));
        assert!(ticket.error_code().is_none());
    }

    #[test]
    fn ticket_error_deserializes_with_details() {
        let ticket: PushTicket = serde_json::from_value(json!({
            "status": "error",
            "message": "\"ExponentPushToken[x]\" is not a registered push notification recipient",
            "details": {"error": "DeviceNotRegistered"}
        }))
        .unwrap();
        assert!(!ticket.is_ok());
        assert!(ticket.receipt_id().is_none());
        assert_eq!(ticket.error_code(), Some(ErrorCode::DeviceNotRegistered));
    }

    #[test]
    fn empty_ticket_id_is_not_a_receipt_id() {
        let ticket = PushTicket {
            id: Some(String::new()),
            status: PushStatus::Ok,
            message: None,
            details: None,
        };
        assert!(ticket.receipt_id().is_none());
    }

    #[test]
    fn unknown_status_is_rejected() {
        assert!(serde_json::from_value::<PushTicket>(json!({"status": "pending"})).is_err());
    }

    #[test]
    fn receipt_device_not_registered() {
        let receipt: PushReceipt = serde_json::from_value(json!({
            "status": "error",
            "message": "gone",
            "details": {"error": "DeviceNotRegistered"}
        }))
        .unwrap();
        assert!(!receipt.is_ok());
        assert!(receipt.is_device_not_registered());
    }

    #[test]
    fn receipt_other_error_is_not_device_not_registered() {
        let receipt: PushReceipt = serde_json::from_value(json!({
            "status": "error",
            "details": {"error": "MessageRateExceeded"}
        }))
        .unwrap();
        assert!(!receipt.is_device_not_registered());
        assert_eq!(receipt.error_code(), Some(ErrorCode::MessageRateExceeded));
    }

    #[test]
    fn error_code_round_trips_known_and_unknown() {
        for code in [
            "DeviceNotRegistered",
            "MessageTooBig",
            "MessageRateExceeded",
            "MismatchSenderId",
            "InvalidCredentials",
            "SomethingNew",
        ] {
            assert_eq!(ErrorCode::from(code).as_str(), code);
        }
        assert_eq!(
            ErrorCode::from("SomethingNew"),
            ErrorCode::Other("SomethingNew".into())
        );
    }

    #[test]
    fn api_error_object_tolerates_missing_fields() {
        let err: ApiErrorObject = serde_json::from_value(json!({"code": "UNAUTHORIZED"})).unwrap();
        assert_eq!(err.code, request_error::UNAUTHORIZED);
        assert!(err.message.is_empty());
    }
}
