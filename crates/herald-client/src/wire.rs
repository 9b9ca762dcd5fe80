//! JSON envelopes exchanged with the push service.

use std::collections::HashMap;

use herald_core::{ApiErrorObject, PushReceipt, PushTicket};
use serde::{Deserialize, Serialize};

/// Body of a publish response: either `data` or `errors`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PublishResponse {
    /// One ticket per expanded recipient, in request order.
    #[serde(default)]
    pub data: Option<Vec<PushTicket>>,
    /// Request-level errors.
    #[serde(default)]
    pub errors: Option<Vec<ApiErrorObject>>,
}

/// Body of a receipt request.
#[derive(Clone, Debug, Serialize)]
pub struct ReceiptsRequest<'a> {
    /// Ticket IDs to look up.
    pub ids: &'a [String],
}

/// Body of a receipt response, keyed by ticket ID.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ReceiptsResponse {
    /// Receipts that are ready. IDs may be absent.
    #[serde(default)]
    pub data: Option<HashMap<String, PushReceipt>>,
    /// Request-level errors.
    #[serde(default)]
    pub errors: Option<Vec<ApiErrorObject>>,
}

/// Take `errors` only when the service actually reported some.
pub(crate) fn reported(errors: Option<Vec<ApiErrorObject>>) -> Option<Vec<ApiErrorObject>> {
    errors.filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use herald_core::PushStatus;

    #[test]
    fn publish_response_with_data() {
        let resp: PublishResponse = serde_json::from_str(
            r#"{"data":[{"status":"ok","id":"t1"},{"status":"error","message":"gone","details":{"error":"DeviceNotRegistered"}}]}"#,
        )
        .unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0].receipt_id(), Some("t1"));
        assert_eq!(data[1].status, PushStatus::Error);
        assert!(resp.errors.is_none());
    }

    #[test]
    fn publish_response_with_errors() {
        let resp: PublishResponse = serde_json::from_str(
            r#"{"errors":[{"code":"PUSH_TOO_MANY_NOTIFICATIONS","message":"too many"}]}"#,
        )
        .unwrap();
        assert!(resp.data.is_none());
        let errors = reported(resp.errors).unwrap();
        assert_eq!(errors[0].code, "PUSH_TOO_MANY_NOTIFICATIONS");
    }

    #[test]
    fn empty_errors_array_is_not_reported() {
        assert!(reported(Some(vec![])).is_none());
        assert!(reported(None).is_none());
    }

    #[test]
    fn receipts_request_shape() {
        let ids = vec!["a".to_string(), "b".to_string()];
        let json = serde_json::to_value(ReceiptsRequest { ids: &ids }).unwrap();
        assert_eq!(json, serde_json::json!({"ids": ["a", "b"]}));
    }

    #[test]
    fn receipts_response_map() {
        let resp: ReceiptsResponse = serde_json::from_str(
            r#"{"data":{"t1":{"status":"ok"},"t2":{"status":"error","message":"x","details":{"error":"MessageTooBig"}}}}"#,
        )
        .unwrap();
        let data = resp.data.unwrap();
        assert!(data["t1"].is_ok());
        assert!(!data["t2"].is_ok());
    }
}
