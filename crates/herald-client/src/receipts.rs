//! Receipt lookup.
//!
//! A single POST with no retry loop: receipts are polled late and can be
//! polled again, so a failed fetch is reported rather than retried.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use herald_core::{PushConfig, PushReceipt, validate_receipt_ids};
use tracing::{debug, instrument};

use crate::error::{PushError, Result};
use crate::publish::{check_status, request_headers};
use crate::transport::{Transport, TransportRequest};
use crate::wire::{ReceiptsRequest, ReceiptsResponse, reported};

/// Fetches receipts for ticket IDs.
pub struct ReceiptFetcher {
    config: Arc<PushConfig>,
    transport: Arc<dyn Transport>,
}

impl ReceiptFetcher {
    /// Create a fetcher over `transport`.
    pub fn new(config: Arc<PushConfig>, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    /// Look up receipts. IDs whose receipt is not ready are absent from the map.
    #[instrument(skip_all, fields(ids = ids.len()))]
    pub async fn fetch(&self, ids: &[String]) -> Result<HashMap<String, PushReceipt>> {
        validate_receipt_ids(ids)?;
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let body = serde_json::to_vec(&ReceiptsRequest { ids }).map_err(PushError::Encode)?;
        let request = TransportRequest {
            url: self.config.receipts_url(),
            headers: request_headers(&self.config, false)?,
            body: Bytes::from(body),
        };

        let response = self.transport.post(request).await?;
        check_status(&response)?;
        let decoded: ReceiptsResponse =
            serde_json::from_slice(&response.body).map_err(PushError::Decode)?;
        if let Some(errors) = reported(decoded.errors) {
            return Err(PushError::ReceiptFetch { errors });
        }

        let receipts = decoded.data.unwrap_or_default();
        debug!(requested = ids.len(), received = receipts.len(), "receipts fetched");
        Ok(receipts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedTransport;
    use assert_matches::assert_matches;
    use herald_core::ValidationError;

    fn fetcher(transport: &Arc<ScriptedTransport>) -> ReceiptFetcher {
        let config = PushConfig {
            host: "http://push.test".into(),
            ..PushConfig::default()
        };
        ReceiptFetcher::new(Arc::new(config), transport.clone())
    }

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| (*s).to_owned()).collect()
    }

    #[tokio::test]
    async fn returns_receipts_by_id() {
        let transport = Arc::new(ScriptedTransport::new().reply(
            200,
            r#"{"data":{"t1":{"status":"ok"}}}"#,
        ));
        let receipts = fetcher(&transport).fetch(&ids(&["t1", "t2"])).await.unwrap();
        assert!(receipts["t1"].is_ok());
        assert!(!receipts.contains_key("t2"));

        let request = &transport.requests()[0];
        assert_eq!(request.url, "http://push.test/--/api/v2/push/getReceipts");
        let body: serde_json::Value = serde_json::from_slice(&request.body).unwrap();
        assert_eq!(body, serde_json::json!({"ids": ["t1", "t2"]}));
    }

    #[tokio::test]
    async fn failure_is_not_retried() {
        let transport = Arc::new(ScriptedTransport::new().reply(503, "unavailable"));
        let err = fetcher(&transport).fetch(&ids(&["t1"])).await.unwrap_err();
        assert_matches!(err, PushError::InvalidResponse { status: 503, .. });
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_is_reported() {
        let transport = Arc::new(ScriptedTransport::new().fail("timed out"));
        let err = fetcher(&transport).fetch(&ids(&["t1"])).await.unwrap_err();
        assert_matches!(err, PushError::Transport(_));
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn errors_array_is_receipt_fetch_error() {
        let transport = Arc::new(ScriptedTransport::new().reply(
            200,
            r#"{"errors":[{"code":"PUSH_TOO_MANY_RECEIPTS","message":"slow down"}]}"#,
        ));
        let err = fetcher(&transport).fetch(&ids(&["t1"])).await.unwrap_err();
        assert_matches!(err, PushError::ReceiptFetch { .. });
    }

    #[tokio::test]
    async fn empty_ids_make_no_request() {
        let transport = Arc::new(ScriptedTransport::new());
        let receipts = fetcher(&transport).fetch(&[]).await.unwrap();
        assert!(receipts.is_empty());
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn too_many_ids_is_rejected_locally() {
        let transport = Arc::new(ScriptedTransport::new());
        let many: Vec<String> = (0..1001).map(|i| format!("t{i}")).collect();
        let err = fetcher(&transport).fetch(&many).await.unwrap_err();
        assert_matches!(
            err,
            PushError::Validation(ValidationError::BatchTooLarge { count: 1001, max: 1000 })
        );
        assert_eq!(transport.calls(), 0);
    }
}
