//! Client facade.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use herald_core::{Message, PushConfig, PushReceipt};
use tokio_util::sync::CancellationToken;
use tracing::{error, instrument};

use crate::error::{PushError, Result};
use crate::publish::{PublishPipeline, PublishedTicket};
use crate::receipts::ReceiptFetcher;
use crate::reconcile::{ReceiptReconciler, Reconciliation};
use crate::transport::{ReqwestTransport, Transport};

/// Operations offered by a push client. Implemented by [`PushClient`];
/// applications can substitute their own for tests.
#[async_trait]
pub trait PushService: Send + Sync {
    /// Publish a batch, one ticket per recipient.
    async fn publish(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Vec<PublishedTicket>>;

    /// Publish a single message.
    async fn publish_single(
        &self,
        message: &Message,
        cancel: &CancellationToken,
    ) -> Result<Vec<PublishedTicket>> {
        self.publish(std::slice::from_ref(message), cancel).await
    }

    /// Fetch receipts for ticket IDs.
    async fn fetch_receipts(&self, ids: &[String]) -> Result<HashMap<String, PushReceipt>>;

    /// Wait `delay`, then attach receipts to `tickets`.
    async fn reconcile(
        &self,
        tickets: Vec<PublishedTicket>,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Reconciliation;

    /// Publish, then reconcile. A publish failure is returned as `Err`;
    /// a reconcile failure is carried in the returned [`Reconciliation`].
    async fn send_with_receipts(
        &self,
        messages: &[Message],
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<Reconciliation> {
        let tickets = self.publish(messages, cancel).await?;
        Ok(self.reconcile(tickets, delay, cancel).await)
    }
}

/// Push client over a shared [`Transport`].
pub struct PushClient {
    config: Arc<PushConfig>,
    publisher: PublishPipeline,
    reconciler: ReceiptReconciler,
}

impl PushClient {
    /// Build a client with an HTTP transport using the configured timeout.
    pub fn new(config: PushConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Build a client over any transport.
    pub fn with_transport(config: PushConfig, transport: Arc<dyn Transport>) -> Self {
        let config = Arc::new(config);
        let publisher = PublishPipeline::new(config.clone(), transport.clone());
        let reconciler = ReceiptReconciler::new(ReceiptFetcher::new(config.clone(), transport));
        Self {
            config,
            publisher,
            reconciler,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &PushConfig {
        &self.config
    }
}

#[async_trait]
impl PushService for PushClient {
    async fn publish(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Vec<PublishedTicket>> {
        self.publisher.send(messages, cancel).await
    }

    async fn fetch_receipts(&self, ids: &[String]) -> Result<HashMap<String, PushReceipt>> {
        self.reconciler.fetcher().fetch(ids).await
    }

    async fn reconcile(
        &self,
        tickets: Vec<PublishedTicket>,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Reconciliation {
        self.reconciler.reconcile(tickets, delay, cancel).await
    }

    #[instrument(skip_all, fields(messages = messages.len()))]
    async fn send_with_receipts(
        &self,
        messages: &[Message],
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Result<Reconciliation> {
        let tickets = self
            .publisher
            .send(messages, cancel)
            .await
            .inspect_err(|err: &PushError| {
                error!(error = %err, category = err.category(), "failed to send push notifications");
            })?;
        Ok(self.reconciler.reconcile(tickets, delay, cancel).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::Outcome;
    use crate::testing::{ScriptedTransport, message, ok_tickets};
    use assert_matches::assert_matches;
    use herald_core::RetryConfig;

    fn client(transport: &Arc<ScriptedTransport>) -> PushClient {
        let config = PushConfig {
            host: "http://push.test".into(),
            retry: RetryConfig {
                max_retries: 1,
                initial_interval_ms: 1,
                max_interval_ms: 1,
                multiplier: 1.0,
            },
            ..PushConfig::default()
        };
        PushClient::with_transport(config, transport.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn publish_single_wraps_one_message() {
        let transport = Arc::new(ScriptedTransport::new().reply(200, ok_tickets(&["t1", "t2"])));
        let published = client(&transport)
            .publish_single(&message(&["a", "b"]), &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(published.len(), 2);
        assert!(published.iter().all(|p| p.message_index == 0));
    }

    #[tokio::test(start_paused = true)]
    async fn send_with_receipts_runs_both_phases() {
        let transport = Arc::new(
            ScriptedTransport::new()
                .reply(200, ok_tickets(&["t1"]))
                .reply(200, r#"{"data":{"t1":{"status":"ok"}}}"#),
        );
        let outcome = client(&transport)
            .send_with_receipts(&[message(&["a"])], Duration::from_secs(2), &CancellationToken::new())
            .await
            .unwrap();
        assert!(outcome.is_complete());
        assert_eq!(outcome.results[0].outcome(), Outcome::Delivered);
        assert_eq!(transport.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn send_with_receipts_stops_on_publish_failure() {
        let transport = Arc::new(ScriptedTransport::new().reply(401, "unauthorized"));
        let err = client(&transport)
            .send_with_receipts(&[message(&["a"])], Duration::from_secs(2), &CancellationToken::new())
            .await
            .unwrap_err();
        assert_matches!(err, PushError::InvalidResponse { status: 401, .. });
        assert_eq!(transport.calls(), 1);
    }

    #[tokio::test]
    async fn fetch_receipts_delegates() {
        let transport = Arc::new(ScriptedTransport::new().reply(200, r#"{"data":{}}"#));
        let receipts = client(&transport)
            .fetch_receipts(&["t1".to_owned()])
            .await
            .unwrap();
        assert!(receipts.is_empty());
    }

    #[test]
    fn new_builds_http_client() {
        let client = PushClient::new(PushConfig::default()).unwrap();
        assert_eq!(client.config().host, "https://exp.host");
    }
}
