//! # Publish pipeline
//!
//! validate → encode → (gzip) → retrying POST → status check → decode →
//! expand and pair.
//!
//! The service returns one ticket per *recipient*, in request order. The
//! pipeline flattens the batch in the same order and pairs position `i` of
//! that flattening with ticket `i`, so every ticket stays tied to the
//! message and token it was issued for.

use std::sync::Arc;

use bytes::Bytes;
use herald_core::{Message, PushConfig, PushTicket, PushToken, validate_batch};
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument};

use crate::compression::gzip;
use crate::error::{PushError, Result};
use crate::retry::RetryExecutor;
use crate::transport::{Transport, TransportRequest, TransportResponse};
use crate::wire::{PublishResponse, reported};

/// Longest response body snippet kept in an error.
pub(crate) const ERROR_BODY_LIMIT: usize = 512;

/// A ticket paired with the message and recipient it answers.
#[derive(Clone, Debug, PartialEq)]
pub struct PublishedTicket {
    /// Position of the message in the submitted batch.
    pub message_index: usize,
    /// Recipient this ticket was issued for.
    pub recipient: PushToken,
    /// The ticket itself.
    pub ticket: PushTicket,
}

impl PublishedTicket {
    /// The originating message within `batch`.
    pub fn message<'m>(&self, batch: &'m [Message]) -> Option<&'m Message> {
        batch.get(self.message_index)
    }
}

/// Flatten a batch to `(message_index, recipient)` pairs in request order.
pub fn expand(messages: &[Message]) -> Vec<(usize, &PushToken)> {
    messages
        .iter()
        .enumerate()
        .flat_map(|(index, message)| message.to.iter().map(move |token| (index, token)))
        .collect()
}

/// Sends batches to the publish endpoint.
pub struct PublishPipeline {
    config: Arc<PushConfig>,
    transport: Arc<dyn Transport>,
    executor: RetryExecutor,
}

impl PublishPipeline {
    /// Create a pipeline over `transport`.
    pub fn new(config: Arc<PushConfig>, transport: Arc<dyn Transport>) -> Self {
        let executor = RetryExecutor::new(config.retry.clone());
        Self {
            config,
            transport,
            executor,
        }
    }

    /// Publish a batch and return one paired ticket per recipient.
    ///
    /// An empty batch returns no tickets without contacting the service.
    #[instrument(skip_all, fields(messages = messages.len()))]
    pub async fn send(
        &self,
        messages: &[Message],
        cancel: &CancellationToken,
    ) -> Result<Vec<PublishedTicket>> {
        validate_batch(messages)?;
        if messages.is_empty() {
            debug!("empty batch, nothing to publish");
            return Ok(Vec::new());
        }

        let request = self.build_request(messages)?;
        debug!(
            recipients = messages.iter().map(Message::recipient_count).sum::<usize>(),
            gzip = self.config.gzip,
            bytes = request.body.len(),
            "publishing batch"
        );
        let response = self
            .executor
            .execute(cancel, || self.transport.post(request.clone()))
            .await?;

        let published = decode_tickets(&response)
            .and_then(|tickets| pair_tickets(messages, tickets))
            .inspect_err(|err| {
                error!(error = %err, category = err.category(), "unusable publish response");
            })?;

        let failed = published.iter().filter(|p| !p.ticket.is_ok()).count();
        metrics::counter!("push_tickets_total", "status" => "ok")
            .increment((published.len() - failed) as u64);
        metrics::counter!("push_tickets_total", "status" => "error").increment(failed as u64);
        info!(tickets = published.len(), failed, "batch published");
        Ok(published)
    }

    fn build_request(&self, messages: &[Message]) -> Result<TransportRequest> {
        let json = serde_json::to_vec(messages).map_err(PushError::Encode)?;
        let body = if self.config.gzip { gzip(&json)? } else { json };
        Ok(TransportRequest {
            url: self.config.send_url(),
            headers: request_headers(&self.config, self.config.gzip)?,
            body: Bytes::from(body),
        })
    }
}

/// Headers shared by publish and receipt requests.
pub(crate) fn request_headers(config: &PushConfig, compressed: bool) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    let _ = headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    let _ = headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
    let _ = headers.insert(
        header::ACCEPT_ENCODING,
        HeaderValue::from_static("gzip, deflate"),
    );
    if compressed {
        let _ = headers.insert(header::CONTENT_ENCODING, HeaderValue::from_static("gzip"));
    }
    if let Some(token) = config.bearer_token() {
        let value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
            PushError::Config {
                message: "access token contains characters not allowed in a header".into(),
            }
        })?;
        let _ = headers.insert(header::AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Reject non-2xx responses with a truncated body snippet.
pub(crate) fn check_status(response: &TransportResponse) -> Result<()> {
    if response.is_success() {
        Ok(())
    } else {
        Err(PushError::InvalidResponse {
            status: response.status,
            body: response.body_snippet(ERROR_BODY_LIMIT),
        })
    }
}

fn decode_tickets(response: &TransportResponse) -> Result<Vec<PushTicket>> {
    check_status(response)?;
    let decoded: PublishResponse =
        serde_json::from_slice(&response.body).map_err(PushError::Decode)?;
    if let Some(errors) = reported(decoded.errors) {
        return Err(PushError::InvalidRequest { errors });
    }
    decoded
        .data
        .ok_or_else(|| PushError::contract("publish response has neither data nor errors"))
}

/// Pair tickets with the flattened batch, position by position.
pub fn pair_tickets(
    messages: &[Message],
    tickets: Vec<PushTicket>,
) -> Result<Vec<PublishedTicket>> {
    let expanded = expand(messages);
    if expanded.len() != tickets.len() {
        return Err(PushError::contract(format!(
            "mismatched response length: expected {} tickets, received {}",
            expanded.len(),
            tickets.len()
        )));
    }
    Ok(expanded
        .into_iter()
        .zip(tickets)
        .map(|((message_index, recipient), ticket)| PublishedTicket {
            message_index,
            recipient: recipient.clone(),
            ticket,
        })
        .collect())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
