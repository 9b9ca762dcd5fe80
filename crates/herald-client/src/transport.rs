//! HTTP transport abstraction.
//!
//! The publish and receipt paths only need "POST these bytes, give me the
//! status and body back". Keeping that behind [`Transport`] lets tests
//! script responses without a network.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::header::HeaderMap;

use crate::error::TransportError;

/// A fully prepared POST request.
#[derive(Clone, Debug)]
pub struct TransportRequest {
    /// Absolute endpoint URL.
    pub url: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Encoded (and possibly compressed) body.
    pub body: Bytes,
}

/// Status and body of a completed exchange.
#[derive(Clone, Debug)]
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: Bytes,
}

impl TransportResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body as text, lossy and truncated to `limit` characters.
    pub fn body_snippet(&self, limit: usize) -> String {
        String::from_utf8_lossy(&self.body).chars().take(limit).collect()
    }
}

/// Sends one request and returns the response.
///
/// A non-2xx status is *not* an error at this layer; only failures to
/// complete the exchange are.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST the request.
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError>;
}

/// [`Transport`] backed by a shared `reqwest::Client`.
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a client with the given per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let response = self
            .client
            .post(&request.url)
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(TransportResponse { status, body })
    }
}
