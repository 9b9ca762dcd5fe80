//! # herald-client
//!
//! Reliable delivery of batched push notifications.
//!
//! - [`PublishPipeline`] validates a batch, posts it through the
//!   [`RetryExecutor`] and pairs the returned tickets with their message
//!   and recipient.
//! - [`ReceiptReconciler`] waits, fetches receipts once and produces one
//!   [`DeliveryResult`] per recipient.
//! - [`DeliveryResult::outcome`] classifies each result as delivered,
//!   pending, retry-eligible or terminal.
//! - [`PushClient`] ties these together behind the [`PushService`] trait.
//!
//! All waits take a `CancellationToken`; cancelling it ends the wait with
//! [`PushError::Cancelled`].

#![deny(unsafe_code)]

pub mod client;
pub mod compression;
pub mod error;
pub mod publish;
pub mod receipts;
pub mod reconcile;
pub mod result;
pub mod retry;
pub mod transport;
pub mod wire;

#[cfg(test)]
pub(crate) mod testing;

pub use client::{PushClient, PushService};
pub use error::{DeliveryError, PushError, Result, TransportError};
pub use publish::{PublishPipeline, PublishedTicket, expand, pair_tickets};
pub use receipts::ReceiptFetcher;
pub use reconcile::{ReceiptReconciler, Reconciliation};
pub use result::{DeliveryResult, Outcome};
pub use retry::RetryExecutor;
pub use transport::{ReqwestTransport, Transport, TransportRequest, TransportResponse};

pub use herald_core::{Message, PushConfig, PushToken};
pub use tokio_util::sync::CancellationToken;
