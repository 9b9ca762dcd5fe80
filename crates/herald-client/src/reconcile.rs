//! # Receipt reconciliation
//!
//! Turns published tickets into [`DeliveryResult`]s:
//!
//! 1. Every ticket becomes a result; tickets that failed or have no ID
//!    carry a ticket error.
//! 2. Ok tickets with a non-empty ID are eligible for a receipt lookup.
//! 3. If any are eligible, wait the receipt delay (cancellable), fetch
//!    once, and attach receipts by ticket ID.
//!
//! The results are always returned. A cancelled wait or a failed fetch is
//! reported alongside them in [`Reconciliation::error`], with every result
//! left exactly as it was before the fetch.

use std::time::Duration;

use herald_core::config::effective_receipt_delay;
use herald_core::validate_receipt_ids;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::error::PushError;
use crate::publish::PublishedTicket;
use crate::receipts::ReceiptFetcher;
use crate::result::{DeliveryResult, Outcome};

/// Results of a reconcile pass, with the error that cut it short (if any).
#[derive(Debug)]
pub struct Reconciliation {
    /// One result per published ticket, in publish order.
    pub results: Vec<DeliveryResult>,
    /// Set when the wait was cancelled or the receipt fetch failed.
    pub error: Option<PushError>,
}

impl Reconciliation {
    /// Whether receipts were fetched (or none were needed).
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Results with the given outcome.
    pub fn with_outcome(&self, outcome: Outcome) -> impl Iterator<Item = &DeliveryResult> {
        self.results.iter().filter(move |r| r.outcome() == outcome)
    }

    /// Turn a partial reconciliation into an error, dropping the results.
    pub fn into_result(self) -> Result<Vec<DeliveryResult>, PushError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(self.results),
        }
    }
}

/// Matches receipts to tickets.
pub struct ReceiptReconciler {
    fetcher: ReceiptFetcher,
}

impl ReceiptReconciler {
    /// Create a reconciler over `fetcher`.
    pub fn new(fetcher: ReceiptFetcher) -> Self {
        Self { fetcher }
    }

    /// The underlying receipt fetcher.
    pub fn fetcher(&self) -> &ReceiptFetcher {
        &self.fetcher
    }

    /// Reconcile `tickets` after waiting `delay`. A zero `delay` waits the
    /// 15 minute default.
    #[instrument(skip_all, fields(tickets = tickets.len()))]
    pub async fn reconcile(
        &self,
        tickets: Vec<PublishedTicket>,
        delay: Duration,
        cancel: &CancellationToken,
    ) -> Reconciliation {
        let mut results: Vec<DeliveryResult> =
            tickets.into_iter().map(DeliveryResult::from_ticket).collect();

        let ids: Vec<String> = results
            .iter()
            .filter(|r| r.error.is_none())
            .filter_map(|r| r.ticket_id().map(str::to_owned))
            .collect();
        if ids.is_empty() {
            debug!("no tickets eligible for receipts");
            return Reconciliation {
                results,
                error: None,
            };
        }
        if let Err(err) = validate_receipt_ids(&ids) {
            warn!(eligible = ids.len(), error = %err, "too many tickets for one receipt lookup");
            return Reconciliation {
                results,
                error: Some(err.into()),
            };
        }

        let delay = effective_receipt_delay(delay);
        debug!(
            eligible = ids.len(),
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "waiting before fetching receipts"
        );
        tokio::select! {
            biased;
            () = cancel.cancelled() => {
                warn!("receipt wait cancelled");
                return Reconciliation { results, error: Some(PushError::Cancelled) };
            }
            () = tokio::time::sleep(delay) => {}
        }

        let receipts = match self.fetcher.fetch(&ids).await {
            Ok(receipts) => receipts,
            Err(err) => {
                warn!(error = %err, category = err.category(), "receipt fetch failed");
                return Reconciliation {
                    results,
                    error: Some(err),
                };
            }
        };

        for result in &mut results {
            let receipt = result.ticket_id().and_then(|id| receipts.get(id)).cloned();
            if let Some(receipt) = receipt {
                metrics::counter!("push_receipts_total", "status" => receipt.status.to_string())
                    .increment(1);
                result.attach_receipt(receipt);
            }
        }

        let count = |outcome: Outcome| results.iter().filter(|r| r.outcome() == outcome).count();
        info!(
            delivered = count(Outcome::Delivered),
            pending = count(Outcome::Pending),
            retry_eligible = count(Outcome::RetryEligible),
            terminal = count(Outcome::Terminal),
            "receipts reconciled"
        );

        Reconciliation {
            results,
            error: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
