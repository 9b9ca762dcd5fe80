//! Per-recipient delivery results and their classification.

use herald_core::{Message, PushReceipt, PushTicket, PushToken};

use crate::error::DeliveryError;
use crate::publish::PublishedTicket;

/// Where a single notification ended up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Ticket and receipt are both ok.
    Delivered,
    /// Accepted, receipt not (yet) available.
    Pending,
    /// Failed in a way worth retrying later.
    RetryEligible,
    /// The device is permanently gone; drop the token.
    Terminal,
}

/// Outcome of one recipient of one message.
#[derive(Clone, Debug, PartialEq)]
pub struct DeliveryResult {
    /// Position of the message in the submitted batch.
    pub message_index: usize,
    /// Recipient this result is about.
    pub recipient: PushToken,
    /// Ticket issued at publish time.
    pub ticket: PushTicket,
    /// Receipt, once fetched.
    pub receipt: Option<PushReceipt>,
    /// First failure seen for this recipient.
    pub error: Option<DeliveryError>,
}

impl DeliveryResult {
    /// Start a result from a published ticket.
    ///
    /// A ticket that is not ok, or ok without an ID, cannot be followed up
    /// and carries a ticket error.
    pub fn from_ticket(published: PublishedTicket) -> Self {
        let trackable = published.ticket.is_ok() && published.ticket.receipt_id().is_some();
        let error = (!trackable).then(|| DeliveryError::Ticket {
            message: published.ticket.message.clone().unwrap_or_default(),
            code: published.ticket.error_code(),
        });
        Self {
            message_index: published.message_index,
            recipient: published.recipient,
            ticket: published.ticket,
            receipt: None,
            error,
        }
    }

    /// Attach a receipt, recording a receipt error if it failed.
    pub fn attach_receipt(&mut self, receipt: PushReceipt) {
        if !receipt.is_ok() && self.error.is_none() {
            self.error = Some(DeliveryError::Receipt {
                message: receipt.message.clone().unwrap_or_default(),
                code: receipt.error_code(),
            });
        }
        self.receipt = Some(receipt);
    }

    /// Receipt ID of the ticket, if it has one.
    pub fn ticket_id(&self) -> Option<&str> {
        self.ticket.receipt_id()
    }

    /// The originating message within `batch`.
    pub fn message<'m>(&self, batch: &'m [Message]) -> Option<&'m Message> {
        batch.get(self.message_index)
    }

    /// Ticket ok, receipt present and ok, no error.
    pub fn is_successful(&self) -> bool {
        self.error.is_none()
            && self.ticket.is_ok()
            && self.receipt.as_ref().is_some_and(PushReceipt::is_ok)
    }

    /// The receipt says the device is not registered.
    pub fn is_terminal(&self) -> bool {
        self.receipt
            .as_ref()
            .is_some_and(PushReceipt::is_device_not_registered)
    }

    /// Failed, and not for a reason that makes retrying pointless.
    pub fn should_retry(&self) -> bool {
        self.error.is_some() && !self.is_terminal()
    }

    /// Single classification of this result.
    pub fn outcome(&self) -> Outcome {
        if self.is_terminal() {
            Outcome::Terminal
        } else if self.should_retry() {
            Outcome::RetryEligible
        } else if self.is_successful() {
            Outcome::Delivered
        } else {
            Outcome::Pending
        }
    }
}
