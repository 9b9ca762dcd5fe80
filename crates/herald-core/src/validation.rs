//! Batch and message validation.
//!
//! Checks run before anything is serialized, so a rejected batch never
//! reaches the network. Publish batches and receipt-ID batches have
//! independent size limits.

use crate::errors::{Result, ValidationError};
use crate::message::Message;

/// Maximum messages in one publish request.
pub const MAX_MESSAGES_PER_REQUEST: usize = 100;

/// Maximum ticket IDs in one receipt request.
pub const MAX_RECEIPT_IDS_PER_REQUEST: usize = 1000;

/// Estimated payload ceiling, leaving headroom below the 4096-byte limit
/// for JSON framing.
pub const MAX_PAYLOAD_BYTES: usize = 4000;

/// Validate a publish batch.
///
/// Every message must have at least one recipient and every recipient
/// token must be non-empty and well-formed. The batch may hold at most
/// [`MAX_MESSAGES_PER_REQUEST`] messages. An empty batch is valid.
pub fn validate_batch(messages: &[Message]) -> Result<()> {
    for (index, message) in messages.iter().enumerate() {
        if message.to.is_empty() {
            return Err(ValidationError::EmptyRecipients { index });
        }
        if let Some(token) = message.to.iter().find(|t| !t.is_valid()) {
            return Err(ValidationError::InvalidToken {
                token: token.as_str().to_owned(),
            });
        }
    }
    checked_len(messages.len(), MAX_MESSAGES_PER_REQUEST)
}

/// Validate the size of a receipt-ID batch.
pub fn validate_receipt_ids(ids: &[String]) -> Result<()> {
    checked_len(ids.len(), MAX_RECEIPT_IDS_PER_REQUEST)
}

/// Validate a single message, including the payload-size estimate.
pub fn validate_message(message: &Message) -> Result<()> {
    if message.to.is_empty() {
        return Err(ValidationError::EmptyRecipients { index: 0 });
    }

    let estimated = message.estimated_payload_size();
    if estimated > MAX_PAYLOAD_BYTES {
        return Err(ValidationError::PayloadTooLarge {
            estimated,
            max: MAX_PAYLOAD_BYTES,
        });
    }

    match message.to.iter().find(|t| !t.is_valid()) {
        Some(token) => Err(ValidationError::InvalidToken {
            token: token.as_str().to_owned(),
        }),
        None => Ok(()),
    }
}

/// Drop malformed tokens from every message in place.
///
/// Returns how many tokens were removed. Messages may end up with no
/// recipients; [`validate_batch`] rejects those.
pub fn filter_invalid_tokens(messages: &mut [Message]) -> usize {
    messages
        .iter_mut()
        .map(|message| {
            let before = message.to.len();
            message.to.retain(crate::token::PushToken::is_valid);
            before - message.to.len()
        })
        .sum()
}

fn checked_len(count: usize, max: usize) -> Result<()> {
    if count > max {
        Err(ValidationError::BatchTooLarge { count, max })
    } else {
        Ok(())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
