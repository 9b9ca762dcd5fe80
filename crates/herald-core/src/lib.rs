//! # herald-core
//!
//! Foundation types for the Herald push delivery client.
//!
//! This crate provides the shared vocabulary the other Herald crates depend on:
//!
//! - **Tokens**: [`PushToken`], a validated recipient address
//! - **Messages**: [`Message`] with its platform-specific fields
//! - **Tickets and receipts**: [`PushTicket`], [`PushReceipt`], [`ErrorCode`]
//! - **Retry math**: [`RetryConfig`] backoff and the retryable-status set
//! - **Validation**: batch limits, payload estimate, token filtering
//! - **Configuration**: [`PushConfig`] endpoints, auth and timing
//!
//! Nothing here performs I/O.

#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod message;
pub mod retry;
pub mod ticket;
pub mod token;
pub mod validation;

pub use config::PushConfig;
pub use errors::ValidationError;
pub use message::{Data, Message, Priority};
pub use retry::{RetryConfig, is_retryable_status};
pub use ticket::{ApiErrorObject, Details, ErrorCode, PushReceipt, PushStatus, PushTicket};
pub use token::{PushToken, is_push_token_valid};
pub use validation::{
    MAX_MESSAGES_PER_REQUEST, MAX_RECEIPT_IDS_PER_REQUEST, filter_invalid_tokens,
    validate_batch, validate_message, validate_receipt_ids,
};
