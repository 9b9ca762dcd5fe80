//! # herald-logging
//!
//! Structured logging setup for applications embedding the Herald client.
//!
//! The library crates only emit `tracing` events; installing a subscriber
//! is left to the application. This crate provides:
//! - [`init_subscriber`]: compact, human-readable output to stderr
//! - [`init_json_subscriber`]: one JSON object per line to stderr
//! - [`capture_logs`]: an in-memory layer for asserting on events in tests

#![deny(unsafe_code)]

pub mod capture;

pub use capture::{CapturedEvent, CapturedLogs, capture_logs};

use tracing_subscriber::EnvFilter;

/// Build the level filter, preferring `RUST_LOG` when it is set and valid.
fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at application startup. Subsequent calls are no-ops.
///
/// # Arguments
///
/// * `level` - Minimum level when `RUST_LOG` is unset, e.g. `"info"` or
///   `"herald_client=debug,warn"`.
pub fn init_subscriber(level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init fails if a global subscriber already exists
    let _ = subscriber.try_init();
}

/// Initialize the global tracing subscriber with JSON-lines output.
///
/// Same semantics as [`init_subscriber`]; intended for log shippers.
pub fn init_json_subscriber(level: &str) {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter(level))
        .with_target(true)
        .with_writer(std::io::stderr)
        .json()
        .flatten_event(true);

    let _ = subscriber.try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
