//! Scripted in-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use herald_core::{Message, PushToken};

use crate::error::TransportError;
use crate::transport::{Transport, TransportRequest, TransportResponse};

type Scripted = Result<TransportResponse, TransportError>;

/// Replies with queued responses in order; panics when the script runs out.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<TransportRequest>>,
    calls: AtomicUsize,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn reply(self, status: u16, body: impl Into<String>) -> Self {
        self.push(Ok(TransportResponse {
            status,
            body: Bytes::from(body.into()),
        }))
    }

    pub(crate) fn fail(self, message: &str) -> Self {
        self.push(Err(TransportError::other(message)))
    }

    fn push(self, item: Scripted) -> Self {
        self.script.lock().unwrap().push_back(item);
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn post(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        let _ = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .expect("scripted transport ran out of responses")
    }
}

pub(crate) fn token(name: &str) -> PushToken {
    PushToken::parse(format!("ExponentPushToken[{name}]")).unwrap()
}

pub(crate) fn message(tokens: &[&str]) -> Message {
    Message::new(tokens.iter().map(|t| token(t)).collect(), "hello")
}

/// `{"data": [...]}` with one ok ticket per id.
pub(crate) fn ok_tickets(ids: &[&str]) -> String {
    let data: Vec<_> = ids
        .iter()
        .map(|id| serde_json::json!({"status": "ok", "id": id}))
        .collect();
    serde_json::json!({ "data": data }).to_string()
}
