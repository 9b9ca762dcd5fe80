//! Push notification messages.
//!
//! A [`Message`] is one logical notification addressed to one or more
//! [`PushToken`]s. The service answers with one ticket per recipient, so a
//! message with `n` recipients expands to `n` tickets.
//!
//! Field names and omission rules follow the wire format of the push
//! service: unset optional fields are not serialized at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::token::PushToken;

/// Free-form string payload delivered to the app with the notification.
pub type Data = HashMap<String, String>;

/// Delivery priority.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    /// Platform default priority.
    #[default]
    Default,
    /// Normal priority.
    Normal,
    /// High priority (wakes sleeping devices).
    High,
}

/// A notification addressed to one or more recipients.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Recipients of this message.
    pub to: Vec<PushToken>,

    /// Title shown in the notification.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Body text of the notification.
    pub body: String,

    /// Extra data passed to the app. Counts toward the 4 KiB payload limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Data>,

    /// Sound to play on receipt (`"default"` for the device sound).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sound: Option<String>,

    /// Seconds the message may be kept for redelivery.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,

    /// Unix timestamp after which the message is dropped.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiration: Option<i64>,

    /// Delivery priority.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    /// Unread badge count (iOS). `Some(0)` clears the badge.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge: Option<u32>,

    /// Android notification channel.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel_id: Option<String>,

    /// Subtitle below the title (iOS).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    /// Interruption level (iOS), e.g. `"active"` or `"time-sensitive"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interruption_level: Option<String>,

    /// Allow a notification service extension to modify the content (iOS).
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub mutable_content: bool,

    /// Wake the app in the background (iOS).
    #[serde(rename = "_contentAvailable", default, skip_serializing_if = "std::ops::Not::not")]
    pub content_available: bool,

    /// Android drawable resource used as the notification icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Rich content such as `{"image": url}`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rich_content: Option<HashMap<String, String>>,

    /// Notification category for actionable notifications.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
}

impl Message {
    /// Create a message with recipients and body; every other field unset.
    #[must_use]
    pub fn new(to: Vec<PushToken>, body: impl Into<String>) -> Self {
        Self {
            to,
            body: body.into(),
            ..Self::default()
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the data payload.
    #[must_use]
    pub fn with_data(mut self, data: Data) -> Self {
        self.data = Some(data);
        self
    }

    /// Set the delivery priority.
    #[must_use]
    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// Number of tickets this message expands to.
    pub fn recipient_count(&self) -> usize {
        self.to.len()
    }

    /// Rough payload size: title, body and every data key and value.
    pub fn estimated_payload_size(&self) -> usize {
        let text = self.title.as_ref().map_or(0, String::len) + self.body.len();
        let data = self
            .data
            .as_ref()
            .map_or(0, |d| d.iter().map(|(k, v)| k.len() + v.len()).sum());
        text + data
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
