//! Push tokens.
//!
//! A [`PushToken`] is the recipient address of a notification. Tokens built
//! through [`PushToken::parse`] (or deserialized) always carry a recognised
//! prefix. [`PushToken::new_unchecked`] exists for values read back from
//! trusted storage; those are checked again when a batch is validated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{Result, ValidationError};

/// Canonical push-token prefix.
pub const TOKEN_PREFIX: &str = "ExponentPushToken";

/// Alternate prefix accepted by the delivery service.
pub const ALT_TOKEN_PREFIX: &str = "ExpoPushToken";

/// Validated recipient identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PushToken(String);

impl PushToken {
    /// Parse a token, rejecting anything without a push-token prefix.
    pub fn parse(token: impl Into<String>) -> Result<Self> {
        let token = token.into();
        if is_push_token_valid(&token) {
            Ok(Self(token))
        } else {
            Err(ValidationError::MalformedToken { token })
        }
    }

    /// Wrap a token without checking it.
    #[must_use]
    pub fn new_unchecked(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// The raw token string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the token carries a recognised prefix.
    pub fn is_valid(&self) -> bool {
        is_push_token_valid(&self.0)
    }
}

/// Whether `token` looks like a push token.
pub fn is_push_token_valid(token: &str) -> bool {
    token.starts_with(TOKEN_PREFIX) || token.starts_with(ALT_TOKEN_PREFIX)
}

impl TryFrom<String> for PushToken {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<PushToken> for String {
    fn from(token: PushToken) -> Self {
        token.0
    }
}

impl fmt::Display for PushToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for PushToken {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
