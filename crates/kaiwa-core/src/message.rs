//! Wire frames.
//!
//! Frames are JSON text over the relay socket. The client always sends the
//! full five-field shape; the relay may deliver a reduced one (`user` +
//! `content` only), so everything else is optional on the inbound side.
//! Beyond a successful decode the relay is trusted — no field validation.

use crate::Role;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The only action the relay routes on.
pub const SEND_ACTION: &str = "sendmessage";

/// Frame sent from the client to the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientMessage {
    pub action: String,
    pub user: Role,
    pub content: String,
    pub source_lang: String,
    pub target_lang: String,
}

impl ClientMessage {
    /// Build a `sendmessage` frame for `role`. The language pair comes from
    /// the role; callers never pick it.
    pub fn compose(role: Role, content: impl Into<String>) -> Self {
        Self {
            action: SEND_ACTION.to_string(),
            user: role,
            content: content.into(),
            source_lang: role.source_lang().to_string(),
            target_lang: role.target_lang().to_string(),
        }
    }

    /// Serialize to the wire encoding.
    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Frame delivered by the relay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayMessage {
    pub user: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub action: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_lang: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_lang: Option<String>,
}

impl RelayMessage {
    /// A reduced delivery frame (`user` + `content` only).
    pub fn new(user: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            content: content.into(),
            action: None,
            source_lang: None,
            target_lang: None,
        }
    }

    /// Decode a wire frame.
    pub fn decode(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }
}

impl fmt::Display for RelayMessage {
    /// Log line rendering: `user: content`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.user, self.content)
    }
}
