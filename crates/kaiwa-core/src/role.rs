//! Participant roles.
//!
//! Exactly two roles exist, and each one pins the language pair and the UI
//! strings for its side of the conversation. The pair is never chosen by
//! the user, and there is no default role: an unknown identifier is a parse
//! error and the session must not start.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One of the two fixed chat participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Korean side (`user1`): writes `ko`, reads `ja`.
    User1,
    /// Japanese side (`user2`): writes `ja`, reads `ko`.
    User2,
}

impl Role {
    /// Wire identifier carried in the `user` field.
    pub fn as_str(self) -> &'static str {
        match self {
            Role::User1 => "user1",
            Role::User2 => "user2",
        }
    }

    /// Language this role writes in.
    pub fn source_lang(self) -> &'static str {
        match self {
            Role::User1 => "ko",
            Role::User2 => "ja",
        }
    }

    /// Language the relay translates into for the other side.
    pub fn target_lang(self) -> &'static str {
        match self {
            Role::User1 => "ja",
            Role::User2 => "ko",
        }
    }

    /// Header line for this role's chat surface.
    pub fn header(self) -> &'static str {
        match self {
            Role::User1 => "🇰🇷 한국어 채팅",
            Role::User2 => "🇯🇵 日本語チャット",
        }
    }

    /// Placeholder shown while the input box is empty.
    pub fn input_placeholder(self) -> &'static str {
        match self {
            Role::User1 => "한국어 메시지 입력",
            Role::User2 => "日本語メッセージを入力",
        }
    }

    /// Label for the submit action.
    pub fn submit_label(self) -> &'static str {
        match self {
            Role::User1 => "전송",
            Role::User2 => "送信",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = RoleParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user1" => Ok(Role::User1),
            "user2" => Ok(Role::User2),
            other => Err(RoleParseError(other.to_string())),
        }
    }
}

impl TryFrom<String> for Role {
    type Error = RoleParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

/// Error for role identifiers outside `{"user1", "user2"}`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown role {0:?}, expected \"user1\" or \"user2\"")]
pub struct RoleParseError(pub String);
