//! Conversation, turn, and exchange types for DOBI.
//!
//! A conversation is an append-only sequence of turns keyed by a
//! caller-supplied identifier. A `ChatExchange` is the record handed back
//! to the UI layer after each submitted message.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;
use crate::intent::Intent;

/// Maximum length of a conversation identifier.
pub const MAX_CONVERSATION_ID_LEN: usize = 128;

/// Caller-supplied conversation identifier.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can be used
/// directly as a file name by the history store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ConversationId(String);

impl ConversationId {
    /// Validate and wrap a conversation identifier.
    pub fn new(id: impl Into<String>) -> Result<Self, ChatError> {
        let id = id.into();
        if id.is_empty() || id.len() > MAX_CONVERSATION_ID_LEN {
            return Err(ChatError::InvalidConversationId(id));
        }
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(ChatError::InvalidConversationId(id));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConversationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ConversationId {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for ConversationId {
    type Error = ChatError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ConversationId> for String {
    fn from(id: ConversationId) -> Self {
        id.0
    }
}

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl TurnRole {
    /// Speaker prefix used when rendering history into a prompt.
    pub fn prefix(&self) -> &'static str {
        match self {
            TurnRole::User => "Human",
            TurnRole::Assistant => "AI",
        }
    }
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single immutable turn in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: TurnRole,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::User,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            role: TurnRole::Assistant,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }
}

/// An ordered, append-only sequence of turns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: ConversationId,
    pub turns: Vec<Turn>,
}

impl Conversation {
    /// A conversation with no turns yet.
    pub fn empty(id: ConversationId) -> Self {
        Self {
            id,
            turns: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

/// The record returned to the UI for every submitted message.
///
/// Failed requests still produce an exchange (with `failed = true` and an
/// apology as the answer) so the caller's view stays consistent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatExchange {
    pub conversation_id: ConversationId,
    pub original_text: String,
    pub answer_text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub failed: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversation_id_accepts_safe_names() {
        for id in ["fa1010", "user_42", "a-b-c", "X"] {
            assert!(ConversationId::new(id).is_ok(), "{id} should be valid");
        }
    }

    #[test]
    fn test_conversation_id_rejects_unsafe_names() {
        for id in ["", "../etc/passwd", "has space", "slash/inside", "dot.json"] {
            assert!(ConversationId::new(id).is_err(), "{id} should be rejected");
        }
        let too_long = "a".repeat(MAX_CONVERSATION_ID_LEN + 1);
        assert!(ConversationId::new(too_long).is_err());
    }

    #[test]
    fn test_conversation_id_serde_validates() {
        let id: ConversationId = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(id.as_str(), "abc");
        assert!(serde_json::from_str::<ConversationId>("\"../x\"").is_err());
    }

    #[test]
    fn test_turn_role_prefix() {
        assert_eq!(TurnRole::User.prefix(), "Human");
        assert_eq!(TurnRole::Assistant.prefix(), "AI");
    }

    #[test]
    fn test_turn_serde_shape() {
        let turn = Turn::user("hi");
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["role"], "user");
        assert_eq!(json["text"], "hi");
        assert!(json["timestamp"].is_string());
    }
}
