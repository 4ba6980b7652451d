//! Conversation message types.

use super::id::local_id;
use serde::{Deserialize, Serialize};

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
    /// Synthetic message shown in place of an assistant reply after a
    /// failed round-trip. Never produced by the server.
    Error,
}

/// A single message in a conversation transcript.
///
/// Message ids are generated locally at creation time and are a display
/// concern only; the server is authoritative for conversation content but
/// never for message-level ids held here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Locally generated id (timestamp-derived).
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// The content of the message.
    pub content: String,
    /// Creation time, client clock (RFC 3339).
    pub timestamp: String,
}

impl Message {
    fn with_role(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: local_id(),
            role,
            content: content.into(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Creates a user message with a fresh local id.
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::User, content)
    }

    /// Creates an assistant message with a fresh local id.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Assistant, content)
    }

    /// Creates a synthetic error message with a fresh local id.
    pub fn error(content: impl Into<String>) -> Self {
        Self::with_role(MessageRole::Error, content)
    }
}
