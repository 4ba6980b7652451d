//! Transport seam.
//!
//! Defines the contract the synchronization engine talks to, plus the wire
//! records it consumes. The duck-typed response shape of the backend is
//! discriminated once, at the transport boundary, into [`SendResponse`]; the
//! engine never performs fallback chains on optional fields.

use crate::conversation::{Conversation, Message, MessageRole, local_id};
use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A conversation as persisted by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub messages: Vec<MessageRecord>,
    pub created_at: String,
    pub updated_at: String,
}

/// A message inside a server conversation record.
///
/// `role` is a free string on the wire; only `"user"` is meaningful, every
/// other value renders as an assistant message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageRecord {
    #[serde(default)]
    pub id: String,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: String,
}

impl MessageRecord {
    /// Maps the wire role onto the local role set.
    pub fn local_role(&self) -> MessageRole {
        if self.role == "user" {
            MessageRole::User
        } else {
            MessageRole::Assistant
        }
    }

    fn into_message(self) -> Message {
        let role = self.local_role();
        Message {
            // Server message ids are not required locally; fill gaps so the
            // display layer always has a key.
            id: if self.id.is_empty() { local_id() } else { self.id },
            role,
            content: self.content,
            timestamp: self.timestamp,
        }
    }
}

impl Conversation {
    /// Builds a domain conversation from a server record. Server titles are
    /// final, so the rename once-guard is set.
    pub fn from_record(record: ConversationRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            messages: record
                .messages
                .into_iter()
                .map(MessageRecord::into_message)
                .collect(),
            created_at: record.created_at,
            updated_at: record.updated_at,
            title_assigned: true,
        }
    }
}

/// Authoritative history listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub conversations: Vec<ConversationRecord>,
    /// Total count as reported by the server; informational.
    #[serde(default)]
    pub total: Option<i64>,
}

/// Outcome of a successful send, discriminated by which payload the server
/// returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResponse {
    /// Assistant reply only (anonymous mode); nothing replaces local state.
    Reply { reply: String },
    /// Full authoritative conversation record (authenticated mode); replaces
    /// the locally optimistic transcript wholesale.
    Conversation(ConversationRecord),
}

/// Typed request/response operations against the chat backend.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Fetches the authoritative conversation list. Authenticated mode only.
    async fn fetch_history(&self) -> Result<HistoryResponse>;

    /// Sends a message, optionally continuing an existing server
    /// conversation. Callers must pass only server-shaped ids; see
    /// [`crate::conversation::is_server_id`].
    async fn send_message(
        &self,
        content: &str,
        conversation_id: Option<&str>,
    ) -> Result<SendResponse>;

    /// Deletes a server-persisted conversation.
    async fn delete_conversation(&self, id: &str) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with_roles(roles: &[&str]) -> ConversationRecord {
        ConversationRecord {
            id: "64f1a2b3c4d5e6f708192aab".to_string(),
            title: "Quy trình".to_string(),
            messages: roles
                .iter()
                .enumerate()
                .map(|(i, role)| MessageRecord {
                    id: format!("m{i}"),
                    role: role.to_string(),
                    content: format!("msg {i}"),
                    timestamp: "2025-01-01T00:00:00Z".to_string(),
                })
                .collect(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_role_mapping_user_stays_everything_else_assistant() {
        let record = record_with_roles(&["user", "assistant", "system", "tool"]);
        let conv = Conversation::from_record(record);
        let roles: Vec<MessageRole> = conv.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::Assistant,
                MessageRole::Assistant,
            ]
        );
    }

    #[test]
    fn test_from_record_seals_title() {
        let conv = Conversation::from_record(record_with_roles(&["user"]));
        assert!(conv.title_assigned);
    }

    #[test]
    fn test_missing_message_id_gets_local_fill() {
        let mut record = record_with_roles(&["user"]);
        record.messages[0].id.clear();
        let conv = Conversation::from_record(record);
        assert!(!conv.messages[0].id.is_empty());
    }

    #[test]
    fn test_history_response_tolerates_missing_fields() {
        let parsed: HistoryResponse = serde_json::from_str("{}").unwrap();
        assert!(parsed.conversations.is_empty());
        assert!(parsed.total.is_none());
    }
}
