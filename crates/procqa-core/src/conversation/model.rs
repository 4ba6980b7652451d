//! Conversation domain model.

use super::message::Message;
use serde::{Deserialize, Serialize};

/// A titled, ordered sequence of messages exchanged with the assistant.
///
/// The id is either a client-local temporary id (before the first successful
/// server round-trip) or a server-issued persistent id. Insertion order of
/// `messages` is significant (chronological).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: String,
    /// Derived from the first user message unless explicitly renamed.
    pub title: String,
    pub messages: Vec<Message>,
    /// Timestamp when the conversation was created (RFC 3339).
    pub created_at: String,
    /// Advances on every appended message (RFC 3339).
    pub updated_at: String,
    /// Once-guard for first-message title assignment. Conversations built
    /// from server records have it set; server titles are final.
    #[serde(default)]
    pub title_assigned: bool,
}

impl Conversation {
    /// Creates an empty local conversation with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: id.into(),
            title: title.into(),
            messages: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            title_assigned: false,
        }
    }
}
