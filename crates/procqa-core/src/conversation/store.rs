//! In-memory conversation store.
//!
//! The store exclusively owns all `Conversation` and `Message` instances for
//! the lifetime of the page session. All mutation flows through the
//! synchronization engine and the history loader; the UI layer only reads.

use super::message::Message;
use super::model::Conversation;
use crate::text::DEFAULT_TITLE;

/// Maximum number of characters a derived title keeps before truncation.
const TITLE_MAX_CHARS: usize = 30;

/// Holds the conversation list, the active selection, and the transcript of
/// the active selection.
///
/// The active transcript exists independently of the conversation list: an
/// anonymous user can hold a transcript that is never materialized as a
/// `Conversation` entity.
#[derive(Debug, Default)]
pub struct ConversationStore {
    /// Newest-first conversation list.
    conversations: Vec<Conversation>,
    /// Id of the active conversation, if one is selected.
    active_id: Option<String>,
    /// Transcript of the active selection (or of the unattached session).
    active_messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ------------------------------------------------------------------
    // Read accessors
    // ------------------------------------------------------------------

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active_id.as_deref()
    }

    pub fn active_messages(&self) -> &[Message] {
        &self.active_messages
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    // ------------------------------------------------------------------
    // Mutators (engine / loader only)
    // ------------------------------------------------------------------

    /// Inserts `conv` at the front if its id is unseen, else replaces the
    /// stored conversation wholesale. Never merges field-by-field: once a
    /// server record exists it is authoritative.
    pub fn upsert_conversation(&mut self, conv: Conversation) {
        match self.conversations.iter().position(|c| c.id == conv.id) {
            Some(pos) => self.conversations[pos] = conv,
            None => self.conversations.insert(0, conv),
        }
    }

    /// Selects a conversation and copies its messages into the active
    /// transcript. Unknown ids are a no-op.
    pub fn set_active(&mut self, id: &str) {
        if let Some(conv) = self.get(id) {
            self.active_messages = conv.messages.clone();
            self.active_id = Some(id.to_string());
        }
    }

    /// Clears the active selection so the next send starts fresh.
    pub fn clear_active(&mut self) {
        self.active_id = None;
        self.active_messages.clear();
    }

    /// Appends a message on behalf of a send targeting `target`.
    ///
    /// The message lands in the active transcript only when `target` still
    /// matches the active selection (both `None` counts as a match), and is
    /// mirrored into the targeted conversation entity when one exists. This
    /// is what lets an in-flight send reach its own conversation after the
    /// user has navigated away.
    pub fn append_message(&mut self, target: Option<&str>, msg: Message) {
        let on_target = self.active_id.as_deref() == target;
        if on_target {
            self.active_messages.push(msg.clone());
        }
        match target {
            Some(id) => {
                if let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) {
                    conv.messages.push(msg);
                    conv.updated_at = chrono::Utc::now().to_rfc3339();
                } else if !on_target {
                    tracing::debug!(target_id = %id, "dropping message for vanished conversation");
                }
            }
            None => {
                if !on_target {
                    tracing::debug!("dropping message for superseded unattached transcript");
                }
            }
        }
    }

    /// Removes a conversation; clears the active selection if it pointed at
    /// the removed conversation.
    pub fn remove_conversation(&mut self, id: &str) {
        self.conversations.retain(|c| c.id != id);
        if self.active_id.as_deref() == Some(id) {
            self.clear_active();
        }
    }

    /// Assigns a title derived from `text` exactly once per conversation.
    ///
    /// The text is trimmed to at most 30 characters with an ellipsis when
    /// truncated (character count, not bytes). Subsequent calls are no-ops,
    /// even with different texts.
    pub fn rename_if_first_message(&mut self, id: &str, text: &str) {
        let Some(conv) = self.conversations.iter_mut().find(|c| c.id == id) else {
            return;
        };
        if conv.title_assigned {
            return;
        }
        conv.title = derive_title(text);
        conv.title_assigned = true;
        conv.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Replaces the full conversation list (history load). Clears the active
    /// selection; the caller re-selects.
    pub fn replace_all(&mut self, conversations: Vec<Conversation>) {
        self.conversations = conversations;
        self.clear_active();
    }

    /// Sign-out teardown: drops all conversations and the active transcript.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

fn derive_title(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    if trimmed.chars().count() > TITLE_MAX_CHARS {
        let cut: String = trimmed.chars().take(TITLE_MAX_CHARS).collect();
        format!("{cut}...")
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::local_id;

    fn conv(id: &str) -> Conversation {
        Conversation::new(id, DEFAULT_TITLE)
    }

    #[test]
    fn test_upsert_inserts_at_front() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));
        store.upsert_conversation(conv("b"));
        let ids: Vec<&str> = store.conversations().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[test]
    fn test_upsert_replaces_wholesale() {
        let mut store = ConversationStore::new();
        let mut first = conv("a");
        first.messages.push(Message::user("old"));
        store.upsert_conversation(first);

        let replacement = conv("a");
        store.upsert_conversation(replacement);

        assert_eq!(store.conversations().len(), 1);
        assert!(store.get("a").unwrap().messages.is_empty());
    }

    #[test]
    fn test_set_active_copies_transcript_and_ignores_unknown() {
        let mut store = ConversationStore::new();
        let mut c = conv("a");
        c.messages.push(Message::user("hello"));
        store.upsert_conversation(c);

        store.set_active("a");
        assert_eq!(store.active_id(), Some("a"));
        assert_eq!(store.active_messages().len(), 1);

        store.set_active("missing");
        assert_eq!(store.active_id(), Some("a"));
    }

    #[test]
    fn test_append_message_unattached() {
        let mut store = ConversationStore::new();
        store.append_message(None, Message::user("hi"));
        assert_eq!(store.active_messages().len(), 1);
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn test_append_message_mirrors_into_entity_and_bumps_updated_at() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));
        store.set_active("a");
        let before = store.get("a").unwrap().updated_at.clone();

        store.append_message(Some("a"), Message::user("hi"));

        let entity = store.get("a").unwrap();
        assert_eq!(entity.messages.len(), 1);
        assert!(entity.updated_at >= before);
        assert_eq!(store.active_messages().len(), 1);
    }

    #[test]
    fn test_append_message_after_navigation_lands_on_entity_only() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));
        store.upsert_conversation(conv("b"));
        store.set_active("b");

        store.append_message(Some("a"), Message::assistant("late reply"));

        assert_eq!(store.get("a").unwrap().messages.len(), 1);
        assert!(store.active_messages().is_empty());
    }

    #[test]
    fn test_unattached_message_dropped_after_selection() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));
        store.set_active("a");

        // A send issued before the selection existed has nowhere to land.
        store.append_message(None, Message::assistant("late reply"));
        assert!(store.active_messages().is_empty());
        assert!(store.get("a").unwrap().messages.is_empty());
    }

    #[test]
    fn test_remove_conversation_clears_active() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));
        store.set_active("a");
        store.remove_conversation("a");
        assert!(store.active_id().is_none());
        assert!(store.conversations().is_empty());
    }

    #[test]
    fn test_rename_assigns_once() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));

        store.rename_if_first_message("a", "Quy trình nghỉ phép");
        assert_eq!(store.get("a").unwrap().title, "Quy trình nghỉ phép");

        store.rename_if_first_message("a", "something else entirely");
        assert_eq!(store.get("a").unwrap().title, "Quy trình nghỉ phép");
    }

    #[test]
    fn test_rename_truncates_by_characters() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));

        // 35 Vietnamese characters; byte-based truncation would split a
        // multi-byte character.
        let long = "Quy trình xin nghỉ việc của nhân sự";
        assert_eq!(long.chars().count(), 35);
        store.rename_if_first_message("a", long);

        let title = &store.get("a").unwrap().title;
        assert!(title.ends_with("..."));
        assert_eq!(title.chars().count(), 33);
    }

    #[test]
    fn test_rename_empty_falls_back_to_default() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(Conversation::new("a", "placeholder"));
        store.rename_if_first_message("a", "   ");
        assert_eq!(store.get("a").unwrap().title, DEFAULT_TITLE);
    }

    #[test]
    fn test_replace_all_clears_selection() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv("a"));
        store.set_active("a");

        store.replace_all(vec![conv("x"), conv("y")]);
        assert!(store.active_id().is_none());
        assert_eq!(store.conversations().len(), 2);
    }

    #[test]
    fn test_reset_drops_everything() {
        let mut store = ConversationStore::new();
        store.upsert_conversation(conv(&local_id()));
        store.append_message(None, Message::user("hi"));
        store.reset();
        assert!(store.conversations().is_empty());
        assert!(store.active_messages().is_empty());
        assert!(store.active_id().is_none());
    }
}
