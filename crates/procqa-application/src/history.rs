//! Authoritative history loading.

use crate::notify::Notifier;
use procqa_core::conversation::{Conversation, ConversationStore};
use procqa_core::identity::{ModeResolver, SessionMode};
use procqa_core::text::GENERIC_ERROR_NOTICE;
use procqa_core::transport::ChatTransport;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Replaces local state with the server's conversation list on startup and
/// on mode change.
///
/// The operating mode is recomputed on every call, so a sign-in or sign-out
/// between loads takes effect without reconstruction.
pub struct HistoryLoader {
    store: Arc<RwLock<ConversationStore>>,
    transport: Arc<dyn ChatTransport>,
    resolver: Arc<dyn ModeResolver>,
    notifier: Notifier,
}

impl HistoryLoader {
    pub fn new(
        store: Arc<RwLock<ConversationStore>>,
        transport: Arc<dyn ChatTransport>,
        resolver: Arc<dyn ModeResolver>,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            transport,
            resolver,
            notifier,
        }
    }

    /// Loads the authoritative history in authenticated mode; does nothing
    /// in anonymous mode (an in-progress transcript must not be disrupted
    /// by a spurious reload).
    ///
    /// A fetch failure preserves the prior local state: a visible transcript
    /// is never destroyed because the network went away. Returns the mode
    /// the load ran under.
    pub async fn load(&self) -> SessionMode {
        let mode = self.resolver.resolve_mode();
        if mode == SessionMode::Anonymous {
            tracing::debug!("anonymous mode, skipping history load");
            return mode;
        }

        match self.transport.fetch_history().await {
            Ok(history) => {
                let mut conversations: Vec<Conversation> = history
                    .conversations
                    .into_iter()
                    .map(Conversation::from_record)
                    .collect();
                // Most recently updated first; the server already sorts,
                // but the selection below depends on the order.
                conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
                let first_id = conversations.first().map(|c| c.id.clone());

                let mut store = self.store.write().await;
                store.replace_all(conversations);
                if let Some(id) = first_id {
                    store.set_active(&id);
                }
                tracing::info!(count = store.conversations().len(), "history loaded");
            }
            Err(e) => {
                tracing::warn!("history load failed, keeping local state: {e}");
                self.notifier
                    .raise(e.notice().unwrap_or(GENERIC_ERROR_NOTICE))
                    .await;
            }
        }
        mode
    }
}
