//! Conversation synchronization engine.
//!
//! Orchestrates message sends: optimistic transcript update, the server
//! round-trip, reconciliation of optimistic state with the authoritative
//! response, and error annotation on failure. Replace-not-merge on success
//! keeps the client from diverging from server truth; preserve-on-failure
//! keeps the user's own words visible even when they were not durably saved.

use crate::notify::Notifier;
use crate::state::{SendPhase, SendTracker};
use procqa_core::Result;
use procqa_core::conversation::{Conversation, ConversationStore, Message, is_server_id};
use procqa_core::text::{GENERIC_ERROR_NOTICE, SEND_FAILURE_APOLOGY};
use procqa_core::transport::{ChatTransport, SendResponse};
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::{Mutex, RwLock};

/// Queue key for sends issued with no active conversation.
const UNATTACHED_KEY: &str = "<unattached>";

/// Drives all conversation mutation for the session.
///
/// Sends targeting the same conversation are serialized behind a
/// per-conversation lock: a send issued while another is outstanding waits
/// until the prior one reaches its terminal phase, so two optimistic appends
/// can never race two server replacements. Sends to different conversations
/// proceed concurrently. There is no cancellation; an in-flight send always
/// runs to completion, and its effect lands on its own conversation even if
/// the user has navigated away.
pub struct ChatEngine {
    store: Arc<RwLock<ConversationStore>>,
    transport: Arc<dyn ChatTransport>,
    notifier: Notifier,
    /// Per-conversation send serialization.
    send_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    /// Number of sends currently issued (queued or in flight).
    in_flight: AtomicUsize,
}

impl ChatEngine {
    pub fn new(
        store: Arc<RwLock<ConversationStore>>,
        transport: Arc<dyn ChatTransport>,
        notifier: Notifier,
    ) -> Self {
        Self {
            store,
            transport,
            notifier,
            send_locks: Mutex::new(HashMap::new()),
            in_flight: AtomicUsize::new(0),
        }
    }

    // ------------------------------------------------------------------
    // Read surface for the UI layer
    // ------------------------------------------------------------------

    pub async fn conversations(&self) -> Vec<Conversation> {
        self.store.read().await.conversations().to_vec()
    }

    pub async fn active_id(&self) -> Option<String> {
        self.store.read().await.active_id().map(str::to_string)
    }

    pub async fn active_messages(&self) -> Vec<Message> {
        self.store.read().await.active_messages().to_vec()
    }

    /// True while any send is queued or in flight. Advisory: the UI uses it
    /// to disable submission, the engine serializes regardless.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn transient_error(&self) -> Option<String> {
        self.notifier.message().await
    }

    /// Shared store handle, for composing with the history loader.
    pub fn store(&self) -> Arc<RwLock<ConversationStore>> {
        Arc::clone(&self.store)
    }

    pub fn notifier(&self) -> Notifier {
        self.notifier.clone()
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Clears the active selection so the next send starts a fresh
    /// conversation.
    pub async fn create_new_conversation(&self) {
        self.store.write().await.clear_active();
    }

    pub async fn select_conversation(&self, id: &str) {
        self.store.write().await.set_active(id);
    }

    /// Removes a conversation locally and, for server-persisted ids, from
    /// the server. A failed server delete is surfaced as a transient notice;
    /// the local removal stands either way.
    pub async fn delete_conversation(&self, id: &str) {
        self.store.write().await.remove_conversation(id);
        if is_server_id(id) {
            if let Err(e) = self.transport.delete_conversation(id).await {
                tracing::warn!(conversation = %id, "server delete failed: {e}");
                self.notifier
                    .raise(e.notice().unwrap_or(GENERIC_ERROR_NOTICE))
                    .await;
            }
        }
    }

    /// Session teardown (sign-out): drops all local conversation state.
    /// The credential holder is cleared by the composition root.
    pub async fn reset(&self) {
        self.store.write().await.reset();
        self.notifier.clear().await;
        self.send_locks.lock().await.clear();
    }

    /// Sends a user message and reconciles the result into the store.
    ///
    /// Empty (after trim) input returns `Idle` with no state change.
    /// Returns the terminal phase of the send, `Reconciled` or `Failed`;
    /// failures are annotated into the transcript, not propagated.
    pub async fn send_message(&self, text: &str) -> Result<SendPhase> {
        let content = text.trim();
        if content.is_empty() {
            return Ok(SendPhase::Idle);
        }

        // The target is the conversation the user was looking at when they
        // issued the send; it does not move if they navigate away later.
        let target = self.store.read().await.active_id().map(str::to_string);
        let key = target.clone().unwrap_or_else(|| UNATTACHED_KEY.to_string());

        self.in_flight.fetch_add(1, Ordering::SeqCst);
        let lock = self.send_lock(&key).await;
        let serialized = lock.lock().await;
        let outcome = self.run_send(content, target).await;
        drop(serialized);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        outcome
    }

    async fn send_lock(&self, key: &str) -> Arc<Mutex<()>> {
        let mut locks = self.send_locks.lock().await;
        Arc::clone(locks.entry(key.to_string()).or_default())
    }

    async fn run_send(&self, content: &str, target: Option<String>) -> Result<SendPhase> {
        let mut tracker = SendTracker::new();
        tracker.advance(SendPhase::Composing)?;

        {
            let mut store = self.store.write().await;
            store.append_message(target.as_deref(), Message::user(content));
            if let Some(id) = target.as_deref() {
                if store.get(id).is_some_and(|c| c.messages.len() == 1) {
                    store.rename_if_first_message(id, content);
                }
            }
        }
        tracker.advance(SendPhase::OptimisticApplied)?;

        // A client-temporary id must never reach the server as a
        // continuation target; omitting it makes the server start a new
        // conversation instead of erroring on an unknown id.
        let continuation = target.as_deref().filter(|id| is_server_id(id));
        tracker.advance(SendPhase::AwaitingServer)?;

        match self.transport.send_message(content, continuation).await {
            Ok(SendResponse::Conversation(record)) => {
                let conversation = Conversation::from_record(record);
                let id = conversation.id.clone();
                let mut store = self.store.write().await;
                // Upsert always lands on the conversation the send belongs
                // to; activation only follows when the user is still there.
                let on_target = store.active_id() == target.as_deref();
                store.upsert_conversation(conversation);
                if on_target {
                    store.set_active(&id);
                }
                tracing::debug!(conversation = %id, "reconciled with server record");
                tracker.advance(SendPhase::Reconciled)?;
            }
            Ok(SendResponse::Reply { reply }) => {
                let mut store = self.store.write().await;
                store.append_message(target.as_deref(), Message::assistant(reply));
                tracker.advance(SendPhase::Reconciled)?;
            }
            Err(e) => {
                tracing::warn!("send failed: {e}");
                self.store
                    .write()
                    .await
                    .append_message(target.as_deref(), Message::error(SEND_FAILURE_APOLOGY));
                self.notifier
                    .raise(e.notice().unwrap_or(GENERIC_ERROR_NOTICE))
                    .await;
                tracker.advance(SendPhase::Failed)?;
            }
        }
        Ok(tracker.phase())
    }
}
