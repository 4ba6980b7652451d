//! Conversation domain module.
//!
//! Contains the conversation and message models, local/server id handling,
//! and the in-memory conversation store.

mod id;
mod message;
mod model;
mod store;

pub use id::{is_server_id, local_id};
pub use message::{Message, MessageRole};
pub use model::Conversation;
pub use store::ConversationStore;
