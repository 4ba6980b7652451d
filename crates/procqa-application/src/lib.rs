//! Application layer for procqa.
//!
//! Coordinates the conversation store, the transport, and the identity
//! resolver into the synchronization engine and the history loader that the
//! UI layer consumes.

pub mod engine;
pub mod history;
pub mod notify;
pub mod state;

pub use engine::ChatEngine;
pub use history::HistoryLoader;
pub use notify::Notifier;
pub use state::{SendPhase, SendTracker};
