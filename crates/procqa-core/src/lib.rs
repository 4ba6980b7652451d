pub mod conversation;
pub mod error;
pub mod identity;
pub mod text;
pub mod transport;

// Re-export common error type
pub use error::{ProcqaError, Result};

pub use conversation::{Conversation, ConversationStore, Message, MessageRole};
pub use identity::{ModeResolver, SessionMode};
pub use transport::{ChatTransport, ConversationRecord, HistoryResponse, MessageRecord, SendResponse};
