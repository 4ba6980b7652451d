//! Conversation id generation and format discrimination.
//!
//! Two id shapes coexist: client-local temporary ids, generated before the
//! first successful server round-trip, and server-issued persistent ids
//! (24-character hex tokens). Only the latter may be sent back to the server
//! as a continuation target; a temporary id is silently omitted so the
//! server starts a new conversation instead of erroring on an unknown id.

use std::sync::atomic::{AtomicU64, Ordering};

/// Expected length of a server-issued conversation id.
const SERVER_ID_LEN: usize = 24;

static LOCAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Generates a client-local temporary id.
///
/// Timestamp-derived with a process-wide sequence suffix, so ids created in
/// the same millisecond stay distinct. The shape (decimal digits plus a
/// dash) can never satisfy [`is_server_id`].
pub fn local_id() -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let seq = LOCAL_SEQ.fetch_add(1, Ordering::Relaxed);
    format!("{millis}-{seq}")
}

/// Returns true if `id` has the server's id shape: exactly 24 hex characters.
///
/// This is the single predicate deciding whether an id is eligible to be
/// submitted as a continuation target; call sites must not re-implement the
/// check.
pub fn is_server_id(id: &str) -> bool {
    id.len() == SERVER_ID_LEN && id.bytes().all(|b| b.is_ascii_hexdigit())
}
