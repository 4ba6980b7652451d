//! Operating mode and the resolver seam.
//!
//! The mode is derived from the held credential, never stored. The resolver
//! trait lives here so the application layer depends on the abstraction
//! rather than on the HTTP/credential crate.

use serde::{Deserialize, Serialize};

/// Operating mode of the session, derived from the held credential.
///
/// Mode determines whether conversations are synchronized with the server
/// (`Authenticated`) or held purely in page-session memory (`Anonymous`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionMode {
    /// No valid credential; conversations are not durably persisted.
    Anonymous,
    /// Valid credential; conversations are persisted server-side.
    Authenticated,
}

/// Resolves the current operating mode from the held credential.
///
/// Implementations must never fail: a malformed credential resolves to
/// `Anonymous` (degraded mode), not to an error.
pub trait ModeResolver: Send + Sync {
    fn resolve_mode(&self) -> SessionMode;
}
