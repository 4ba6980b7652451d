//! Credential holder and identity resolution.
//!
//! The resolver inspects the held JWT to decide the operating mode. Claims
//! are consumed, never produced: the payload segment is base64url-decoded
//! and parsed without signature verification (the server re-validates every
//! request). Any defect in the token resolves to anonymous mode — the
//! degraded mode, never a crash.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use procqa_core::identity::{ModeResolver, SessionMode};
use procqa_core::{ProcqaError, Result};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, RwLock};

/// Shared holder for the bearer credential.
///
/// Constructed at session start and injected into the resolver and the HTTP
/// transport; there is no ambient storage. Sign-in sets the token, sign-out
/// clears it, and the mode is recomputed on the next resolution.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    token: Arc<RwLock<Option<String>>>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a holder already carrying a token (e.g. restored by the UI
    /// shell at startup).
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Arc::new(RwLock::new(Some(token.into()))),
        }
    }

    pub fn set_token(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }

    pub fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}

/// Claims carried by the backend's tokens.
///
/// `user_id` is the backend's custom subject claim; `sub` is accepted as a
/// standard alternative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub sub: Option<String>,
    /// Expiration time (Unix timestamp).
    #[serde(default)]
    pub exp: Option<i64>,
}

impl Claims {
    /// The user this token identifies.
    pub fn subject(&self) -> Option<&str> {
        self.user_id.as_deref().or(self.sub.as_deref())
    }

    /// True when the token has an expiry that has not passed.
    pub fn is_current(&self) -> bool {
        match self.exp {
            Some(exp) => exp > chrono::Utc::now().timestamp(),
            None => false,
        }
    }
}

/// Decodes the claims of a JWT without verifying its signature.
pub fn decode_claims(token: &str) -> Result<Claims> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ProcqaError::credential("token has no payload segment"))?;
    let bytes = URL_SAFE_NO_PAD
        .decode(payload)
        .map_err(|e| ProcqaError::credential(format!("payload is not base64url: {e}")))?;
    serde_json::from_slice(&bytes)
        .map_err(|e| ProcqaError::credential(format!("payload is not claims JSON: {e}")))
}

/// Determines the operating mode from the held credential.
pub struct IdentityResolver {
    credentials: CredentialStore,
}

impl IdentityResolver {
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }

    /// The subject of the held credential, when it resolves to
    /// authenticated mode.
    pub fn subject(&self) -> Option<String> {
        let token = self.credentials.token()?;
        let claims = decode_claims(&token).ok()?;
        if claims.is_current() {
            claims.subject().map(str::to_string)
        } else {
            None
        }
    }
}

impl ModeResolver for IdentityResolver {
    fn resolve_mode(&self) -> SessionMode {
        let Some(token) = self.credentials.token() else {
            return SessionMode::Anonymous;
        };
        match decode_claims(&token) {
            Ok(claims) if claims.is_current() => SessionMode::Authenticated,
            Ok(_) => {
                tracing::debug!("credential expired, resolving to anonymous mode");
                SessionMode::Anonymous
            }
            Err(e) => {
                tracing::warn!("malformed credential, resolving to anonymous mode: {e}");
                SessionMode::Anonymous
            }
        }
    }
}
