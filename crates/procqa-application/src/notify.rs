//! Transient, self-dismissing error notifications.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;

/// How long a notification stays up before it clears itself.
const DISMISS_AFTER: Duration = Duration::from_secs(5);

/// Holds at most one user-facing notice; raising a new one supersedes the
/// old and restarts the dismissal clock.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    current: Arc<RwLock<Option<String>>>,
    generation: Arc<AtomicU64>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shows a notice and schedules its dismissal. A notice raised later
    /// cancels the pending dismissal of the earlier one.
    pub async fn raise(&self, message: impl Into<String>) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.current.write().await = Some(message.into());

        let current = Arc::clone(&self.current);
        let counter = Arc::clone(&self.generation);
        tokio::spawn(async move {
            tokio::time::sleep(DISMISS_AFTER).await;
            if counter.load(Ordering::SeqCst) == generation {
                *current.write().await = None;
            }
        });
    }

    /// Explicit dismissal (the toast's close button).
    pub async fn clear(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        *self.current.write().await = None;
    }

    pub async fn message(&self) -> Option<String> {
        self.current.read().await.clone()
    }
}
