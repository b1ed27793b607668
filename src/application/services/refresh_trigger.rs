use std::sync::Arc;

use tokio::sync::Notify;

/// Handle for asking the unread store to refresh soon.
///
/// Fires are coalesced with any refresh already in flight and are only
/// acted on while the store has subscribers.
#[derive(Debug, Clone, Default)]
pub struct RefreshTrigger {
    notify: Arc<Notify>,
}

impl RefreshTrigger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests a refresh.
    pub fn fire(&self) {
        self.notify.notify_one();
    }

    pub(crate) async fn fired(&self) {
        self.notify.notified().await;
    }
}
