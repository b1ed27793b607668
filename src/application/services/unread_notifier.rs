use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::entities::UnreadSnapshot;
use crate::domain::ports::NotificationPort;

/// Sends a notification when the number of unread chats goes up.
///
/// The first loaded snapshot only sets the baseline.
pub struct UnreadNotifier {
    port: Arc<dyn NotificationPort>,
    last_count: Mutex<Option<usize>>,
}

impl UnreadNotifier {
    #[must_use]
    pub fn new(port: Arc<dyn NotificationPort>) -> Self {
        Self {
            port,
            last_count: Mutex::new(None),
        }
    }

    /// Feeds a committed snapshot.
    pub fn observe(&self, snapshot: &UnreadSnapshot) {
        if snapshot.last_updated.is_none() || snapshot.error.is_some() {
            return;
        }

        let previous = self.last_count.lock().replace(snapshot.count);

        if let Some(previous) = previous
            && snapshot.count > previous
        {
            let new_chats = snapshot.count - previous;
            debug!(previous, current = snapshot.count, "Unread chats increased");

            let body = if new_chats == 1 {
                "1 conversation has new messages".to_string()
            } else {
                format!("{new_chats} conversations have new messages")
            };
            self.port.send("carelink", &body);
        }
    }
}
