//! Mark-as-read use case.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::application::services::RefreshTrigger;
use crate::domain::entities::{ChatId, ChatMessageId};
use crate::domain::errors::ChatError;
use crate::domain::ports::ChatPort;

/// Acknowledges the newest message of a chat and asks the unread store to
/// refresh.
pub struct MarkChatReadUseCase {
    chat_port: Arc<dyn ChatPort>,
    refresh: RefreshTrigger,
    acknowledged: Mutex<HashMap<ChatId, ChatMessageId>>,
}

impl MarkChatReadUseCase {
    /// Creates new use case.
    #[must_use]
    pub fn new(chat_port: Arc<dyn ChatPort>, refresh: RefreshTrigger) -> Self {
        Self {
            chat_port,
            refresh,
            acknowledged: Mutex::new(HashMap::new()),
        }
    }

    /// Moves the read marker of `chat_id` to `message_id`.
    ///
    /// Returns `Ok(false)` without calling the API when `message_id` is not
    /// newer than what was already acknowledged for that chat.
    ///
    /// # Errors
    /// Returns the API error; the marker is left untouched.
    pub async fn execute(
        &self,
        chat_id: ChatId,
        message_id: ChatMessageId,
    ) -> Result<bool, ChatError> {
        let already = self
            .acknowledged
            .lock()
            .get(&chat_id)
            .is_some_and(|acked| *acked >= message_id);

        if already {
            debug!(%chat_id, %message_id, "Message already acknowledged");
            return Ok(false);
        }

        self.chat_port
            .mark_read(chat_id, message_id)
            .await
            .inspect_err(|e| warn!(%chat_id, error = %e, "Failed to update read marker"))?;

        {
            let mut acknowledged = self.acknowledged.lock();
            let entry = acknowledged.entry(chat_id).or_insert(message_id);
            if *entry < message_id {
                *entry = message_id;
            }
        }

        debug!(%chat_id, %message_id, "Read marker updated");
        self.refresh.fire();
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::mocks::MockChatPort;
    use tokio_test::{assert_pending, assert_ready, task};

    #[tokio::test]
    async fn test_marks_and_fires_refresh() {
        let port = Arc::new(MockChatPort::new());
        let trigger = RefreshTrigger::new();
        let use_case = MarkChatReadUseCase::new(port.clone(), trigger.clone());

        let updated = use_case
            .execute(ChatId(4), ChatMessageId(20))
            .await
            .unwrap();

        assert!(updated);
        assert_eq!(port.marked(), vec![(ChatId(4), ChatMessageId(20))]);

        let mut fired = task::spawn(trigger.fired());
        assert_ready!(fired.poll());
    }

    #[tokio::test]
    async fn test_skips_already_acknowledged() {
        let port = Arc::new(MockChatPort::new());
        let trigger = RefreshTrigger::new();
        let use_case = MarkChatReadUseCase::new(port.clone(), trigger.clone());

        use_case
            .execute(ChatId(4), ChatMessageId(20))
            .await
            .unwrap();
        let mut drain = task::spawn(trigger.fired());
        assert_ready!(drain.poll());

        let older = use_case
            .execute(ChatId(4), ChatMessageId(18))
            .await
            .unwrap();
        let same = use_case
            .execute(ChatId(4), ChatMessageId(20))
            .await
            .unwrap();

        assert!(!older);
        assert!(!same);
        assert_eq!(port.marked().len(), 1);

        let mut fired = task::spawn(trigger.fired());
        assert_pending!(fired.poll());
    }

    #[tokio::test]
    async fn test_failure_does_not_record() {
        let port = Arc::new(MockChatPort::failing_mark_read());
        let use_case = MarkChatReadUseCase::new(port, RefreshTrigger::new());

        let result = use_case.execute(ChatId(1), ChatMessageId(2)).await;

        assert!(matches!(
            result,
            Err(ChatError::UnexpectedStatus { status: 500, .. })
        ));
        assert!(use_case.acknowledged.lock().is_empty());
    }
}
