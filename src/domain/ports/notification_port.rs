/// Port for user-facing notifications.
#[cfg_attr(test, mockall::automock)]
pub trait NotificationPort: Send + Sync {
    /// Shows a notification.
    fn send(&self, title: &str, body: &str);
}
