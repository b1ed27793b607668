mod chat_port;
mod notification_port;
mod token_storage_port;

pub use chat_port::ChatPort;
pub use notification_port::NotificationPort;
pub use token_storage_port::TokenStoragePort;

#[cfg(test)]
pub use notification_port::MockNotificationPort;
