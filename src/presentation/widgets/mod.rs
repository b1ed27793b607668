mod chat_list;
mod header_bar;
mod status_bar;

pub use chat_list::{ChatList, ChatListState, truncate_to_width, visible_chats};
pub use header_bar::{HeaderBar, HeaderBarStyle};
pub use status_bar::{StatusBar, StatusLevel};
