//! Use case implementations.

mod mark_chat_read_use_case;
mod resolve_session_use_case;

pub use mark_chat_read_use_case::MarkChatReadUseCase;
pub use resolve_session_use_case::ResolveSessionUseCase;
