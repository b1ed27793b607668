//! Domain error types.

mod chat_error;
mod session_error;

pub use chat_error::ChatError;
pub use session_error::SessionError;
