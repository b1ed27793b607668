use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::entities::{ChatMessageId, ChatSummary};

/// Decodes a `GET /chats` body.
///
/// The backend answers with a bare list or with a page wrapper carrying
/// the list under `content`. Any other shape means no chats.
pub fn decode_chat_list(body: Value) -> Result<Vec<ChatSummary>, serde_json::Error> {
    match body {
        Value::Array(_) => serde_json::from_value(body),
        Value::Object(mut page) => match page.remove("content") {
            Some(content @ Value::Array(_)) => serde_json::from_value(content),
            _ => Ok(Vec::new()),
        },
        _ => Ok(Vec::new()),
    }
}

/// `PATCH /chats/{id}/messages/read` body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkReadRequest {
    pub message_id: ChatMessageId,
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, alias = "error")]
    pub message: Option<String>,
}
