//! Chat API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, header};
use tracing::{debug, warn};

use super::dto::{ErrorResponse, MarkReadRequest, decode_chat_list};
use crate::domain::entities::{ChatId, ChatMessageId, ChatSummary, SessionToken};
use crate::domain::errors::ChatError;
use crate::domain::ports::ChatPort;

const USER_AGENT: &str = concat!("carelink/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP adapter for the chat endpoints.
pub struct ChatApiClient {
    client: Client,
    base_url: String,
    token: SessionToken,
}

impl ChatApiClient {
    /// Creates client for `base_url` authenticated with `token`.
    ///
    /// # Errors
    /// Returns error if HTTP client creation fails.
    pub fn new(base_url: impl Into<String>, token: SessionToken) -> Result<Self, ChatError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatError::unexpected(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn map_send_error(e: &reqwest::Error) -> ChatError {
        warn!(error = %e, "Failed to reach chat API");
        if e.is_timeout() {
            ChatError::network("request timed out")
        } else if e.is_connect() {
            ChatError::network("failed to connect to the server")
        } else {
            ChatError::network(e.to_string())
        }
    }

    async fn handle_error_response(status: StatusCode, response: reqwest::Response) -> ChatError {
        let message = match response.json::<ErrorResponse>().await {
            Ok(ErrorResponse {
                message: Some(message),
            }) => message,
            _ => format!("HTTP {status}"),
        };

        match status {
            StatusCode::UNAUTHORIZED => ChatError::Unauthorized,
            StatusCode::FORBIDDEN => ChatError::forbidden(message),
            _ => ChatError::status(status.as_u16(), message),
        }
    }
}

#[async_trait]
impl ChatPort for ChatApiClient {
    async fn list_my_chats(&self) -> Result<Vec<ChatSummary>, ChatError> {
        debug!("Fetching chat list");

        let response = self
            .client
            .get(self.url("/chats"))
            .header(header::AUTHORIZATION, self.token.bearer())
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        let body: serde_json::Value = response.json().await.map_err(|e| {
            warn!(error = %e, "Chat list is not valid JSON");
            ChatError::decode(e.to_string())
        })?;

        let chats = decode_chat_list(body).map_err(|e| {
            warn!(error = %e, "Failed to decode chat list");
            ChatError::decode(e.to_string())
        })?;

        debug!(chats = chats.len(), "Chat list fetched");
        Ok(chats)
    }

    async fn mark_read(
        &self,
        chat_id: ChatId,
        message_id: ChatMessageId,
    ) -> Result<(), ChatError> {
        debug!(%chat_id, %message_id, "Updating read marker");

        let response = self
            .client
            .patch(self.url(&format!("/chats/{chat_id}/messages/read")))
            .header(header::AUTHORIZATION, self.token.bearer())
            .json(&MarkReadRequest { message_id })
            .send()
            .await
            .map_err(|e| Self::map_send_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::handle_error_response(status, response).await);
        }

        Ok(())
    }
}
