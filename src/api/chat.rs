// src/api/chat.rs — Assistant conversation endpoints

use super::types::{
    ChatMessage, ChatRequest, ChatResponse, LatestConversation, MessagesResponse,
    NewConversationResponse,
};
use super::{ApiClient, ApiRequest};
use crate::infra::errors::ApiError;

impl ApiClient {
    /// Id of the user's most recent conversation, if any.
    pub async fn latest_conversation(&self) -> Result<Option<i64>, ApiError> {
        let latest: LatestConversation = self.get(&self.routes().latest_conversation()).await?;
        Ok(latest.conversation_id)
    }

    pub async fn conversation_messages(&self, id: i64) -> Result<Vec<ChatMessage>, ApiError> {
        let response: MessagesResponse =
            self.get(&self.routes().conversation_messages(id)).await?;
        Ok(response.messages.into_iter().map(Into::into).collect())
    }

    /// Ask the backend to open a fresh conversation and return its id.
    pub async fn new_conversation(&self) -> Result<i64, ApiError> {
        let response: NewConversationResponse = self
            .execute(ApiRequest::post(self.routes().new_conversation()))
            .await?;
        Ok(response.conversation_id)
    }

    /// Send one user message. With no `conversation_id` the backend starts a
    /// new conversation and returns its id.
    pub async fn send_chat(
        &self,
        message: &str,
        conversation_id: Option<i64>,
    ) -> Result<ChatResponse, ApiError> {
        self.post(
            &self.routes().chat(),
            &ChatRequest {
                message,
                conversation_id,
            },
        )
        .await
    }
}
