use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ChatMessageContent, ResponseFormat};
use crate::ai::{ChatPrompt, ChatService};
use crate::{Error, Result};
use async_trait::async_trait;
use std::time::Duration;

const CHAT_TIMEOUT: Duration = Duration::from_secs(60);

pub struct OpenAiChatClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiChatClient {
    pub fn new_with_client(
        api_key: String,
        base_url: String,
        model: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, base_url, CHAT_TIMEOUT, client),
            model,
        }
    }
}

#[async_trait]
impl ChatService for OpenAiChatClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(prompt.system.clone()),
                ChatMessage::user(ChatMessageContent::Text(prompt.user.clone())),
            ],
            max_completion_tokens: prompt.max_tokens,
            response_format: prompt.json_output.then(ResponseFormat::json_object),
        };

        tracing::debug!(
            "Sending chat completion (model: {}, json: {})",
            self.model,
            prompt.json_output
        );

        let response = self.http.chat_completion(&request).await?;

        response
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| Error::AiProvider("No response from OpenAI chat API".to_string()))
    }
}
