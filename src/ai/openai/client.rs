use super::types::{ChatCompletionRequest, ChatCompletionResponse, ErrorEnvelope};
use crate::{Error, Result};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

pub struct OpenAiHttpClient {
    pub(crate) client: Client,
    pub(crate) api_key: String,
    pub(crate) base_url: String,
    pub(crate) timeout: Duration,
}

impl OpenAiHttpClient {
    pub fn new_with_client(
        api_key: String,
        base_url: String,
        timeout: Duration,
        client: Client,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        }
    }

    fn request(&self, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        self.client
            .post(&url)
            .timeout(self.timeout)
            .header("Authorization", format!("Bearer {}", self.api_key))
    }

    pub async fn post<Req: Serialize, Resp: DeserializeOwned>(
        &self,
        path: &str,
        request: &Req,
    ) -> Result<Resp> {
        self.send(self.request(path).json(request)).await
    }

    pub async fn post_multipart<Resp: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> Result<Resp> {
        self.send(self.request(path).multipart(form)).await
    }

    pub async fn chat_completion(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse> {
        self.post("/v1/chat/completions", request).await
    }

    async fn send<Resp: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<Resp> {
        let response = builder.send().await.map_err(|e| {
            tracing::error!("Failed to send request to OpenAI: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("OpenAI API error (status {}): {}", status, error_text);
            return Err(rejection(status, &error_text));
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse OpenAI response: {}\nBody: {}", e, body);
            Error::AiProvider(format!("Failed to parse OpenAI response: {}", e))
        })
    }
}

/// Maps a non-success response to an error, keeping the provider's message when present.
fn rejection(status: StatusCode, body: &str) -> Error {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error);

    if let Some(code) = detail.as_ref().and_then(|detail| detail.code.as_deref()) {
        tracing::warn!("OpenAI rejected request with code {}", code);
    }

    match detail
        .and_then(|detail| detail.message)
        .filter(|message| !message.trim().is_empty())
    {
        Some(message) => Error::ProviderRejected {
            status: status.as_u16(),
            message,
        },
        None => Error::AiProvider(format!("API error (status {}): {}", status, body)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejection_extracts_provider_message() {
        let body = r#"{"error":{"message":"Incorrect API key provided","type":"invalid_request_error","code":"invalid_api_key"}}"#;
        let err = rejection(StatusCode::UNAUTHORIZED, body);
        match err {
            Error::ProviderRejected { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejection_with_code_only_keeps_body() {
        let body = r#"{"error":{"message":null,"code":"rate_limit_exceeded"}}"#;
        match rejection(StatusCode::TOO_MANY_REQUESTS, body) {
            Error::AiProvider(message) => assert!(message.contains("rate_limit_exceeded")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_rejection_without_envelope_keeps_body() {
        let err = rejection(StatusCode::BAD_GATEWAY, "upstream down");
        match err {
            Error::AiProvider(message) => assert!(message.contains("upstream down")),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OpenAiHttpClient::new_with_client(
            "key".to_string(),
            "http://localhost:1234/".to_string(),
            Duration::from_secs(1),
            Client::new(),
        );
        assert_eq!(client.base_url, "http://localhost:1234");
    }
}
