use super::client::OpenAiHttpClient;
use super::types::{ChatCompletionRequest, ChatMessage, ChatMessageContent, MessagePart};
use crate::ai::ImageQaService;
use crate::models::UploadedImage;
use crate::{prompts, Result};
use async_trait::async_trait;
use std::time::Duration;

const QA_TIMEOUT: Duration = Duration::from_secs(60);

/// Room for "YES"/"NO" and nothing more.
const VERDICT_MAX_TOKENS: u32 = 5;

pub struct OpenAiImageQaClient {
    http: OpenAiHttpClient,
    model: String,
}

impl OpenAiImageQaClient {
    pub fn new_with_client(
        api_key: String,
        base_url: String,
        model: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, base_url, QA_TIMEOUT, client),
            model,
        }
    }
}

/// Reads a one-word classifier answer. Only an answer starting with `Y` counts as yes.
pub fn parse_verdict(answer: &str) -> bool {
    answer
        .trim_start_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'')
        .chars()
        .next()
        .is_some_and(|c| c.eq_ignore_ascii_case(&'y'))
}

#[async_trait]
impl ImageQaService for OpenAiImageQaClient {
    async fn detect_glasses(&self, image: &UploadedImage) -> Result<bool> {
        tracing::debug!(
            "Detecting glasses in {} ({} bytes, {})",
            image.file_name,
            image.bytes.len(),
            image.mime_type
        );

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![ChatMessage::user(ChatMessageContent::Parts(vec![
                MessagePart::text(prompts::GLASSES_USER.trim()),
                MessagePart::image(image.data_url()),
            ]))],
            max_completion_tokens: VERDICT_MAX_TOKENS,
            response_format: None,
        };

        let response = self.http.chat_completion(&request).await?;

        // An empty or missing answer is a "no", not a failure.
        let answer = response.first_text().unwrap_or_default();
        let wears_glasses = parse_verdict(answer);

        tracing::info!(
            "Glasses detection answer {:?} -> wears_glasses={}",
            answer,
            wears_glasses
        );

        Ok(wears_glasses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::openai::test_support;
    use crate::Error;
    use wiremock::matchers::body_string_contains;
    use wiremock::{MockServer, ResponseTemplate};

    fn make_client(server: &MockServer) -> OpenAiImageQaClient {
        OpenAiImageQaClient::new_with_client(
            "test-key".to_string(),
            server.uri(),
            "gpt-4.1-mini".to_string(),
            reqwest::Client::new(),
        )
    }

    fn photo() -> UploadedImage {
        UploadedImage {
            bytes: vec![0x89, 0x50, 0x4E, 0x47],
            file_name: "me.png".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    async fn answer_with(content: &str) -> bool {
        let server = MockServer::start().await;

        test_support::post(test_support::CHAT_COMPLETIONS_PATH)
            .respond_with(ResponseTemplate::new(200).set_body_json(test_support::chat_reply(content)))
            .mount(&server)
            .await;

        make_client(&server).detect_glasses(&photo()).await.unwrap()
    }

    #[test]
    fn test_parse_verdict() {
        assert!(parse_verdict("YES"));
        assert!(parse_verdict("yes."));
        assert!(parse_verdict("  \"Yes\""));
        assert!(!parse_verdict("NO"));
        assert!(!parse_verdict("no"));
        assert!(!parse_verdict(""));
        assert!(!parse_verdict("I think so"));
        assert!(!parse_verdict("はい"));
    }

    #[tokio::test]
    async fn test_detect_glasses_yes() {
        assert!(answer_with("YES").await);
    }

    #[tokio::test]
    async fn test_detect_glasses_no() {
        assert!(!answer_with("NO").await);
    }

    #[tokio::test]
    async fn test_detect_glasses_ambiguous_defaults_to_false() {
        assert!(!answer_with("Maybe, hard to tell").await);
    }

    #[tokio::test]
    async fn test_detect_glasses_sends_inline_image_and_token_cap() {
        let server = MockServer::start().await;

        test_support::post(test_support::CHAT_COMPLETIONS_PATH)
            .and(body_string_contains("data:image/png;base64,iVBORw=="))
            .and(body_string_contains("\"max_completion_tokens\":5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(test_support::chat_reply("NO")))
            .expect(1)
            .mount(&server)
            .await;

        make_client(&server).detect_glasses(&photo()).await.unwrap();
    }

    #[tokio::test]
    async fn test_detect_glasses_api_error() {
        let server = MockServer::start().await;

        test_support::post(test_support::CHAT_COMPLETIONS_PATH)
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let err = make_client(&server).detect_glasses(&photo()).await.unwrap_err();
        assert!(matches!(err, Error::AiProvider(_)));
    }
}
