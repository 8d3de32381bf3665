use super::{ChatPrompt, ChatService, ImageEditService, ImageQaService};
use crate::models::UploadedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

/// A 1x1 PNG returned by [`MockImageEditClient`] when nothing else is scripted.
pub const TINY_PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, // PNG signature
    0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52, // IHDR chunk
    0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, // 1x1 pixel
    0x08, 0x02, 0x00, 0x00, 0x00, 0x90, 0x77, 0x53, 0xDE, 0x00, 0x00, 0x00, 0x0C, 0x49, 0x44,
    0x41, // IDAT chunk
    0x54, 0x08, 0x99, 0x63, 0xF8, 0xCF, 0xC0, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0xE2, 0x25,
    0x00, 0xBC, 0x00, 0x00, 0x00, 0x00, 0x49, 0x45, 0x4E, // IEND chunk
    0x44, 0xAE, 0x42, 0x60, 0x82,
];

/// One scripted outcome for a mock call.
#[derive(Debug, Clone)]
enum Scripted<T> {
    Reply(T),
    /// Transport-style failure with no provider message.
    Fail(String),
    /// Provider returned an error envelope.
    Reject(u16, String),
}

impl<T: Clone> Scripted<T> {
    fn to_result(&self) -> Result<T> {
        match self {
            Scripted::Reply(value) => Ok(value.clone()),
            Scripted::Fail(message) => Err(Error::AiProvider(message.clone())),
            Scripted::Reject(status, message) => Err(Error::ProviderRejected {
                status: *status,
                message: message.clone(),
            }),
        }
    }
}

/// Picks the scripted outcome for the `count`-th call, cycling through the script.
fn pick<T: Clone>(script: &[Scripted<T>], count: usize, default: impl FnOnce() -> T) -> Result<T> {
    if script.is_empty() {
        Ok(default())
    } else {
        script[(count - 1) % script.len()].to_result()
    }
}

pub struct MockChatClient {
    responses: Arc<Mutex<Vec<Scripted<String>>>>,
    prompts: Arc<Mutex<Vec<ChatPrompt>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockChatClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Reply(response.into()));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Fail(message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn recorded_prompts(&self) -> Vec<ChatPrompt> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockChatClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatService for MockChatClient {
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt.clone());

        let responses = self.responses.lock().unwrap();
        pick(&responses, *count, || {
            if prompt.json_output {
                r#"{"name":"模擬必殺テストバースト","tagline":"テストは裏切らない。","description":"モックの力で全てを通す。"}"#.to_string()
            } else {
                "技名：模擬必殺テストバースト\nキャッチコピー：テストは裏切らない。\n説明：モックの力で全てを通す。".to_string()
            }
        })
    }
}

pub struct MockImageQaClient {
    verdicts: Arc<Mutex<Vec<Scripted<bool>>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageQaClient {
    pub fn new() -> Self {
        Self {
            verdicts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_verdict(self, wears_glasses: bool) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .push(Scripted::Reply(wears_glasses));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.verdicts
            .lock()
            .unwrap()
            .push(Scripted::Fail(message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }
}

impl Default for MockImageQaClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageQaService for MockImageQaClient {
    async fn detect_glasses(&self, _image: &UploadedImage) -> Result<bool> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;

        let verdicts = self.verdicts.lock().unwrap();
        pick(&verdicts, *count, || false)
    }
}

pub struct MockImageEditClient {
    responses: Arc<Mutex<Vec<Scripted<Vec<u8>>>>>,
    prompts: Arc<Mutex<Vec<String>>>,
    call_count: Arc<Mutex<usize>>,
}

impl MockImageEditClient {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(Vec::new())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn with_image_response(self, response: Vec<u8>) -> Self {
        self.responses.lock().unwrap().push(Scripted::Reply(response));
        self
    }

    pub fn with_failure(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Fail(message.into()));
        self
    }

    pub fn with_rejection(self, status: u16, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push(Scripted::Reject(status, message.into()));
        self
    }

    pub fn get_call_count(&self) -> usize {
        *self.call_count.lock().unwrap()
    }

    pub fn recorded_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

impl Default for MockImageEditClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageEditService for MockImageEditClient {
    async fn edit_image(&self, _image: &UploadedImage, prompt: &str) -> Result<Vec<u8>> {
        let mut count = self.call_count.lock().unwrap();
        *count += 1;
        self.prompts.lock().unwrap().push(prompt.to_string());

        let responses = self.responses.lock().unwrap();
        pick(&responses, *count, || TINY_PNG.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prompt() -> ChatPrompt {
        ChatPrompt {
            system: "s".to_string(),
            user: "u".to_string(),
            json_output: true,
            max_tokens: 10,
        }
    }

    fn photo() -> UploadedImage {
        UploadedImage {
            bytes: TINY_PNG.to_vec(),
            file_name: "p.png".to_string(),
            mime_type: "image/png".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mock_chat_client_cycles_script() {
        let client = MockChatClient::new()
            .with_response("first")
            .with_failure("boom");

        assert_eq!(client.complete(&prompt()).await.unwrap(), "first");
        assert!(client.complete(&prompt()).await.is_err());
        assert_eq!(client.complete(&prompt()).await.unwrap(), "first");
        assert_eq!(client.get_call_count(), 3);
        assert_eq!(client.recorded_prompts().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_chat_client_default_is_valid_json() {
        let client = MockChatClient::new();
        let text = client.complete(&prompt()).await.unwrap();
        assert!(serde_json::from_str::<serde_json::Value>(&text).is_ok());
    }

    #[tokio::test]
    async fn test_mock_image_qa_defaults_to_false() {
        let client = MockImageQaClient::new();
        assert!(!client.detect_glasses(&photo()).await.unwrap());

        let client = MockImageQaClient::new().with_verdict(true);
        assert!(client.detect_glasses(&photo()).await.unwrap());
        assert_eq!(client.get_call_count(), 1);
    }

    #[tokio::test]
    async fn test_mock_image_edit_records_prompts_and_rejects() {
        let client = MockImageEditClient::new().with_rejection(400, "blocked");

        let err = client.edit_image(&photo(), "chibi please").await.unwrap_err();
        assert_eq!(err.client_message("fallback"), "blocked");
        assert_eq!(client.recorded_prompts(), vec!["chibi please".to_string()]);
    }
}
