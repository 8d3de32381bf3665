//! AI service integration for skill text, glasses detection and avatar edits
//!
//! Each capability sits behind its own trait so the HTTP layer can run
//! against OpenAI in production and against the mocks in tests.

pub mod mime;
pub mod mock;
pub mod openai;

pub use mock::{MockChatClient, MockImageEditClient, MockImageQaClient};
pub use openai::{OpenAiChatClient, OpenAiImageEditClient, OpenAiImageQaClient};

use crate::models::UploadedImage;
use crate::Result;
use async_trait::async_trait;

/// A single-turn completion request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    /// Ask the provider for a JSON object instead of prose.
    pub json_output: bool,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ChatService: Send + Sync {
    /// Returns the raw text of the first choice.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String>;
}

#[async_trait]
pub trait ImageQaService: Send + Sync {
    /// Whether the person in the photo wears glasses.
    async fn detect_glasses(&self, image: &UploadedImage) -> Result<bool>;
}

#[async_trait]
pub trait ImageEditService: Send + Sync {
    /// Edits `image` according to `prompt` and returns the PNG bytes.
    async fn edit_image(&self, image: &UploadedImage, prompt: &str) -> Result<Vec<u8>>;
}
