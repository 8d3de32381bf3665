use super::client::OpenAiHttpClient;
use super::types::ImageEditResponse;
use crate::ai::ImageEditService;
use crate::models::UploadedImage;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

const IMAGE_EDIT_TIMEOUT: Duration = Duration::from_secs(180);

pub struct OpenAiImageEditClient {
    http: OpenAiHttpClient,
    model: String,
    size: String,
}

impl OpenAiImageEditClient {
    pub fn new_with_client(
        api_key: String,
        base_url: String,
        model: String,
        size: String,
        client: reqwest::Client,
    ) -> Self {
        Self {
            http: OpenAiHttpClient::new_with_client(api_key, base_url, IMAGE_EDIT_TIMEOUT, client),
            model,
            size,
        }
    }

    fn build_form(&self, image: &UploadedImage, prompt: &str) -> Result<Form> {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.mime_type)
            .map_err(|e| Error::Generic(format!("Invalid upload MIME type: {}", e)))?;

        Ok(Form::new()
            .text("model", self.model.clone())
            .text("prompt", prompt.to_string())
            .text("n", "1")
            .text("size", self.size.clone())
            .text("input_fidelity", "high")
            .text("quality", "high")
            .text("output_format", "png")
            .part("image", part))
    }
}

#[async_trait]
impl ImageEditService for OpenAiImageEditClient {
    async fn edit_image(&self, image: &UploadedImage, prompt: &str) -> Result<Vec<u8>> {
        tracing::debug!(
            "Sending image edit request (model: {}, size: {}, source: {} bytes)",
            self.model,
            self.size,
            image.bytes.len()
        );

        let form = self.build_form(image, prompt)?;
        let response: ImageEditResponse = self.http.post_multipart("/v1/images/edits", form).await?;

        let b64_json = response
            .data
            .first()
            .and_then(|data| data.b64_json.as_deref())
            .ok_or_else(|| Error::AiProvider("No image data in OpenAI response".to_string()))?;

        use base64::Engine as _;
        base64::engine::general_purpose::STANDARD
            .decode(b64_json)
            .map_err(|e| Error::AiProvider(format!("Failed to decode base64 image: {}", e)))
    }
}
