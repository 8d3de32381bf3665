//! Chibi avatar generation from an uploaded photo.

use crate::ai::{ImageEditService, ImageQaService};
use crate::models::{AvatarResult, UploadedImage};
use crate::{prompts, Error, Result};
use base64::Engine as _;
use std::sync::Arc;
use tracing::info;

pub const FIELD_NAME: &str = "photo";
pub const MAX_UPLOAD_BYTES: usize = 5 * 1024 * 1024;

/// Returns the edit prompt with exactly one eyewear clause spliced in.
pub fn build_avatar_prompt(wears_glasses: bool) -> String {
    let clause = if wears_glasses {
        prompts::EYEWEAR_KEEP
    } else {
        prompts::EYEWEAR_NONE
    };

    prompts::render(prompts::AVATAR_EDIT, &[("eyewear", clause.trim())])
        .trim()
        .to_string()
}

pub struct AvatarGenerator {
    image_qa: Arc<dyn ImageQaService>,
    image_edit: Arc<dyn ImageEditService>,
}

impl AvatarGenerator {
    pub fn new(image_qa: Arc<dyn ImageQaService>, image_edit: Arc<dyn ImageEditService>) -> Self {
        Self {
            image_qa,
            image_edit,
        }
    }

    /// Classifies eyewear, then runs the edit. The two calls are sequential.
    pub async fn generate(&self, photo: &UploadedImage) -> Result<AvatarResult> {
        let wears_glasses = self.image_qa.detect_glasses(photo).await?;
        info!(
            "Generating avatar for {} (glasses: {})",
            photo.file_name, wears_glasses
        );

        let prompt = build_avatar_prompt(wears_glasses);
        let png = self.image_edit.edit_image(photo, &prompt).await?;
        if png.is_empty() {
            return Err(Error::AiProvider("Image edit returned no bytes".to_string()));
        }

        info!("Avatar generated ({} bytes)", png.len());
        let encoded = base64::engine::general_purpose::STANDARD.encode(&png);
        Ok(AvatarResult::from_png(encoded))
    }
}
