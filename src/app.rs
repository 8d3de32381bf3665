//! Application wiring: provider clients built once at startup and shared by every request.

use crate::ai::{
    ChatService, ImageEditService, ImageQaService, OpenAiChatClient, OpenAiImageEditClient,
    OpenAiImageQaClient,
};
use crate::avatar::AvatarGenerator;
use crate::models::{Config, SkillParseMode};
use crate::skill::SkillGenerator;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Immutable per-process state handed to the HTTP handlers.
pub struct App {
    skill: SkillGenerator,
    avatar: AvatarGenerator,
    static_dir: PathBuf,
}

/// Injectable service bundle used to construct [`App`] in tests/harnesses.
pub struct AppServices {
    pub chat: Arc<dyn ChatService>,
    pub image_qa: Arc<dyn ImageQaService>,
    pub image_edit: Arc<dyn ImageEditService>,
}

impl App {
    /// Build an app from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses that
    /// need to inject mocks.
    pub fn with_services(
        services: AppServices,
        skill_parse_mode: SkillParseMode,
        static_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            skill: SkillGenerator::new(services.chat, skill_parse_mode),
            avatar: AvatarGenerator::new(services.image_qa, services.image_edit),
            static_dir: static_dir.into(),
        }
    }

    /// Construct an app backed by OpenAI from a validated [`Config`].
    pub fn from_config(config: &Config) -> Self {
        // Reuse one HTTP connection pool across provider clients.
        let http_client = reqwest::Client::new();

        info!(
            "Chat provider: OpenAI (model: {}, parse mode: {:?})",
            config.chat_model, config.skill_parse_mode
        );
        let chat = OpenAiChatClient::new_with_client(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.chat_model.clone(),
            http_client.clone(),
        );

        info!("Vision provider: OpenAI (model: {})", config.vision_model);
        let image_qa = OpenAiImageQaClient::new_with_client(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.vision_model.clone(),
            http_client.clone(),
        );

        info!(
            "Image edit provider: OpenAI (model: {}, size: {})",
            config.image_model, config.image_size
        );
        let image_edit = OpenAiImageEditClient::new_with_client(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
            config.image_model.clone(),
            config.image_size.clone(),
            http_client,
        );

        Self::with_services(
            AppServices {
                chat: Arc::new(chat),
                image_qa: Arc::new(image_qa),
                image_edit: Arc::new(image_edit),
            },
            config.skill_parse_mode,
            &config.static_dir,
        )
    }

    pub fn skill(&self) -> &SkillGenerator {
        &self.skill
    }

    pub fn avatar(&self) -> &AvatarGenerator {
        &self.avatar
    }

    pub fn index_html(&self) -> PathBuf {
        self.static_dir.join("index.html")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_configured_parse_mode() {
        let config = Config::from_lookup(|key| match key {
            "OPENAI_API_KEY" => Some("sk-test".to_string()),
            "SKILL_PARSE_MODE" => Some("labelled".to_string()),
            "STATIC_DIR" => Some("public".to_string()),
            _ => None,
        })
        .unwrap();

        let app = App::from_config(&config);
        assert_eq!(app.skill().mode(), SkillParseMode::Labelled);
        assert_eq!(app.index_html(), PathBuf::from("public/index.html"));
    }
}
