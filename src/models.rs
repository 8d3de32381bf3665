//! Data models and structures
//!
//! Defines the request/response payloads exchanged with the browser client
//! and the runtime configuration loaded at startup.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Body of `POST /api/generate-skill`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SkillRequest {
    #[serde(default)]
    pub intro: Option<String>,
}

impl SkillRequest {
    /// Returns the intro when it holds something other than whitespace.
    pub fn intro(&self) -> Option<&str> {
        self.intro.as_deref().filter(|intro| !intro.trim().is_empty())
    }
}

/// A generated special move.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SkillResult {
    pub name: String,
    pub tagline: String,
    pub description: String,
}

/// Successful body of `POST /api/generate-avatar`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvatarResult {
    pub ok: bool,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

impl AvatarResult {
    pub fn from_png(png_base64: String) -> Self {
        Self {
            ok: true,
            image_url: format!("data:image/png;base64,{}", png_base64),
        }
    }
}

/// Error body shared by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub error: String,
}

/// A photo received through the multipart upload, held in memory for one request.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: String,
}

impl UploadedImage {
    /// Inline `data:` URI used by the vision call.
    pub fn data_url(&self) -> String {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:{};base64,{}", self.mime_type, encoded)
    }
}

/// How the skill completion is requested and parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SkillParseMode {
    /// Provider JSON mode; malformed output is an error.
    #[default]
    Structured,
    /// Labelled prose; missing sections fall back to fixed text.
    Labelled,
}

impl FromStr for SkillParseMode {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "structured" | "json" => Ok(Self::Structured),
            "labelled" | "labeled" | "text" => Ok(Self::Labelled),
            other => Err(crate::Error::Config(format!(
                "Invalid SKILL_PARSE_MODE '{}'. Expected 'structured' or 'labelled'",
                other
            ))),
        }
    }
}

// Configuration
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_IMAGE_MODEL: &str = "gpt-image-1";
pub const DEFAULT_IMAGE_SIZE: &str = "1024x1536";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_base_url: String,
    pub bind_address: String,
    pub port: u16,
    pub chat_model: String,
    pub vision_model: String,
    pub image_model: String,
    pub image_size: String,
    pub skill_parse_mode: SkillParseMode,
    pub static_dir: String,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        apply_env_file(dotenvy::dotenv())?;
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> crate::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let get_or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let openai_api_key = get("OPENAI_API_KEY")
            .ok_or_else(|| crate::Error::Config("OPENAI_API_KEY not set".to_string()))?;

        let port = match get("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| {
                    crate::Error::Config(format!("Invalid PORT '{}'. Expected 1-65535", raw))
                })?,
            None => DEFAULT_PORT,
        };

        let skill_parse_mode = match get("SKILL_PARSE_MODE") {
            Some(raw) => raw.parse()?,
            None => SkillParseMode::default(),
        };

        Ok(Self {
            openai_api_key,
            openai_base_url: get_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            bind_address: get_or("BIND_ADDRESS", DEFAULT_BIND_ADDRESS),
            port,
            chat_model: get_or("CHAT_MODEL", DEFAULT_CHAT_MODEL),
            vision_model: get_or("VISION_MODEL", DEFAULT_VISION_MODEL),
            image_model: get_or("IMAGE_MODEL", DEFAULT_IMAGE_MODEL),
            image_size: get_or("IMAGE_SIZE", DEFAULT_IMAGE_SIZE),
            skill_parse_mode,
            static_dir: get_or("STATIC_DIR", DEFAULT_STATIC_DIR),
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

/// A missing `.env` is fine; an unreadable or malformed one is not.
fn apply_env_file<T>(loaded: dotenvy::Result<T>) -> crate::Result<()> {
    match loaded {
        Ok(_) => Ok(()),
        Err(e) if e.not_found() => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap();

        assert_eq!(config.openai_api_key, "sk-test");
        assert_eq!(config.port, 3000);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
        assert_eq!(config.openai_base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(config.chat_model, DEFAULT_CHAT_MODEL);
        assert_eq!(config.image_model, DEFAULT_IMAGE_MODEL);
        assert_eq!(config.skill_parse_mode, SkillParseMode::Structured);
        assert_eq!(config.static_dir, "static");
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "8080")])).unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_config_blank_api_key_is_missing() {
        let err = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "   ")])).unwrap_err();
        assert!(matches!(err, crate::Error::Config(_)));
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "8080"),
            ("OPENAI_BASE_URL", "http://localhost:9999/"),
            ("SKILL_PARSE_MODE", "labelled"),
            ("IMAGE_SIZE", "1024x1024"),
        ]))
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.openai_base_url, "http://localhost:9999");
        assert_eq!(config.skill_parse_mode, SkillParseMode::Labelled);
        assert_eq!(config.image_size, "1024x1024");
    }

    #[test]
    fn test_config_rejects_bad_port() {
        let err = Config::from_lookup(lookup_from(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("PORT", "http"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_missing_env_file_is_ignored() {
        let missing = dotenvy::Error::Io(std::io::Error::from(std::io::ErrorKind::NotFound));
        assert!(apply_env_file::<()>(Err(missing)).is_ok());
        assert!(apply_env_file(Ok(())).is_ok());
    }

    #[test]
    fn test_malformed_env_file_is_an_error() {
        let malformed = dotenvy::Error::LineParse("OPENAI API KEY=sk".to_string(), 6);
        let err = apply_env_file::<()>(Err(malformed)).unwrap_err();
        assert!(matches!(err, crate::Error::EnvVar(_)));
    }

    #[test]
    fn test_parse_mode_rejects_unknown() {
        assert!("yaml".parse::<SkillParseMode>().is_err());
        assert_eq!(
            "JSON".parse::<SkillParseMode>().unwrap(),
            SkillParseMode::Structured
        );
    }

    #[test]
    fn test_skill_request_intro_rejects_blank() {
        let blank = SkillRequest {
            intro: Some(" \n\t".to_string()),
        };
        assert!(blank.intro().is_none());
        assert!(SkillRequest::default().intro().is_none());

        let filled = SkillRequest {
            intro: Some("猫が好きなエンジニア".to_string()),
        };
        assert_eq!(filled.intro(), Some("猫が好きなエンジニア"));
    }

    #[test]
    fn test_avatar_result_serializes_image_url() {
        let json = serde_json::to_value(AvatarResult::from_png("iVBORw0KGgo=".to_string())).unwrap();
        assert_eq!(json["ok"], true);
        assert_eq!(json["imageUrl"], "data:image/png;base64,iVBORw0KGgo=");
    }

    #[test]
    fn test_uploaded_image_data_url() {
        let image = UploadedImage {
            bytes: vec![0xFF, 0xD8, 0xFF],
            file_name: "me.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
        };
        assert_eq!(image.data_url(), "data:image/jpeg;base64,/9j/");
    }
}
