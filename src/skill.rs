//! Special-move generation from a self-introduction.
//!
//! Builds the Japanese instruction prompt, asks the chat provider for a move,
//! and turns the reply into a fully populated [`SkillResult`].

use crate::ai::{ChatPrompt, ChatService};
use crate::models::{SkillParseMode, SkillResult};
use crate::{prompts, Error, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::sync::Arc;

pub const FALLBACK_NAME: &str = "名無しの必殺技";
pub const FALLBACK_TAGLINE: &str = "その一撃、まだ誰も知らない。";
pub const FALLBACK_DESCRIPTION: &str = "詳細は謎に包まれている。使い手本人もよく分かっていないらしい。";

const SKILL_MAX_TOKENS: u32 = 800;

pub struct SkillGenerator {
    chat: Arc<dyn ChatService>,
    mode: SkillParseMode,
}

impl SkillGenerator {
    pub fn new(chat: Arc<dyn ChatService>, mode: SkillParseMode) -> Self {
        Self { chat, mode }
    }

    pub fn mode(&self) -> SkillParseMode {
        self.mode
    }

    pub fn build_prompt(&self, intro: &str) -> ChatPrompt {
        let system = match self.mode {
            SkillParseMode::Structured => prompts::SKILL_SYSTEM,
            SkillParseMode::Labelled => prompts::SKILL_SYSTEM_LABELLED,
        };

        ChatPrompt {
            system: system.trim().to_string(),
            user: prompts::render(prompts::SKILL_USER, &[("intro", intro)])
                .trim()
                .to_string(),
            json_output: self.mode == SkillParseMode::Structured,
            max_tokens: SKILL_MAX_TOKENS,
        }
    }

    /// Generates a move for `intro`. The caller has already rejected blank input.
    pub async fn generate(&self, intro: &str) -> Result<SkillResult> {
        let prompt = self.build_prompt(intro);
        let reply = self.chat.complete(&prompt).await?;

        match self.mode {
            SkillParseMode::Structured => parse_structured_skill(&reply),
            SkillParseMode::Labelled => Ok(parse_labelled_skill(&reply)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawSkill {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tagline: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

fn or_fallback(value: Option<String>, fallback: &str) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

/// Parses a JSON-mode reply. Malformed JSON is an error; absent fields get fallbacks.
pub fn parse_structured_skill(reply: &str) -> Result<SkillResult> {
    let raw: RawSkill = serde_json::from_str(reply.trim()).map_err(|e| {
        tracing::error!("Skill reply is not valid JSON: {}\nReply: {}", e, reply);
        Error::AiProvider(format!("Failed to parse skill JSON: {}", e))
    })?;

    Ok(SkillResult {
        name: or_fallback(raw.name, FALLBACK_NAME),
        tagline: or_fallback(raw.tagline, FALLBACK_TAGLINE),
        description: or_fallback(raw.description, FALLBACK_DESCRIPTION),
    })
}

// Label, optional markdown emphasis, then a full- or half-width colon. Only
// horizontal whitespace may follow the colon, so an empty label never reads
// the next line.
static NAME_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:[^\S\n]|[*#>-])*(?:技名|必殺技名)(?:[^\S\n]|\*)*[：:][^\S\n]*(.+)$")
        .unwrap()
});
static TAGLINE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?m)^(?:[^\S\n]|[*#>-])*キャッチコピー(?:[^\S\n]|\*)*[：:][^\S\n]*(.+)$").unwrap()
});
static DESCRIPTION_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?ms)^(?:[^\S\n]|[*#>-])*説明(?:[^\S\n]|\*)*[：:]\s*(.+)\z").unwrap()
});

fn capture(pattern: &Regex, text: &str) -> Option<String> {
    pattern
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().trim_matches('*').trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Extracts the three labelled sections from a prose reply.
///
/// Never fails: a missing section yields that field's fallback text. The
/// description runs to the end of the reply.
pub fn parse_labelled_skill(reply: &str) -> SkillResult {
    SkillResult {
        name: capture(&NAME_LABEL, reply).unwrap_or_else(|| FALLBACK_NAME.to_string()),
        tagline: capture(&TAGLINE_LABEL, reply).unwrap_or_else(|| FALLBACK_TAGLINE.to_string()),
        description: capture(&DESCRIPTION_LABEL, reply)
            .unwrap_or_else(|| FALLBACK_DESCRIPTION.to_string()),
    }
}
