use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::config::ServiceConfig;
use crate::error::{TranslateError, TranslateResult};
use crate::language::{Language, SourceLanguage};
use crate::prompts::build_translate_prompt;

pub const MAX_ALTERNATIVES: usize = 3;

/// One logical translation request. Structural equality over all four fields
/// is the request key: two equal requests must not both be dispatched.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TranslationRequest {
    pub source_text: String,
    pub source: SourceLanguage,
    pub target: Language,
    pub ui: Language,
}

impl TranslationRequest {
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.source_text.trim().is_empty()
    }
}

/// Structured reply from the model. Every field defaults when absent so a
/// sparse but parseable response never fails.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    #[serde(default)]
    pub detected_language: String,
    #[serde(default)]
    pub corrected_source_text: String,
    #[serde(default)]
    pub main_translation: String,
    #[serde(default)]
    pub alternative_translations: Vec<String>,
    #[serde(default)]
    pub meaning_explanation: String,
}

impl Translation {
    /// Meaningful only when the request used auto-detect.
    #[must_use]
    pub fn detected(&self) -> Option<Language> {
        Language::parse(&self.detected_language)
    }

    fn normalized(mut self) -> Self {
        self.alternative_translations
            .retain(|alt| !alt.trim().is_empty());
        self.alternative_translations.truncate(MAX_ALTERNATIVES);
        self
    }
}

/// The external translation boundary. The orchestrator only sees this trait,
/// so tests inject scripted translators and the CLI injects the HTTP client.
#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(&self, req: &TranslationRequest) -> TranslateResult<Translation>;
}

/// Client for an OpenAI-style chat-completions endpoint.
pub struct HttpTranslator {
    http: reqwest::Client,
    endpoint: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl HttpTranslator {
    pub fn new(cfg: &ServiceConfig) -> TranslateResult<Self> {
        let http = reqwest::Client::builder()
            .user_agent("werger/0.1")
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .build()
            .map_err(|e| TranslateError::Service(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: cfg.endpoint.clone(),
            model: cfg.model.clone(),
            api_key: cfg.api_key.clone().filter(|k| !k.trim().is_empty()),
            api_key_env: cfg.api_key_env.clone(),
        })
    }

    /// Resolved at call time so fixing the environment makes the next retry
    /// succeed without restarting.
    fn api_key(&self) -> TranslateResult<String> {
        if let Some(key) = &self.api_key {
            return Ok(key.clone());
        }
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            _ => Err(TranslateError::Configuration(format!(
                "no api key in config and {} is unset",
                self.api_key_env
            ))),
        }
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    async fn translate(&self, req: &TranslationRequest) -> TranslateResult<Translation> {
        let api_key = self.api_key()?;
        let prompt = build_translate_prompt(req);

        let body = json!({
            "model": self.model,
            "messages": [{"role": "user", "content": prompt}],
            "temperature": 0.3,
            "response_format": {"type": "json_object"},
        });

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(TranslateError::Service(format!(
                "endpoint returned {status}"
            )));
        }

        let chat: ChatResponse = resp.json().await?;
        let content = chat
            .choices
            .first()
            .map(|c| c.message.content.as_str())
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| TranslateError::Service("empty completion".to_string()))?;

        parse_translation(content)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: ChatMessage,
}

#[derive(Debug, Default, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: String,
}

/// Parse the structured reply out of raw model text. Tolerates code fences and
/// prose around the object: parsing starts at the first `{` and stops at the
/// end of the value, so trailing junk is ignored.
pub fn parse_translation(raw: &str) -> TranslateResult<Translation> {
    let text = strip_code_fence(raw);
    let start = text
        .find('{')
        .ok_or_else(|| TranslateError::Service("no json object in reply".to_string()))?;
    let mut de = serde_json::Deserializer::from_str(&text[start..]);
    let translation = Translation::deserialize(&mut de)?;
    Ok(translation.normalized())
}

fn strip_code_fence(text: &str) -> &str {
    let s = text.trim();
    let Some(rest) = s.strip_prefix("```") else {
        return s;
    };
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or(rest);
    rest.rsplit_once("```").map(|(body, _)| body).unwrap_or(rest).trim()
}
