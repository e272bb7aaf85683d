//! Gemini `generateContent` client plus the prompt catalog and the typed
//! schemas for structured generations.

pub mod prompts;
pub mod schema;

use base64::Engine;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

use crate::config::LlmConfig;
use crate::{Result, SmartAdsError};

pub use prompts::{build_conversation, Conversation, HistoryMessage};
pub use schema::{parse_structured, StructuredOutput};

const SERVICE: &str = "Gemini";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speaker {
    User,
    Model,
}

impl Speaker {
    /// `ai`, `model` and `assistant` are the model; anything else is the user.
    pub fn from_role(role: &str) -> Self {
        match role.trim().to_ascii_lowercase().as_str() {
            "ai" | "model" | "assistant" => Speaker::Model,
            _ => Speaker::User,
        }
    }

    fn wire_name(self) -> &'static str {
        match self {
            Speaker::User => "user",
            Speaker::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatTurn {
    pub speaker: Speaker,
    pub text: String,
}

/// An uploaded image, kept in memory for a single call.
#[derive(Debug, Clone)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    api_base: String,
    model: String,
    temperature: f64,
}

impl GeminiClient {
    /// `None` when `GEMINI_API_KEY` is not set.
    pub fn from_config(config: &LlmConfig) -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty())?;
        Self::new(config, api_key).ok()
    }

    pub fn new(config: &LlmConfig, api_key: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|err| SmartAdsError::Config(format!("failed to build Gemini client: {}", err)))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            api_base: config.api_base.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Multi-turn chat under a system persona; returns the reply text.
    pub async fn chat(&self, system: &str, conversation: &Conversation) -> Result<String> {
        let contents = conversation
            .turns()
            .map(|turn| Content::text(turn.speaker, &turn.text))
            .collect();
        self.generate(Some(system), contents, false).await
    }

    /// Single-shot generation that must come back as the JSON schema `T`.
    pub async fn generate_structured<T: StructuredOutput>(
        &self,
        prompt: &str,
        image: Option<&InlineImage>,
    ) -> Result<T> {
        let mut content = Content::text(Speaker::User, prompt);
        if let Some(image) = image {
            content.parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: image.mime_type.clone(),
                    data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                },
            });
        }
        let raw = self.generate(None, vec![content], true).await?;
        parse_structured(&raw)
    }

    async fn generate(&self, system: Option<&str>, contents: Vec<Content>, json: bool) -> Result<String> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.api_base.trim_end_matches('/'),
            self.model
        );
        let request = GenerateRequest {
            system_instruction: system.map(|text| SystemInstruction {
                parts: vec![Part::Text {
                    text: text.to_string(),
                }],
            }),
            contents,
            generation_config: GenerationConfig {
                temperature: self.temperature,
                response_mime_type: json.then(|| "application/json".to_string()),
            },
        };

        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|err| SmartAdsError::upstream(SERVICE, format!("request failed: {}", err)))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_else(|_| String::new());
            let detail = error_body.trim();
            if detail.is_empty() {
                return Err(SmartAdsError::upstream(SERVICE, status.to_string()));
            }
            return Err(SmartAdsError::upstream(SERVICE, format!("{} {}", status, detail)));
        }

        let body: GenerateResponse = response
            .json()
            .await
            .map_err(|err| SmartAdsError::upstream(SERVICE, format!("response parse failed: {}", err)))?;

        if let Some(reason) = body.prompt_feedback.and_then(|feedback| feedback.block_reason) {
            return Err(SmartAdsError::upstream(SERVICE, format!("prompt blocked: {}", reason)));
        }

        let text: String = body
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(SmartAdsError::upstream(SERVICE, "response missing candidate text"));
        }
        Ok(text)
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<SystemInstruction>,
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

impl Content {
    fn text(speaker: Speaker, text: &str) -> Self {
        Self {
            role: speaker.wire_name(),
            parts: vec![Part::Text {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineData,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)]
    block_reason: Option<String>,
}
