// Mistral AI adapter implementation
// Chat completions: https://docs.mistral.ai/api/#tag/chat
//
// The API is OpenAI-compatible, except that `message.content` may come back
// either as a plain string or as a list of typed chunks (text, thinking,
// references). Both are flattened to a single string here.

use crate::llm::provider::LLMAdapter;
use crate::types::{AppError, AppResult, LLMRequest, LLMResponse, TokenUsage};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

pub const MISTRAL_API_BASE: &str = "https://api.mistral.ai/v1";

pub struct MistralAdapter {
    client: Client,
    api_key: String,
    api_base: String,
}

// Request types for the Mistral API
#[derive(Serialize)]
struct MistralChatRequest<'a> {
    model: &'a str,
    messages: Vec<MistralMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
}

#[derive(Serialize)]
struct MistralMessage<'a> {
    role: &'a str,
    content: &'a str,
}

// Response types for the Mistral API
#[derive(Deserialize)]
struct MistralChatResponse {
    #[serde(default)]
    choices: Vec<MistralChoice>,
    #[serde(default)]
    usage: Option<MistralUsage>,
}

#[derive(Deserialize)]
struct MistralChoice {
    message: MistralResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct MistralResponseMessage {
    #[serde(default)]
    content: Option<MistralContent>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MistralContent {
    Text(String),
    Chunks(Vec<MistralChunk>),
}

#[derive(Deserialize)]
struct MistralChunk {
    #[serde(rename = "type", default)]
    chunk_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

impl MistralContent {
    fn into_text(self) -> String {
        match self {
            MistralContent::Text(text) => text,
            MistralContent::Chunks(chunks) => chunks
                .into_iter()
                .filter(|c| matches!(c.chunk_type.as_deref(), None | Some("text")))
                .filter_map(|c| c.text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }
}

#[derive(Deserialize)]
struct MistralUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl MistralAdapter {
    /// Point the adapter at another OpenAI-compatible endpoint
    pub fn with_api_base(api_key: &str, api_base: &str, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    /// System instruction goes first, as its own system message
    fn build_messages<'a>(request: &'a LLMRequest) -> Vec<MistralMessage<'a>> {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = request.system_instruction.as_deref() {
            messages.push(MistralMessage {
                role: "system",
                content: system,
            });
        }
        messages.extend(request.messages.iter().map(|m| MistralMessage {
            role: m.role.as_str(),
            content: m.content.as_str(),
        }));
        messages
    }

    fn error_message(body: &str) -> String {
        serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| {
                v.get("message")
                    .and_then(|m| m.as_str())
                    .map(String::from)
                    .or_else(|| v.get("detail").map(|d| d.to_string()))
            })
            .unwrap_or_else(|| body.to_string())
    }
}

#[async_trait]
impl LLMAdapter for MistralAdapter {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        let url = format!("{}/chat/completions", self.api_base);

        let body = MistralChatRequest {
            model: &request.model,
            messages: Self::build_messages(request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            stream: false,
        };

        debug!(model = %request.model, messages = body.messages.len(), "Sending Mistral chat request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::LLMApi(format!("Mistral request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LLMApi(format!(
                "Mistral API error ({}): {}",
                status,
                Self::error_message(&error_text)
            )));
        }

        let parsed: MistralChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::LLMApi(format!("Failed to parse Mistral response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::LLMApi("Mistral returned no choices".to_string()))?;

        let usage = parsed
            .usage
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            })
            .unwrap_or_default();

        Ok(LLMResponse {
            content: choice.message.content.map(MistralContent::into_text).unwrap_or_default(),
            finish_reason: choice.finish_reason.unwrap_or_else(|| "unknown".to_string()),
            usage,
        })
    }
}
