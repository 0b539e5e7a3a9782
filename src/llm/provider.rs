use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use crate::types::{AppError, AppResult, LLMRequest, LLMResponse};

#[async_trait]
pub trait LLMAdapter: Send + Sync {
    async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse>;
}

/// Configuration for an LLM provider
#[derive(Debug, Clone)]
pub struct LLMProviderConfig {
    pub name: String,
    pub api_key: String,
    pub api_base: Option<String>,
    pub timeout: Duration,
}

impl LLMProviderConfig {
    pub fn from_config(config: &crate::config::LLMConfig) -> Self {
        Self {
            name: config.provider.clone(),
            api_key: config.api_key.clone(),
            api_base: Some(config.api_base.clone()),
            timeout: Duration::from_secs(config.request_timeout_secs),
        }
    }
}

/// Cheap to clone handle shared by every agent that calls a model
#[derive(Clone)]
pub struct LLM {
    adapter: Arc<dyn LLMAdapter>,
    provider_name: String,
}

impl LLM {
    /// Build the adapter for `provider.name`. Agents refuse to construct
    /// without credentials, so an empty key is a configuration error.
    pub fn new(provider: LLMProviderConfig) -> AppResult<Self> {
        if provider.api_key.trim().is_empty() {
            return Err(AppError::Config(
                "MISTRALAI_API_KEY is required to call the hosted model".to_string(),
            ));
        }

        let adapter: Arc<dyn LLMAdapter> = match provider.name.as_str() {
            "mistral" => {
                let base = provider
                    .api_base
                    .as_deref()
                    .unwrap_or(crate::llm::mistral::MISTRAL_API_BASE);
                Arc::new(crate::llm::mistral::MistralAdapter::with_api_base(
                    &provider.api_key,
                    base,
                    provider.timeout,
                )?)
            }
            other => {
                return Err(AppError::Config(format!("Unsupported provider: {}", other)));
            }
        };

        Ok(Self {
            adapter,
            provider_name: provider.name,
        })
    }

    pub fn from_adapter(adapter: Arc<dyn LLMAdapter>) -> Self {
        Self {
            adapter,
            provider_name: "custom".to_string(),
        }
    }

    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub async fn create_chat_completion(&self, request: &LLMRequest) -> AppResult<LLMResponse> {
        self.adapter.create_chat_completion(request).await
    }

    /// Send a single user prompt and return the response text
    pub async fn complete(&self, model: &str, prompt: &str) -> AppResult<String> {
        let request = LLMRequest::prompt(model, prompt);
        Ok(self.create_chat_completion(&request).await?.content)
    }
}
