//! OpenAI chat-completions backend.
//!
//! Speaks the `/chat/completions` wire format, so it also serves any
//! compatible API by swapping the base URL (see [`super::perplexity`]).

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::provider::{Completion, Provider};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

const SYSTEM_PROMPT: &str =
    "You are a precise analyst. Answer from your own training knowledge and reply with JSON only.";

/// OpenAI (or OpenAI-compatible) provider.
#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    name: String,
    display_name: String,
    temperature: Option<f32>,
    max_tokens: u32,
}

impl OpenAiProvider {
    /// ChatGPT via the OpenAI API. `None` leaves the provider unconfigured.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            name: "chatgpt".to_string(),
            display_name: "ChatGPT".to_string(),
            temperature: Some(0.2),
            max_tokens: 1500,
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("OPENAI_API_KEY").ok())
    }

    /// Set a custom base URL (for compatible APIs, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Rename the provider (key and display name).
    pub fn with_identity(mut self, name: impl Into<String>, display_name: impl Into<String>) -> Self {
        self.name = name.into();
        self.display_name = display_name.into();
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    fn build_request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        let reasoning_model = uses_max_completion_tokens(&self.model);
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: if reasoning_model { None } else { self.temperature },
            max_tokens: (!reasoning_model).then_some(self.max_tokens),
            max_completion_tokens: reasoning_model.then_some(self.max_tokens),
        }
    }
}

/// Reasoning models reject `max_tokens` and `temperature`.
fn uses_max_completion_tokens(model: &str) -> bool {
    model.starts_with("o1")
        || model.starts_with("o3")
        || model.starts_with("o4")
        || model.starts_with("gpt-5")
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponseRaw {
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<Completion> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredentials {
                provider: self.name.clone(),
            })?;
        let start = std::time::Instant::now();

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(prompt))
            .send()
            .await
            .map_err(|e| {
                warn!(provider = %self.name, error = %e, "Chat completion request failed");
                ProviderError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(provider = %self.name, status = %status, error = %body, "Chat completion API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: ChatResponseRaw = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;

        let text = raw
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| ProviderError::Parse("no choices in response".into()))?;

        debug!(
            provider = %self.name,
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Chat completion"
        );

        let mut completion = Completion::new(text);
        if let Some(usage) = raw.usage {
            completion = completion.with_tokens(usage.total_tokens);
        }
        Ok(completion)
    }
}
