//! Anthropic messages backend.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProviderError, ProviderResult};
use crate::traits::provider::{Completion, Provider};

pub const DEFAULT_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
pub const API_VERSION: &str = "2023-06-01";

const SYSTEM_PROMPT: &str =
    "You are a precise analyst. Answer from your own training knowledge and reply with JSON only.";

/// Claude via the Anthropic API.
#[derive(Clone)]
pub struct AnthropicProvider {
    http_client: Client,
    api_key: Option<String>,
    base_url: String,
    model: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    /// `None` leaves the provider unconfigured.
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 1500,
        }
    }

    /// Create from environment variable `ANTHROPIC_API_KEY`.
    pub fn from_env() -> Self {
        Self::new(std::env::var("ANTHROPIC_API_KEY").ok())
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    input_tokens: u32,
    #[serde(default)]
    output_tokens: u32,
}

impl MessagesResponse {
    /// Concatenated text blocks; `None` when the reply had no text.
    fn text(self) -> Option<String> {
        let text: String = self
            .content
            .into_iter()
            .filter(|block| block.kind == "text")
            .filter_map(|block| block.text)
            .collect();
        (!text.is_empty()).then_some(text)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        "claude"
    }

    fn display_name(&self) -> &str {
        "Claude"
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<Completion> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingCredentials {
                provider: self.name().to_string(),
            })?;
        let start = std::time::Instant::now();

        let request = MessagesRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: SYSTEM_PROMPT,
            messages: vec![Message {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .http_client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", api_key)
            .header("anthropic-version", API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "Anthropic request failed");
                ProviderError::Network(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = %status, error = %body, "Anthropic API error");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: MessagesResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::Parse(e.to_string()))?;
        let tokens = raw.usage.as_ref().map(|u| u.input_tokens + u.output_tokens);
        let text = raw
            .text()
            .ok_or_else(|| ProviderError::Parse("no text content in response".into()))?;

        debug!(
            model = %self.model,
            duration_ms = start.elapsed().as_millis(),
            "Anthropic message"
        );

        let completion = Completion::new(text);
        Ok(match tokens {
            Some(tokens) => completion.with_tokens(tokens),
            None => completion,
        })
    }
}
