//! Provider trait for LLM text-completion backends.

use async_trait::async_trait;

use crate::error::ProviderResult;

/// Raw output of one completion call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Completion {
    pub text: String,

    /// Total tokens billed, when the backend reports usage
    pub tokens: Option<u32>,
}

impl Completion {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tokens: None,
        }
    }

    pub fn with_tokens(mut self, tokens: u32) -> Self {
        self.tokens = Some(tokens);
        self
    }
}

/// One external text-completion service.
///
/// Implementations only speak their backend's protocol and report failures
/// as [`ProviderError`](crate::error::ProviderError). Prompting, deadlines,
/// parsing, and failure containment live in
/// [`ProviderAdapter`](crate::providers::ProviderAdapter), so adding a
/// backend never touches the orchestrator.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable key used in stored results ("chatgpt").
    fn name(&self) -> &str;

    /// Name used in outreach copy ("ChatGPT").
    fn display_name(&self) -> &str;

    /// Send one prompt and return the model's text.
    async fn complete(&self, prompt: &str) -> ProviderResult<Completion>;
}
