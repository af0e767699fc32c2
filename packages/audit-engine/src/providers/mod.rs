//! LLM backends and the adapter that contains their failures.
//!
//! Available backends:
//! - [`OpenAiProvider`] - OpenAI chat completions (also any compatible API)
//! - [`AnthropicProvider`] - Anthropic messages API
//! - [`perplexity`] - Perplexity via its OpenAI-compatible endpoint

pub mod anthropic;
pub mod openai;
pub mod perplexity;

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::ProviderError;
use crate::pipeline::{parser::parse_response, prompt::build_audit_prompt};
use crate::traits::provider::Provider;
use crate::types::{audit::ProviderResponse, subject::Subject};

/// Wraps one [`Provider`] behind the never-fails audit contract.
///
/// Every failure (missing key, network, timeout, non-2xx, bad body) becomes
/// an empty [`ProviderResponse`] with `error` set, so one backend going
/// down never takes its siblings or the batch with it.
#[derive(Clone)]
pub struct ProviderAdapter {
    provider: Arc<dyn Provider>,
    timeout: Duration,
}

impl ProviderAdapter {
    pub fn new(provider: Arc<dyn Provider>, timeout: Duration) -> Self {
        Self { provider, timeout }
    }

    pub fn name(&self) -> &str {
        self.provider.name()
    }

    pub fn display_name(&self) -> &str {
        self.provider.display_name()
    }

    /// Audit one subject with this provider.
    pub async fn query(&self, subject: &Subject) -> ProviderResponse {
        self.query_prompt(&build_audit_prompt(subject)).await
    }

    /// Send an already-built audit prompt.
    pub async fn query_prompt(&self, prompt: &str) -> ProviderResponse {
        let start = Instant::now();

        let outcome = match tokio::time::timeout(self.timeout, self.provider.complete(prompt)).await {
            Ok(result) => result,
            Err(_) => Err(ProviderError::Timeout {
                elapsed: self.timeout,
            }),
        };
        let latency_ms = start.elapsed().as_millis() as u64;

        match outcome {
            Ok(completion) => {
                let parsed = parse_response(&completion.text);
                debug!(
                    provider = %self.name(),
                    findings = parsed.findings.len(),
                    accuracy = parsed.accuracy_score,
                    latency_ms,
                    "Provider answered"
                );
                ProviderResponse {
                    provider: self.name().to_string(),
                    display_name: self.display_name().to_string(),
                    description: parsed.description,
                    findings: parsed.findings,
                    accuracy_score: parsed.accuracy_score,
                    tokens_used: completion.tokens,
                    latency_ms,
                    error: None,
                }
            }
            Err(e) => {
                warn!(provider = %self.name(), error = %e, latency_ms, "Provider query failed");
                let mut response = ProviderResponse::empty(self.name(), self.display_name())
                    .with_error(e.to_string());
                response.latency_ms = latency_ms;
                response
            }
        }
    }
}
