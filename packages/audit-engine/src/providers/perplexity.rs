//! Perplexity, reached through its OpenAI-compatible endpoint.

use super::openai::OpenAiProvider;

pub const DEFAULT_MODEL: &str = "sonar";
pub const BASE_URL: &str = "https://api.perplexity.ai";

/// Build the Perplexity provider. `None` leaves it unconfigured.
pub fn perplexity(api_key: Option<String>) -> OpenAiProvider {
    OpenAiProvider::new(api_key)
        .with_base_url(BASE_URL)
        .with_model(DEFAULT_MODEL)
        .with_identity("perplexity", "Perplexity")
}

/// Create from environment variable `PERPLEXITY_API_KEY`.
pub fn perplexity_from_env() -> OpenAiProvider {
    perplexity(std::env::var("PERPLEXITY_API_KEY").ok())
}
