//! Server dependencies, built once at process start.
//!
//! Providers and stores are chosen here from [`Config`]; everything past this
//! point only sees the engine's traits.

use std::sync::Arc;

use anyhow::{Context, Result};
use audit_engine::providers::{perplexity::perplexity, AnthropicProvider, OpenAiProvider};
use audit_engine::{
    AuditStore, Auditor, BatchOrchestrator, MemoryStore, PostgresStore, Provider, ProviderAdapter,
    SubjectSource,
};
use tracing::{info, warn};

use crate::config::Config;

#[derive(Clone)]
pub struct ServerDeps {
    pub orchestrator: Arc<BatchOrchestrator>,

    /// Keys of providers that have credentials, in query order
    pub providers_configured: Vec<String>,
}

impl ServerDeps {
    pub fn new(orchestrator: Arc<BatchOrchestrator>, providers_configured: Vec<String>) -> Self {
        Self {
            orchestrator,
            providers_configured,
        }
    }

    /// Build providers, the store, and the orchestrator from configuration.
    pub async fn from_config(config: &Config) -> Result<Self> {
        let audit_config = config.audit_config();
        let (providers, configured) = build_providers(config);

        if configured.is_empty() {
            warn!("No provider API keys configured; every audit will come back empty");
        }

        let adapters = providers
            .into_iter()
            .map(|p| ProviderAdapter::new(p, audit_config.provider_timeout))
            .collect();
        let auditor = Auditor::new(adapters, audit_config).context("Invalid provider set")?;

        let (subjects, store): (Arc<dyn SubjectSource>, Arc<dyn AuditStore>) =
            match &config.database_url {
                Some(url) => {
                    info!("Connecting to database...");
                    let store = Arc::new(
                        PostgresStore::new(url)
                            .await
                            .context("Failed to connect to database")?,
                    );
                    info!("Database connected");
                    (store.clone(), store)
                }
                None => {
                    warn!("DATABASE_URL not set; using in-memory store");
                    let store = Arc::new(MemoryStore::new());
                    (store.clone(), store)
                }
            };

        let orchestrator = Arc::new(BatchOrchestrator::new(subjects, store, auditor));
        Ok(Self::new(orchestrator, configured))
    }
}

/// The three known providers, plus the keys of those with credentials.
fn build_providers(config: &Config) -> (Vec<Arc<dyn Provider>>, Vec<String>) {
    let mut chatgpt = OpenAiProvider::new(config.openai_api_key.clone());
    if let Some(model) = &config.openai_model {
        chatgpt = chatgpt.with_model(model);
    }

    let mut claude = AnthropicProvider::new(config.anthropic_api_key.clone());
    if let Some(model) = &config.anthropic_model {
        claude = claude.with_model(model);
    }

    let mut pplx = perplexity(config.perplexity_api_key.clone());
    if let Some(model) = &config.perplexity_model {
        pplx = pplx.with_model(model);
    }

    let configured = [
        (chatgpt.name(), chatgpt.is_configured()),
        (claude.name(), claude.is_configured()),
        (pplx.name(), pplx.is_configured()),
    ]
    .into_iter()
    .filter(|(_, ok)| *ok)
    .map(|(name, _)| name.to_string())
    .collect();

    let providers: Vec<Arc<dyn Provider>> = vec![Arc::new(chatgpt), Arc::new(claude), Arc::new(pplx)];
    (providers, configured)
}
