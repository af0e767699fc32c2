use anyhow::{Context, Result};
use audit_engine::AuditConfig;
use dotenvy::dotenv;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Absent means the in-memory store (development only)
    pub database_url: Option<String>,
    pub port: u16,
    pub audit_secret: Option<String>,
    pub openai_api_key: Option<String>,
    pub anthropic_api_key: Option<String>,
    pub perplexity_api_key: Option<String>,
    pub openai_model: Option<String>,
    pub anthropic_model: Option<String>,
    pub perplexity_model: Option<String>,
    pub consensus_threshold: Option<usize>,
    pub subject_delay_ms: Option<u64>,
    pub provider_timeout_secs: Option<u64>,
    pub max_batch_size: Option<usize>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Ok(Self {
            database_url: optional("DATABASE_URL"),
            port: parsed("PORT")?.unwrap_or(8080),
            audit_secret: optional("AUDIT_SECRET"),
            openai_api_key: optional("OPENAI_API_KEY"),
            anthropic_api_key: optional("ANTHROPIC_API_KEY"),
            perplexity_api_key: optional("PERPLEXITY_API_KEY"),
            openai_model: optional("OPENAI_MODEL"),
            anthropic_model: optional("ANTHROPIC_MODEL"),
            perplexity_model: optional("PERPLEXITY_MODEL"),
            consensus_threshold: parsed("CONSENSUS_THRESHOLD")?,
            subject_delay_ms: parsed("SUBJECT_DELAY_MS")?,
            provider_timeout_secs: parsed("PROVIDER_TIMEOUT_SECS")?,
            max_batch_size: parsed("MAX_BATCH_SIZE")?,
        })
    }

    /// Engine settings, with environment overrides applied to the defaults.
    pub fn audit_config(&self) -> AuditConfig {
        let mut config = AuditConfig::default();
        if let Some(threshold) = self.consensus_threshold {
            config = config.with_consensus_threshold(threshold);
        }
        if let Some(ms) = self.subject_delay_ms {
            config = config.with_subject_delay(Duration::from_millis(ms));
        }
        if let Some(secs) = self.provider_timeout_secs {
            config = config.with_provider_timeout(Duration::from_secs(secs));
        }
        if let Some(max) = self.max_batch_size {
            config = config.with_max_batch_size(max);
        }
        config
    }
}

/// Non-blank value of `name`.
fn optional(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parsed<T>(name: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    optional(name)
        .map(|raw| {
            raw.trim()
                .parse()
                .with_context(|| format!("{} must be a valid number", name))
        })
        .transpose()
}
