//! Multi-Model AI Visibility Audit Engine
//!
//! Asks several independent LLMs what they know about a company, compares
//! each answer against verified ground truth, and keeps only the
//! discrepancies that multiple models agree on. The outcome is an accuracy
//! score and a one-line outreach hook per company.
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use audit_engine::{
//!     AuditConfig, Auditor, BatchOrchestrator, BatchRequest, MemoryStore, ProviderAdapter,
//! };
//! use audit_engine::providers::{perplexity::perplexity_from_env, AnthropicProvider, OpenAiProvider};
//!
//! let config = AuditConfig::default();
//! let adapters = vec![
//!     ProviderAdapter::new(Arc::new(OpenAiProvider::from_env()), config.provider_timeout),
//!     ProviderAdapter::new(Arc::new(AnthropicProvider::from_env()), config.provider_timeout),
//!     ProviderAdapter::new(Arc::new(perplexity_from_env()), config.provider_timeout),
//! ];
//!
//! let store = Arc::new(MemoryStore::new());
//! let orchestrator = BatchOrchestrator::new(store.clone(), store, Auditor::new(adapters, config)?);
//! let summary = orchestrator.run(&BatchRequest::new(10, 0)).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Provider and storage seams
//! - [`types`] - Subjects, findings, audit results, configuration
//! - [`pipeline`] - Prompt, parser, consensus, hook, batch orchestration
//! - [`providers`] - OpenAI, Anthropic, and Perplexity backends
//! - [`stores`] - Storage implementations (MemoryStore, PostgresStore)
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod providers;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{AuditError, ProviderError, ProviderResult, Result};
pub use traits::{
    provider::{Completion, Provider},
    store::{AuditStore, SubjectSource},
};
pub use types::{
    audit::{AuditResult, ConsensusReport, ProviderResponse},
    batch::{AuditStats, BatchSummary},
    config::{AccuracyBasis, AuditConfig, BatchRequest, SubjectQuery},
    finding::{Field, Finding, FindingType, Severity},
    subject::{GroundTruth, Subject},
};

// Re-export pipeline entry points
pub use pipeline::{
    aggregate, build_audit_prompt, generate_hook, parse_response, Auditor, BatchOrchestrator,
    DEFAULT_STATUS_SAMPLE,
};
pub use providers::ProviderAdapter;

// Re-export storage implementations
pub use stores::MemoryStore;

#[cfg(feature = "postgres")]
pub use stores::PostgresStore;
