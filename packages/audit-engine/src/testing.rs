//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the audit engine
//! without making real LLM or database calls.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use uuid::Uuid;

use crate::error::{AuditError, ProviderError, ProviderResult, Result};
use crate::stores::MemoryStore;
use crate::traits::{
    provider::{Completion, Provider},
    store::{AuditStore, SubjectSource},
};
use crate::types::{
    audit::AuditResult,
    config::SubjectQuery,
    finding::Finding,
    subject::Subject,
};

/// How a [`MockProvider`] answers a prompt.
#[derive(Debug, Clone)]
enum Behavior {
    Reply(String),
    Fail(String),
    Unconfigured,
    Panic,
}

/// Shared record of the prompts a mock received.
///
/// Cloned handles see the same log, so a test can keep one after the
/// provider itself has been moved into an adapter.
#[derive(Debug, Clone, Default)]
pub struct CallLog {
    prompts: Arc<RwLock<Vec<String>>>,
    finished: Arc<AtomicUsize>,
}

impl CallLog {
    /// Calls started.
    pub fn count(&self) -> usize {
        self.prompts.read().unwrap().len()
    }

    /// Calls that ran to completion (not cancelled mid-flight).
    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.read().unwrap().clone()
    }

    fn push(&self, prompt: &str) {
        self.prompts.write().unwrap().push(prompt.to_string());
    }

    fn finish(&self) {
        self.finished.fetch_add(1, Ordering::SeqCst);
    }
}

/// A mock LLM backend.
///
/// Answers every prompt with a fixed behavior, optionally overridden for
/// prompts that mention a given subject.
#[derive(Debug, Clone)]
pub struct MockProvider {
    name: String,
    display_name: String,
    default: Behavior,
    overrides: Vec<(String, Behavior)>,
    delay: Option<Duration>,
    calls: CallLog,
}

impl MockProvider {
    /// A provider that answers with an empty JSON object.
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            default: Behavior::Reply("{}".to_string()),
            overrides: Vec::new(),
            delay: None,
            calls: CallLog::default(),
        }
    }

    /// Answer every prompt with `text`.
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.default = Behavior::Reply(text.into());
        self
    }

    /// Answer with `text` when the prompt contains `needle`.
    pub fn with_reply_for(mut self, needle: impl Into<String>, text: impl Into<String>) -> Self {
        self.overrides.push((needle.into(), Behavior::Reply(text.into())));
        self
    }

    /// Fail every call with a network error.
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.default = Behavior::Fail(message.into());
        self
    }

    /// Fail with a network error when the prompt contains `needle`.
    pub fn failing_for(mut self, needle: impl Into<String>, message: impl Into<String>) -> Self {
        self.overrides.push((needle.into(), Behavior::Fail(message.into())));
        self
    }

    /// Behave like a backend with no API key.
    pub fn unconfigured(mut self) -> Self {
        self.default = Behavior::Unconfigured;
        self
    }

    /// Panic inside the call.
    pub fn panicking(mut self) -> Self {
        self.default = Behavior::Panic;
        self
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Handle on the call log.
    pub fn calls(&self) -> CallLog {
        self.calls.clone()
    }

    fn behavior_for(&self, prompt: &str) -> &Behavior {
        self.overrides
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, behavior)| behavior)
            .unwrap_or(&self.default)
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    async fn complete(&self, prompt: &str) -> ProviderResult<Completion> {
        self.calls.push(prompt);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.calls.finish();

        match self.behavior_for(prompt) {
            Behavior::Reply(text) => Ok(Completion::new(text.clone()).with_tokens(42)),
            Behavior::Fail(message) => Err(ProviderError::Network(message.clone())),
            Behavior::Unconfigured => Err(ProviderError::MissingCredentials {
                provider: self.name.clone(),
            }),
            Behavior::Panic => panic!("mock provider {} panicked", self.name),
        }
    }
}

/// A model reply carrying `findings` and `accuracy`, wrapped the way chat
/// models tend to answer: a sentence of prose and a fenced JSON block.
pub fn envelope(findings: &[Finding], accuracy: u8) -> String {
    let body = serde_json::json!({
        "description": "A software company.",
        "findings": findings,
        "accuracy_score": accuracy,
    });
    format!(
        "Here is my assessment.\n\n```json\n{}\n```\n",
        serde_json::to_string_pretty(&body).unwrap()
    )
}

/// A [`MemoryStore`] wrapper that fails on demand.
///
/// Writes fail for the configured subject ids; subject reads fail when
/// `failing_reads` is set. Everything else delegates.
pub struct FlakyStore {
    inner: MemoryStore,
    failing_writes: HashSet<String>,
    failing_reads: bool,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            failing_writes: HashSet::new(),
            failing_reads: false,
        }
    }

    /// Make `upsert_audit` fail for `subject_id`.
    pub fn failing_write_for(mut self, subject_id: impl Into<String>) -> Self {
        self.failing_writes.insert(subject_id.into());
        self
    }

    /// Make `list_subjects` fail.
    pub fn failing_reads(mut self) -> Self {
        self.failing_reads = true;
        self
    }

    pub fn inner(&self) -> &MemoryStore {
        &self.inner
    }
}

#[async_trait]
impl SubjectSource for FlakyStore {
    async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
        if self.failing_reads {
            return Err(AuditError::storage("ground truth store unreachable"));
        }
        self.inner.list_subjects(query).await
    }
}

#[async_trait]
impl AuditStore for FlakyStore {
    async fn claim(&self, subject_id: &str, run_id: Uuid, ttl: Duration) -> Result<bool> {
        self.inner.claim(subject_id, run_id, ttl).await
    }

    async fn release(&self, subject_id: &str, run_id: Uuid) -> Result<()> {
        self.inner.release(subject_id, run_id).await
    }

    async fn upsert_audit(&self, result: &AuditResult) -> Result<()> {
        if self.failing_writes.contains(&result.subject_id) {
            return Err(AuditError::storage(format!(
                "write rejected for {}",
                result.subject_id
            )));
        }
        self.inner.upsert_audit(result).await
    }

    async fn get_audit(&self, subject_id: &str) -> Result<Option<AuditResult>> {
        self.inner.get_audit(subject_id).await
    }

    async fn recent_audits(&self, limit: usize) -> Result<Vec<AuditResult>> {
        self.inner.recent_audits(limit).await
    }

    async fn count_audits(&self) -> Result<usize> {
        self.inner.count_audits().await
    }
}
