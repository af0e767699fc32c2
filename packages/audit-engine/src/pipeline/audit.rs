//! Audit one subject across every configured provider.

use std::collections::HashSet;

use futures::future::join_all;
use tokio::task::AbortHandle;
use tracing::{info, instrument, warn};

use crate::error::{AuditError, Result};
use crate::pipeline::{consensus::aggregate, hook::generate_hook, prompt::build_audit_prompt};
use crate::providers::ProviderAdapter;
use crate::types::{
    audit::{AuditResult, ProviderResponse},
    config::AuditConfig,
    subject::Subject,
};

/// Fans one subject out to all providers and folds the answers together.
#[derive(Clone)]
pub struct Auditor {
    adapters: Vec<ProviderAdapter>,
    config: AuditConfig,
}

/// Aborts the wrapped tasks when dropped.
///
/// Holding this across the join means a caller that gives up on an audit
/// (dropped request, outer timeout) also stops the provider calls.
struct AbortOnDrop(Vec<AbortHandle>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        for handle in &self.0 {
            handle.abort();
        }
    }
}

impl Auditor {
    /// Provider names key the stored responses, so they must be unique.
    pub fn new(adapters: Vec<ProviderAdapter>, config: AuditConfig) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(dup) = adapters.iter().find(|a| !seen.insert(a.name())) {
            return Err(AuditError::Config(format!(
                "duplicate provider name: {}",
                dup.name()
            )));
        }
        Ok(Self { adapters, config })
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    /// Provider keys in query order.
    pub fn provider_names(&self) -> Vec<String> {
        self.adapters.iter().map(|a| a.name().to_string()).collect()
    }

    /// Query every provider concurrently and wait for all of them.
    ///
    /// Each call runs on its own task so a panicking backend is contained
    /// like any other failure. Order of the result matches `adapters`.
    pub async fn query_all(&self, subject: &Subject) -> Vec<ProviderResponse> {
        let prompt = build_audit_prompt(subject);

        let handles: Vec<_> = self
            .adapters
            .iter()
            .cloned()
            .map(|adapter| {
                let prompt = prompt.clone();
                tokio::spawn(async move { adapter.query_prompt(&prompt).await })
            })
            .collect();
        let _guard = AbortOnDrop(handles.iter().map(|h| h.abort_handle()).collect());

        join_all(handles)
            .await
            .into_iter()
            .zip(&self.adapters)
            .map(|(joined, adapter)| match joined {
                Ok(response) => response,
                Err(e) => {
                    warn!(provider = %adapter.name(), error = %e, "Provider task aborted");
                    ProviderResponse::empty(adapter.name(), adapter.display_name())
                        .with_error(format!("provider task aborted: {}", e))
                }
            })
            .collect()
    }

    /// Run the full per-subject pipeline.
    #[instrument(skip(self, subject), fields(subject = %subject.id))]
    pub async fn audit(&self, subject: &Subject) -> AuditResult {
        let responses = self.query_all(subject).await;
        let report = aggregate(&responses, &self.config);
        let hook = generate_hook(&subject.name, &report.consensus_issues, &responses);

        info!(
            responded = report.models_responded.len(),
            queried = responses.len(),
            consensus = report.consensus_issues.len(),
            accuracy = report.overall_accuracy,
            "Subject audited"
        );

        AuditResult::assemble(&subject.id, &subject.name, responses, report, hook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{envelope, MockProvider};
    use crate::types::finding::{Field, Finding, FindingType};
    use std::sync::Arc;
    use std::time::Duration;

    fn adapter(mock: MockProvider) -> ProviderAdapter {
        ProviderAdapter::new(Arc::new(mock), Duration::from_secs(5))
    }

    #[tokio::test]
    async fn test_every_provider_is_queried_despite_failures() {
        let a = MockProvider::new("chatgpt", "ChatGPT").failing("down");
        let b = MockProvider::new("claude", "Claude").panicking();
        let c = MockProvider::new("perplexity", "Perplexity").with_reply(envelope(&[], 80));
        let (a_calls, c_calls) = (a.calls(), c.calls());

        let auditor =
            Auditor::new(vec![adapter(a), adapter(b), adapter(c)], AuditConfig::default()).unwrap();
        let responses = auditor.query_all(&Subject::new("acme", "Acme", "acme.com", "crm")).await;

        assert_eq!(a_calls.count(), 1);
        assert_eq!(c_calls.count(), 1);
        let names: Vec<&str> = responses.iter().map(|r| r.provider.as_str()).collect();
        assert_eq!(names, vec!["chatgpt", "claude", "perplexity"]);
        assert!(responses[1].error.as_deref().unwrap_or_default().starts_with("provider task aborted"));
        assert_eq!(responses[2].accuracy_score, 80);
    }

    #[tokio::test(start_paused = true)]
    async fn test_providers_run_concurrently() {
        let slow = |key: &str| {
            MockProvider::new(key, key)
                .with_reply(envelope(&[], 70))
                .with_delay(Duration::from_secs(3))
        };
        let auditor = Auditor::new(
            vec![adapter(slow("a")), adapter(slow("b")), adapter(slow("c"))],
            AuditConfig::default(),
        )
        .unwrap();

        let start = tokio::time::Instant::now();
        auditor.query_all(&Subject::new("acme", "Acme", "acme.com", "crm")).await;
        assert!(start.elapsed() < Duration::from_secs(4));
    }

    #[tokio::test]
    async fn test_audit_assembles_result() {
        let pricing = [Finding::new(Field::Pricing, FindingType::Incorrect)];
        let auditor = Auditor::new(
            vec![
                adapter(MockProvider::new("chatgpt", "ChatGPT").with_reply(envelope(&pricing, 40))),
                adapter(MockProvider::new("claude", "Claude").with_reply(envelope(&pricing, 50))),
            ],
            AuditConfig::default(),
        )
        .unwrap();

        let result = auditor.audit(&Subject::new("acme", "Acme", "acme.com", "crm")).await;
        assert_eq!(result.subject_id, "acme");
        assert_eq!(result.consensus_issues, vec![Field::Pricing]);
        assert_eq!(result.overall_accuracy, 45.0);
        assert_eq!(result.model_responses.len(), 2);
        assert_eq!(
            result.hook,
            "Asked ChatGPT and Claude about Acme — both got your pricing wrong."
        );
    }

    #[test]
    fn test_duplicate_provider_names_are_rejected() {
        let result = Auditor::new(
            vec![
                adapter(MockProvider::new("chatgpt", "ChatGPT")),
                adapter(MockProvider::new("chatgpt", "Other GPT")),
            ],
            AuditConfig::default(),
        );

        assert!(matches!(result, Err(AuditError::Config(msg)) if msg.contains("chatgpt")));
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_the_audit_stops_provider_calls() {
        let mock = MockProvider::new("chatgpt", "ChatGPT")
            .with_reply(envelope(&[], 70))
            .with_delay(Duration::from_secs(30));
        let calls = mock.calls();
        let patient = ProviderAdapter::new(Arc::new(mock), Duration::from_secs(120));
        let auditor = Auditor::new(vec![patient], AuditConfig::default()).unwrap();
        let subject = Subject::new("acme", "Acme", "acme.com", "crm");

        let gave_up = tokio::time::timeout(Duration::from_secs(1), auditor.query_all(&subject)).await;
        assert!(gave_up.is_err());

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(calls.count(), 1);
        assert_eq!(calls.finished(), 0);
    }
}
