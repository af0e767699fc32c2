//! Per-provider responses and per-subject audit results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::finding::{Field, Finding};

/// One backend's answer for one subject. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderResponse {
    /// Stable provider key ("chatgpt")
    pub provider: String,

    /// Name used in outreach copy ("ChatGPT")
    pub display_name: String,

    /// The model's own description of the subject
    pub description: Option<String>,

    pub findings: Vec<Finding>,

    /// 0-100, as self-reported by the model
    pub accuracy_score: u8,

    #[serde(default)]
    pub tokens_used: Option<u32>,

    #[serde(default)]
    pub latency_ms: u64,

    /// Set when the call failed and this is the empty fallback
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ProviderResponse {
    /// The valid-but-empty response used whenever a backend fails.
    pub fn empty(provider: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            display_name: display_name.into(),
            description: None,
            findings: Vec::new(),
            accuracy_score: 0,
            tokens_used: None,
            latency_ms: 0,
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_findings(mut self, findings: Vec<Finding>) -> Self {
        self.findings = findings;
        self
    }

    pub fn with_accuracy(mut self, accuracy_score: u8) -> Self {
        self.accuracy_score = accuracy_score;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Whether the model actually answered, as opposed to the zero fallback.
    pub fn responded(&self) -> bool {
        self.accuracy_score > 0 || !self.findings.is_empty()
    }

    /// Whether this response carries a finding on `field`.
    pub fn flags(&self, field: Field) -> bool {
        self.findings.iter().any(|f| f.field == field)
    }
}

/// The aggregator's view of one subject's responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusReport {
    /// Fields flagged by enough distinct providers, most-reported first
    pub consensus_issues: Vec<Field>,

    /// Shortlist of the most important findings
    pub worst_issues: Vec<Finding>,

    pub overall_accuracy: f64,

    pub has_issues: bool,

    /// Providers that actually answered, in query order
    pub models_responded: Vec<String>,
}

/// The stored outcome of auditing one subject. Written whole or not at all.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditResult {
    pub subject_id: String,
    pub subject_name: String,
    pub model_responses: BTreeMap<String, ProviderResponse>,
    pub models_responded: Vec<String>,
    pub consensus_issues: Vec<Field>,
    pub worst_issues: Vec<Finding>,
    pub overall_accuracy: f64,
    pub has_issues: bool,
    pub hook: String,
    pub audited_at: DateTime<Utc>,
}

impl AuditResult {
    /// Assemble the stored result from its parts.
    pub fn assemble(
        subject_id: impl Into<String>,
        subject_name: impl Into<String>,
        responses: Vec<ProviderResponse>,
        report: ConsensusReport,
        hook: String,
    ) -> Self {
        Self {
            subject_id: subject_id.into(),
            subject_name: subject_name.into(),
            model_responses: responses
                .into_iter()
                .map(|r| (r.provider.clone(), r))
                .collect(),
            models_responded: report.models_responded,
            consensus_issues: report.consensus_issues,
            worst_issues: report.worst_issues,
            overall_accuracy: report.overall_accuracy,
            has_issues: report.has_issues,
            hook,
            audited_at: Utc::now(),
        }
    }

    pub fn has_consensus(&self) -> bool {
        !self.consensus_issues.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::finding::FindingType;

    #[test]
    fn test_empty_response_has_not_responded() {
        let response = ProviderResponse::empty("claude", "Claude").with_error("timed out after 60s");
        assert!(!response.responded());
        assert_eq!(response.accuracy_score, 0);
        assert!(response.findings.is_empty());
    }

    #[test]
    fn test_score_or_findings_count_as_responded() {
        assert!(ProviderResponse::empty("a", "A").with_accuracy(80).responded());
        assert!(ProviderResponse::empty("b", "B")
            .with_findings(vec![Finding::new(Field::Pricing, FindingType::Missing)])
            .responded());
    }
}
