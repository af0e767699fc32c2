//! Configuration and request types for audit runs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// How `overall_accuracy` treats providers that never answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyBasis {
    /// Mean over every queried provider; failures count as 0.
    #[default]
    AllProviders,

    /// Mean over providers that responded; 0 when none did.
    RespondedOnly,
}

/// Policy knobs for the audit pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Distinct providers that must flag a field before it is a consensus issue.
    ///
    /// Default: 2.
    pub consensus_threshold: usize,

    /// Maximum findings kept in the worst-issues shortlist.
    ///
    /// Default: 5.
    pub worst_issue_limit: usize,

    /// Courtesy pause between subjects in a batch.
    ///
    /// Default: 1s.
    #[serde(with = "millis")]
    pub subject_delay: Duration,

    /// Deadline for a single provider call.
    ///
    /// Default: 60s.
    #[serde(with = "millis")]
    pub provider_timeout: Duration,

    /// How long a subject claim blocks other runs.
    ///
    /// Default: 15 minutes.
    #[serde(with = "millis")]
    pub claim_ttl: Duration,

    pub accuracy_basis: AccuracyBasis,

    /// Upper bound on `batch_size` accepted from callers.
    ///
    /// Default: 50.
    pub max_batch_size: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            consensus_threshold: 2,
            worst_issue_limit: 5,
            subject_delay: Duration::from_millis(1000),
            provider_timeout: Duration::from_secs(60),
            claim_ttl: Duration::from_secs(15 * 60),
            accuracy_basis: AccuracyBasis::AllProviders,
            max_batch_size: 50,
        }
    }
}

impl AuditConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the consensus threshold. Values below 1 are raised to 1.
    pub fn with_consensus_threshold(mut self, threshold: usize) -> Self {
        self.consensus_threshold = threshold.max(1);
        self
    }

    pub fn with_worst_issue_limit(mut self, limit: usize) -> Self {
        self.worst_issue_limit = limit;
        self
    }

    pub fn with_subject_delay(mut self, delay: Duration) -> Self {
        self.subject_delay = delay;
        self
    }

    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_claim_ttl(mut self, ttl: Duration) -> Self {
        self.claim_ttl = ttl;
        self
    }

    pub fn with_accuracy_basis(mut self, basis: AccuracyBasis) -> Self {
        self.accuracy_basis = basis;
        self
    }

    pub fn with_max_batch_size(mut self, max: usize) -> Self {
        self.max_batch_size = max;
        self
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

/// Parameters for one batch invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchRequest {
    /// Only audit subjects in this category
    #[serde(default)]
    pub category: Option<String>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    #[serde(default)]
    pub offset: usize,

    /// Skip subjects without enrichment data
    #[serde(default = "default_true")]
    pub only_enriched: bool,

    /// Re-audit subjects that already have a result
    #[serde(default)]
    pub force_reaudit: bool,
}

fn default_batch_size() -> usize {
    10
}

fn default_true() -> bool {
    true
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            category: None,
            batch_size: default_batch_size(),
            offset: 0,
            only_enriched: true,
            force_reaudit: false,
        }
    }
}

impl BatchRequest {
    pub fn new(batch_size: usize, offset: usize) -> Self {
        Self {
            batch_size,
            offset,
            ..Default::default()
        }
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn including_unenriched(mut self) -> Self {
        self.only_enriched = false;
        self
    }

    pub fn forced(mut self) -> Self {
        self.force_reaudit = true;
        self
    }
}

/// Page query against the ground-truth store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectQuery {
    pub category: Option<String>,
    pub only_enriched: bool,
    pub only_unaudited: bool,
    pub offset: usize,
    pub limit: usize,
}

impl From<&BatchRequest> for SubjectQuery {
    fn from(request: &BatchRequest) -> Self {
        Self {
            category: request.category.clone(),
            only_enriched: request.only_enriched,
            only_unaudited: !request.force_reaudit,
            offset: request.offset,
            limit: request.batch_size,
        }
    }
}
