//! Subjects under audit and their trusted ground truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A company profile under audit.
///
/// Owned by the ground-truth store; read-only for the length of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    /// Stable slug, also the key audits are stored under
    pub id: String,

    /// Display name ("Acme")
    pub name: String,

    /// Primary domain ("acme.com")
    pub domain: String,

    /// Category used to scope batch runs ("crm", "analytics")
    pub category: String,

    /// Trusted attributes the models are checked against
    #[serde(default)]
    pub ground_truth: GroundTruth,

    /// When this subject was last audited, if ever
    #[serde(default)]
    pub last_audited_at: Option<DateTime<Utc>>,
}

impl Subject {
    /// Create a subject with empty ground truth.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        domain: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            domain: domain.into(),
            category: category.into(),
            ground_truth: GroundTruth::default(),
            last_audited_at: None,
        }
    }

    /// Set the ground truth.
    pub fn with_ground_truth(mut self, ground_truth: GroundTruth) -> Self {
        self.ground_truth = ground_truth;
        self
    }

    /// Mark when the subject was last audited.
    pub fn with_last_audited_at(mut self, at: DateTime<Utc>) -> Self {
        self.last_audited_at = Some(at);
        self
    }

    /// Whether enrichment data has been collected for this subject.
    pub fn is_enriched(&self) -> bool {
        !self.ground_truth.is_empty()
    }
}

/// Ground-truth context for one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroundTruth {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub integrations: Vec<String>,

    /// Ideal customer profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icp: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub offerings: Vec<String>,
}

impl GroundTruth {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_pricing(mut self, pricing: impl Into<String>) -> Self {
        self.pricing = Some(pricing.into());
        self
    }

    pub fn with_features(mut self, features: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.features = features.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_integrations(
        mut self,
        integrations: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.integrations = integrations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_icp(mut self, icp: impl Into<String>) -> Self {
        self.icp = Some(icp.into());
        self
    }

    pub fn with_offerings(mut self, offerings: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.offerings = offerings.into_iter().map(Into::into).collect();
        self
    }

    /// True when no attribute has been filled in.
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.pricing.is_none()
            && self.features.is_empty()
            && self.integrations.is_empty()
            && self.icp.is_none()
            && self.offerings.is_empty()
    }
}
