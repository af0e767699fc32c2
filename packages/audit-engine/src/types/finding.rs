//! Discrepancies reported by a model.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Profile attribute a finding can be about. Closed vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Pricing,
    Description,
    Category,
    Features,
    Icp,
    Integrations,
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Pricing,
        Field::Description,
        Field::Category,
        Field::Features,
        Field::Icp,
        Field::Integrations,
    ];

    /// Wire name, as used in prompts and stored JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Field::Pricing => "pricing",
            Field::Description => "description",
            Field::Category => "category",
            Field::Features => "features",
            Field::Icp => "icp",
            Field::Integrations => "integrations",
        }
    }

    /// Human wording for outreach copy.
    pub fn label(&self) -> &'static str {
        match self {
            Field::Icp => "ideal customer profile",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Field {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pricing" => Ok(Field::Pricing),
            "description" => Ok(Field::Description),
            "category" => Ok(Field::Category),
            "features" => Ok(Field::Features),
            "icp" => Ok(Field::Icp),
            "integrations" => Ok(Field::Integrations),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// How the model's claim differs from ground truth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingType {
    Missing,
    Incorrect,
    Outdated,
    Incomplete,
}

impl FromStr for FindingType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "missing" => Ok(FindingType::Missing),
            "incorrect" => Ok(FindingType::Incorrect),
            "outdated" => Ok(FindingType::Outdated),
            "incomplete" => Ok(FindingType::Incomplete),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    #[default]
    Medium,
    Low,
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Severity::High),
            "medium" => Ok(Severity::Medium),
            "low" => Ok(Severity::Low),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

/// A value outside one of the closed vocabularies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown value '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

/// One discrepancy between what a model claims and the ground truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub field: Field,

    #[serde(rename = "type")]
    pub kind: FindingType,

    /// What the model said; `None` when it said nothing
    #[serde(default)]
    pub claimed: Option<String>,

    /// What the ground truth says
    #[serde(default)]
    pub truth: String,

    #[serde(default)]
    pub severity: Severity,
}

impl Finding {
    pub fn new(field: Field, kind: FindingType) -> Self {
        Self {
            field,
            kind,
            claimed: None,
            truth: String::new(),
            severity: Severity::default(),
        }
    }

    pub fn with_claimed(mut self, claimed: impl Into<String>) -> Self {
        self.claimed = Some(claimed.into());
        self
    }

    pub fn with_truth(mut self, truth: impl Into<String>) -> Self {
        self.truth = truth.into();
        self
    }

    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_parsing_is_case_insensitive() {
        assert_eq!("Pricing".parse::<Field>(), Ok(Field::Pricing));
        assert_eq!(" ICP ".parse::<Field>(), Ok(Field::Icp));
        assert!("revenue".parse::<Field>().is_err());
    }

    #[test]
    fn test_icp_label() {
        assert_eq!(Field::Icp.label(), "ideal customer profile");
        assert_eq!(Field::Pricing.label(), "pricing");
    }

    #[test]
    fn test_finding_serializes_type_key() {
        let finding = Finding::new(Field::Pricing, FindingType::Incorrect)
            .with_claimed("$10/mo")
            .with_truth("$29/mo")
            .with_severity(Severity::High);

        let json = serde_json::to_value(&finding).unwrap();
        assert_eq!(json["field"], "pricing");
        assert_eq!(json["type"], "incorrect");
        assert_eq!(json["severity"], "high");
    }
}
