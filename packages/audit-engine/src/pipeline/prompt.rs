//! The uniform audit prompt sent to every provider.

use crate::types::{finding::Field, subject::Subject};

const RESPONSE_SHAPE: &str = r#"{
  "description": "<how you would describe the company, from your own knowledge>",
  "findings": [
    {
      "field": "<one of the fields listed above>",
      "type": "missing | incorrect | outdated | incomplete",
      "claimed": "<what you believed before reading the profile, or null>",
      "truth": "<the value from the verified profile>",
      "severity": "high | medium | low"
    }
  ],
  "accuracy_score": <0-100, how accurate your prior knowledge was overall>
}"#;

/// Build the audit prompt for one subject.
///
/// Asks the model to describe the subject from its own knowledge first,
/// then compare that description against the verified profile.
pub fn build_audit_prompt(subject: &Subject) -> String {
    let ground_truth = serde_json::to_string_pretty(&subject.ground_truth)
        .unwrap_or_else(|_| "{}".to_string());

    let vocabulary = Field::ALL
        .iter()
        .map(Field::as_str)
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        r#"You are auditing how accurately AI assistants describe a company.

Company: {name}
Domain: {domain}
Category: {category}

Step 1: Describe {name} using ONLY what you already know from your training data. Do not use the profile below for this step.

Step 2: Compare your description with this verified profile:
{ground_truth}

List every discrepancy between what you knew and the verified profile. Use only these fields: {vocabulary}.
- "missing": you knew nothing about it
- "incorrect": you believed something different
- "outdated": you knew an older value
- "incomplete": you knew only part of it

Respond with a single JSON object in exactly this shape and nothing else:
{shape}"#,
        name = subject.name,
        domain = subject.domain,
        category = subject.category,
        ground_truth = ground_truth,
        vocabulary = vocabulary,
        shape = RESPONSE_SHAPE,
    )
}
