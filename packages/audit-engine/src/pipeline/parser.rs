//! Recover the structured audit envelope from a model's free-text reply.
//!
//! Models wrap the requested JSON in prose, markdown fences, or cut it off
//! mid-object. Extraction is best-effort and modelled as a tagged result;
//! nothing in here returns an error or panics on malformed input.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::types::finding::{Field, Finding, FindingType, Severity};

/// Fields recovered from one reply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedAudit {
    pub description: Option<String>,
    pub findings: Vec<Finding>,
    pub accuracy_score: u8,
}

/// Outcome of parsing one reply.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    Parsed(ParsedAudit),
    Unparseable,
}

impl ParseOutcome {
    /// The parsed value, or the zero value when nothing could be recovered.
    pub fn into_audit(self) -> ParsedAudit {
        match self {
            ParseOutcome::Parsed(audit) => audit,
            ParseOutcome::Unparseable => ParsedAudit::default(),
        }
    }

    pub fn is_parsed(&self) -> bool {
        matches!(self, ParseOutcome::Parsed(_))
    }
}

/// Parse a reply, falling back to the zero value.
pub fn parse_response(raw: &str) -> ParsedAudit {
    let outcome = try_parse_response(raw);
    if !outcome.is_parsed() {
        warn!(
            preview = %preview(raw, 200),
            "No parseable audit envelope in model reply"
        );
    }
    outcome.into_audit()
}

/// Parse a reply into a tagged outcome.
pub fn try_parse_response(raw: &str) -> ParseOutcome {
    for candidate in json_object_candidates(raw) {
        if let Ok(Value::Object(envelope)) = serde_json::from_str::<Value>(candidate) {
            return ParseOutcome::Parsed(read_envelope(&envelope));
        }
    }
    ParseOutcome::Unparseable
}

/// The first top-level `{...}` block in `raw` that is valid JSON.
pub fn extract_json_object(raw: &str) -> Option<&str> {
    json_object_candidates(raw)
        .into_iter()
        .find(|candidate| matches!(serde_json::from_str::<Value>(candidate), Ok(Value::Object(_))))
}

/// Balanced top-level brace spans in order, then the widest span as a last resort.
///
/// The scan skips braces inside JSON strings so `"{"` in a value does not
/// shift the nesting depth.
fn json_object_candidates(raw: &str) -> Vec<&str> {
    let mut candidates = Vec::new();
    let mut depth = 0usize;
    let mut start = None;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in raw.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' if depth > 0 => in_string = true,
            '{' => {
                if depth == 0 {
                    start = Some(i);
                }
                depth += 1;
            }
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    if let Some(s) = start.take() {
                        candidates.push(&raw[s..=i]);
                    }
                }
            }
            _ => {}
        }
    }

    if let (Some(first), Some(last)) = (raw.find('{'), raw.rfind('}')) {
        if last > first {
            let widest = &raw[first..=last];
            if !candidates.contains(&widest) {
                candidates.push(widest);
            }
        }
    }

    candidates
}

fn read_envelope(envelope: &Map<String, Value>) -> ParsedAudit {
    let description = envelope
        .get("description")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let findings = envelope
        .get("findings")
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(read_finding).collect())
        .unwrap_or_default();

    let accuracy_score = envelope
        .get("accuracy_score")
        .map(read_score)
        .unwrap_or(0);

    ParsedAudit {
        description,
        findings,
        accuracy_score,
    }
}

fn read_finding(item: &Value) -> Option<Finding> {
    let obj = item.as_object()?;

    let field = match obj.get("field").and_then(Value::as_str)?.parse::<Field>() {
        Ok(field) => field,
        Err(e) => {
            debug!(error = %e, "Dropping finding outside the field vocabulary");
            return None;
        }
    };

    let kind = match obj.get("type").and_then(Value::as_str)?.parse::<FindingType>() {
        Ok(kind) => kind,
        Err(e) => {
            debug!(error = %e, field = %field, "Dropping finding with unknown type");
            return None;
        }
    };

    let severity = match obj.get("severity").and_then(Value::as_str) {
        None => Severity::default(),
        Some(raw) => match raw.parse::<Severity>() {
            Ok(severity) => severity,
            Err(e) => {
                debug!(error = %e, field = %field, "Dropping finding with unknown severity");
                return None;
            }
        },
    };

    Some(Finding {
        field,
        kind,
        claimed: first_text(obj, &["claimed", "claimed_value"]),
        truth: first_text(obj, &["truth", "ground_truth", "ground_truth_value"]).unwrap_or_default(),
        severity,
    })
}

fn first_text(obj: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| match v {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

fn read_score(value: &Value) -> u8 {
    let raw = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
        .map(|v| v.clamp(0.0, 100.0).round() as u8)
        .unwrap_or(0)
}

fn preview(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}
