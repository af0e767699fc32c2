//! Batch run summaries and operational stats.

use serde::{Deserialize, Serialize};

use super::audit::AuditResult;

/// What one batch invocation did. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub message: String,

    /// Subjects audited and written
    pub processed: usize,

    /// Of those, how many had at least one finding
    pub with_issues: usize,

    /// Subjects claimed by another run or whose write failed
    pub skipped: usize,

    /// Offset to request next; always `offset + batch_size`
    pub next_offset: usize,

    pub results: Vec<AuditResult>,
}

impl BatchSummary {
    pub fn new(next_offset: usize) -> Self {
        Self {
            message: String::new(),
            processed: 0,
            with_issues: 0,
            skipped: 0,
            next_offset,
            results: Vec::new(),
        }
    }

    /// Count and keep one written result.
    pub fn record(&mut self, result: AuditResult) {
        self.processed += 1;
        if result.has_issues {
            self.with_issues += 1;
        }
        self.results.push(result);
    }

    pub fn finish(mut self) -> Self {
        self.message = format!(
            "Audited {} subjects, {} with issues",
            self.processed, self.with_issues
        );
        if self.skipped > 0 {
            self.message.push_str(&format!(", {} skipped", self.skipped));
        }
        self
    }
}

/// Aggregate counts for operational inspection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditStats {
    pub total_audited: usize,

    /// Within `sample`, results with any finding
    pub sample_with_issues: usize,

    /// Within `sample`, results with at least one consensus issue
    pub sample_with_consensus: usize,

    /// Most recent results, newest first
    pub sample: Vec<AuditResult>,
}

impl AuditStats {
    pub fn from_sample(total_audited: usize, sample: Vec<AuditResult>) -> Self {
        Self {
            total_audited,
            sample_with_issues: sample.iter().filter(|r| r.has_issues).count(),
            sample_with_consensus: sample.iter().filter(|r| r.has_consensus()).count(),
            sample,
        }
    }
}
