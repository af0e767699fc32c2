//! Batch driver: page through subjects and audit them one at a time.
//!
//! Subjects are processed strictly in sequence with a courtesy delay between
//! them; only the provider calls for a single subject run concurrently.

use std::sync::Arc;

use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::error::{AuditError, Result};
use crate::pipeline::audit::Auditor;
use crate::traits::store::{AuditStore, SubjectSource};
use crate::types::{
    audit::AuditResult,
    batch::{AuditStats, BatchSummary},
    config::{AuditConfig, BatchRequest, SubjectQuery},
    subject::Subject,
};

/// Default number of recent audits inspected by [`BatchOrchestrator::status`].
pub const DEFAULT_STATUS_SAMPLE: usize = 20;

/// Top-level driver for audit runs.
///
/// All collaborators are injected; nothing here knows which providers or
/// which storage backend it is talking to.
pub struct BatchOrchestrator {
    subjects: Arc<dyn SubjectSource>,
    store: Arc<dyn AuditStore>,
    auditor: Auditor,
}

/// What happened to one subject inside a batch.
enum SubjectOutcome {
    Written(AuditResult),
    Skipped,
}

impl BatchOrchestrator {
    pub fn new(
        subjects: Arc<dyn SubjectSource>,
        store: Arc<dyn AuditStore>,
        auditor: Auditor,
    ) -> Self {
        Self {
            subjects,
            store,
            auditor,
        }
    }

    pub fn config(&self) -> &AuditConfig {
        self.auditor.config()
    }

    pub fn auditor(&self) -> &Auditor {
        &self.auditor
    }

    /// Run one page of audits.
    ///
    /// Only a bad request or an unreadable subject page fails the run;
    /// per-subject problems are logged and counted as skipped.
    #[instrument(skip(self), fields(offset = request.offset, batch_size = request.batch_size))]
    pub async fn run(&self, request: &BatchRequest) -> Result<BatchSummary> {
        let next_offset = self.validate(request)?;

        let subjects = self
            .subjects
            .list_subjects(&SubjectQuery::from(request))
            .await
            .map_err(|e| AuditError::SubjectsUnavailable(Box::new(e)))?;

        let run_id = Uuid::new_v4();
        let delay = self.config().subject_delay;
        let mut summary = BatchSummary::new(next_offset);

        info!(%run_id, subjects = subjects.len(), "Starting audit batch");

        for (i, subject) in subjects.iter().enumerate() {
            if i > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            match self.audit_one(subject, run_id, request.force_reaudit).await {
                SubjectOutcome::Written(result) => summary.record(result),
                SubjectOutcome::Skipped => summary.skipped += 1,
            }
        }

        let summary = summary.finish();
        info!(
            %run_id,
            processed = summary.processed,
            with_issues = summary.with_issues,
            skipped = summary.skipped,
            next_offset = summary.next_offset,
            "Audit batch complete"
        );
        Ok(summary)
    }

    /// Aggregate counts over stored audits.
    pub async fn status(&self, sample_size: usize) -> Result<AuditStats> {
        let total = self.store.count_audits().await?;
        let sample = self.store.recent_audits(sample_size).await?;
        Ok(AuditStats::from_sample(total, sample))
    }

    /// Reject unusable requests; returns the offset of the following page.
    fn validate(&self, request: &BatchRequest) -> Result<usize> {
        let max = self.config().max_batch_size;
        if request.batch_size == 0 || request.batch_size > max {
            return Err(AuditError::InvalidRequest {
                reason: format!("batch_size must be between 1 and {}", max),
            });
        }
        request
            .offset
            .checked_add(request.batch_size)
            .ok_or_else(|| AuditError::InvalidRequest {
                reason: format!("offset {} is out of range", request.offset),
            })
    }

    async fn audit_one(&self, subject: &Subject, run_id: Uuid, force: bool) -> SubjectOutcome {
        let ttl = self.config().claim_ttl;

        match self.store.claim(&subject.id, run_id, ttl).await {
            Ok(true) => {}
            Ok(false) => {
                info!(subject = %subject.id, "Subject claimed by another run, skipping");
                return SubjectOutcome::Skipped;
            }
            Err(e) => {
                error!(subject = %subject.id, error = %e, "Failed to claim subject");
                return SubjectOutcome::Skipped;
            }
        }

        // The page only held unaudited subjects; a result now means a concurrent run finished it.
        if !force {
            if let Ok(Some(_)) = self.store.get_audit(&subject.id).await {
                info!(subject = %subject.id, "Subject already audited, skipping");
                self.release(subject, run_id).await;
                return SubjectOutcome::Skipped;
            }
        }

        let result = self.auditor.audit(subject).await;

        let outcome = match self.store.upsert_audit(&result).await {
            Ok(()) => SubjectOutcome::Written(result),
            Err(e) => {
                error!(subject = %subject.id, error = %e, "Failed to persist audit, skipping subject");
                SubjectOutcome::Skipped
            }
        };

        self.release(subject, run_id).await;
        outcome
    }

    async fn release(&self, subject: &Subject, run_id: Uuid) {
        if let Err(e) = self.store.release(&subject.id, run_id).await {
            warn!(subject = %subject.id, error = %e, "Failed to release subject claim");
        }
    }
}
