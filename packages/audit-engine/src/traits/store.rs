//! Storage traits for ground truth and audit results.
//!
//! - `SubjectSource`: read-only pages of subjects from the ground-truth store
//! - `AuditStore`: claims, upserts, and reads of audit results

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::Result;
use crate::types::{audit::AuditResult, config::SubjectQuery, subject::Subject};

/// Read access to the ground-truth store.
#[async_trait]
pub trait SubjectSource: Send + Sync {
    /// One page of subjects matching `query`, ordered by id.
    async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>>;
}

/// Write access (and an inspection read path) for audit results.
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Try to take exclusive ownership of a subject for one run.
    ///
    /// Returns `false` if another run holds a claim younger than `ttl`.
    /// Re-claiming with the same `run_id` succeeds.
    async fn claim(&self, subject_id: &str, run_id: Uuid, ttl: Duration) -> Result<bool>;

    /// Drop a claim held by `run_id`. Unknown claims are ignored.
    async fn release(&self, subject_id: &str, run_id: Uuid) -> Result<()>;

    /// Insert or replace the result for `result.subject_id`.
    async fn upsert_audit(&self, result: &AuditResult) -> Result<()>;

    async fn get_audit(&self, subject_id: &str) -> Result<Option<AuditResult>>;

    /// Most recent results, newest first.
    async fn recent_audits(&self, limit: usize) -> Result<Vec<AuditResult>>;

    async fn count_audits(&self) -> Result<usize>;
}
