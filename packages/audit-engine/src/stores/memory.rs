//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use uuid::Uuid;

use crate::error::{AuditError, Result};
use crate::traits::store::{AuditStore, SubjectSource};
use crate::types::{audit::AuditResult, config::SubjectQuery, subject::Subject};

/// In-memory ground truth, audits, and claims.
///
/// Useful for testing and development. Not suitable for production
/// as data is lost on restart.
pub struct MemoryStore {
    subjects: RwLock<BTreeMap<String, Subject>>,
    audits: RwLock<HashMap<String, AuditResult>>,
    claims: RwLock<HashMap<String, (Uuid, Instant)>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self {
            subjects: RwLock::new(BTreeMap::new()),
            audits: RwLock::new(HashMap::new()),
            claims: RwLock::new(HashMap::new()),
        }
    }

    /// Create a store seeded with subjects.
    pub fn with_subjects(subjects: impl IntoIterator<Item = Subject>) -> Self {
        let store = Self::new();
        if let Ok(mut map) = store.subjects.write() {
            map.extend(subjects.into_iter().map(|s| (s.id.clone(), s)));
        }
        store
    }

    /// Add or replace a subject.
    pub fn insert_subject(&self, subject: Subject) -> Result<()> {
        write(&self.subjects)?.insert(subject.id.clone(), subject);
        Ok(())
    }

    /// Number of stored audits.
    pub fn audit_count(&self) -> usize {
        self.audits.read().map(|a| a.len()).unwrap_or(0)
    }

    /// Number of live claims, regardless of age.
    pub fn claim_count(&self) -> usize {
        self.claims.read().map(|c| c.len()).unwrap_or(0)
    }
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read()
        .map_err(|_| AuditError::storage("memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write()
        .map_err(|_| AuditError::storage("memory store lock poisoned"))
}

#[async_trait]
impl SubjectSource for MemoryStore {
    async fn list_subjects(&self, query: &SubjectQuery) -> Result<Vec<Subject>> {
        let subjects = read(&self.subjects)?;
        let audits = read(&self.audits)?;

        Ok(subjects
            .values()
            .filter(|s| query.category.as_ref().map_or(true, |c| &s.category == c))
            .filter(|s| !query.only_enriched || s.is_enriched())
            .filter(|s| {
                !query.only_unaudited || (s.last_audited_at.is_none() && !audits.contains_key(&s.id))
            })
            .skip(query.offset)
            .take(query.limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl AuditStore for MemoryStore {
    async fn claim(&self, subject_id: &str, run_id: Uuid, ttl: Duration) -> Result<bool> {
        let mut claims = write(&self.claims)?;
        let now = Instant::now();

        match claims.get(subject_id) {
            Some((holder, at)) if *holder != run_id && now.duration_since(*at) < ttl => Ok(false),
            _ => {
                claims.insert(subject_id.to_string(), (run_id, now));
                Ok(true)
            }
        }
    }

    async fn release(&self, subject_id: &str, run_id: Uuid) -> Result<()> {
        let mut claims = write(&self.claims)?;
        if claims.get(subject_id).is_some_and(|(holder, _)| *holder == run_id) {
            claims.remove(subject_id);
        }
        Ok(())
    }

    /// Stores the result and stamps the subject's `last_audited_at`, holding
    /// both locks so readers never see one without the other.
    async fn upsert_audit(&self, result: &AuditResult) -> Result<()> {
        let mut subjects = write(&self.subjects)?;
        let mut audits = write(&self.audits)?;
        audits.insert(result.subject_id.clone(), result.clone());
        if let Some(subject) = subjects.get_mut(&result.subject_id) {
            subject.last_audited_at = Some(result.audited_at);
        }
        Ok(())
    }

    async fn get_audit(&self, subject_id: &str) -> Result<Option<AuditResult>> {
        Ok(read(&self.audits)?.get(subject_id).cloned())
    }

    async fn recent_audits(&self, limit: usize) -> Result<Vec<AuditResult>> {
        let mut audits: Vec<AuditResult> = read(&self.audits)?.values().cloned().collect();
        audits.sort_by(|a, b| {
            b.audited_at
                .cmp(&a.audited_at)
                .then_with(|| a.subject_id.cmp(&b.subject_id))
        });
        audits.truncate(limit);
        Ok(audits)
    }

    async fn count_audits(&self) -> Result<usize> {
        Ok(read(&self.audits)?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::audit::ConsensusReport;
    use crate::types::subject::GroundTruth;
    use chrono::Utc;

    fn subject(id: &str, category: &str, enriched: bool) -> Subject {
        let s = Subject::new(id, id.to_uppercase(), format!("{}.com", id), category);
        if enriched {
            s.with_ground_truth(GroundTruth::new().with_pricing("$10/mo"))
        } else {
            s
        }
    }

    fn result(id: &str) -> AuditResult {
        AuditResult::assemble(
            id,
            id,
            vec![],
            ConsensusReport {
                consensus_issues: vec![],
                worst_issues: vec![],
                overall_accuracy: 0.0,
                has_issues: false,
                models_responded: vec![],
            },
            String::new(),
        )
    }

    #[tokio::test]
    async fn test_list_filters_and_pages() {
        let store = MemoryStore::with_subjects([
            subject("a", "crm", true),
            subject("b", "crm", false),
            subject("c", "crm", true),
            subject("d", "analytics", true),
            subject("e", "crm", true),
        ]);

        let query = SubjectQuery {
            category: Some("crm".into()),
            only_enriched: true,
            only_unaudited: false,
            offset: 1,
            limit: 5,
        };
        let ids: Vec<String> = store
            .list_subjects(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["c", "e"]);
    }

    #[tokio::test]
    async fn test_only_unaudited_hides_audited() {
        let store = MemoryStore::with_subjects([subject("a", "crm", true), subject("b", "crm", true)]);
        store.upsert_audit(&result("a")).await.unwrap();

        let query = SubjectQuery {
            only_unaudited: true,
            limit: 10,
            ..Default::default()
        };
        let subjects = store.list_subjects(&query).await.unwrap();
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0].id, "b");
    }

    #[tokio::test]
    async fn test_only_unaudited_honors_last_audited_at() {
        // Audited elsewhere: a timestamp but no stored result.
        let store = MemoryStore::with_subjects([
            subject("a", "crm", true).with_last_audited_at(Utc::now()),
            subject("b", "crm", true),
        ]);

        let query = SubjectQuery {
            only_unaudited: true,
            limit: 10,
            ..Default::default()
        };
        let ids: Vec<String> = store
            .list_subjects(&query)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec!["b"]);
    }

    #[tokio::test]
    async fn test_upsert_stamps_last_audited_at() {
        let store = MemoryStore::with_subjects([subject("a", "crm", true)]);
        let audit = result("a");
        store.upsert_audit(&audit).await.unwrap();

        let query = SubjectQuery {
            limit: 10,
            ..Default::default()
        };
        let subjects = store.list_subjects(&query).await.unwrap();
        assert_eq!(subjects[0].last_audited_at, Some(audit.audited_at));
    }

    #[tokio::test]
    async fn test_claims_are_exclusive_until_released() {
        let store = MemoryStore::new();
        let (first, second) = (Uuid::new_v4(), Uuid::new_v4());
        let ttl = Duration::from_secs(60);

        assert!(store.claim("acme", first, ttl).await.unwrap());
        assert!(store.claim("acme", first, ttl).await.unwrap());
        assert!(!store.claim("acme", second, ttl).await.unwrap());

        store.release("acme", second).await.unwrap();
        assert_eq!(store.claim_count(), 1);

        store.release("acme", first).await.unwrap();
        assert!(store.claim("acme", second, ttl).await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_claim_can_be_taken() {
        let store = MemoryStore::new();
        assert!(store.claim("acme", Uuid::new_v4(), Duration::ZERO).await.unwrap());
        assert!(store.claim("acme", Uuid::new_v4(), Duration::ZERO).await.unwrap());
    }

    #[tokio::test]
    async fn test_upsert_replaces_and_counts() {
        let store = MemoryStore::new();
        store.upsert_audit(&result("a")).await.unwrap();
        store.upsert_audit(&result("a")).await.unwrap();
        store.upsert_audit(&result("b")).await.unwrap();

        assert_eq!(store.count_audits().await.unwrap(), 2);
        assert_eq!(store.recent_audits(1).await.unwrap().len(), 1);
        assert!(store.get_audit("b").await.unwrap().is_some());
        assert!(store.get_audit("z").await.unwrap().is_none());
    }
}
