//! In-memory job store.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use overcut_models::{Job, JobId, JobPatch};

use crate::error::{StoreError, StoreResult};
use crate::JobStore;

/// In-memory reference implementation of [`JobStore`].
///
/// Cheap to clone; clones share the same records.
#[derive(Debug, Clone, Default)]
pub struct MemoryJobStore {
    jobs: Arc<RwLock<HashMap<String, Job>>>,
}

impl MemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records held.
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

#[async_trait]
impl JobStore for MemoryJobStore {
    async fn create(&self, job: Job) -> StoreResult<JobId> {
        let mut jobs = self.jobs.write().await;
        let id = job.id.clone();

        if jobs.contains_key(id.as_str()) {
            return Err(StoreError::AlreadyExists(id));
        }

        debug!(job_id = %id, "Created job record");
        jobs.insert(id.as_str().to_string(), job);
        Ok(id)
    }

    async fn get(&self, id: &JobId) -> StoreResult<Job> {
        self.jobs
            .read()
            .await
            .get(id.as_str())
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }

    async fn update(&self, id: &JobId, patch: JobPatch) -> StoreResult<Job> {
        let mut jobs = self.jobs.write().await;
        let job = jobs
            .get_mut(id.as_str())
            .ok_or_else(|| StoreError::NotFound(id.clone()))?;

        *job = job.clone().apply(patch);
        Ok(job.clone())
    }

    async fn list(&self) -> StoreResult<Vec<Job>> {
        let jobs = self.jobs.read().await;
        let mut all: Vec<Job> = jobs.values().cloned().collect();
        // Stable, newest-first polling order.
        all.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overcut_models::{JobStatus, Overlay};

    fn sample_job() -> Job {
        Job::new(
            "/data/uploads/in.mp4",
            vec![Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0)],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_and_get() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        let id = store.create(job.clone()).await.unwrap();

        let fetched = store.get(&id).await.unwrap();
        assert_eq!(fetched.id, job.id);
        assert_eq!(fetched.status, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_id() {
        let store = MemoryJobStore::new();
        let job = sample_job();
        store.create(job.clone()).await.unwrap();

        assert!(matches!(
            store.create(job).await,
            Err(StoreError::AlreadyExists(_))
        ));
    }

    #[tokio::test]
    async fn test_get_missing_job() {
        let store = MemoryJobStore::new();
        let err = store.get(&JobId::from_string("nope")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_applies_patch() {
        let store = MemoryJobStore::new();
        let id = store.create(sample_job()).await.unwrap();

        let updated = store.update(&id, JobPatch::started()).await.unwrap();
        assert_eq!(updated.status, JobStatus::Processing);

        let updated = store
            .update(&id, JobPatch::new().progress(50.0))
            .await
            .unwrap();
        assert_eq!(updated.progress, 50.0);

        // Monotonicity holds across the store boundary too.
        let updated = store
            .update(&id, JobPatch::new().progress(10.0))
            .await
            .unwrap();
        assert_eq!(updated.progress, 50.0);
    }

    #[tokio::test]
    async fn test_update_keeps_terminal_records_immutable() {
        let store = MemoryJobStore::new();
        let id = store.create(sample_job()).await.unwrap();

        store
            .update(&id, JobPatch::failed("probe failed"))
            .await
            .unwrap();

        let after = store
            .update(&id, JobPatch::completed("/data/outputs/out.mp4"))
            .await
            .unwrap();
        assert_eq!(after.status, JobStatus::Error);
        assert!(after.output_path.is_none());
    }

    #[tokio::test]
    async fn test_list_returns_all_jobs() {
        let store = MemoryJobStore::new();
        store.create(sample_job()).await.unwrap();
        store.create(sample_job()).await.unwrap();

        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(store.len().await, 2);
    }
}
