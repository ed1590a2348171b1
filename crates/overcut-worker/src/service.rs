//! Service facade wiring store, pipeline and scheduler together.

use std::path::PathBuf;
use std::sync::Arc;

use overcut_models::{Job, JobId, Overlay};
use overcut_store::JobStore;

use crate::config::WorkerConfig;
use crate::error::WorkerResult;
use crate::render::RenderPipeline;
use crate::scheduler::RenderScheduler;

/// One handle for the whole render backend: validate and persist a
/// submission, hand it to the scheduler, poll the record for progress.
///
/// Transport layers (HTTP, CLI, tests) call this; they never touch the
/// pipeline directly.
pub struct RenderService {
    store: Arc<dyn JobStore>,
    scheduler: RenderScheduler,
}

impl RenderService {
    /// Wire a pipeline and scheduler over the given store.
    pub fn start(config: WorkerConfig, store: Arc<dyn JobStore>) -> Self {
        let pipeline = Arc::new(RenderPipeline::new(config.clone(), Arc::clone(&store)));
        let scheduler = RenderScheduler::start(config.max_concurrent_jobs, pipeline);

        Self { store, scheduler }
    }

    /// Validate, persist and enqueue a render request.
    ///
    /// Fast and non-blocking: the job is `pending` when this returns;
    /// poll [`Self::job`] for progress and the terminal state.
    pub async fn submit(
        &self,
        input_path: impl Into<PathBuf>,
        overlays: Vec<Overlay>,
    ) -> WorkerResult<JobId> {
        let job = Job::new(input_path, overlays)?;
        let id = self.store.create(job).await?;
        self.scheduler.submit(id.clone())?;
        Ok(id)
    }

    /// Fetch one job record.
    pub async fn job(&self, id: &JobId) -> WorkerResult<Job> {
        Ok(self.store.get(id).await?)
    }

    /// List all job records.
    pub async fn jobs(&self) -> WorkerResult<Vec<Job>> {
        Ok(self.store.list().await?)
    }

    /// Number of renders currently executing.
    pub fn active_jobs(&self) -> usize {
        self.scheduler.active_jobs()
    }

    /// Stop dispatching queued work; in-flight renders finish.
    pub fn shutdown(&self) {
        self.scheduler.shutdown();
    }

    /// Wait until every in-flight render has finished.
    pub async fn wait_idle(&self) {
        self.scheduler.wait_idle().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    use overcut_models::{JobStatus, OverlayValidationError};
    use overcut_store::MemoryJobStore;
    use tempfile::TempDir;

    use crate::error::WorkerError;

    fn service_in(dir: &TempDir) -> (RenderService, Arc<MemoryJobStore>) {
        let config = WorkerConfig {
            max_concurrent_jobs: 2,
            upload_dir: dir.path().join("uploads"),
            output_dir: dir.path().join("outputs"),
            assets_dir: dir.path().join("assets"),
        };
        let store = Arc::new(MemoryJobStore::new());
        (
            RenderService::start(config, Arc::clone(&store) as Arc<dyn JobStore>),
            store,
        )
    }

    async fn poll_until_terminal(service: &RenderService, id: &JobId) -> Job {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let job = service.job(id).await.unwrap();
            if job.status.is_terminal() {
                return job;
            }
            assert!(Instant::now() < deadline, "job never reached a terminal state");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_submit_rejects_invalid_overlays() {
        let dir = TempDir::new().unwrap();
        let (service, store) = service_in(&dir);

        let err = service
            .submit(
                dir.path().join("in.mp4"),
                vec![Overlay::text("Hi", 2.0, 0.1, 0.0, 3.0)],
            )
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WorkerError::Validation(OverlayValidationError::PositionOutOfRange { field: "x", .. })
        ));
        // Nothing entered the pipeline.
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_submit_returns_pending_immediately() {
        let dir = TempDir::new().unwrap();
        let (service, _store) = service_in(&dir);

        let id = service
            .submit(dir.path().join("missing.mp4"), vec![])
            .await
            .unwrap();

        // The record exists the moment submit returns; it may already
        // have been picked up, but it is never lost.
        let job = service.job(&id).await.unwrap();
        assert!(matches!(
            job.status,
            JobStatus::Pending | JobStatus::Processing | JobStatus::Error
        ));
    }

    #[tokio::test]
    async fn test_unreadable_input_ends_in_error() {
        let dir = TempDir::new().unwrap();
        let (service, _store) = service_in(&dir);

        let id = service
            .submit(
                dir.path().join("uploads/never-uploaded.mp4"),
                vec![Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0)],
            )
            .await
            .unwrap();

        let job = poll_until_terminal(&service, &id).await;
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.output_path.is_none());
        assert!(job.progress < 100.0);

        service.shutdown();
        service.wait_idle().await;
    }
}
