//! Render supervision.
//!
//! `RenderPipeline` owns the full life of one render: probe the
//! source, compile the overlay graph, run FFmpeg, stream progress into
//! the job record and write the terminal state. It is the only writer
//! of `done`/`error`.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use overcut_media::{
    compile, probe_media, AssetResolver, FfmpegCommand, FfmpegRunner, RenderProgress,
};
use overcut_models::{Job, JobId, JobPatch, JobStatus, LIVENESS_PROGRESS};
use overcut_store::{JobStore, StoreError};

use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::logging::JobLogger;
use crate::metrics;
use crate::retry::{retry_async, RetryConfig};
use crate::scheduler::JobRunner;

/// Streamed progress is capped just below 100 until FFmpeg has exited,
/// so pollers never see a false "done" while output is finalizing.
const PROGRESS_CEILING: f64 = 99.0;

/// Supervises single renders against a job store.
pub struct RenderPipeline {
    config: WorkerConfig,
    store: Arc<dyn JobStore>,
    resolver: AssetResolver,
}

impl RenderPipeline {
    pub fn new(config: WorkerConfig, store: Arc<dyn JobStore>) -> Self {
        let resolver = AssetResolver::new(&config.assets_dir);
        Self {
            config,
            store,
            resolver,
        }
    }

    /// Run one job to a terminal state.
    ///
    /// Returns the render error (if any) after it has been recorded on
    /// the job, so callers can log it; the job record itself is the
    /// public view of the outcome.
    pub async fn render(&self, job_id: &JobId) -> WorkerResult<()> {
        let logger = JobLogger::new(job_id, "render");

        let job = self.update_job(job_id, JobPatch::started()).await?;
        if job.status != JobStatus::Processing {
            // A terminal record is immutable; nothing to do.
            logger.log_warning("Job already terminal, skipping render");
            return Ok(());
        }

        logger.log_start(&format!(
            "{} with {} overlays",
            job.input_path.display(),
            job.overlays.len()
        ));
        metrics::record_started();
        let started = Instant::now();

        match self.render_inner(&job).await {
            Ok(output_path) => {
                self.update_job(job_id, JobPatch::completed(&output_path))
                    .await?;
                metrics::record_finished("done", started.elapsed().as_secs_f64());
                logger.log_completion(&format!("Output at {}", output_path.display()));
                Ok(())
            }
            Err(e) => {
                // Full diagnostic to the logs, short message to the record.
                logger.log_error(&e.to_string());
                if let Err(store_err) = self
                    .update_job(job_id, JobPatch::failed(e.public_message()))
                    .await
                {
                    logger.log_error(&format!(
                        "Failed to record terminal state: {}",
                        store_err
                    ));
                }
                metrics::record_finished("error", started.elapsed().as_secs_f64());
                Err(e)
            }
        }
    }

    async fn render_inner(&self, job: &Job) -> WorkerResult<PathBuf> {
        // 1. Probe the source; the duration anchors progress math.
        let info = probe_media(&job.input_path).await?;
        if info.duration <= 0.0 {
            return Err(WorkerError::job_failed(format!(
                "Could not determine duration of {}",
                job.input_path.display()
            )));
        }

        // 2. Compile the overlay graph, resolving asset references.
        let graph = compile(&job.overlays, &self.resolver)?;

        // 3. Build the invocation.
        tokio::fs::create_dir_all(&self.config.output_dir).await?;
        let output_path = self
            .config
            .output_dir
            .join(format!("{}_output.mp4", job.id));

        let cmd = match graph.output_label.as_deref() {
            // No stages: a straight stream copy of the input.
            None => FfmpegCommand::new(&job.input_path, &output_path).copy_streams(),
            Some(output_label) => FfmpegCommand::new(&job.input_path, &output_path)
                .add_inputs(&graph.extra_inputs)
                .filter_complex(&graph.filter_complex)
                .map(output_label)
                .map("0:a?")
                .video_codec("libx264")
                .audio_codec("aac"),
        };

        // 4-5. Spawn FFmpeg; progress records flow through a channel
        // into a writer task that owns the store updates.
        let (tx, rx) = mpsc::unbounded_channel::<RenderProgress>();
        let writer = self.spawn_progress_writer(job.id.clone(), info.duration, rx);

        let run_result = FfmpegRunner::new()
            .run_with_progress(&cmd, move |progress| {
                // Receiver gone means the render is being torn down.
                let _ = tx.send(progress);
            })
            .await;

        // The callback (and with it the sender) is dropped when the
        // stream ends, so this drains everything that was reported.
        writer.await.ok();

        run_result?;
        Ok(output_path)
    }

    /// Drain streamed progress into the job record, monotonically.
    fn spawn_progress_writer(
        &self,
        job_id: JobId,
        duration_secs: f64,
        mut rx: mpsc::UnboundedReceiver<RenderProgress>,
    ) -> JoinHandle<()> {
        let store = Arc::clone(&self.store);

        tokio::spawn(async move {
            let mut last_pct = LIVENESS_PROGRESS;

            while let Some(progress) = rx.recv().await {
                let pct = progress.percentage(duration_secs).min(PROGRESS_CEILING);
                if pct <= last_pct {
                    // Late or duplicate marker; progress never moves back.
                    continue;
                }
                last_pct = pct;

                if let Err(e) = store
                    .update(&job_id, JobPatch::new().progress(pct))
                    .await
                {
                    // Drop this marker; a later write may still land.
                    warn!(job_id = %job_id, "Failed to write progress: {}", e);
                }
            }
        })
    }

    /// Store write with bounded backoff; transient store hiccups must
    /// not lose lifecycle transitions.
    async fn update_job(&self, job_id: &JobId, patch: JobPatch) -> WorkerResult<Job> {
        let retry = RetryConfig::new("job_store_update");
        let job = retry_async(&retry, StoreError::is_retryable, || {
            let patch = patch.clone();
            async move { self.store.update(job_id, patch).await }
        })
        .await?;
        Ok(job)
    }
}

#[async_trait]
impl JobRunner for RenderPipeline {
    async fn run(&self, job_id: JobId) -> WorkerResult<()> {
        self.render(&job_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overcut_models::Overlay;
    use overcut_store::MemoryJobStore;
    use tempfile::TempDir;

    fn pipeline_with_store(dir: &TempDir) -> (RenderPipeline, Arc<MemoryJobStore>) {
        let config = WorkerConfig {
            max_concurrent_jobs: 1,
            upload_dir: dir.path().join("uploads"),
            output_dir: dir.path().join("outputs"),
            assets_dir: dir.path().join("assets"),
        };
        let store = Arc::new(MemoryJobStore::new());
        (
            RenderPipeline::new(config, Arc::clone(&store) as Arc<dyn JobStore>),
            store,
        )
    }

    #[tokio::test]
    async fn test_missing_input_fails_without_spawning() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline_with_store(&dir);

        let job = Job::new(
            dir.path().join("uploads/not-there.mp4"),
            vec![Overlay::text("Hi", 0.5, 0.1, 0.0, 3.0)],
        )
        .unwrap();
        let id = store.create(job).await.unwrap();

        assert!(pipeline.render(&id).await.is_err());

        let job = store.get(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert!(job.output_path.is_none());
        assert!(job.progress < 100.0);
        assert!(job.message.contains("not-there.mp4"));
    }

    #[tokio::test]
    async fn test_unknown_job_surfaces_store_error() {
        let dir = TempDir::new().unwrap();
        let (pipeline, _store) = pipeline_with_store(&dir);

        let err = pipeline.render(&JobId::from_string("ghost")).await.unwrap_err();
        assert!(matches!(err, WorkerError::Store(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_terminal_job_is_left_alone() {
        let dir = TempDir::new().unwrap();
        let (pipeline, store) = pipeline_with_store(&dir);

        let job = Job::new(dir.path().join("in.mp4"), vec![]).unwrap();
        let id = store.create(job).await.unwrap();
        store
            .update(&id, JobPatch::failed("earlier failure"))
            .await
            .unwrap();

        pipeline.render(&id).await.unwrap();

        let job = store.get(&id).await.unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.message, "earlier failure");
    }
}
