//! Bounded-concurrency render scheduling.
//!
//! Submission is synchronous and fast; execution is asynchronous and
//! slow. An unbounded intake queue feeds a fixed pool of execution
//! slots, so submission bursts queue instead of oversubscribing the
//! host with FFmpeg processes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{error, info};

use overcut_models::JobId;

use crate::error::{WorkerError, WorkerResult};

/// One unit of work the scheduler can dispatch.
///
/// A seam between scheduling and rendering: production uses
/// [`crate::RenderPipeline`], tests use stubs.
#[async_trait]
pub trait JobRunner: Send + Sync + 'static {
    /// Run a job to a terminal state.
    async fn run(&self, job_id: JobId) -> WorkerResult<()>;
}

/// Fixed-size pool of render slots fed by a non-blocking intake queue.
///
/// At most `max_concurrent_jobs` runner calls execute at once, for any
/// burst of submissions. Jobs start in roughly submission order, with
/// no strict FIFO guarantee across slots; completion is observed by
/// polling the job record, not by ordering.
pub struct RenderScheduler {
    intake: mpsc::UnboundedSender<JobId>,
    shutdown: watch::Sender<bool>,
    slots: Arc<Semaphore>,
    max_concurrent_jobs: usize,
}

impl RenderScheduler {
    /// Start the dispatch loop with a fixed number of slots.
    pub fn start(max_concurrent_jobs: usize, runner: Arc<dyn JobRunner>) -> Self {
        let (intake, mut rx) = mpsc::unbounded_channel::<JobId>();
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let slots = Arc::new(Semaphore::new(max_concurrent_jobs));

        let dispatch_slots = Arc::clone(&slots);
        tokio::spawn(async move {
            info!(
                "Render scheduler started with {} slots",
                max_concurrent_jobs
            );

            loop {
                tokio::select! {
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    next = rx.recv() => {
                        let Some(job_id) = next else { break };

                        // Holds intake until a slot frees; queued
                        // submissions wait in the channel.
                        let permit = match Arc::clone(&dispatch_slots).acquire_owned().await {
                            Ok(permit) => permit,
                            Err(_) => break,
                        };

                        let runner = Arc::clone(&runner);
                        tokio::spawn(async move {
                            let _permit = permit;
                            if let Err(e) = runner.run(job_id.clone()).await {
                                // The runner has already recorded the
                                // failure on the job record.
                                error!(job_id = %job_id, "Render job failed: {}", e);
                            }
                        });
                    }
                }
            }

            info!("Render scheduler stopped");
        });

        Self {
            intake,
            shutdown,
            slots,
            max_concurrent_jobs,
        }
    }

    /// Accept a job ID for eventual execution. Returns immediately.
    pub fn submit(&self, job_id: JobId) -> WorkerResult<()> {
        self.intake
            .send(job_id)
            .map_err(|_| WorkerError::SchedulerClosed)
    }

    /// Number of renders currently executing.
    pub fn active_jobs(&self) -> usize {
        self.max_concurrent_jobs - self.slots.available_permits()
    }

    /// Stop dispatching queued work. In-flight renders finish.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait until every in-flight render has finished.
    pub async fn wait_idle(&self) {
        loop {
            if self.slots.available_permits() == self.max_concurrent_jobs {
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}
