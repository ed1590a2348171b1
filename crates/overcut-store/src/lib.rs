//! Job record store: the persistence contract the render pipeline
//! writes through and external callers poll.
//!
//! The trait assumes many-reader/one-writer semantics per record: at
//! most one worker mutates a given job at a time, readers may poll
//! concurrently. `MemoryJobStore` is the in-process reference
//! implementation; durable backends implement the same trait.

pub mod error;
pub mod memory;

use async_trait::async_trait;

use overcut_models::{Job, JobId, JobPatch};

pub use error::{StoreError, StoreResult};
pub use memory::MemoryJobStore;

/// Key-value contract for job records.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Persist a new job, returning its ID.
    async fn create(&self, job: Job) -> StoreResult<JobId>;

    /// Fetch a job by ID.
    async fn get(&self, id: &JobId) -> StoreResult<Job>;

    /// Apply a partial update and return the updated record.
    ///
    /// Updates go through [`Job::apply`], so terminal records stay
    /// immutable and progress never decreases.
    async fn update(&self, id: &JobId, patch: JobPatch) -> StoreResult<Job>;

    /// List all known jobs.
    async fn list(&self) -> StoreResult<Vec<Job>>;
}
