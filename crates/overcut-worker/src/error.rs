//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Job failed: {0}")]
    JobFailed(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Scheduler is shut down")]
    SchedulerClosed,

    #[error("Invalid overlay: {0}")]
    Validation(#[from] overcut_models::OverlayValidationError),

    #[error("Media error: {0}")]
    Media(#[from] overcut_media::MediaError),

    #[error("Store error: {0}")]
    Store(#[from] overcut_store::StoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn job_failed(msg: impl Into<String>) -> Self {
        Self::JobFailed(msg.into())
    }

    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Short, caller-safe description for the job record; raw engine
    /// output never crosses this boundary.
    pub fn public_message(&self) -> String {
        match self {
            WorkerError::Media(e) => e.public_message(),
            WorkerError::Store(_) => "Job store unavailable".to_string(),
            other => other.to_string(),
        }
    }
}
