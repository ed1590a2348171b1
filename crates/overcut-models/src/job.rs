//! Render job record, lifecycle state machine and partial updates.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::overlay::{Overlay, OverlayValidationError};

/// Progress value a job jumps to the instant a worker picks it up, so
/// pollers can tell "queued" from "started" before the first real
/// progress marker arrives.
pub const LIVENESS_PROGRESS: f64 = 1.0;

/// Unique identifier for a render job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state of a render job.
///
/// `pending -> processing -> done | error`; the terminal states are
/// sticky and nothing transitions out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Accepted, waiting for a worker
    #[default]
    Pending,
    /// Owned by a worker, render in flight
    Processing,
    /// Output produced
    Done,
    /// Render failed
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Done => "done",
            JobStatus::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Error)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One render request and its tracked lifecycle state.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Unique job ID
    pub id: JobId,

    /// Resolved location of the uploaded source video; read-only here
    pub input_path: PathBuf,

    /// Produced file, set exactly once on success
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,

    /// Lifecycle state
    #[serde(default)]
    pub status: JobStatus,

    /// Human-readable last status note
    pub message: String,

    /// Compositing instructions, bottom to top; immutable after creation
    pub overlays: Vec<Overlay>,

    /// Percentage in [0, 100]; reaches 100 only together with `done`
    #[serde(default)]
    pub progress: f64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Job {
    /// Create a pending job, validating every overlay up front.
    ///
    /// Malformed overlays never enter the pipeline; the error names the
    /// offending field.
    pub fn new(
        input_path: impl Into<PathBuf>,
        overlays: Vec<Overlay>,
    ) -> Result<Self, OverlayValidationError> {
        for overlay in &overlays {
            overlay.validate()?;
        }

        let now = Utc::now();
        Ok(Self {
            id: JobId::new(),
            input_path: input_path.into(),
            output_path: None,
            status: JobStatus::Pending,
            message: "Queued".to_string(),
            overlays,
            progress: 0.0,
            created_at: now,
            updated_at: now,
        })
    }

    /// Apply a partial update, preserving the state-machine invariants:
    /// terminal records are immutable and progress never decreases.
    pub fn apply(mut self, patch: JobPatch) -> Self {
        if self.status.is_terminal() {
            return self;
        }

        if let Some(progress) = patch.progress {
            // 100 is reserved for the transition into `done`; streamed
            // markers cap just below it until the process has exited.
            let cap = if patch.status == Some(JobStatus::Done) {
                100.0
            } else {
                99.0
            };
            let progress = progress.clamp(0.0, cap);
            if progress > self.progress {
                self.progress = progress;
            }
        }
        if let Some(message) = patch.message {
            self.message = message;
        }
        if let Some(output_path) = patch.output_path {
            self.output_path = Some(output_path);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        self.updated_at = Utc::now();
        self
    }
}

/// Partial update to a job record, applied through [`Job::apply`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct JobPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

impl JobPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: JobStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn output_path(mut self, output_path: impl Into<PathBuf>) -> Self {
        self.output_path = Some(output_path.into());
        self
    }

    /// Patch marking the job picked up by a worker.
    pub fn started() -> Self {
        Self::new()
            .status(JobStatus::Processing)
            .progress(LIVENESS_PROGRESS)
            .message("Rendering started")
    }

    /// Patch marking the job finished with a produced output file.
    pub fn completed(output_path: impl Into<PathBuf>) -> Self {
        Self::new()
            .status(JobStatus::Done)
            .progress(100.0)
            .output_path(output_path)
            .message("Rendering complete")
    }

    /// Patch marking the job failed with a short diagnostic.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::new().status(JobStatus::Error).message(message)
    }
}
