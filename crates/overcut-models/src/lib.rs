//! Shared data models for the Overcut render backend.
//!
//! This crate provides Serde-serializable types for:
//! - Overlays (text captions, still images, secondary clips)
//! - Render jobs and their lifecycle state machine
//! - Partial job updates applied through the job store

pub mod job;
pub mod overlay;

// Re-export common types
pub use job::{Job, JobId, JobPatch, JobStatus, LIVENESS_PROGRESS};
pub use overlay::{Overlay, OverlayKind, OverlayValidationError, TextStyle};
