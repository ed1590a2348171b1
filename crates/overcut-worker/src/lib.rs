//! Render worker.
//!
//! This crate provides:
//! - The render supervision pipeline (probe, compile, spawn, stream
//!   progress, write terminal state)
//! - A bounded-concurrency scheduler with a non-blocking intake queue
//! - Worker configuration, per-job logging and store-write retry
//! - A service facade wiring the pieces over a job store

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod render;
pub mod retry;
pub mod scheduler;
pub mod service;

pub use config::WorkerConfig;
pub use error::{WorkerError, WorkerResult};
pub use logging::JobLogger;
pub use render::RenderPipeline;
pub use scheduler::{JobRunner, RenderScheduler};
pub use service::RenderService;
