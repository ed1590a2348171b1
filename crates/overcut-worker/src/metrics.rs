//! Render metrics collection.
//!
//! Counters and histograms via the `metrics` facade; exporter wiring
//! is the embedding service's concern.

use metrics::{counter, histogram};

/// Metric name constants for consistency.
pub mod names {
    /// Renders picked up by a worker.
    pub const RENDERS_STARTED_TOTAL: &str = "render_jobs_started_total";

    /// Renders reaching a terminal state, labeled by outcome.
    pub const RENDERS_FINISHED_TOTAL: &str = "render_jobs_finished_total";

    /// Wall-clock render duration in seconds, labeled by outcome.
    pub const RENDER_DURATION_SECONDS: &str = "render_duration_seconds";
}

/// Record a render starting.
pub fn record_started() {
    counter!(names::RENDERS_STARTED_TOTAL).increment(1);
}

/// Record a render reaching a terminal state.
pub fn record_finished(outcome: &str, elapsed_secs: f64) {
    counter!(
        names::RENDERS_FINISHED_TOTAL,
        "outcome" => outcome.to_string()
    )
    .increment(1);

    histogram!(
        names::RENDER_DURATION_SECONDS,
        "outcome" => outcome.to_string()
    )
    .record(elapsed_secs);
}
