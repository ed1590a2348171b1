//! FFmpeg progress records.

use serde::{Deserialize, Serialize};

/// One record from FFmpeg's `-progress` stream.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RenderProgress {
    /// Current frame number
    pub frame: u64,
    /// Current encoding FPS
    pub fps: f64,
    /// Elapsed output time in microseconds (FFmpeg emits microseconds
    /// under both `out_time_us` and the misnamed `out_time_ms`)
    pub out_time_us: i64,
    /// Encoding speed (e.g., 1.5 = 1.5x realtime)
    pub speed: f64,
    /// Whether the stream reported `progress=end`
    pub is_complete: bool,
}

impl RenderProgress {
    /// Percentage of the output written, given the source duration in
    /// seconds. Unknown/zero durations report 0.
    pub fn percentage(&self, total_duration_secs: f64) -> f64 {
        if total_duration_secs <= 0.0 {
            return 0.0;
        }
        let elapsed_secs = self.out_time_us as f64 / 1_000_000.0;
        ((elapsed_secs / total_duration_secs) * 100.0).min(100.0)
    }
}
