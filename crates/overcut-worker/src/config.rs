//! Worker configuration.

use std::path::PathBuf;

/// Immutable configuration handed to each component at construction.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Maximum render jobs executing at once
    pub max_concurrent_jobs: usize,
    /// Directory uploaded source videos live in
    pub upload_dir: PathBuf,
    /// Directory rendered outputs are written to
    pub output_dir: PathBuf,
    /// Directory overlay assets are resolved under
    pub assets_dir: PathBuf,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_jobs: 4,
            upload_dir: PathBuf::from("/tmp/overcut/uploads"),
            output_dir: PathBuf::from("/tmp/overcut/outputs"),
            assets_dir: PathBuf::from("/tmp/overcut/assets"),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_concurrent_jobs: std::env::var("MAX_WORKERS")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_jobs),
            upload_dir: std::env::var("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            output_dir: std::env::var("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            assets_dir: std::env::var("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.assets_dir),
        }
    }
}
