//! FFmpeg CLI wrapper for overlay compositing.
//!
//! This crate provides:
//! - Asset reference resolution against a configured assets root
//! - Compilation of an overlay list into a `filter_complex` graph
//! - Type-safe FFmpeg command building with multiple inputs
//! - Progress parsing from `-progress pipe:2`
//! - Source probing via ffprobe

pub mod assets;
pub mod command;
pub mod error;
pub mod graph;
pub mod probe;
pub mod progress;

pub use assets::AssetResolver;
pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use graph::{compile, OverlayGraph};
pub use probe::{duration, probe_media, SourceInfo};
pub use progress::RenderProgress;
