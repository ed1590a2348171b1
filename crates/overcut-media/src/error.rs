//! Error types for media operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for media operations.
pub type MediaResult<T> = Result<T, MediaError>;

/// Errors that can occur while compiling or running a render.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("FFmpeg not found in PATH")]
    FfmpegNotFound,

    #[error("FFprobe not found in PATH")]
    FfprobeNotFound,

    #[error("FFmpeg command failed: {message}")]
    FfmpegFailed {
        message: String,
        stderr: Option<String>,
        exit_code: Option<i32>,
    },

    #[error("FFprobe command failed: {message}")]
    ProbeFailed {
        message: String,
        stderr: Option<String>,
    },

    #[error("Overlay asset not found: {reference} (tried {})", format_tried(.tried))]
    AssetNotFound {
        reference: String,
        tried: Vec<PathBuf>,
    },

    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Invalid media file: {0}")]
    InvalidMedia(String),

    #[error("Render cancelled")]
    Cancelled,

    #[error("Render timed out after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

fn format_tried(tried: &[PathBuf]) -> String {
    tried
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl MediaError {
    /// Create an FFmpeg failure error.
    pub fn ffmpeg_failed(
        message: impl Into<String>,
        stderr: Option<String>,
        exit_code: Option<i32>,
    ) -> Self {
        Self::FfmpegFailed {
            message: message.into(),
            stderr,
            exit_code,
        }
    }

    /// Create a probe failure error.
    pub fn probe_failed(message: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ProbeFailed {
            message: message.into(),
            stderr,
        }
    }

    /// Short, caller-safe description, with any raw engine output left
    /// for the logs.
    pub fn public_message(&self) -> String {
        match self {
            MediaError::FfmpegFailed {
                message, exit_code, ..
            } => match exit_code {
                Some(code) => format!("{} (exit code {})", message, code),
                None => message.clone(),
            },
            MediaError::ProbeFailed { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_not_found_lists_tried_paths() {
        let err = MediaError::AssetNotFound {
            reference: "logo.png".to_string(),
            tried: vec![PathBuf::from("/assets/logo.png")],
        };
        let rendered = err.to_string();
        assert!(rendered.contains("logo.png"));
        assert!(rendered.contains("/assets/logo.png"));
    }

    #[test]
    fn test_public_message_omits_stderr() {
        let err = MediaError::ffmpeg_failed(
            "FFmpeg exited with non-zero status",
            Some("long raw diagnostic output".to_string()),
            Some(1),
        );
        let public = err.public_message();
        assert!(public.contains("exit code 1"));
        assert!(!public.contains("diagnostic"));
    }
}
