//! Overlay asset resolution.

use std::path::{Path, PathBuf};

use crate::error::{MediaError, MediaResult};

/// Maps an overlay's content reference to a concrete, existing file.
///
/// Resolution is a fresh filesystem check on every call; assets may
/// appear or change between renders and nothing is cached.
#[derive(Debug, Clone)]
pub struct AssetResolver {
    assets_root: PathBuf,
}

impl AssetResolver {
    /// Create a resolver rooted at the configured assets directory.
    pub fn new(assets_root: impl Into<PathBuf>) -> Self {
        Self {
            assets_root: assets_root.into(),
        }
    }

    /// Resolve a reference to an existing path.
    ///
    /// An absolute, existing path is returned as-is; anything else is
    /// treated as a filename under the assets root. Failure reports
    /// every candidate that was probed.
    pub fn resolve(&self, reference: &str) -> MediaResult<PathBuf> {
        let raw = Path::new(reference);
        let mut tried = Vec::new();

        if raw.is_absolute() {
            if raw.exists() {
                return Ok(raw.to_path_buf());
            }
            tried.push(raw.to_path_buf());
        }

        let candidate = self.assets_root.join(reference);
        if candidate.exists() {
            return Ok(candidate);
        }
        tried.push(candidate);

        Err(MediaError::AssetNotFound {
            reference: reference.to_string(),
            tried,
        })
    }
}
