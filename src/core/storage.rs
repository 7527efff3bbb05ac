use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::AcquireError;

/// The flat directory all artifacts are written into.
/// Only obtainable through [`DownloadDir::prepare`], so holding one means the directory exists.
#[derive(Debug, Clone)]
pub struct DownloadDir {
    root: PathBuf,
}

impl DownloadDir {
    /// Creates the directory if needed. Run once at startup, before any acquisition.
    pub fn prepare(root: impl Into<PathBuf>) -> Result<Self, AcquireError> {
        let root = root.into();
        std::fs::create_dir_all(&root).map_err(|e| AcquireError::io(&root, e))?;
        info!(dir = %root.display(), "download directory ready");
        Ok(Self { root })
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Path of `filename` inside the directory. Existing files there get overwritten.
    pub fn file(&self, filename: &str) -> PathBuf {
        self.path().join(filename)
    }
}
