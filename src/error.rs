use std::path::PathBuf;

use thiserror::Error;

/// Failure talking to the upstream aggregator.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Connection, timeout or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("upstream returned HTTP {0}")]
    Status(u16),

    /// Body was not the JSON shape we expected.
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Step-level failures of an acquisition. None of them are retried.
#[derive(Debug, Error)]
pub enum AcquireError {
    #[error("missing required fields (source and either id or name)")]
    MissingInput,

    #[error("{0}")]
    NotFound(&'static str),

    #[error("upstream error: {0}")]
    Upstream(#[from] ApiError),

    #[error("no download link available (copyright/subscription restriction)")]
    NoPlayableSource,

    #[error("failed to download file: {0}")]
    Fetch(String),

    #[error("cannot write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AcquireError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        AcquireError::Io {
            path: path.into(),
            source,
        }
    }
}
