pub mod gdstudio;

#[cfg(test)]
pub mod fake;

use std::io::Read;

use crate::error::ApiError;
use crate::models::CandidateTrack;

/// An opened download: declared content type plus a body read incrementally.
pub struct RemoteFile {
    pub content_type: Option<String>,
    pub body: Box<dyn Read + Send>,
}

/// Upstream aggregator that fronts several music catalogs.
/// Every capability the pipeline needs goes through this trait so it can be swapped in tests.
pub trait MusicApi {
    /// Keyword search. A body that is not a list is reported as no results.
    fn search(
        &self,
        source: &str,
        keyword: &str,
        count: u32,
        page: u32,
    ) -> Result<Vec<CandidateTrack>, ApiError>;

    /// Playable URL for one bitrate tier, `None` when the tier is unavailable.
    fn track_url(&self, source: &str, id: &str, br: u32) -> Result<Option<String>, ApiError>;

    /// Raw lyric text, `None` when empty or absent.
    fn lyric(&self, source: &str, id: &str) -> Result<Option<String>, ApiError>;

    /// Cover art URL for a picture id.
    fn cover_url(&self, source: &str, pic_id: &str, size: u32) -> Result<Option<String>, ApiError>;

    /// Opens `url` for streaming. Non-success statuses are errors.
    fn open(&self, url: &str) -> Result<RemoteFile, ApiError>;
}
