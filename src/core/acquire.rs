use tracing::{info, warn};

use crate::core::storage::DownloadDir;
use crate::core::{bitrate, fetcher, lyric, resolver, sanitize};
use crate::error::AcquireError;
use crate::models::{
    AcquisitionResult, LyricResult, LyricStatus, ResolvedTrack, Status, TrackRequest,
};
use crate::sources::MusicApi;

/// Runs one request end to end: resolve, name, optional lyric, negotiate, stream.
/// Holds no per-request state, so one instance can serve any number of requests.
pub struct Acquirer<'a> {
    api: &'a dyn MusicApi,
    dir: &'a DownloadDir,
}

/// Runs a side step whose failure must not abort the caller. The error is logged and dropped.
fn best_effort<T>(step: &str, f: impl FnOnce() -> Result<T, AcquireError>) -> Option<T> {
    match f() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(step, error = %e, "optional step failed, continuing");
            None
        }
    }
}

impl<'a> Acquirer<'a> {
    pub fn new(api: &'a dyn MusicApi, dir: &'a DownloadDir) -> Self {
        Self { api, dir }
    }

    /// Resolves the request into a concrete track. Without an id the top search
    /// hit is used, and a caller-supplied artist still takes precedence.
    fn resolve(&self, request: &TrackRequest) -> Result<ResolvedTrack, AcquireError> {
        if request.source.trim().is_empty() {
            return Err(AcquireError::MissingInput);
        }

        match (request.track_id(), request.name()) {
            (Some(id), name) => Ok(ResolvedTrack {
                track_id: id.to_string(),
                name: name.unwrap_or(id).to_string(),
                artist: request.artist.clone(),
            }),
            (None, Some(name)) => {
                let found = resolver::resolve(self.api, &request.source, name)?;
                let artist = if request.has_explicit_artist() {
                    request.artist.clone()
                } else {
                    found.artist
                };
                Ok(ResolvedTrack { artist, ..found })
            }
            (None, None) => Err(AcquireError::MissingInput),
        }
    }

    pub fn acquire(&self, request: &TrackRequest) -> Result<AcquisitionResult, AcquireError> {
        let track = self.resolve(request)?;
        let basename = sanitize::build_basename(&track.artist, &track.name);
        let source = request.source.as_str();

        let lyric_status = if request.fetch_lyric {
            best_effort("lyric", || {
                lyric::download_lyric(self.api, source, &track.track_id, &basename, self.dir)
            })
            .map(|_| LyricStatus::Downloaded)
        } else {
            None
        };

        let negotiated = bitrate::negotiate(
            self.api,
            source,
            &track.track_id,
            request.requested_bitrate_kbps,
        )?;
        let stored = fetcher::fetch(self.api, &negotiated.url, &basename, self.dir)?;

        info!(
            file = %stored.filename,
            bitrate = negotiated.bitrate_kbps,
            "acquisition complete"
        );
        Ok(AcquisitionResult {
            status: Status::Success,
            filename: stored.filename,
            filesystem_path: stored.path,
            achieved_bitrate_kbps: negotiated.bitrate_kbps,
            lyric_status,
        })
    }

    /// Standalone lyric download. Needs source, id and name; errors are surfaced.
    pub fn download_lyric(&self, request: &TrackRequest) -> Result<LyricResult, AcquireError> {
        let (Some(id), Some(name)) = (request.track_id(), request.name()) else {
            return Err(AcquireError::MissingInput);
        };
        if request.source.trim().is_empty() {
            return Err(AcquireError::MissingInput);
        }

        let basename = sanitize::build_basename(&request.artist, name);
        let stored = lyric::download_lyric(self.api, &request.source, id, &basename, self.dir)?;
        Ok(LyricResult {
            status: Status::Success,
            filename: stored.filename,
            path: stored.path,
        })
    }
}
