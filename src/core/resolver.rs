use tracing::info;

use crate::error::AcquireError;
use crate::models::{CandidateTrack, ResolvedTrack};
use crate::sources::MusicApi;

/// Turns a free-text name into a concrete track by taking the single top search hit.
/// Upstream ordering is authoritative; there is no local ranking.
pub fn resolve(api: &dyn MusicApi, source: &str, name: &str) -> Result<ResolvedTrack, AcquireError> {
    let candidate = api
        .search(source, name, 1, 1)?
        .into_iter()
        .next()
        .ok_or(AcquireError::NotFound(
            "no matching track found, try providing an exact id",
        ))?;

    let resolved = ResolvedTrack::from(candidate);
    info!(
        query = name,
        id = %resolved.track_id,
        name = %resolved.name,
        artist = %resolved.artist,
        "resolved track by search"
    );
    Ok(resolved)
}

/// Plain keyword search. An empty keyword is rejected before any upstream call.
pub fn search(
    api: &dyn MusicApi,
    source: &str,
    keyword: &str,
    count: u32,
    page: u32,
) -> Result<Vec<CandidateTrack>, AcquireError> {
    if keyword.trim().is_empty() {
        return Err(AcquireError::MissingInput);
    }
    Ok(api.search(source, keyword, count, page)?)
}

/// Cover art URL for a picture id.
pub fn cover_url(
    api: &dyn MusicApi,
    source: &str,
    pic_id: &str,
    size: u32,
) -> Result<String, AcquireError> {
    if pic_id.trim().is_empty() {
        return Err(AcquireError::MissingInput);
    }
    api.cover_url(source, pic_id, size)?
        .ok_or(AcquireError::NotFound("no cover found"))
}
