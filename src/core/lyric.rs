use tracing::info;

use crate::core::fetcher::StoredFile;
use crate::core::storage::DownloadDir;
use crate::error::AcquireError;
use crate::sources::MusicApi;

pub fn fetch_lyric(api: &dyn MusicApi, source: &str, track_id: &str) -> Result<String, AcquireError> {
    api.lyric(source, track_id)?
        .ok_or(AcquireError::NotFound("no lyric found"))
}

/// Fetches the raw lyric and writes it verbatim to `basename.lrc`.
pub fn download_lyric(
    api: &dyn MusicApi,
    source: &str,
    track_id: &str,
    basename: &str,
    dir: &DownloadDir,
) -> Result<StoredFile, AcquireError> {
    let text = fetch_lyric(api, source, track_id)?;

    let filename = format!("{}.lrc", basename);
    let path = dir.file(&filename);
    std::fs::write(&path, text).map_err(|e| AcquireError::io(&path, e))?;

    info!(path = %path.display(), "stored lyric file");
    Ok(StoredFile { filename, path })
}
