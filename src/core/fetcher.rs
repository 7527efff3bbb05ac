use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use tracing::{info, warn};

use crate::core::storage::DownloadDir;
use crate::error::AcquireError;
use crate::sources::MusicApi;

const DEFAULT_EXTENSION: &str = ".mp3";
const URL_MARKERS: [&str; 3] = [".flac", ".m4a", ".ogg"];
const CHUNK_SIZE: usize = 8192;

/// A payload persisted in the download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
}

/// MIME type to extension, following the system `mime.types` table for audio.
/// Parameters such as `; charset=...` are ignored.
fn extension_for_mime(content_type: &str) -> Option<&'static str> {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    // Only audio types map. Generic ones like `application/octet-stream` or
    // `text/html` stay unmapped on purpose so the URL markers decide.
    let ext = match essence.as_str() {
        "audio/mpeg" => ".mpga",
        "audio/mp3" | "audio/mpeg3" | "audio/x-mpeg-3" => ".mp3",
        "audio/flac" | "audio/x-flac" => ".flac",
        "audio/mp4" | "audio/m4a" | "audio/x-m4a" => ".m4a",
        "audio/aac" | "audio/x-aac" => ".aac",
        "audio/ogg" | "application/ogg" => ".ogg",
        "audio/opus" => ".opus",
        "audio/wav" | "audio/wave" | "audio/x-wav" => ".wav",
        "audio/x-ms-wma" => ".wma",
        _ => return None,
    };
    Some(ext)
}

/// Picks the stored extension: declared content type first, then a marker in
/// the URL, then `.mp3`. `.mpga` is always written as `.mp3`.
pub fn infer_extension(content_type: Option<&str>, url: &str) -> &'static str {
    let ext = content_type
        .and_then(extension_for_mime)
        .or_else(|| URL_MARKERS.into_iter().find(|marker| url.contains(marker)))
        .unwrap_or(DEFAULT_EXTENSION);

    if ext == ".mpga" {
        ".mp3"
    } else {
        ext
    }
}

/// Streams `url` into `dir` as `basename + extension`, overwriting any existing file.
/// A stream that breaks midway removes what it wrote.
pub fn fetch(
    api: &dyn MusicApi,
    url: &str,
    basename: &str,
    dir: &DownloadDir,
) -> Result<StoredFile, AcquireError> {
    let mut remote = api
        .open(url)
        .map_err(|e| AcquireError::Fetch(e.to_string()))?;

    let ext = infer_extension(remote.content_type.as_deref(), url);
    let filename = format!("{}{}", basename, ext);
    let path = dir.file(&filename);

    let file = File::create(&path).map_err(|e| AcquireError::io(&path, e))?;
    let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);

    let copied = io::copy(&mut remote.body, &mut writer).and_then(|n| writer.flush().map(|_| n));
    let bytes = match copied {
        Ok(n) => n,
        Err(e) => {
            drop(writer);
            if let Err(rm) = std::fs::remove_file(&path) {
                warn!(path = %path.display(), error = %rm, "could not remove partial file");
            }
            return Err(AcquireError::Fetch(e.to_string()));
        }
    };

    info!(
        path = %path.display(),
        bytes,
        content_type = remote.content_type.as_deref().unwrap_or("-"),
        "stored audio file"
    );
    Ok(StoredFile { filename, path })
}
