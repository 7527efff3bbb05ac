use std::num::IntErrorKind;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

pub const UNKNOWN_ARTIST: &str = "Unknown";
pub const DEFAULT_BITRATE: u32 = 999;

/// A download request as the user (or a JSON body) states it.
/// Field names on the wire follow the aggregator front-end: `id`, `br`, `lyric`.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackRequest {
    #[serde(default)]
    pub source: String,
    #[serde(rename = "id", default, deserialize_with = "optional_id")]
    pub track_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default = "default_artist")]
    pub artist: String,
    #[serde(
        rename = "br",
        default = "default_bitrate",
        deserialize_with = "lenient_bitrate"
    )]
    pub requested_bitrate_kbps: u32,
    #[serde(rename = "lyric", default)]
    pub fetch_lyric: bool,
}

impl TrackRequest {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            track_id: None,
            name: None,
            artist: default_artist(),
            requested_bitrate_kbps: DEFAULT_BITRATE,
            fetch_lyric: false,
        }
    }

    /// Track id, treating an empty string as absent.
    pub fn track_id(&self) -> Option<&str> {
        self.track_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Name, treating an empty string as absent.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref().filter(|s| !s.is_empty())
    }

    pub fn has_explicit_artist(&self) -> bool {
        self.artist != UNKNOWN_ARTIST
    }
}

/// The concrete track an acquisition works on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTrack {
    pub track_id: String,
    pub name: String,
    pub artist: String,
}

/// One entry of an upstream search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateTrack {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub artist: Vec<String>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default, deserialize_with = "optional_id")]
    pub pic_id: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
}

impl CandidateTrack {
    pub fn display_artist(&self) -> String {
        self.artist.join(" ")
    }
}

impl From<CandidateTrack> for ResolvedTrack {
    fn from(candidate: CandidateTrack) -> Self {
        let artist = candidate.display_artist();
        ResolvedTrack {
            track_id: candidate.id,
            name: candidate.name,
            artist,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LyricStatus {
    Downloaded,
}

#[derive(Debug, Clone, Serialize)]
pub struct AcquisitionResult {
    pub status: Status,
    pub filename: String,
    #[serde(rename = "path")]
    pub filesystem_path: PathBuf,
    #[serde(rename = "bitrate")]
    pub achieved_bitrate_kbps: u32,
    #[serde(rename = "lyric", skip_serializing_if = "Option::is_none")]
    pub lyric_status: Option<LyricStatus>,
}

/// Outcome of a standalone lyric download.
#[derive(Debug, Clone, Serialize)]
pub struct LyricResult {
    pub status: Status,
    pub filename: String,
    pub path: PathBuf,
}

fn default_artist() -> String {
    UNKNOWN_ARTIST.to_string()
}

fn default_bitrate() -> u32 {
    DEFAULT_BITRATE
}

fn id_from_value(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    id_from_value(value).ok_or_else(|| serde::de::Error::custom("expected a string or number id"))
}

fn optional_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(id_from_value(Value::deserialize(deserializer)?))
}

/// Accepts a number or a numeric string; anything unreadable means the default.
/// Integers outside `u32` saturate, which keeps them off the ladder.
fn lenient_bitrate<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    let parsed = match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_u64().map(|_| i64::MAX))
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => parse_integer(s.trim()),
        _ => None,
    };
    Ok(parsed
        .map(|v| v.clamp(0, u32::MAX as i64) as u32)
        .unwrap_or(DEFAULT_BITRATE))
}

fn parse_integer(s: &str) -> Option<i64> {
    match s.parse::<i64>() {
        Ok(v) => Some(v),
        Err(e) => match e.kind() {
            IntErrorKind::PosOverflow => Some(i64::MAX),
            IntErrorKind::NegOverflow => Some(i64::MIN),
            _ => None,
        },
    }
}
