//! Scripted in-memory aggregator used by the pipeline tests.

use std::collections::HashMap;
use std::io::{self, Cursor, Read};
use std::sync::Mutex;

use crate::error::ApiError;
use crate::models::CandidateTrack;
use crate::sources::{MusicApi, RemoteFile};

#[derive(Debug, Clone)]
pub enum Tier {
    Url(String),
    Empty,
    Fails,
}

#[derive(Default)]
pub struct FakeApi {
    pub candidates: Vec<CandidateTrack>,
    pub search_fails: bool,
    pub tiers: HashMap<u32, Tier>,
    pub lyric: Option<String>,
    pub lyric_fails: bool,
    pub cover: Option<String>,
    pub content_type: Option<String>,
    pub payload: Vec<u8>,
    pub open_status: Option<u16>,
    pub truncate_after: Option<usize>,
    pub probes: Mutex<Vec<u32>>,
    pub searches: Mutex<Vec<(String, u32, u32)>>,
}

impl FakeApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_candidate(mut self, id: &str, name: &str, artists: &[&str]) -> Self {
        self.candidates.push(CandidateTrack {
            id: id.to_string(),
            name: name.to_string(),
            artist: artists.iter().map(|a| a.to_string()).collect(),
            album: None,
            pic_id: None,
            source: None,
        });
        self
    }

    pub fn with_tier(mut self, br: u32, tier: Tier) -> Self {
        self.tiers.insert(br, tier);
        self
    }

    pub fn with_payload(mut self, content_type: Option<&str>, payload: &[u8]) -> Self {
        self.content_type = content_type.map(|s| s.to_string());
        self.payload = payload.to_vec();
        self
    }

    /// Bitrates probed through `track_url`, in call order.
    pub fn probes(&self) -> Vec<u32> {
        self.probes.lock().unwrap().clone()
    }

    pub fn searches(&self) -> Vec<(String, u32, u32)> {
        self.searches.lock().unwrap().clone()
    }
}

/// Yields `limit` bytes of the payload, then fails like a dropped connection.
struct TruncatedReader {
    inner: Cursor<Vec<u8>>,
    remaining: usize,
}

impl Read for TruncatedReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if self.remaining == 0 {
            return Err(io::Error::new(io::ErrorKind::ConnectionReset, "connection reset"));
        }
        let max = buf.len().min(self.remaining);
        let n = self.inner.read(&mut buf[..max])?;
        self.remaining -= n;
        Ok(n)
    }
}

impl MusicApi for FakeApi {
    fn search(
        &self,
        _source: &str,
        keyword: &str,
        count: u32,
        page: u32,
    ) -> Result<Vec<CandidateTrack>, ApiError> {
        self.searches
            .lock()
            .unwrap()
            .push((keyword.to_string(), count, page));
        if self.search_fails {
            return Err(ApiError::Status(502));
        }
        Ok(self.candidates.iter().take(count as usize).cloned().collect())
    }

    fn track_url(&self, _source: &str, _id: &str, br: u32) -> Result<Option<String>, ApiError> {
        self.probes.lock().unwrap().push(br);
        match self.tiers.get(&br).cloned().unwrap_or(Tier::Empty) {
            Tier::Url(url) => Ok(Some(url)),
            Tier::Empty => Ok(None),
            Tier::Fails => Err(ApiError::Status(500)),
        }
    }

    fn lyric(&self, _source: &str, _id: &str) -> Result<Option<String>, ApiError> {
        if self.lyric_fails {
            return Err(ApiError::Status(503));
        }
        Ok(self.lyric.clone())
    }

    fn cover_url(&self, _source: &str, _pic_id: &str, _size: u32) -> Result<Option<String>, ApiError> {
        Ok(self.cover.clone())
    }

    fn open(&self, _url: &str) -> Result<RemoteFile, ApiError> {
        if let Some(status) = self.open_status {
            return Err(ApiError::Status(status));
        }
        let cursor = Cursor::new(self.payload.clone());
        let body: Box<dyn Read + Send> = match self.truncate_after {
            Some(limit) => Box::new(TruncatedReader {
                inner: cursor,
                remaining: limit,
            }),
            None => Box::new(cursor),
        };
        Ok(RemoteFile {
            content_type: self.content_type.clone(),
            body,
        })
    }
}
