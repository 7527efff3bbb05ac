use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::CandidateTrack;
use crate::sources::{MusicApi, RemoteFile};

/// Client for the GD Studio music aggregator (`api.php?types=...`).
pub struct GdStudioClient {
    api: Client,
    download: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct UrlResponse {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Deserialize)]
struct LyricResponse {
    #[serde(default)]
    lyric: Option<String>,
}

impl GdStudioClient {
    /// Builds separate clients for JSON calls and for streamed downloads so each gets its own timeout.
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let api = Client::builder()
            .user_agent(concat!("tunefetch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("failed to build the upstream HTTP client")?;

        let download = Client::builder()
            .user_agent(concat!("tunefetch/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.download_timeout_secs))
            .build()
            .context("failed to build the download HTTP client")?;

        Ok(Self {
            api,
            download,
            base_url: config.base_url.clone(),
        })
    }

    fn call(&self, params: &[(&str, &str)]) -> Result<String, ApiError> {
        debug!(?params, "upstream call");
        let resp = self.api.get(&self.base_url).query(params).send()?;
        let resp = check_status(resp)?;
        Ok(resp.text()?)
    }

    fn call_json<T: DeserializeOwned>(&self, params: &[(&str, &str)]) -> Result<T, ApiError> {
        let body = self.call(params)?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn check_status(resp: Response) -> Result<Response, ApiError> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(ApiError::Status(status.as_u16()))
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// The aggregator answers "no match" with an empty list, `null`, or an error object.
fn parse_search(body: &str) -> Result<Vec<CandidateTrack>, ApiError> {
    match serde_json::from_str::<Value>(body)? {
        Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
        _ => Ok(Vec::new()),
    }
}

impl MusicApi for GdStudioClient {
    fn search(
        &self,
        source: &str,
        keyword: &str,
        count: u32,
        page: u32,
    ) -> Result<Vec<CandidateTrack>, ApiError> {
        let count = count.to_string();
        let page = page.to_string();
        let body = self.call(&[
            ("types", "search"),
            ("source", source),
            ("name", keyword),
            ("count", &count),
            ("pages", &page),
        ])?;
        parse_search(&body)
    }

    fn track_url(&self, source: &str, id: &str, br: u32) -> Result<Option<String>, ApiError> {
        let br = br.to_string();
        let resp: UrlResponse =
            self.call_json(&[("types", "url"), ("source", source), ("id", id), ("br", &br)])?;
        Ok(non_empty(resp.url))
    }

    fn lyric(&self, source: &str, id: &str) -> Result<Option<String>, ApiError> {
        let resp: LyricResponse =
            self.call_json(&[("types", "lyric"), ("source", source), ("id", id)])?;
        Ok(non_empty(resp.lyric))
    }

    fn cover_url(&self, source: &str, pic_id: &str, size: u32) -> Result<Option<String>, ApiError> {
        let size = size.to_string();
        let resp: UrlResponse = self.call_json(&[
            ("types", "pic"),
            ("source", source),
            ("id", pic_id),
            ("size", &size),
        ])?;
        Ok(non_empty(resp.url))
    }

    fn open(&self, url: &str) -> Result<RemoteFile, ApiError> {
        let resp = check_status(self.download.get(url).send()?)?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        Ok(RemoteFile {
            content_type,
            body: Box::new(resp),
        })
    }
}
