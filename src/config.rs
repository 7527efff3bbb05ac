use std::path::PathBuf;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::models::DEFAULT_BITRATE;

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
    /// Per upstream JSON call.
    pub timeout_secs: u64,
    /// Per streamed audio download.
    pub download_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://music-api.gdstudio.xyz/api.php".to_string(),
            timeout_secs: 15,
            download_timeout_secs: 600,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub dir: PathBuf,
    pub source: String,
    pub bitrate: u32,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("/music"),
            source: "netease".to_string(),
            bitrate: DEFAULT_BITRATE,
        }
    }
}

fn config_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home)
        .join(".config")
        .join("tunefetch")
        .join("config.toml")
}

pub fn load_config() -> Config {
    let path = config_path();
    if !path.exists() {
        return Config::default();
    }
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_config(&content),
        Err(_) => Config::default(),
    }
}

fn parse_config(content: &str) -> Config {
    toml::from_str(content).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "ignoring unreadable config file");
        Config::default()
    })
}

pub fn save_config(config: &Config) -> Result<()> {
    let path = config_path();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let cfg = parse_config("[download]\ndir = \"/srv/music\"\n");
        assert_eq!(cfg.download.dir, PathBuf::from("/srv/music"));
        assert_eq!(cfg.download.source, "netease");
        assert_eq!(cfg.download.bitrate, 999);
        assert_eq!(cfg.api.timeout_secs, 15);
    }

    #[test]
    fn test_broken_config_falls_back() {
        let cfg = parse_config("this is = = not toml");
        assert_eq!(cfg.api.base_url, ApiConfig::default().base_url);
    }

    #[test]
    fn test_round_trip_through_toml() {
        let mut cfg = Config::default();
        cfg.api.base_url = "http://localhost:9000/api.php".to_string();
        let text = toml::to_string_pretty(&cfg).unwrap();
        let back = parse_config(&text);
        assert_eq!(back.api.base_url, "http://localhost:9000/api.php");
    }
}
