use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{Cell, Table};
use dialoguer::Input;
use serde::Serialize;

use crate::config::{self, Config};
use crate::core::acquire::Acquirer;
use crate::core::resolver;
use crate::core::storage::DownloadDir;
use crate::models::{TrackRequest, UNKNOWN_ARTIST};
use crate::sources::gdstudio::GdStudioClient;

#[derive(Parser)]
#[command(name = "tunefetch", about = "Download tracks and lyrics through a music aggregator API")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Download a track, negotiating the best available bitrate
    Download {
        /// Catalog to use (netease, kuwo, tencent, ...)
        #[arg(long)]
        source: Option<String>,
        /// Track id; without it the top search hit for --name is used
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = UNKNOWN_ARTIST)]
        artist: String,
        /// Bitrate ceiling in kbps
        #[arg(long)]
        br: Option<u32>,
        /// Also save the lyric as .lrc
        #[arg(long)]
        lyric: bool,
        /// Read a JSON request body from a file, or `-` for stdin
        #[arg(long, conflicts_with_all = ["source", "id", "name", "artist", "br", "lyric"])]
        request: Option<PathBuf>,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Download only the lyric of a known track
    Lyric {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = UNKNOWN_ARTIST)]
        artist: String,
        #[arg(long)]
        dir: Option<PathBuf>,
        #[arg(long)]
        json: bool,
    },
    /// Search a catalog
    Search {
        keyword: String,
        #[arg(long)]
        source: Option<String>,
        #[arg(long, default_value_t = 20)]
        count: u32,
        #[arg(long, default_value_t = 1)]
        pages: u32,
        #[arg(long)]
        json: bool,
    },
    /// Print the cover art URL for a picture id
    Cover {
        #[arg(long)]
        source: Option<String>,
        #[arg(long)]
        id: String,
        #[arg(long, default_value_t = 300)]
        size: u32,
        #[arg(long)]
        json: bool,
    },
    /// Edit the persisted configuration
    Config,
}

pub fn run(cli: Cli) -> Result<()> {
    let cfg = config::load_config();

    match cli.command {
        Commands::Download {
            source,
            id,
            name,
            artist,
            br,
            lyric,
            request,
            dir,
            json,
        } => {
            let request = match request {
                Some(path) => read_request(&path)?,
                None => TrackRequest {
                    track_id: id,
                    name,
                    artist,
                    requested_bitrate_kbps: br.unwrap_or(cfg.download.bitrate),
                    fetch_lyric: lyric,
                    ..TrackRequest::new(source.unwrap_or_else(|| cfg.download.source.clone()))
                },
            };
            cmd_download(&cfg, &request, dir, json)
        }
        Commands::Lyric {
            source,
            id,
            name,
            artist,
            dir,
            json,
        } => {
            let request = TrackRequest {
                track_id: Some(id),
                name: Some(name),
                artist,
                ..TrackRequest::new(source.unwrap_or_else(|| cfg.download.source.clone()))
            };
            cmd_lyric(&cfg, &request, dir, json)
        }
        Commands::Search {
            keyword,
            source,
            count,
            pages,
            json,
        } => {
            let source = source.unwrap_or_else(|| cfg.download.source.clone());
            cmd_search(&cfg, &source, &keyword, count, pages, json)
        }
        Commands::Cover {
            source,
            id,
            size,
            json,
        } => {
            let source = source.unwrap_or_else(|| cfg.download.source.clone());
            cmd_cover(&cfg, &source, &id, size, json)
        }
        Commands::Config => cmd_config(cfg),
    }
}

fn read_request(path: &Path) -> Result<TrackRequest> {
    let body = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("failed to read request from stdin")?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("failed to read request file {}", path.display()))?
    };
    serde_json::from_str(&body).context("request is not valid JSON")
}

/// Prints `value` as JSON, or an `{"error": ...}` body, mirroring the HTTP front-end.
fn emit_json<T: Serialize>(outcome: &Result<T>) -> Result<()> {
    let body = match outcome {
        Ok(value) => serde_json::to_string_pretty(value)?,
        Err(e) => serde_json::to_string_pretty(&serde_json::json!({ "error": format!("{:#}", e) }))?,
    };
    println!("{}", body);
    Ok(())
}

fn prepare_dir(cfg: &Config, dir: Option<PathBuf>) -> Result<DownloadDir> {
    let dir = dir.unwrap_or_else(|| cfg.download.dir.clone());
    DownloadDir::prepare(&dir).context("cannot prepare the download directory")
}

fn cmd_download(cfg: &Config, request: &TrackRequest, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let dir = prepare_dir(cfg, dir)?;
    let client = GdStudioClient::new(&cfg.api)?;
    let outcome = Acquirer::new(&client, &dir)
        .acquire(request)
        .map_err(anyhow::Error::from);

    if json {
        emit_json(&outcome)?;
    }
    let result = outcome?;
    if !json {
        println!("Saved: {}", result.filesystem_path.display());
        println!("Bitrate: {} kbps", result.achieved_bitrate_kbps);
        if result.lyric_status.is_some() {
            println!("Lyric: downloaded");
        }
    }
    Ok(())
}

fn cmd_lyric(cfg: &Config, request: &TrackRequest, dir: Option<PathBuf>, json: bool) -> Result<()> {
    let dir = prepare_dir(cfg, dir)?;
    let client = GdStudioClient::new(&cfg.api)?;
    let outcome = Acquirer::new(&client, &dir)
        .download_lyric(request)
        .map_err(anyhow::Error::from);

    if json {
        emit_json(&outcome)?;
    }
    let result = outcome?;
    if !json {
        println!("Saved: {}", result.path.display());
    }
    Ok(())
}

fn cmd_search(cfg: &Config, source: &str, keyword: &str, count: u32, pages: u32, json: bool) -> Result<()> {
    let client = GdStudioClient::new(&cfg.api)?;
    let outcome = resolver::search(&client, source, keyword, count, pages)
        .map_err(anyhow::Error::from);

    if json {
        emit_json(&outcome)?;
        return outcome.map(|_| ());
    }
    let results = outcome.context("search failed")?;

    if results.is_empty() {
        println!("No results for \"{}\"", keyword);
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "Title", "Artist", "Album", "Pic ID"]);
    for track in &results {
        table.add_row(vec![
            Cell::new(&track.id),
            Cell::new(&track.name),
            Cell::new(track.display_artist()),
            Cell::new(track.album.as_deref().unwrap_or("-")),
            Cell::new(track.pic_id.as_deref().unwrap_or("-")),
        ]);
    }
    println!("{table}");
    println!("\n{} result(s) from {}", results.len(), source);
    Ok(())
}

fn cmd_cover(cfg: &Config, source: &str, pic_id: &str, size: u32, json: bool) -> Result<()> {
    let client = GdStudioClient::new(&cfg.api)?;
    let outcome = resolver::cover_url(&client, source, pic_id, size)
        .map(|url| serde_json::json!({ "url": url }))
        .map_err(anyhow::Error::from);

    if json {
        emit_json(&outcome)?;
    }
    let body = outcome?;
    if !json {
        println!("{}", body["url"].as_str().unwrap_or_default());
    }
    Ok(())
}

fn cmd_config(mut cfg: Config) -> Result<()> {
    println!("tunefetch configuration\n");

    cfg.api.base_url = Input::new()
        .with_prompt("API base URL")
        .with_initial_text(cfg.api.base_url.clone())
        .interact_text()?;

    let dir: String = Input::new()
        .with_prompt("Download directory")
        .with_initial_text(cfg.download.dir.display().to_string())
        .interact_text()?;
    cfg.download.dir = PathBuf::from(dir);

    cfg.download.source = Input::new()
        .with_prompt("Default source")
        .with_initial_text(cfg.download.source.clone())
        .interact_text()?;

    cfg.download.bitrate = Input::new()
        .with_prompt("Default bitrate (kbps)")
        .default(cfg.download.bitrate)
        .interact_text()?;

    config::save_config(&cfg)?;
    println!("\nConfiguration saved.");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_file_excludes_inline_fields() {
        for flag in [
            ["--source", "kuwo"],
            ["--id", "42"],
            ["--name", "Imagine"],
            ["--artist", "Queen"],
            ["--br", "320"],
        ] {
            let args = ["tunefetch", "download", "--request", "req.json", flag[0], flag[1]];
            assert!(Cli::try_parse_from(args).is_err(), "{} accepted", flag[0]);
        }
        assert!(Cli::try_parse_from(["tunefetch", "download", "--request", "-", "--lyric"]).is_err());
    }

    #[test]
    fn test_request_file_with_output_flags() {
        let cli = Cli::try_parse_from([
            "tunefetch", "download", "--request", "-", "--dir", "/tmp/m", "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Download {
                request, artist, json, ..
            } => {
                assert_eq!(request, Some(PathBuf::from("-")));
                assert_eq!(artist, UNKNOWN_ARTIST);
                assert!(json);
            }
            _ => panic!("expected download"),
        }
    }
}
