pub mod acquire;
pub mod bitrate;
pub mod fetcher;
pub mod lyric;
pub mod resolver;
pub mod sanitize;
pub mod storage;
