//! On-disk catalog description (TOML).
//!
//! ```toml
//! description = ["Songs written between 2019 and 2023."]
//!
//! [[albums]]
//! name = "First"
//! date = "2021-05-01"
//!
//! [[albums.tracks]]
//! name = "Opening"
//! track_num = 1
//! duration = "03:12"
//! lyrics = "first/opening.lrc"
//! sources = [{ uri = "first/opening.mp3", mimetype = "audio/mpeg" }]
//! markers = [{ time = "01:05", label = "bridge" }]
//! ```

use super::model::{AudioSource, Contributor, DownloadLink, Score};
use crate::timefmt::{self, DurationParseError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    /// Paragraphs shown in the global info box.
    pub description: Vec<String>,
    pub albums: Vec<AlbumConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AlbumConfig {
    pub name: String,
    pub artist: Option<String>,
    /// Compared as a string when ordering albums, so use ISO dates.
    pub date: Option<String>,
    pub description: Option<String>,
    pub cover_art: Option<String>,
    pub download_link: Option<DownloadLink>,
    pub tracks: Vec<TrackConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackConfig {
    pub name: String,
    pub duration: Option<DurationValue>,
    pub sources: Vec<AudioSource>,
    /// Lyric file locator (path or http(s) URL).
    pub lyrics: Option<String>,
    pub track_num: Option<u32>,
    pub date: Option<String>,
    pub score: Option<Score>,
    pub writers: Vec<String>,
    pub contributors: Vec<Contributor>,
    pub recommended: bool,
    pub markers: Vec<MarkerConfig>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkerConfig {
    pub time: DurationValue,
    pub label: String,
}

/// Either raw milliseconds or a "MM:SS" label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Label(String),
}

impl DurationValue {
    pub fn to_ms(&self) -> Result<u64, DurationParseError> {
        match self {
            DurationValue::Millis(ms) => Ok(*ms),
            DurationValue::Label(label) => timefmt::parse_duration_ms(label),
        }
    }
}
