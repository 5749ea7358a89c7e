//! Albums and their tracks.

use anyhow::Context;
use std::path::Path;
use thiserror::Error;

pub mod config;
pub mod model;

pub use config::{AlbumConfig, CatalogConfig, DurationValue, MarkerConfig, TrackConfig};
pub use model::{
    normalize_name, Album, AlbumId, AudioSource, Contributor, DownloadLink, Marker, Score, Track,
    TrackId,
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    #[error("album name must not be empty")]
    EmptyAlbumName,
    #[error("track name must not be empty")]
    EmptyTrackName,
    #[error("track {track:?}: {err}")]
    Duration {
        track: String,
        err: crate::timefmt::DurationParseError,
    },
    #[error("album {album:?}: {err}")]
    InAlbum {
        album: String,
        err: Box<CatalogError>,
    },
}

impl CatalogError {
    fn in_album(self, album: &str) -> Self {
        CatalogError::InAlbum {
            album: album.to_string(),
            err: Box::new(self),
        }
    }
}

/// Hands out album and track ids. Separate counters, both start at 1 and
/// never repeat for the lifetime of the allocator.
#[derive(Debug, Default)]
pub struct IdAllocator {
    last_album: u64,
    last_track: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn album(&mut self) -> AlbumId {
        self.last_album += 1;
        AlbumId(self.last_album)
    }

    pub fn track(&mut self) -> TrackId {
        self.last_track += 1;
        TrackId(self.last_track)
    }
}

#[derive(Debug, Default)]
pub struct Catalog {
    description: Vec<String>,
    albums: Vec<Album>,
}

impl Catalog {
    /// Albums are listed newest first; undated albums sort last.
    pub fn new(description: Vec<String>, mut albums: Vec<Album>) -> Self {
        albums.sort_by(|a, b| {
            let a = a.date.as_deref().unwrap_or("");
            let b = b.date.as_deref().unwrap_or("");
            b.cmp(a)
        });
        Self { description, albums }
    }

    pub fn from_config(cfg: CatalogConfig, ids: &mut IdAllocator) -> Result<Self, CatalogError> {
        let albums = cfg
            .albums
            .into_iter()
            .map(|a| Album::from_config(ids, a))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(cfg.description, albums))
    }

    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read {}", path.display()))?;
        let cfg = toml::from_str::<CatalogConfig>(&raw)
            .with_context(|| format!("parse {}", path.display()))?;
        let catalog = Self::from_config(cfg, &mut IdAllocator::new())
            .with_context(|| format!("validate {}", path.display()))?;
        tracing::debug!(albums = catalog.albums.len(), path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    pub fn description(&self) -> &[String] {
        &self.description
    }

    pub fn albums(&self) -> &[Album] {
        &self.albums
    }

    pub fn is_empty(&self) -> bool {
        self.albums.is_empty()
    }

    pub fn album(&self, id: AlbumId) -> Option<&Album> {
        self.albums.iter().find(|a| a.id == id)
    }

    pub fn album_index(&self, id: AlbumId) -> Option<usize> {
        self.albums.iter().position(|a| a.id == id)
    }

    /// The album whose track list holds `track`.
    pub fn album_containing(&self, track: TrackId) -> Option<&Album> {
        self.albums.iter().find(|a| a.contains(track))
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.albums.iter().find_map(|a| a.track(id))
    }

    /// Case-insensitive match with typographic apostrophes folded.
    pub fn find_album(&self, name: &str) -> Option<&Album> {
        let wanted = normalize_name(name);
        self.albums.iter().find(|a| normalize_name(&a.name) == wanted)
    }
}
