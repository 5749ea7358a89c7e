use crate::catalog::{Album, AlbumId, Catalog, TrackId};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    /// Neighbour of `index` in a list of `len` items, if it exists.
    fn step(self, index: Option<usize>, len: usize) -> Option<usize> {
        let next = match (self, index) {
            (Direction::Forward, None) => Some(0),
            (Direction::Forward, Some(i)) => i.checked_add(1),
            (Direction::Backward, None) => None,
            (Direction::Backward, Some(i)) => i.checked_sub(1),
        };
        next.filter(|&i| i < len)
    }

    /// Where to land when stepping off either end of a list.
    fn wrap(self, len: usize) -> usize {
        match self {
            Direction::Forward => 0,
            Direction::Backward => len.saturating_sub(1),
        }
    }
}

/// The catalog cannot produce anything to play.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no albums")]
    NoAlbums,
    #[error("album {album:?} contains no tracks")]
    EmptyAlbum { album: String },
    #[error("track {track:?} contains no sources")]
    NoSources { track: String },
}

/// What the user is looking at (album) and what is loaded (track).
///
/// The two can disagree: browsing another album does not stop the current
/// track, and "next" then starts the browsed album instead of skipping it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlaybackCursor {
    current_album: Option<AlbumId>,
    current_track: Option<TrackId>,
}

impl PlaybackCursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_album(&self) -> Option<AlbumId> {
        self.current_album
    }

    pub fn current_track(&self) -> Option<TrackId> {
        self.current_track
    }

    /// Returns false when the album was already current.
    pub fn select_album(&mut self, album: AlbumId) -> bool {
        if self.current_album == Some(album) {
            return false;
        }
        self.current_album = Some(album);
        true
    }

    /// Always counts as a change, even for the same track: callers reload on it.
    pub fn select_track(&mut self, track: TrackId) {
        self.current_track = Some(track);
    }

    /// Album holding the current track, else the viewed album.
    pub fn playing_album<'a>(&self, catalog: &'a Catalog) -> Option<&'a Album> {
        self.current_track
            .and_then(|t| catalog.album_containing(t))
            .or_else(|| self.current_album.and_then(|a| catalog.album(a)))
    }

    /// Move to the next or previous track, crossing into the neighbouring
    /// album (with wraparound) at either end.
    pub fn advance(
        &mut self,
        catalog: &Catalog,
        direction: Direction,
    ) -> Result<TrackId, NavigationError> {
        let first = catalog.albums().first().ok_or(NavigationError::NoAlbums)?;
        let viewed = match self.current_album.and_then(|id| catalog.album(id)) {
            Some(album) => album,
            None => {
                self.select_album(first.id);
                first
            }
        };
        if viewed.tracks.is_empty() {
            return Err(empty(viewed));
        }

        let playing = self.playing_album(catalog).unwrap_or(viewed);
        let index = self.current_track.and_then(|t| playing.track_position(t));

        if let Some(next) = direction.step(index, playing.tracks.len()) {
            let id = playing.tracks[next].id;
            self.select_track(id);
        } else {
            if playing.id == viewed.id {
                let albums = catalog.albums();
                let here = catalog.album_index(playing.id);
                let target = direction
                    .step(here, albums.len())
                    .unwrap_or_else(|| direction.wrap(albums.len()));
                self.select_album(albums[target].id);
            }

            let album = self
                .current_album
                .and_then(|id| catalog.album(id))
                .ok_or(NavigationError::NoAlbums)?;
            let track = match direction {
                Direction::Forward => album.tracks.first(),
                Direction::Backward => album.tracks.last(),
            }
            .ok_or_else(|| empty(album))?;
            self.select_track(track.id);
        }

        self.require_sources(catalog)
    }

    /// Jump to the first track of the neighbouring album, wrapping around.
    ///
    /// Does nothing with fewer than two albums.
    pub fn step_album(
        &mut self,
        catalog: &Catalog,
        direction: Direction,
    ) -> Result<Option<TrackId>, NavigationError> {
        let albums = catalog.albums();
        if albums.len() <= 1 {
            return Ok(None);
        }

        let here = self.playing_album(catalog).and_then(|a| catalog.album_index(a.id));
        let target = match (direction, here) {
            (_, None) => 0,
            (Direction::Forward, Some(i)) => (i + 1) % albums.len(),
            (Direction::Backward, Some(0)) => albums.len() - 1,
            (Direction::Backward, Some(i)) => i - 1,
        };
        let album = &albums[target];
        self.select_album(album.id);

        let track = album.tracks.first().ok_or_else(|| empty(album))?;
        self.select_track(track.id);
        Ok(Some(track.id))
    }

    fn require_sources(&self, catalog: &Catalog) -> Result<TrackId, NavigationError> {
        let id = self.current_track.ok_or(NavigationError::NoAlbums)?;
        match catalog.track(id) {
            Some(track) if track.sources.is_empty() => Err(NavigationError::NoSources {
                track: track.name.clone(),
            }),
            _ => Ok(id),
        }
    }
}

fn empty(album: &Album) -> NavigationError {
    NavigationError::EmptyAlbum {
        album: album.name.clone(),
    }
}
