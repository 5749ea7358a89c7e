use crate::catalog::{AlbumId, TrackId};

/// State changes published to whoever renders the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    AlbumSelected { album: AlbumId },
    /// `album` is the album that holds the track, not necessarily the viewed one.
    TrackSelected { album: AlbumId, track: TrackId },
    Started,
    Paused,
    Progress {
        time: String,
        duration: Option<String>,
    },
    LyricLine { index: usize, line: String },
    Ended,
}
