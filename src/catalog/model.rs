use super::config::{AlbumConfig, TrackConfig};
use super::{CatalogError, IdAllocator};
use crate::lyrics::LyricTrack;
use crate::markers::{self, PlacedMarker};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct AlbumId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TrackId(pub u64);

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AudioSource {
    pub uri: String,
    pub mimetype: Option<String>,
    /// Bytes
    pub size: Option<u64>,
    pub priority: Option<i32>,
    pub name: Option<String>,
}

impl AudioSource {
    pub fn new(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Score {
    pub uri: String,
    pub size: Option<u64>,
    pub thumbnail: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadLink {
    pub uri: String,
    pub size: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Contributor {
    pub name: String,
    pub credits: Vec<String>,
}

/// A labeled point on a track's timeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Marker {
    pub time_ms: u64,
    pub label: String,
}

#[derive(Debug)]
pub struct Track {
    pub id: TrackId,
    pub name: String,
    pub duration_ms: Option<u64>,
    pub sources: Vec<AudioSource>,
    pub track_num: Option<u32>,
    pub date: Option<String>,
    pub score: Option<Score>,
    pub lyrics: Option<LyricTrack>,
    pub writers: Vec<String>,
    pub contributors: Vec<Contributor>,
    pub recommended: bool,
    pub markers: Vec<Marker>,
    pub icon_url: Option<String>,
}

impl Track {
    pub fn from_config(id: TrackId, cfg: TrackConfig) -> Result<Self, CatalogError> {
        let name = cfg.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::EmptyTrackName);
        }

        let duration_ms = cfg
            .duration
            .map(|d| d.to_ms())
            .transpose()
            .map_err(|err| CatalogError::Duration { track: name.clone(), err })?;

        let markers = cfg
            .markers
            .into_iter()
            .map(|m| {
                let label = m.label;
                m.time.to_ms().map(|time_ms| Marker { time_ms, label })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|err| CatalogError::Duration { track: name.clone(), err })?;

        Ok(Self {
            id,
            name,
            duration_ms,
            sources: cfg.sources,
            track_num: cfg.track_num,
            date: cfg.date,
            score: cfg.score,
            lyrics: cfg.lyrics.map(LyricTrack::new),
            writers: cfg.writers,
            contributors: cfg.contributors,
            recommended: cfg.recommended,
            markers,
            icon_url: cfg.icon_url,
        })
    }

    /// Number shown in track lists: the track number, else the 1-based position.
    pub fn display_number(&self, position: usize) -> String {
        let n = self.track_num.map(|n| n as usize).unwrap_or(position + 1);
        format!("{n:02}")
    }

    /// "written by A, B and C"
    pub fn writers_credit(&self) -> Option<String> {
        let (last, rest) = self.writers.split_last()?;
        if rest.is_empty() {
            Some(format!("written by {last}"))
        } else {
            Some(format!("written by {} and {last}", rest.join(", ")))
        }
    }

    /// Source offered for download: the first mpeg one, else the first.
    pub fn download_source(&self) -> Option<&AudioSource> {
        self.sources
            .iter()
            .find(|s| s.mimetype.as_deref().is_some_and(|m| m.contains("mpeg")))
            .or_else(|| self.sources.first())
    }

    /// Marker positions for a progress bar `bar_width` pixels wide.
    ///
    /// Without a known duration there is no axis to place markers on.
    pub fn marker_layout(&self, bar_width: f64) -> Option<Vec<PlacedMarker>> {
        let duration = self.duration_ms.filter(|&d| d > 0)?;
        Some(markers::layout(&self.markers, duration, bar_width))
    }
}

#[derive(Debug)]
pub struct Album {
    pub id: AlbumId,
    pub name: String,
    pub tracks: Vec<Track>,
    pub artist: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
    pub cover_art: Option<String>,
    pub download_link: Option<DownloadLink>,
}

impl Album {
    pub fn from_config(ids: &mut IdAllocator, cfg: AlbumConfig) -> Result<Self, CatalogError> {
        let name = cfg.name.trim().to_string();
        if name.is_empty() {
            return Err(CatalogError::EmptyAlbumName);
        }
        let id = ids.album();

        let mut tracks = cfg
            .tracks
            .into_iter()
            .map(|t| Track::from_config(ids.track(), t))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| e.in_album(&name))?;
        // Stable, so equal numbers keep their listed order.
        tracks.sort_by_key(|t| t.track_num);

        Ok(Self {
            id,
            name,
            tracks,
            artist: cfg.artist,
            date: cfg.date,
            description: cfg.description,
            cover_art: cfg.cover_art,
            download_link: cfg.download_link,
        })
    }

    /// Sum of known track durations, recomputed on every call.
    pub fn duration_ms(&self) -> u64 {
        self.tracks.iter().map(|t| t.duration_ms.unwrap_or(0)).sum()
    }

    pub fn track_position(&self, id: TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| t.id == id)
    }

    pub fn contains(&self, id: TrackId) -> bool {
        self.track_position(id).is_some()
    }

    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Case-insensitive match with typographic apostrophes folded.
    pub fn find_track(&self, name: &str) -> Option<&Track> {
        let wanted = normalize_name(name);
        self.tracks.iter().find(|t| normalize_name(&t.name) == wanted)
    }
}

pub fn normalize_name(name: &str) -> String {
    name.to_lowercase().replace('\u{2019}', "'")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::config::{DurationValue, MarkerConfig};

    fn track_cfg(name: &str, num: Option<u32>, duration: Option<DurationValue>) -> TrackConfig {
        TrackConfig {
            name: name.to_string(),
            track_num: num,
            duration,
            sources: vec![AudioSource::new(format!("{name}.mp3"))],
            ..Default::default()
        }
    }

    #[test]
    fn test_tracks_sorted_by_number_stable() {
        let mut ids = IdAllocator::new();
        let album = Album::from_config(
            &mut ids,
            AlbumConfig {
                name: "A".into(),
                tracks: vec![
                    track_cfg("three", Some(3), None),
                    track_cfg("one-a", Some(1), None),
                    track_cfg("two", Some(2), None),
                    track_cfg("one-b", Some(1), None),
                ],
                ..Default::default()
            },
        )
        .unwrap();

        let names: Vec<_> = album.tracks.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["one-a", "one-b", "two", "three"]);
        assert_eq!(album.track_position(album.tracks[3].id), Some(3));
    }

    #[test]
    fn test_album_duration_sums_known_tracks() {
        let mut ids = IdAllocator::new();
        let album = Album::from_config(
            &mut ids,
            AlbumConfig {
                name: "A".into(),
                tracks: vec![
                    track_cfg("a", Some(1), Some(DurationValue::Label("03:00".into()))),
                    track_cfg("b", Some(2), None),
                    track_cfg("c", Some(3), Some(DurationValue::Millis(1_500))),
                ],
                ..Default::default()
            },
        )
        .unwrap();
        assert_eq!(album.duration_ms(), 181_500);
    }

    #[test]
    fn test_bad_marker_time_is_rejected() {
        let mut cfg = track_cfg("a", None, None);
        cfg.markers.push(MarkerConfig {
            time: DurationValue::Label("soon".into()),
            label: "chorus".into(),
        });
        let err = Track::from_config(TrackId(1), cfg).unwrap_err();
        assert!(matches!(err, CatalogError::Duration { .. }));
    }

    #[test]
    fn test_empty_names_are_rejected() {
        let mut ids = IdAllocator::new();
        assert_eq!(
            Album::from_config(&mut ids, AlbumConfig::default()).unwrap_err(),
            CatalogError::EmptyAlbumName
        );
        let err = Album::from_config(
            &mut ids,
            AlbumConfig {
                name: "A".into(),
                tracks: vec![track_cfg("  ", None, None)],
                ..Default::default()
            },
        )
        .unwrap_err();
        assert!(err.to_string().contains("\"A\""));
    }

    #[test]
    fn test_display_helpers() {
        let mut t = Track::from_config(TrackId(1), track_cfg("x", None, None)).unwrap();
        assert_eq!(t.display_number(4), "05");
        t.track_num = Some(12);
        assert_eq!(t.display_number(0), "12");

        assert_eq!(t.writers_credit(), None);
        t.writers = vec!["Ann".into()];
        assert_eq!(t.writers_credit().as_deref(), Some("written by Ann"));
        t.writers = vec!["Ann".into(), "Bo".into(), "Cy".into()];
        assert_eq!(t.writers_credit().as_deref(), Some("written by Ann, Bo and Cy"));
    }

    #[test]
    fn test_download_source_prefers_mpeg() {
        let mut t = Track::from_config(TrackId(1), track_cfg("x", None, None)).unwrap();
        t.sources = vec![
            AudioSource { mimetype: Some("audio/ogg".into()), ..AudioSource::new("x.ogg") },
            AudioSource { mimetype: Some("audio/mpeg".into()), ..AudioSource::new("x.mp3") },
        ];
        assert_eq!(t.download_source().map(|s| s.uri.as_str()), Some("x.mp3"));
        t.sources.pop();
        assert_eq!(t.download_source().map(|s| s.uri.as_str()), Some("x.ogg"));
    }

    #[test]
    fn test_find_track_normalizes_names() {
        let mut ids = IdAllocator::new();
        let album = Album::from_config(
            &mut ids,
            AlbumConfig {
                name: "A".into(),
                tracks: vec![track_cfg("Don\u{2019}t Stop", None, None)],
                ..Default::default()
            },
        )
        .unwrap();
        assert!(album.find_track("don't stop").is_some());
        assert!(album.find_track("DON\u{2019}T STOP").is_some());
        assert!(album.find_track("dont stop").is_none());
    }
}
