//! Plain-text and JSON views of the catalog and player state.

use crate::catalog::{Album, Catalog, Track};
use crate::link;
use crate::lyrics::TimedText;
use crate::markers::PlacedMarker;
use crate::player::PlayerEvent;
use crate::timefmt;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AlbumView<'a> {
    pub name: &'a str,
    pub artist: Option<&'a str>,
    pub date: Option<&'a str>,
    pub duration: String,
    pub download: Option<DownloadView<'a>>,
    pub tracks: Vec<TrackView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct TrackView<'a> {
    pub number: String,
    pub name: &'a str,
    pub duration: Option<String>,
    pub credit: Option<String>,
    pub recommended: bool,
    pub lyrics: bool,
    pub markers: usize,
    pub download: Option<DownloadView<'a>>,
}

#[derive(Debug, Serialize)]
pub struct DownloadView<'a> {
    pub uri: &'a str,
    pub size: Option<String>,
}

impl<'a> AlbumView<'a> {
    pub fn new(album: &'a Album) -> Self {
        Self {
            name: &album.name,
            artist: album.artist.as_deref(),
            date: album.date.as_deref(),
            duration: timefmt::pretty_duration_from_ms(album.duration_ms() as f64),
            download: album.download_link.as_ref().map(|d| DownloadView {
                uri: &d.uri,
                size: d.size.map(timefmt::pretty_filesize),
            }),
            tracks: album
                .tracks
                .iter()
                .enumerate()
                .map(|(i, t)| TrackView::new(t, i))
                .collect(),
        }
    }
}

impl<'a> TrackView<'a> {
    pub fn new(track: &'a Track, position: usize) -> Self {
        Self {
            number: track.display_number(position),
            name: &track.name,
            duration: track
                .duration_ms
                .map(|ms| timefmt::pretty_duration_from_ms(ms as f64)),
            credit: track.writers_credit(),
            recommended: track.recommended,
            lyrics: track.lyrics.is_some(),
            markers: track.markers.len(),
            download: track.download_source().map(|s| DownloadView {
                uri: &s.uri,
                size: s.size.map(timefmt::pretty_filesize),
            }),
        }
    }
}

pub fn album_lines(view: &AlbumView<'_>) -> Vec<String> {
    let mut header = view.name.to_string();
    if let Some(artist) = view.artist {
        header.push_str(&format!(" - {artist}"));
    }
    if let Some(date) = view.date {
        header.push_str(&format!(" ({date})"));
    }
    header.push_str(&format!("  [{}]", view.duration));

    let mut out = vec![header];
    for t in &view.tracks {
        let star = if t.recommended { " *" } else { "" };
        let duration = t.duration.as_deref().unwrap_or("--:--");
        let mut line = format!("  {}. {}{star}  {duration}", t.number, t.name);
        if let Some(credit) = &t.credit {
            line.push_str(&format!("  ({credit})"));
        }
        out.push(line);
    }
    out
}

/// `[MM:SS] text`, with `>` in front of the active line.
pub fn lyric_lines(text: &TimedText, active: Option<usize>) -> Vec<String> {
    text.iter()
        .enumerate()
        .map(|(i, l)| {
            let mark = if active == Some(i) { '>' } else { ' ' };
            format!("{mark} [{}] {}", l.time, l.text)
        })
        .collect()
}

/// Numbered from 1, matching the `m <n>` command.
pub fn marker_lines(markers: &[PlacedMarker]) -> Vec<String> {
    markers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "{:>2}. {}  {:5.1}%  level {}  {}",
                i + 1,
                m.time_label,
                m.percent(),
                m.level,
                m.label
            )
        })
        .collect()
}

/// A placed marker with a link that opens the track at it.
#[derive(Debug, Serialize)]
pub struct MarkerView<'a> {
    #[serde(flatten)]
    pub marker: &'a PlacedMarker,
    pub link: String,
}

pub fn marker_views<'a>(
    markers: &'a [PlacedMarker],
    base_url: &str,
    album: &str,
    track: &str,
) -> Vec<MarkerView<'a>> {
    markers
        .iter()
        .map(|marker| MarkerView {
            marker,
            link: link::track_url(base_url, album, track, Some(&marker.time_label)),
        })
        .collect()
}

/// One status line per player event. Progress is left to the caller.
pub fn event_line(catalog: &Catalog, event: &PlayerEvent) -> Option<String> {
    match event {
        PlayerEvent::AlbumSelected { album } => {
            let album = catalog.album(*album)?;
            Some(format!("== {}", album.name))
        }
        PlayerEvent::TrackSelected { album, track } => {
            let album = catalog.album(*album)?;
            let position = album.track_position(*track)?;
            let track = &album.tracks[position];
            Some(format!(
                "-> {}. {} ({})",
                track.display_number(position),
                track.name,
                album.name
            ))
        }
        PlayerEvent::Started => Some("playing".to_string()),
        PlayerEvent::Paused => Some("paused".to_string()),
        PlayerEvent::Ended => Some("ended".to_string()),
        PlayerEvent::LyricLine { line, .. } => Some(format!("   ♪ {line}")),
        PlayerEvent::Progress { .. } => None,
    }
}
