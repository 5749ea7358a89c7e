//! Shareable playback positions.
//!
//! A position is carried in the query string of the page URL:
//! `?album=<name>&track=<name>&time=<SS or MM:SS>`. Names match
//! case-insensitively, with typographic apostrophes folded to ASCII.

use crate::catalog::{AlbumId, Catalog, TrackId};
use crate::timefmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub album: String,
    pub track: Option<String>,
    pub time_ms: Option<u64>,
}

/// Link to `track` of `album` on the page at `base`, optionally at `time`.
///
/// Other query parameters and the fragment of `base` are kept. Without a
/// time, any existing `time` parameter is dropped.
pub fn track_url(base: &str, album: &str, track: &str, time: Option<&str>) -> String {
    let (rest, fragment) = match base.split_once('#') {
        Some((rest, fragment)) => (rest, Some(fragment)),
        None => (base, None),
    };
    let (path, query) = rest.split_once('?').unwrap_or((rest, ""));

    let mut params: Vec<(String, String)> = parse_query(query)
        .into_iter()
        .filter(|(k, _)| !matches!(k.as_str(), "album" | "track" | "time"))
        .collect();
    params.push(("album".into(), album.into()));
    params.push(("track".into(), track.into()));
    if let Some(time) = time.filter(|t| !t.is_empty()) {
        params.push(("time".into(), time.into()));
    }

    let query = params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&");

    let mut url = format!("{path}?{query}");
    if let Some(fragment) = fragment {
        url.push('#');
        url.push_str(fragment);
    }
    url
}

/// Read a position back out of a URL. `None` without an `album` parameter.
///
/// A malformed `time` is ignored rather than rejecting the whole link.
pub fn parse_selection(url: &str) -> Option<Selection> {
    let rest = url.split_once('#').map_or(url, |(rest, _)| rest);
    let query = rest.split_once('?').map_or("", |(_, q)| q);
    let params = parse_query(query);
    let get = |key: &str| {
        params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
    };

    Some(Selection {
        album: get("album")?,
        track: get("track"),
        time_ms: get("time").and_then(|t| timefmt::parse_seek_param(&t)),
    })
}

/// Find the album, and the track if one was named, in `catalog`.
pub fn resolve(catalog: &Catalog, sel: &Selection) -> Option<(AlbumId, Option<TrackId>)> {
    let album = catalog.find_album(&sel.album)?;
    let track = sel
        .track
        .as_deref()
        .and_then(|name| album.find_track(name))
        .map(|t| t.id);
    Some((album.id, track))
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

fn decode(raw: &str) -> String {
    let raw = raw.replace('+', " ");
    match urlencoding::decode(&raw) {
        Ok(s) => s.into_owned(),
        Err(_) => raw,
    }
}
