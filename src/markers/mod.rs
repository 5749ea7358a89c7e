//! Timeline marker placement.
//!
//! Markers sit on the progress bar at their time fraction. Labels that would
//! overlap are pushed to a higher row ("level"), greedily, left to right.

use crate::catalog::Marker;
use crate::timefmt;
use serde::Serialize;

/// Rows available for stacking labels.
pub const MAX_LEVELS: usize = 10;
/// Minimum horizontal gap between two labels on the same row, in pixels.
pub const GUTTER_PX: f64 = 10.0;

const CHAR_WIDTH_PX: f64 = 5.25;
const CHROME_PX: f64 = 15.0;
const BASE_HEIGHT_PX: f64 = 35.0;
const LEVEL_HEIGHT_PX: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlacedMarker {
    pub time_ms: u64,
    pub label: String,
    /// "MM:SS"
    pub time_label: String,
    /// Position along the bar, 0.0..=1.0
    pub offset: f64,
    pub level: usize,
    /// Height of the marker stem in pixels.
    pub height: f64,
}

impl PlacedMarker {
    pub fn percent(&self) -> f64 {
        self.offset * 100.0
    }
}

/// Rendered label width estimate.
pub fn estimated_width(label: &str) -> f64 {
    label.chars().count() as f64 * CHAR_WIDTH_PX + CHROME_PX
}

pub fn level_height(level: usize) -> f64 {
    BASE_HEIGHT_PX + level as f64 * LEVEL_HEIGHT_PX
}

/// Assign levels to `(offset, width)` pairs, in the order given.
///
/// A level is taken when an earlier marker on it lies less than
/// `width + GUTTER_PX` pixels to the left of the current one. The lowest
/// free level wins; when every level is taken the top one is reused.
pub fn assign_levels(items: &[(f64, f64)], bar_width: f64) -> Vec<usize> {
    let mut placed: Vec<(f64, usize)> = Vec::with_capacity(items.len());

    for &(offset, width) in items {
        let mut blocked = [false; MAX_LEVELS];
        for &(prev_offset, level) in &placed {
            let distance = offset * bar_width - prev_offset * bar_width;
            if distance < width + GUTTER_PX {
                blocked[level] = true;
            }
        }

        let level = blocked
            .iter()
            .position(|&b| !b)
            .unwrap_or(MAX_LEVELS - 1);
        placed.push((offset, level));
    }

    placed.into_iter().map(|(_, level)| level).collect()
}

/// Lay out a track's markers on a bar `bar_width` pixels wide.
pub fn layout(markers: &[Marker], duration_ms: u64, bar_width: f64) -> Vec<PlacedMarker> {
    let items: Vec<(f64, f64)> = markers
        .iter()
        .map(|m| (m.time_ms as f64 / duration_ms as f64, estimated_width(&m.label)))
        .collect();
    let levels = assign_levels(&items, bar_width);

    markers
        .iter()
        .zip(items)
        .zip(levels)
        .map(|((m, (offset, _)), level)| PlacedMarker {
            time_ms: m.time_ms,
            label: m.label.clone(),
            time_label: timefmt::pretty_duration_from_ms(m.time_ms as f64),
            offset,
            level,
            height: level_height(level),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn marker(secs: u64, label: &str) -> Marker {
        Marker {
            time_ms: secs * 1000,
            label: label.to_string(),
        }
    }

    #[test]
    fn test_estimated_width() {
        assert_eq!(estimated_width(""), 15.0);
        assert_eq!(estimated_width("bridge"), 6.0 * 5.25 + 15.0);
        assert_eq!(estimated_width("çé"), 2.0 * 5.25 + 15.0);
    }

    #[test]
    fn test_spread_markers_share_level_zero() {
        // 100s track on a 1000px bar: 10px per second.
        let markers = [marker(0, "intro"), marker(30, "verse"), marker(60, "chorus")];
        let placed = layout(&markers, 100_000, 1000.0);
        assert!(placed.iter().all(|p| p.level == 0));
        assert!(placed.iter().all(|p| p.height == 35.0));
        assert_eq!(placed[1].time_label, "00:30");
        assert_eq!(placed[2].offset, 0.6);
        assert!((placed[2].percent() - 60.0).abs() < 1e-9);
    }

    #[test]
    fn test_close_markers_stack() {
        let markers = [
            marker(10, "a long label"),
            marker(12, "another"),
            marker(14, "third"),
            marker(80, "far away"),
        ];
        let placed = layout(&markers, 100_000, 1000.0);
        let levels: Vec<_> = placed.iter().map(|p| p.level).collect();
        assert_eq!(levels, [0, 1, 2, 0]);
        assert_eq!(placed[2].height, 95.0);
    }

    #[test]
    fn test_freed_level_is_reused() {
        // Width of "x" is 20.25, threshold 30.25px.
        let items = [(0.0, 20.25), (0.01, 20.25), (0.05, 20.25)];
        // 0 -> 0; 10px -> blocked by 0 -> 1; 50px from both -> 0.
        assert_eq!(assign_levels(&items, 1000.0), [0, 1, 0]);
    }

    #[test]
    fn test_threshold_is_strict() {
        // Exactly width + gutter apart does not collide.
        assert_eq!(assign_levels(&[(0.0, 40.0), (0.5, 40.0)], 100.0), [0, 0]);
        assert_eq!(assign_levels(&[(0.0, 40.0), (0.49, 40.0)], 100.0), [0, 1]);
    }

    #[test]
    fn test_overflow_reuses_top_level() {
        let items = vec![(0.5, 40.0); MAX_LEVELS + 3];
        let levels = assign_levels(&items, 800.0);
        assert_eq!(levels[..MAX_LEVELS].to_vec(), (0..MAX_LEVELS).collect::<Vec<_>>());
        assert!(levels[MAX_LEVELS..].iter().all(|&l| l == MAX_LEVELS - 1));
    }

    #[test]
    fn test_deterministic_and_no_shared_level_when_close() {
        let items: Vec<(f64, f64)> = (0..30)
            .map(|i| ((i as f64 * 0.37) % 1.0, 15.0 + (i % 7) as f64 * 5.25))
            .collect();
        let mut sorted = items.clone();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let first = assign_levels(&sorted, 640.0);
        assert_eq!(first, assign_levels(&sorted, 640.0));

        for i in 0..sorted.len() {
            for j in 0..i {
                let distance = sorted[i].0 * 640.0 - sorted[j].0 * 640.0;
                if distance < sorted[i].1 + GUTTER_PX && first[i] != MAX_LEVELS - 1 {
                    assert_ne!(first[i], first[j], "markers {j} and {i} collide");
                }
            }
        }
    }
}
