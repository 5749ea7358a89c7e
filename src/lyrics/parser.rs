//! Timed lyric parser
//!
//! Accepts one cue per line:
//! [mm:ss.xx]Lyrics line here
//!
//! Only the `mm:ss` part is kept as the time label; the centiseconds must
//! be present but are dropped. Anything else on a line of its own is skipped.

use crate::timefmt;

/// A single line of lyrics with its time label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimedLine<'a> {
    pub text: &'a str,
    pub time: &'a str,
}

/// Result of a lookup: the active line and where it sits in the index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricMatch {
    pub line: String,
    pub index: usize,
}

/// Index-aligned lyric lines and `MM:SS` labels in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimedText {
    lines: Vec<String>,
    times: Vec<String>,
}

impl TimedText {
    pub fn parse(content: &str) -> Self {
        let mut out = Self::default();

        for line in content.lines() {
            if let Some((time, text)) = Self::parse_cue(line) {
                out.times.push(time.to_string());
                out.lines.push(text.to_string());
            }
        }

        if !out.is_sorted() {
            tracing::warn!(
                lines = out.len(),
                "lyric timestamps are not in ascending order, lookups may be off"
            );
        }

        out
    }

    /// Split `[mm:ss.xx]text` into (`mm:ss`, `text`).
    fn parse_cue(line: &str) -> Option<(&str, &str)> {
        let b = line.as_bytes();
        if b.len() < 10 || b[0] != b'[' || b[3] != b':' || b[6] != b'.' || b[9] != b']' {
            return None;
        }
        let digits = [1, 2, 4, 5, 7, 8];
        if !digits.iter().all(|&i| b[i].is_ascii_digit()) {
            return None;
        }
        // All bytes checked so far are ASCII, so these are char boundaries.
        Some((&line[1..6], &line[10..]))
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn times(&self) -> &[String] {
        &self.times
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = TimedLine<'_>> {
        self.lines.iter().zip(&self.times).map(|(text, time)| TimedLine {
            text: text.as_str(),
            time: time.as_str(),
        })
    }

    pub fn time_for_index(&self, index: usize) -> Option<&str> {
        self.times.get(index).map(String::as_str)
    }

    /// Seek target for a line, in milliseconds.
    pub fn time_ms(&self, index: usize) -> Option<u64> {
        timefmt::parse_duration_ms(self.time_for_index(index)?).ok()
    }

    fn is_sorted(&self) -> bool {
        self.times.windows(2).all(|w| w[0] <= w[1])
    }

    /// Line active at `timestamp` ("MM:SS"): the last cue at or before it.
    ///
    /// Labels are fixed-width and zero padded, so plain string ordering
    /// matches numeric ordering. Returns `None` before the first cue.
    pub fn find_at(&self, timestamp: &str) -> Option<LyricMatch> {
        let mut low = 0usize;
        let mut high = self.times.len();
        let mut prev = None;

        // Half-open [low, high).
        while low < high {
            let mid = low + (high - low) / 2;
            match self.times[mid].as_str().cmp(timestamp) {
                std::cmp::Ordering::Greater => high = mid,
                std::cmp::Ordering::Less => {
                    prev = Some(mid);
                    low = mid + 1;
                }
                std::cmp::Ordering::Equal => {
                    return Some(self.match_at(mid));
                }
            }
        }

        prev.map(|i| self.match_at(i))
    }

    fn match_at(&self, index: usize) -> LyricMatch {
        LyricMatch {
            line: self.lines[index].clone(),
            index,
        }
    }
}
