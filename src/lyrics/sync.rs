use super::parser::{LyricMatch, TimedText};
use super::source::TextSource;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;

/// Outcome of a lookup that may have to wait for the lyrics to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deferred {
    /// Nobody asked for the lyrics yet, so there is nothing to wait on.
    Unavailable,
    Ready(Option<LyricMatch>),
}

impl Deferred {
    pub fn into_match(self) -> Option<LyricMatch> {
        match self {
            Deferred::Unavailable => None,
            Deferred::Ready(m) => m,
        }
    }
}

/// Lyrics attached to a track: a locator plus the parsed index, loaded once.
///
/// The first `load` fetches and parses; concurrent and later callers share
/// that single result. A failed fetch leaves the track loaded but empty and
/// is never retried.
#[derive(Debug)]
pub struct LyricTrack {
    locator: String,
    requested: AtomicBool,
    text: OnceCell<TimedText>,
}

impl LyricTrack {
    pub fn new(locator: impl Into<String>) -> Self {
        Self {
            locator: locator.into(),
            requested: AtomicBool::new(false),
            text: OnceCell::new(),
        }
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn is_loaded(&self) -> bool {
        self.text.initialized()
    }

    /// Parsed lyrics if the load already finished.
    pub fn get(&self) -> Option<&TimedText> {
        self.text.get()
    }

    pub async fn load<S: TextSource>(&self, source: &S) -> &TimedText {
        self.requested.store(true, Ordering::Release);
        self.text
            .get_or_init(|| async {
                match source.fetch(&self.locator).await {
                    Ok(raw) => {
                        let text = TimedText::parse(&raw);
                        tracing::debug!(locator = %self.locator, lines = text.len(), "lyrics loaded");
                        text
                    }
                    Err(e) => {
                        tracing::warn!(locator = %self.locator, "failed to load lyrics: {e:#}");
                        TimedText::default()
                    }
                }
            })
            .await
    }

    /// Active line at `timestamp`, once the pending load has settled.
    ///
    /// Returns `Unavailable` right away when `load` was never called. The
    /// source is only consulted if the load that was started got dropped
    /// before finishing.
    pub async fn lyrics_at_deferred<S: TextSource>(&self, source: &S, timestamp: &str) -> Deferred {
        if !self.requested.load(Ordering::Acquire) {
            return Deferred::Unavailable;
        }
        Deferred::Ready(self.load(source).await.find_at(timestamp))
    }
}
