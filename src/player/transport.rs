//! The media playback primitive the player drives.
//!
//! Decoding and output live behind [`MediaTransport`]; the player only reads
//! the clock and issues play/pause/seek.

use crate::catalog::AudioSource;

pub trait MediaTransport {
    /// Replace the loaded media. Resets the clock and metadata.
    fn load(&mut self, sources: &[AudioSource]);
    fn play(&mut self);
    fn pause(&mut self);
    fn paused(&self) -> bool;
    fn ended(&self) -> bool;
    /// Seconds
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, seconds: f64);
    /// Seconds, NaN until metadata is known.
    fn duration(&self) -> f64;
    /// 0.0..=1.0
    fn set_volume(&mut self, volume: f64);
    fn set_muted(&mut self, muted: bool);
    fn muted(&self) -> bool;
}

/// System media keys / now-playing integration.
pub trait MediaControls {
    fn bind(&mut self) -> anyhow::Result<()>;
    fn set_metadata(&mut self, title: &str, artist: Option<&str>, album: &str) -> anyhow::Result<()>;
}

/// Media clock without audio output, advanced explicitly with [`tick`].
///
/// [`tick`]: SimulatedTransport::tick
#[derive(Debug, Clone)]
pub struct SimulatedTransport {
    loaded: Option<String>,
    position: f64,
    duration: f64,
    paused: bool,
    volume: f64,
    muted: bool,
}

impl Default for SimulatedTransport {
    fn default() -> Self {
        Self {
            loaded: None,
            position: 0.0,
            duration: f64::NAN,
            paused: true,
            volume: 1.0,
            muted: false,
        }
    }
}

impl SimulatedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// What a real backend learns from the file header.
    pub fn set_duration(&mut self, seconds: f64) {
        self.duration = seconds;
    }

    pub fn loaded_uri(&self) -> Option<&str> {
        self.loaded.as_deref()
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    /// Advance the clock while playing, stopping at the end.
    pub fn tick(&mut self, seconds: f64) {
        if self.paused || self.loaded.is_none() {
            return;
        }
        self.position += seconds;
        if self.duration.is_finite() && self.position >= self.duration {
            self.position = self.duration;
            self.paused = true;
        }
    }
}

impl MediaTransport for SimulatedTransport {
    fn load(&mut self, sources: &[AudioSource]) {
        self.loaded = sources.first().map(|s| s.uri.clone());
        self.position = 0.0;
        self.duration = f64::NAN;
        self.paused = true;
    }

    fn play(&mut self) {
        if self.ended() {
            self.position = 0.0;
        }
        self.paused = false;
    }

    fn pause(&mut self) {
        self.paused = true;
    }

    fn paused(&self) -> bool {
        self.paused
    }

    fn ended(&self) -> bool {
        self.duration.is_finite() && self.position >= self.duration
    }

    fn current_time(&self) -> f64 {
        self.position
    }

    fn set_current_time(&mut self, seconds: f64) {
        self.position = if self.duration.is_finite() {
            seconds.clamp(0.0, self.duration)
        } else {
            seconds.max(0.0)
        };
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn set_volume(&mut self, volume: f64) {
        self.volume = volume.clamp(0.0, 1.0);
    }

    fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    fn muted(&self) -> bool {
        self.muted
    }
}
