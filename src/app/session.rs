//! Headless playback: a [`Player`] over the simulated clock, printing what a
//! screen would show.

use super::actions::Action;
use super::render;
use crate::config::Config;
use crate::input;
use crate::link::{self, Selection};
use crate::lyrics::TextSource;
use crate::player::{
    MediaControls, MediaTransport, NavigationError, Player, PlayerEvent, SimulatedTransport,
};
use crate::timefmt;
use tokio::sync::mpsc;

const VOLUME_STEP: i16 = 10;

pub struct Session<S> {
    player: Player<SimulatedTransport, S>,
    events: mpsc::Receiver<PlayerEvent>,
    volume: u8,
    seek_step: f64,
    fine_seek_step: f64,
    bar_width: f64,
    base_url: String,
    finished: usize,
    max_tracks: usize,
    echo: bool,
    transcript: Vec<String>,
}

/// Reports the now-playing track through the log.
pub struct LogControls;

impl MediaControls for LogControls {
    fn bind(&mut self) -> anyhow::Result<()> {
        Ok(())
    }

    fn set_metadata(&mut self, title: &str, artist: Option<&str>, album: &str) -> anyhow::Result<()> {
        tracing::info!(title, artist = artist.unwrap_or("-"), album, "now playing");
        Ok(())
    }
}

impl<S: TextSource> Session<S> {
    /// Stops once `max_tracks` tracks have played to the end.
    pub fn new(mut player: Player<SimulatedTransport, S>, cfg: &Config, max_tracks: usize) -> Self {
        let events = player.subscribe(256);
        let volume = cfg.player.volume.min(100);
        player.set_volume(f64::from(volume) / 100.0);
        Self {
            player,
            events,
            volume,
            seek_step: cfg.player.seek_step_secs as f64,
            fine_seek_step: cfg.player.fine_seek_step_secs as f64,
            bar_width: cfg.layout.bar_width,
            base_url: cfg.link.base_url.clone(),
            finished: 0,
            max_tracks,
            echo: true,
            transcript: Vec::new(),
        }
    }

    /// Keep output in the transcript only.
    #[cfg(test)]
    pub fn quiet(mut self) -> Self {
        self.echo = false;
        self
    }

    pub fn player(&self) -> &Player<SimulatedTransport, S> {
        &self.player
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    fn say(&mut self, line: String) {
        if self.echo {
            println!("{line}");
        }
        self.transcript.push(line);
    }

    pub fn start(&mut self, selection: Option<&Selection>) -> anyhow::Result<()> {
        let selected = self.player.select_initial(selection);
        self.recover(selected)?;
        let started = self.player.play();
        self.recover(started)?;
        self.flush();
        Ok(())
    }

    /// Skip forward past tracks that cannot be played, at most one lap.
    fn recover(&mut self, mut result: Result<(), NavigationError>) -> anyhow::Result<()> {
        let limit: usize = self.player.catalog().albums().iter().map(|a| a.tracks.len()).sum();
        let mut skipped = 0;
        loop {
            match result {
                Err(NavigationError::NoSources { track }) if skipped < limit => {
                    tracing::warn!(%track, "no audio sources, skipping");
                    skipped += 1;
                    result = self.player.next_track();
                }
                other => return Ok(other?),
            }
        }
    }

    /// Fill in what a media backend would learn after loading: the duration.
    async fn prepare_track(&mut self) {
        if self.player.transport().duration().is_finite() {
            return;
        }
        let Some(track) = self.player.current_track() else {
            return;
        };
        let name = track.name.clone();
        let duration_ms = track.duration_ms;
        let markers = track.marker_layout(self.bar_width);
        let fresh_lyrics = track.lyrics.as_ref().is_some_and(|l| !l.is_loaded());
        tracing::debug!(
            track = %name,
            uri = self.player.transport().loaded_uri().unwrap_or("-"),
            "track loaded"
        );

        match duration_ms {
            Some(ms) => self.player.transport_mut().set_duration(ms as f64 / 1000.0),
            None => {
                tracing::warn!(track = %name, "unknown duration, skipping");
                self.player.transport_mut().set_duration(0.0);
            }
        }
        for line in markers.as_deref().map(render::marker_lines).unwrap_or_default() {
            self.say(format!("   | {line}"));
        }
        if let Some(text) = self.player.load_lyrics().await
            && fresh_lyrics
        {
            tracing::debug!(track = %name, lines = text.len(), "lyrics ready");
        }
    }

    /// Advance the clock by `seconds`. Returns false once playback is over.
    pub async fn step(&mut self, seconds: f64) -> anyhow::Result<bool> {
        self.prepare_track().await;
        self.player.transport_mut().tick(seconds);
        let progress = self.player.tick().await;
        tracing::trace!(
            time = %progress.time,
            duration = ?progress.duration,
            percent = ?progress.percent,
            lyric = ?progress.lyric.as_ref().map(|m| m.index),
            "tick"
        );
        self.flush();

        if self.player.transport().ended() {
            self.finished += 1;
            if self.finished >= self.max_tracks {
                self.flush();
                return Ok(false);
            }
            let next = self.player.on_ended();
            self.recover(next)?;
            self.flush();
        }
        Ok(true)
    }

    /// Returns false on quit.
    pub fn apply(&mut self, action: Action) -> anyhow::Result<bool> {
        let result = match action {
            Action::Quit => return Ok(false),
            Action::TogglePause => self.player.play_or_pause(),
            Action::NextTrack => self.player.next_track(),
            Action::PrevTrack => self.player.prev_track(),
            Action::NextAlbum => self.player.next_album(),
            Action::PrevAlbum => self.player.prev_album(),
            Action::SeekForward => {
                self.player.seek_relative(self.seek_step);
                Ok(())
            }
            Action::SeekBack => {
                self.player.seek_relative(-self.seek_step);
                Ok(())
            }
            Action::FineSeekForward => {
                self.player.seek_relative(self.fine_seek_step);
                Ok(())
            }
            Action::FineSeekBack => {
                self.player.seek_relative(-self.fine_seek_step);
                Ok(())
            }
            Action::SeekPercent(pct) => {
                self.player.seek_to_percent(pct);
                Ok(())
            }
            Action::SeekLyric(index) => {
                if !self.player.seek_to_lyric(index) {
                    self.say(format!("no lyric line {}", index + 1));
                }
                Ok(())
            }
            Action::SeekMarker(index) => {
                if !self.player.seek_to_marker(index) {
                    self.say(format!("no marker {}", index + 1));
                }
                Ok(())
            }
            Action::VolumeUp => {
                self.change_volume(VOLUME_STEP);
                Ok(())
            }
            Action::VolumeDown => {
                self.change_volume(-VOLUME_STEP);
                Ok(())
            }
            Action::Share => {
                if let Some(url) = self.share_link() {
                    self.say(url);
                }
                Ok(())
            }
            Action::Help => {
                self.say(input::HELP.to_string());
                Ok(())
            }
        };
        self.recover(result)?;
        self.flush();
        Ok(true)
    }

    fn change_volume(&mut self, delta: i16) {
        self.volume = (i16::from(self.volume) + delta).clamp(0, 100) as u8;
        self.player.set_volume(f64::from(self.volume) / 100.0);
        let transport = self.player.transport();
        let line = if transport.muted() {
            "muted".to_string()
        } else {
            format!("volume {:.0}%", transport.volume() * 100.0)
        };
        self.say(line);
    }

    /// Link that reopens the current track at the current position.
    pub fn share_link(&self) -> Option<String> {
        let track = self.player.current_track()?;
        let album = self.player.playing_album()?;
        let time = timefmt::pretty_duration_from_secs(self.player.transport().current_time());
        Some(link::track_url(&self.base_url, &album.name, &track.name, Some(&time)))
    }

    fn flush(&mut self) {
        while let Ok(event) = self.events.try_recv() {
            if let PlayerEvent::Progress { time, duration } = &event {
                tracing::debug!(%time, duration = duration.as_deref().unwrap_or("\u{2026}"), "progress");
            }
            if let Some(line) = render::event_line(self.player.catalog(), &event) {
                self.say(line);
            }
        }
    }
}
