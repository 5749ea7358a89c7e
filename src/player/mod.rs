pub mod cursor;
pub mod events;
pub mod transport;

use crate::catalog::{Album, AlbumId, Catalog, Track, TrackId};
use crate::link::{self, Selection};
use crate::lyrics::{LyricMatch, TextSource, TimedText};
use crate::timefmt;
pub use cursor::{Direction, NavigationError, PlaybackCursor};
pub use events::PlayerEvent;
use tokio::sync::mpsc;
pub use transport::{MediaControls, MediaTransport, SimulatedTransport};

/// Snapshot returned by [`Player::tick`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Progress {
    pub time: String,
    pub duration: Option<String>,
    /// 0.0..=100.0, unknown until the duration is.
    pub percent: Option<f64>,
    pub lyric: Option<LyricMatch>,
}

/// Drives a transport from the catalog: navigation, seeking and the
/// per-tick progress/lyric bookkeeping.
pub struct Player<T, S> {
    catalog: Catalog,
    cursor: PlaybackCursor,
    transport: T,
    source: S,
    events: Option<mpsc::Sender<PlayerEvent>>,
    controls: Option<Box<dyn MediaControls + Send>>,
    pending_seek_ms: Option<u64>,
    last_time: Option<String>,
    last_duration: Option<String>,
    last_lyric: Option<usize>,
}

impl<T: MediaTransport, S: TextSource> Player<T, S> {
    pub fn new(catalog: Catalog, transport: T, source: S) -> Self {
        Self {
            catalog,
            cursor: PlaybackCursor::new(),
            transport,
            source,
            events: None,
            controls: None,
            pending_seek_ms: None,
            last_time: None,
            last_duration: None,
            last_lyric: None,
        }
    }

    pub fn subscribe(&mut self, capacity: usize) -> mpsc::Receiver<PlayerEvent> {
        let (tx, rx) = mpsc::channel(capacity);
        self.events = Some(tx);
        rx
    }

    /// Hook up system media controls. Failure is logged and ignored.
    pub fn attach_controls(&mut self, mut controls: Box<dyn MediaControls + Send>) {
        match controls.bind() {
            Ok(()) => self.controls = Some(controls),
            Err(e) => tracing::warn!("could not bind media controls: {e:#}"),
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.catalog.track(self.cursor.current_track()?)
    }

    pub fn playing_album(&self) -> Option<&Album> {
        self.cursor.playing_album(&self.catalog)
    }

    pub fn is_playing(&self) -> bool {
        !self.transport.paused()
    }

    fn emit(&self, event: PlayerEvent) {
        if let Some(tx) = &self.events
            && let Err(e) = tx.try_send(event)
        {
            tracing::debug!("dropped player event: {e}");
        }
    }

    pub fn select_album(&mut self, album: AlbumId) -> bool {
        let changed = self.cursor.select_album(album);
        if changed {
            self.emit(PlayerEvent::AlbumSelected { album });
        }
        changed
    }

    pub fn select_track(&mut self, track: TrackId) {
        self.cursor.select_track(track);
        self.load_current_track();
    }

    /// Restore a shared position, or start from the top of the catalog.
    pub fn select_initial(&mut self, selection: Option<&Selection>) -> Result<(), NavigationError> {
        if let Some(sel) = selection
            && let Some((album_id, track_id)) = link::resolve(&self.catalog, sel)
        {
            self.pending_seek_ms = sel.time_ms;
            self.select_album(album_id);
            if let Some(track_id) = track_id {
                self.select_track(track_id);
                return match self.current_track() {
                    Some(track) if track.sources.is_empty() => Err(NavigationError::NoSources {
                        track: track.name.clone(),
                    }),
                    _ => Ok(()),
                };
            }
        }
        self.advance(Direction::Forward).map(|_| ())
    }

    /// Step to the neighbouring track without touching play state.
    pub fn advance(&mut self, direction: Direction) -> Result<TrackId, NavigationError> {
        let album_before = self.cursor.current_album();
        let result = self.cursor.advance(&self.catalog, direction);
        let selected = matches!(result, Ok(_) | Err(NavigationError::NoSources { .. }));
        self.after_navigation(album_before, selected);
        result
    }

    fn after_navigation(&mut self, album_before: Option<AlbumId>, track_selected: bool) {
        if let Some(album) = self.cursor.current_album()
            && album_before != Some(album)
        {
            self.emit(PlayerEvent::AlbumSelected { album });
        }
        if track_selected {
            self.load_current_track();
        }
    }

    fn load_current_track(&mut self) {
        let Some(track_id) = self.cursor.current_track() else {
            return;
        };
        let Some(album) = self.catalog.album_containing(track_id) else {
            return;
        };
        let Some(track) = album.track(track_id) else {
            return;
        };

        self.transport.load(&track.sources);
        self.last_time = None;
        self.last_duration = None;
        self.last_lyric = None;

        if let Some(controls) = self.controls.as_mut()
            && let Err(e) = controls.set_metadata(&track.name, album.artist.as_deref(), &album.name)
        {
            tracing::warn!("could not set media metadata: {e:#}");
        }

        let event = PlayerEvent::TrackSelected {
            album: album.id,
            track: track_id,
        };
        self.emit(event);

        if let Some(ms) = self.pending_seek_ms.take() {
            self.seek_to_ms(ms as f64);
        }
    }

    /// Fetch and parse the current track's lyrics (once per track).
    pub async fn load_lyrics(&self) -> Option<&TimedText> {
        let lyrics = self.current_track()?.lyrics.as_ref()?;
        Some(lyrics.load(&self.source).await)
    }

    pub fn play(&mut self) -> Result<(), NavigationError> {
        if !self.transport.paused() {
            return Ok(());
        }
        if self.cursor.current_track().is_none() || self.transport.ended() {
            self.advance(Direction::Forward)?;
        }
        self.transport.play();
        self.emit(PlayerEvent::Started);
        Ok(())
    }

    pub fn pause(&mut self) {
        self.transport.pause();
        self.emit(PlayerEvent::Paused);
    }

    pub fn play_or_pause(&mut self) -> Result<(), NavigationError> {
        if self.is_playing() {
            self.pause();
            Ok(())
        } else {
            self.play()
        }
    }

    pub fn next_track(&mut self) -> Result<(), NavigationError> {
        self.pause();
        self.advance(Direction::Forward)?;
        self.play()
    }

    pub fn prev_track(&mut self) -> Result<(), NavigationError> {
        self.pause();
        self.advance(Direction::Backward)?;
        self.play()
    }

    pub fn next_album(&mut self) -> Result<(), NavigationError> {
        self.step_album(Direction::Forward)
    }

    pub fn prev_album(&mut self) -> Result<(), NavigationError> {
        self.step_album(Direction::Backward)
    }

    fn step_album(&mut self, direction: Direction) -> Result<(), NavigationError> {
        if self.catalog.albums().len() <= 1 {
            return Ok(());
        }
        self.pause();
        let album_before = self.cursor.current_album();
        let result = self.cursor.step_album(&self.catalog, direction);
        let selected = matches!(result, Ok(Some(_)));
        self.after_navigation(album_before, selected);
        result?;
        self.play()
    }

    /// The transport reached the end of the current track.
    pub fn on_ended(&mut self) -> Result<(), NavigationError> {
        self.emit(PlayerEvent::Ended);
        self.advance(Direction::Forward)?;
        self.play()
    }

    pub fn seek_to_ms(&mut self, ms: f64) {
        self.transport.set_current_time(ms / 1000.0);
    }

    /// Seek by `seconds` from the current position, never before 0.
    pub fn seek_relative(&mut self, seconds: f64) {
        let target = (self.transport.current_time() + seconds).max(0.0);
        self.seek_to_ms(target * 1000.0);
    }

    /// Position in ms at `percent` of the track, `None` while the duration is unknown.
    pub fn ms_from_percent(&self, percent: f64) -> Option<f64> {
        let duration = self.transport.duration();
        if !duration.is_finite() {
            return None;
        }
        Some(duration * (percent.clamp(0.0, 100.0) / 100.0) * 1000.0)
    }

    pub fn seek_to_percent(&mut self, percent: f64) {
        if let Some(ms) = self.ms_from_percent(percent) {
            self.seek_to_ms(ms);
        }
    }

    /// Jump to the cue of lyric line `index`. False while the lyrics are
    /// not loaded or the line does not exist.
    pub fn seek_to_lyric(&mut self, index: usize) -> bool {
        let Some(ms) = self
            .current_track()
            .and_then(|t| t.lyrics.as_ref()?.get()?.time_ms(index))
        else {
            return false;
        };
        self.seek_to_ms(ms as f64);
        true
    }

    /// Jump to a timeline marker of the current track, by position in its list.
    pub fn seek_to_marker(&mut self, index: usize) -> bool {
        let Some(ms) = self
            .current_track()
            .and_then(|t| t.markers.get(index))
            .map(|m| m.time_ms)
        else {
            return false;
        };
        self.seek_to_ms(ms as f64);
        true
    }

    /// 0.0..=1.0; zero mutes instead of setting the level.
    pub fn set_volume(&mut self, volume: f64) {
        if volume == 0.0 {
            self.transport.set_muted(true);
            return;
        }
        self.transport.set_muted(false);
        self.transport.set_volume(volume);
    }

    /// Sample the transport clock. Publishes progress when the displayed
    /// time changes and the lyric line when a new one becomes active.
    pub async fn tick(&mut self) -> Progress {
        let current = self.transport.current_time();
        let duration = self.transport.duration();
        let time = timefmt::pretty_duration_from_secs(current);
        let duration_label = duration
            .is_finite()
            .then(|| timefmt::pretty_duration_from_secs(duration));
        let percent = (duration.is_finite() && duration > 0.0)
            .then(|| (current / duration * 100.0).clamp(0.0, 100.0));

        if self.last_time.as_deref() != Some(time.as_str()) || self.last_duration != duration_label {
            self.last_time = Some(time.clone());
            self.last_duration = duration_label.clone();
            self.emit(PlayerEvent::Progress {
                time: time.clone(),
                duration: duration_label.clone(),
            });
        }

        let lyric = match self.current_track().and_then(|t| t.lyrics.as_ref()) {
            Some(lyrics) => lyrics.lyrics_at_deferred(&self.source, &time).await.into_match(),
            None => None,
        };
        if let Some(hit) = &lyric
            && self.last_lyric != Some(hit.index)
        {
            self.last_lyric = Some(hit.index);
            self.emit(PlayerEvent::LyricLine {
                index: hit.index,
                line: hit.line.clone(),
            });
        }

        Progress {
            time,
            duration: duration_label,
            percent,
            lyric,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{
        AlbumConfig, AudioSource, CatalogConfig, DurationValue, IdAllocator, MarkerConfig,
        TrackConfig,
    };
    use std::sync::{Arc, Mutex};

    struct StaticSource(&'static str);

    impl TextSource for StaticSource {
        async fn fetch(&self, _locator: &str) -> anyhow::Result<String> {
            Ok(self.0.to_string())
        }
    }

    const LRC: &str = "[00:02.00]hello\n[00:05.50]world\n";

    fn catalog() -> Catalog {
        let track = |name: &str, n: u32| TrackConfig {
            name: name.into(),
            track_num: Some(n),
            duration: Some(DurationValue::Label("00:10".into())),
            lyrics: Some(format!("{name}.lrc")),
            sources: vec![AudioSource::new(format!("{name}.mp3"))],
            ..Default::default()
        };
        let cfg = CatalogConfig {
            description: vec![],
            albums: vec![
                AlbumConfig {
                    name: "A".into(),
                    date: Some("2022".into()),
                    artist: Some("Ann".into()),
                    tracks: vec![track("a1", 1), track("a2", 2)],
                    ..Default::default()
                },
                AlbumConfig {
                    name: "B".into(),
                    date: Some("2021".into()),
                    tracks: vec![track("b1", 1)],
                    ..Default::default()
                },
            ],
        };
        Catalog::from_config(cfg, &mut IdAllocator::new()).unwrap()
    }

    fn player() -> Player<SimulatedTransport, StaticSource> {
        Player::new(catalog(), SimulatedTransport::new(), StaticSource(LRC))
    }

    fn drain(rx: &mut mpsc::Receiver<PlayerEvent>) -> Vec<PlayerEvent> {
        std::iter::from_fn(|| rx.try_recv().ok()).collect()
    }

    #[test]
    fn test_play_with_nothing_selected_starts_first_track() {
        let mut p = player();
        let mut rx = p.subscribe(16);
        p.play().unwrap();

        assert_eq!(p.current_track().map(|t| t.name.as_str()), Some("a1"));
        assert_eq!(p.transport().loaded_uri(), Some("a1.mp3"));
        assert!(p.is_playing());

        let events = drain(&mut rx);
        assert!(matches!(events[0], PlayerEvent::AlbumSelected { .. }));
        assert!(matches!(events[1], PlayerEvent::TrackSelected { .. }));
        assert_eq!(events[2], PlayerEvent::Started);
    }

    #[test]
    fn test_next_and_prev_track() {
        let mut p = player();
        p.play().unwrap();
        p.next_track().unwrap();
        assert_eq!(p.current_track().unwrap().name, "a2");
        p.next_track().unwrap();
        assert_eq!(p.current_track().unwrap().name, "b1");
        assert_eq!(p.playing_album().unwrap().name, "B");
        p.prev_track().unwrap();
        assert_eq!(p.current_track().unwrap().name, "a2");
        assert!(p.is_playing());
    }

    #[test]
    fn test_album_steps() {
        let mut p = player();
        p.play().unwrap();
        p.next_album().unwrap();
        assert_eq!(p.current_track().unwrap().name, "b1");
        p.next_album().unwrap();
        assert_eq!(p.current_track().unwrap().name, "a1");
        p.prev_album().unwrap();
        assert_eq!(p.current_track().unwrap().name, "b1");
    }

    #[test]
    fn test_ended_advances_and_plays() {
        let mut p = player();
        p.play().unwrap();
        p.transport_mut().set_duration(10.0);
        p.transport_mut().tick(11.0);
        assert!(p.transport().ended());
        p.on_ended().unwrap();
        assert_eq!(p.current_track().unwrap().name, "a2");
        assert!(p.is_playing());
    }

    #[test]
    fn test_seeking() {
        let mut p = player();
        p.play().unwrap();
        assert_eq!(p.ms_from_percent(50.0), None);
        p.seek_to_percent(50.0);
        assert_eq!(p.transport().current_time(), 0.0);

        p.transport_mut().set_duration(200.0);
        assert_eq!(p.ms_from_percent(150.0), Some(200_000.0));
        p.seek_to_percent(25.0);
        assert_eq!(p.transport().current_time(), 50.0);
        p.seek_relative(-10.0);
        assert_eq!(p.transport().current_time(), 40.0);
        p.seek_relative(-100.0);
        assert_eq!(p.transport().current_time(), 0.0);
    }

    #[test]
    fn test_volume_zero_mutes() {
        let mut p = player();
        p.set_volume(0.0);
        assert!(p.transport().muted());
        p.set_volume(0.5);
        assert!(!p.transport().muted());
        assert_eq!(p.transport().volume(), 0.5);
    }

    #[test]
    fn test_initial_selection_from_link() {
        let mut p = player();
        let sel = Selection {
            album: "b".into(),
            track: Some("B1".into()),
            time_ms: Some(3_000),
        };
        p.select_initial(Some(&sel)).unwrap();
        assert_eq!(p.current_track().unwrap().name, "b1");
        assert_eq!(p.transport().current_time(), 3.0);

        let mut p = player();
        let sel = Selection {
            album: "missing".into(),
            track: None,
            time_ms: None,
        };
        p.select_initial(Some(&sel)).unwrap();
        assert_eq!(p.current_track().unwrap().name, "a1");
    }

    #[test]
    fn test_initial_selection_of_track_without_sources() {
        let cfg = CatalogConfig {
            description: vec![],
            albums: vec![AlbumConfig {
                name: "A".into(),
                tracks: vec![
                    TrackConfig {
                        name: "silent".into(),
                        track_num: Some(1),
                        ..Default::default()
                    },
                    TrackConfig {
                        name: "ok".into(),
                        track_num: Some(2),
                        sources: vec![AudioSource::new("ok.mp3")],
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
        };
        let catalog = Catalog::from_config(cfg, &mut IdAllocator::new()).unwrap();
        let mut p = Player::new(catalog, SimulatedTransport::new(), StaticSource(LRC));
        let sel = Selection {
            album: "A".into(),
            track: Some("silent".into()),
            time_ms: None,
        };
        assert_eq!(
            p.select_initial(Some(&sel)),
            Err(NavigationError::NoSources { track: "silent".into() })
        );
        p.next_track().unwrap();
        assert_eq!(p.current_track().unwrap().name, "ok");
    }

    #[test]
    fn test_seek_to_marker() {
        let cfg = CatalogConfig {
            description: vec![],
            albums: vec![AlbumConfig {
                name: "A".into(),
                tracks: vec![TrackConfig {
                    name: "t".into(),
                    duration: Some(DurationValue::Label("01:00".into())),
                    sources: vec![AudioSource::new("t.mp3")],
                    markers: vec![
                        MarkerConfig {
                            time: DurationValue::Label("00:20".into()),
                            label: "verse".into(),
                        },
                        MarkerConfig {
                            time: DurationValue::Millis(42_000),
                            label: "solo".into(),
                        },
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            }],
        };
        let catalog = Catalog::from_config(cfg, &mut IdAllocator::new()).unwrap();
        let mut p = Player::new(catalog, SimulatedTransport::new(), StaticSource(LRC));
        assert!(!p.seek_to_marker(0));

        p.play().unwrap();
        p.transport_mut().set_duration(60.0);
        assert!(p.seek_to_marker(1));
        assert_eq!(p.transport().current_time(), 42.0);
        assert!(p.seek_to_marker(0));
        assert_eq!(p.transport().current_time(), 20.0);
        assert!(!p.seek_to_marker(2));
    }

    #[tokio::test]
    async fn test_tick_reports_lyrics_after_load() {
        let mut p = player();
        let mut rx = p.subscribe(32);
        p.play().unwrap();
        p.transport_mut().set_duration(10.0);
        p.transport_mut().tick(3.0);

        // Nothing asked for the lyrics yet.
        let progress = p.tick().await;
        assert_eq!(progress.time, "00:03");
        assert_eq!(progress.duration.as_deref(), Some("00:10"));
        assert_eq!(progress.lyric, None);

        assert_eq!(p.load_lyrics().await.map(|t| t.len()), Some(2));
        let progress = p.tick().await;
        assert_eq!(progress.lyric.map(|m| m.line), Some("hello".to_string()));

        p.transport_mut().tick(3.0);
        let progress = p.tick().await;
        assert_eq!(progress.lyric.map(|m| m.index), Some(1));
        assert_eq!(progress.percent, Some(60.0));

        assert!(p.seek_to_lyric(0));
        assert_eq!(p.transport().current_time(), 2.0);
        assert!(!p.seek_to_lyric(7));

        let lyric_events: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::LyricLine { .. }))
            .collect();
        assert_eq!(
            lyric_events,
            [
                PlayerEvent::LyricLine { index: 0, line: "hello".into() },
                PlayerEvent::LyricLine { index: 1, line: "world".into() },
            ]
        );
    }

    #[tokio::test]
    async fn test_progress_only_published_on_change() {
        let mut p = player();
        let mut rx = p.subscribe(32);
        p.play().unwrap();
        drain(&mut rx);

        p.tick().await;
        p.tick().await;
        let progress: Vec<_> = drain(&mut rx)
            .into_iter()
            .filter(|e| matches!(e, PlayerEvent::Progress { .. }))
            .collect();
        assert_eq!(progress.len(), 1);
    }

    #[derive(Clone, Default)]
    struct RecordingControls {
        fail_bind: bool,
        titles: Arc<Mutex<Vec<String>>>,
    }

    impl MediaControls for RecordingControls {
        fn bind(&mut self) -> anyhow::Result<()> {
            if self.fail_bind {
                anyhow::bail!("no media session");
            }
            Ok(())
        }

        fn set_metadata(&mut self, title: &str, _artist: Option<&str>, _album: &str) -> anyhow::Result<()> {
            self.titles.lock().unwrap().push(title.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_media_controls_are_optional() {
        let controls = RecordingControls::default();
        let titles = controls.titles.clone();
        let mut p = player();
        p.attach_controls(Box::new(controls));
        p.play().unwrap();
        assert_eq!(*titles.lock().unwrap(), ["a1"]);

        let broken = RecordingControls {
            fail_bind: true,
            ..Default::default()
        };
        let titles = broken.titles.clone();
        let mut p = player();
        p.attach_controls(Box::new(broken));
        p.play().unwrap();
        assert!(titles.lock().unwrap().is_empty());
    }
}
