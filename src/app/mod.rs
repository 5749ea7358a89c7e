pub mod actions;
pub mod render;
pub mod session;

use crate::catalog::{Album, Catalog, Track};
use crate::config::Config;
use crate::input;
use crate::link::{self, Selection};
use crate::lyrics::AnySource;
use crate::player::{Player, SimulatedTransport};
use crate::timefmt;
use anyhow::Context;
use render::AlbumView;
use session::{LogControls, Session};
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;

pub struct App {
    cfg: Config,
    config_path: PathBuf,
}

impl App {
    pub fn new(cfg: Config, config_path: PathBuf) -> Self {
        Self { cfg, config_path }
    }

    fn load_catalog(&self) -> anyhow::Result<Catalog> {
        Catalog::load(&self.cfg.paths.catalog).context("load catalog")
    }

    pub fn albums(&self, json: bool) -> anyhow::Result<()> {
        let catalog = self.load_catalog()?;
        let views: Vec<AlbumView<'_>> = catalog.albums().iter().map(AlbumView::new).collect();
        if json {
            println!("{}", serde_json::to_string_pretty(&views)?);
            return Ok(());
        }
        for paragraph in catalog.description() {
            println!("{paragraph}");
            println!();
        }
        for view in &views {
            for line in render::album_lines(view) {
                println!("{line}");
            }
        }
        Ok(())
    }

    /// Print a track's lyrics, marking the line active at `at` (`SS` or `MM:SS`).
    pub async fn lyrics(&self, album: &str, track: &str, at: Option<&str>, json: bool) -> anyhow::Result<()> {
        let catalog = self.load_catalog()?;
        let (_, track) = find_track(&catalog, album, track)?;
        let lyrics = track
            .lyrics
            .as_ref()
            .with_context(|| format!("{:?} has no lyrics", track.name))?;
        let source = AnySource::from_config(&self.cfg)?;
        let text = lyrics.load(&source).await;

        let active = match at {
            Some(raw) => {
                let ms = timefmt::parse_seek_param(raw)
                    .with_context(|| format!("invalid time {raw:?}, expected SS or MM:SS"))?;
                text.find_at(&timefmt::pretty_duration_from_ms(ms as f64))
            }
            None => None,
        };

        if json {
            let active = active
                .as_ref()
                .map(|m| serde_json::json!({ "index": m.index, "line": m.line }));
            let v = serde_json::json!({
                "locator": lyrics.locator(),
                "lines": text.lines(),
                "times": text.times(),
                "active": active,
            });
            println!("{}", serde_json::to_string_pretty(&v)?);
            return Ok(());
        }
        println!("# {}", lyrics.locator());
        if text.is_empty() {
            println!("(no timed lines)");
        }
        for line in render::lyric_lines(text, active.map(|m| m.index)) {
            println!("{line}");
        }
        Ok(())
    }

    pub fn markers(&self, album: &str, track: &str, width: Option<f64>, json: bool) -> anyhow::Result<()> {
        let catalog = self.load_catalog()?;
        let (album, track) = find_track(&catalog, album, track)?;
        let width = width.unwrap_or(self.cfg.layout.bar_width);
        let placed = track
            .marker_layout(width)
            .with_context(|| format!("{:?} has no duration to place markers on", track.name))?;
        let views = render::marker_views(&placed, &self.cfg.link.base_url, &album.name, &track.name);
        if json {
            println!("{}", serde_json::to_string_pretty(&views)?);
            return Ok(());
        }
        for (line, view) in render::marker_lines(&placed).iter().zip(&views) {
            println!("{line}");
            println!("    {}", view.link);
        }
        Ok(())
    }

    pub fn link(&self, album: &str, track: &str, time: Option<&str>, base: Option<&str>) -> anyhow::Result<()> {
        let catalog = self.load_catalog()?;
        let (album, track) = find_track(&catalog, album, track)?;
        if let Some(raw) = time
            && timefmt::parse_seek_param(raw).is_none()
        {
            anyhow::bail!("invalid time {raw:?}, expected SS or MM:SS");
        }
        let base = base.unwrap_or(&self.cfg.link.base_url);
        println!("{}", link::track_url(base, &album.name, &track.name, time));
        Ok(())
    }

    /// Show where a shared link points.
    pub fn open(&self, url: &str) -> anyhow::Result<()> {
        let catalog = self.load_catalog()?;
        let sel = link::parse_selection(url).context("link has no album parameter")?;
        let (album_id, track_id) = link::resolve(&catalog, &sel)
            .with_context(|| format!("no album named {:?}", sel.album))?;
        let album = catalog.album(album_id).context("album vanished")?;
        println!("album: {}", album.name);
        match track_id.and_then(|id| album.track(id)) {
            Some(track) => println!("track: {}", track.name),
            None if sel.track.is_some() => println!("track: (not found, starts from the top)"),
            None => {}
        }
        if let Some(ms) = sel.time_ms {
            println!("time:  {}", timefmt::pretty_duration_from_ms(ms as f64));
        }
        Ok(())
    }

    /// Play through the catalog on a simulated clock, reading commands
    /// from stdin. `tracks` defaults to every track once.
    pub async fn play(&self, from: Option<&str>, tracks: Option<usize>, speed: Option<f64>) -> anyhow::Result<()> {
        let selection: Option<Selection> = match from {
            Some(url) => Some(link::parse_selection(url).context("link has no album parameter")?),
            None => None,
        };
        let catalog = self.load_catalog()?;
        anyhow::ensure!(!catalog.is_empty(), "nothing to play, the catalog has no albums");
        let total: usize = catalog.albums().iter().map(|a| a.tracks.len()).sum();
        let source = AnySource::from_config(&self.cfg)?;
        let mut player = Player::new(catalog, SimulatedTransport::new(), source);
        player.attach_controls(Box::new(LogControls));
        let mut session = Session::new(player, &self.cfg, tracks.unwrap_or(total).max(1));

        let tick = Duration::from_millis(self.cfg.player.tick_ms.max(10));
        let speed = speed.unwrap_or(self.cfg.player.speed);
        anyhow::ensure!(speed.is_finite() && speed > 0.0, "speed must be positive");
        let step = tick.as_secs_f64() * speed;

        session.start(selection.as_ref())?;
        tracing::info!(tick_ms = tick.as_millis() as u64, speed, "playing (h for help)");

        let (tx, mut rx) = mpsc::channel(16);
        input::spawn_input_task(tx);

        let mut interval = tokio::time::interval(tick);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = interval.tick() => {
                    if !session.step(step).await? {
                        break;
                    }
                }
                Some(action) = rx.recv() => {
                    if !session.apply(action)? {
                        break;
                    }
                }
            }
        }
        tracing::info!(
            track = session.player().current_track().map_or("-", |t| t.name.as_str()),
            lines = session.transcript().len(),
            "stopped"
        );
        Ok(())
    }

    pub fn show_config(&self) -> anyhow::Result<()> {
        println!("# {}", self.config_path.display());
        print!("{}", toml::to_string_pretty(&self.cfg).context("serialize config")?);
        Ok(())
    }

    pub fn config_path(&self) -> &std::path::Path {
        &self.config_path
    }

    pub fn config_mut(&mut self) -> &mut Config {
        &mut self.cfg
    }

    pub fn save_config(&self) -> anyhow::Result<()> {
        crate::config::save(&self.cfg, Some(&self.config_path)).context("save config")
    }
}

fn find_track<'c>(catalog: &'c Catalog, album: &str, track: &str) -> anyhow::Result<(&'c Album, &'c Track)> {
    let album = catalog
        .find_album(album)
        .with_context(|| format!("no album named {album:?}"))?;
    let track = album
        .find_track(track)
        .with_context(|| format!("no track named {track:?} in {:?}", album.name))?;
    Ok((album, track))
}
