use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub mod defaults;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub paths: PathsConfig,
    pub lyrics: LyricsConfig,
    pub player: PlayerConfig,
    pub layout: LayoutConfig,
    pub link: LinkConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Catalog file (TOML) describing albums and tracks.
    pub catalog: PathBuf,
    /// Base directory for relative lyric file locators.
    pub lyrics_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LyricsConfig {
    pub fetch_timeout_secs: u64,
    pub user_agent: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Volume level (0-100)
    pub volume: u8,
    /// How often the headless player samples the clock.
    pub tick_ms: u64,
    /// Simulated seconds of playback per real second.
    pub speed: f64,
    pub seek_step_secs: u64,
    pub fine_seek_step_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Progress bar width in pixels used for marker placement.
    pub bar_width: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkConfig {
    /// Page that hosts the player; share links are built on it.
    pub base_url: String,
}

impl Default for Config {
    fn default() -> Self {
        defaults::defaults()
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        let proj = ProjectDirs::from("dev", "analbum", "analbum");
        let data_dir = proj
            .as_ref()
            .map(|p| p.data_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("analbum"));
        Self {
            catalog: data_dir.join("catalog.toml"),
            lyrics_dir: None,
        }
    }
}

impl Default for LyricsConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            user_agent: concat!("analbum/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 80,
            tick_ms: 250,
            speed: 1.0,
            seek_step_secs: 10,
            fine_seek_step_secs: 3,
        }
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self { bar_width: 600.0 }
    }
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost/".to_string(),
        }
    }
}

impl Config {
    /// Lyric directory, falling back to the catalog's own directory.
    pub fn lyrics_base(&self) -> Option<PathBuf> {
        self.paths
            .lyrics_dir
            .clone()
            .or_else(|| self.paths.catalog.parent().map(Path::to_path_buf))
    }
}

pub fn save(cfg: &Config, override_path: Option<&Path>) -> anyhow::Result<()> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };
    write_config(&path, cfg)
}

fn write_config(path: &Path, cfg: &Config) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("create dir {}", parent.display()))?;
    }
    let raw = toml::to_string_pretty(cfg).context("serialize config")?;
    fs::write(path, raw).with_context(|| format!("write {}", path.display()))?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let _ = fs::set_permissions(path, fs::Permissions::from_mode(0o600));
    }
    Ok(())
}

pub fn default_config_path() -> anyhow::Result<PathBuf> {
    let proj =
        ProjectDirs::from("dev", "analbum", "analbum").context("ProjectDirs unavailable")?;
    Ok(proj.config_dir().join("config.toml"))
}

/// Read the config, writing the defaults out on first run.
pub fn load(override_path: Option<&Path>) -> anyhow::Result<Config> {
    let path = match override_path {
        Some(p) => p.to_path_buf(),
        None => default_config_path()?,
    };

    if !path.exists() {
        let cfg = defaults::defaults();
        write_config(&path, &cfg).context("write default config")?;
        tracing::info!(path = %path.display(), "wrote default config");
        return Ok(cfg);
    }

    let raw = fs::read_to_string(&path).with_context(|| format!("read {}", path.display()))?;
    let cfg = toml::from_str::<Config>(&raw).with_context(|| format!("parse {}", path.display()))?;
    Ok(cfg)
}
