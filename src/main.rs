mod app;
mod catalog;
mod config;
mod input;
mod link;
mod lyrics;
mod markers;
mod player;
mod timefmt;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "analbum", version, about = "Multi-album player with synced lyrics and timeline markers")]
struct Cli {
    /// Override config file path.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Override the catalog file from the config.
    #[arg(long)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List albums and their tracks (default).
    Albums {
        #[arg(long)]
        json: bool,
    },
    /// Print a track's timed lyrics.
    Lyrics {
        album: String,
        track: String,
        /// Mark the line active at this time (SS or MM:SS).
        #[arg(long)]
        at: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show where a track's timeline markers are placed.
    Markers {
        album: String,
        track: String,
        /// Progress bar width in pixels.
        #[arg(long)]
        width: Option<f64>,
        #[arg(long)]
        json: bool,
    },
    /// Build a shareable link to a track.
    Link {
        album: String,
        track: String,
        /// Start position (SS or MM:SS).
        #[arg(long)]
        time: Option<String>,
        /// Page the link points at, instead of the configured one.
        #[arg(long)]
        base: Option<String>,
    },
    /// Show which album, track and position a link points at.
    Open { url: String },
    /// Play on a simulated clock, printing tracks and lyric lines as they come up.
    Play {
        /// Start from a shared link.
        #[arg(long)]
        from: Option<String>,
        /// Stop after this many tracks (default: every track once).
        #[arg(long)]
        tracks: Option<usize>,
        /// Simulated seconds per real second.
        #[arg(long)]
        speed: Option<f64>,
    },
    /// Show or change the config file.
    Config {
        #[command(subcommand)]
        cmd: Option<ConfigCommand>,
    },
}

#[derive(Debug, Subcommand)]
enum ConfigCommand {
    /// Print the config (default).
    Show,
    /// Print the config file path.
    Path,
    /// Set the catalog file.
    Catalog { path: PathBuf },
    /// Set the directory relative lyric paths are read from.
    LyricsDir { path: PathBuf },
    /// Set the page share links point at.
    BaseUrl { url: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut cfg = config::load(cli.config.as_deref()).context("load config")?;
    let cfg_path = match cli.config.clone() {
        Some(p) => p,
        None => config::default_config_path().context("default config path")?,
    };
    // Only for this run; `config` subcommands save what is on disk.
    if let Some(catalog) = cli.catalog
        && !matches!(cli.command, Some(Command::Config { .. }))
    {
        cfg.paths.catalog = catalog;
    }

    let mut app = app::App::new(cfg, cfg_path);
    match cli.command.unwrap_or(Command::Albums { json: false }) {
        Command::Albums { json } => app.albums(json)?,
        Command::Lyrics { album, track, at, json } => {
            app.lyrics(&album, &track, at.as_deref(), json).await?
        }
        Command::Markers { album, track, width, json } => app.markers(&album, &track, width, json)?,
        Command::Link { album, track, time, base } => {
            app.link(&album, &track, time.as_deref(), base.as_deref())?
        }
        Command::Open { url } => app.open(&url)?,
        Command::Play { from, tracks, speed } => app.play(from.as_deref(), tracks, speed).await?,
        Command::Config { cmd } => match cmd.unwrap_or(ConfigCommand::Show) {
            ConfigCommand::Show => app.show_config()?,
            ConfigCommand::Path => println!("{}", app.config_path().display()),
            ConfigCommand::Catalog { path } => {
                app.config_mut().paths.catalog = path;
                app.save_config()?;
                println!("Updated catalog path in config.");
            }
            ConfigCommand::LyricsDir { path } => {
                app.config_mut().paths.lyrics_dir = Some(path);
                app.save_config()?;
                println!("Updated lyrics directory in config.");
            }
            ConfigCommand::BaseUrl { url } => {
                app.config_mut().link.base_url = url;
                app.save_config()?;
                println!("Updated link base URL in config.");
            }
        },
    }

    Ok(())
}
