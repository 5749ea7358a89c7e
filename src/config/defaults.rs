use super::{Config, LayoutConfig, LinkConfig, LyricsConfig, PathsConfig, PlayerConfig};

pub fn defaults() -> Config {
    Config {
        paths: PathsConfig::default(),
        lyrics: LyricsConfig::default(),
        player: PlayerConfig::default(),
        layout: LayoutConfig::default(),
        link: LinkConfig::default(),
    }
}
