/// Things the listener can ask for while `play` is running.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Quit,
    TogglePause,

    NextTrack,
    PrevTrack,
    NextAlbum,
    PrevAlbum,

    SeekForward,
    SeekBack,
    FineSeekForward,
    FineSeekBack,
    /// 0..=100 along the current track.
    SeekPercent(f64),
    /// Jump to the cue of a lyric line, 0-based.
    SeekLyric(usize),
    /// Jump to a timeline marker, 0-based.
    SeekMarker(usize),

    VolumeUp,
    VolumeDown,

    /// Print a link to the current track and position.
    Share,
    Help,
}
