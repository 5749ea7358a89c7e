use crate::app::actions::Action;
use std::io::BufRead;
use tokio::sync::mpsc;

/// Read commands from stdin, one per line, until EOF or the receiver goes away.
pub fn spawn_input_task(tx: mpsc::Sender<Action>) {
    tokio::task::spawn_blocking(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else {
                break;
            };
            match map_line_to_action(&line) {
                Some(action) => {
                    if tx.blocking_send(action).is_err() {
                        break;
                    }
                }
                None => tracing::warn!("unknown command {:?}, type h for help", line.trim()),
            }
        }
    });
}

pub const HELP: &str = "\
<enter>  play/pause
n / p    next / previous track
N / P    next / previous album
] / [    seek forward / back
} / {    fine seek forward / back
g <pct>  jump to percent of the track
l <n>    jump to lyric line n
m <n>    jump to marker n
+ / -    volume up / down
s        print a link to this moment
h        this help
q        quit";

pub fn map_line_to_action(line: &str) -> Option<Action> {
    let line = line.trim();
    if let Some(pct) = line.strip_prefix('g') {
        return pct.trim().parse::<f64>().ok().map(Action::SeekPercent);
    }
    if let Some(n) = line.strip_prefix('l') {
        return line_number(n).map(Action::SeekLyric);
    }
    if let Some(n) = line.strip_prefix('m') {
        return line_number(n).map(Action::SeekMarker);
    }
    match line {
        "" | "space" => Some(Action::TogglePause),
        "q" | "quit" => Some(Action::Quit),
        "n" => Some(Action::NextTrack),
        "p" => Some(Action::PrevTrack),
        "N" => Some(Action::NextAlbum),
        "P" => Some(Action::PrevAlbum),
        "]" => Some(Action::SeekForward),
        "[" => Some(Action::SeekBack),
        "}" => Some(Action::FineSeekForward),
        "{" => Some(Action::FineSeekBack),
        "+" | "=" => Some(Action::VolumeUp),
        "-" | "_" => Some(Action::VolumeDown),
        "s" => Some(Action::Share),
        "h" | "?" => Some(Action::Help),
        _ => None,
    }
}

/// 1-based number as typed, to a 0-based index.
fn line_number(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok()?.checked_sub(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_line_to_action() {
        assert_eq!(map_line_to_action(""), Some(Action::TogglePause));
        assert_eq!(map_line_to_action("  N "), Some(Action::NextAlbum));
        assert_eq!(map_line_to_action("n"), Some(Action::NextTrack));
        assert_eq!(map_line_to_action("g 42.5"), Some(Action::SeekPercent(42.5)));
        assert_eq!(map_line_to_action("g"), None);
        assert_eq!(map_line_to_action("l 3"), Some(Action::SeekLyric(2)));
        assert_eq!(map_line_to_action("l 0"), None);
        assert_eq!(map_line_to_action("m 1"), Some(Action::SeekMarker(0)));
        assert_eq!(map_line_to_action("m"), None);
        assert_eq!(map_line_to_action("x"), None);
    }
}
