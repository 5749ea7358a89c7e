//! Time-synchronized lyrics
//!
//! This module provides:
//! - a parser and floor-search index for `[mm:ss.xx]` cue files
//! - load-once lyric tracks with a lookup that waits for the pending load
//! - text sources for lyric files on disk or over HTTP

pub mod parser;
pub mod source;
pub mod sync;

pub use parser::{LyricMatch, TimedLine, TimedText};
pub use source::{AnySource, FileSource, HttpSource, TextSource};
pub use sync::{Deferred, LyricTrack};
