//! Commands, notifications and errors shared by the audio thread and its handle.

use std::time::Duration;

use thiserror::Error;

use crate::player::SinkEvent;

#[derive(Debug, Clone, PartialEq)]
pub enum AudioCmd {
    /// Replace the current source. Playback stays paused until `Play`.
    Load { source: String, generation: u64 },
    /// Start or resume. A source that already played to its end restarts.
    Play,
    Pause,
    /// Jump to an absolute position in the current source.
    Seek(Duration),
    /// Restart the source instead of reporting the end.
    SetLoop(bool),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

/// A [`SinkEvent`] tagged with the load it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tagged {
    pub generation: u64,
    pub event: SinkEvent,
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to fetch {url}: {source}")]
    Fetch {
        url: String,
        source: reqwest::Error,
    },
    #[error("unsupported source {0:?}")]
    Unsupported(String),
    #[error("failed to decode {source_uri}: {source}")]
    Decode {
        source_uri: String,
        source: rodio::decoder::DecoderError,
    },
}
