use std::sync::Arc;
use std::time::Duration;

use crate::catalog::Track;

use super::format::{format_duration, progress_fraction};

/// Coarse controller state.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing loaded.
    #[default]
    Empty,
    Paused,
    Playing,
}

/// Snapshot of the single playback session.
#[derive(Debug, Clone, Default)]
pub struct PlaybackState {
    pub track: Option<Arc<Track>>,
    pub playing: bool,
    pub looping: bool,
    pub elapsed: Duration,
    /// `None` until the sink reports it.
    pub duration: Option<Duration>,
}

impl PlaybackState {
    pub fn status(&self) -> Status {
        match (&self.track, self.playing) {
            (None, _) => Status::Empty,
            (Some(_), true) => Status::Playing,
            (Some(_), false) => Status::Paused,
        }
    }

    pub fn progress(&self) -> f64 {
        progress_fraction(self.elapsed, self.duration)
    }

    pub fn elapsed_text(&self) -> String {
        format_duration(Some(self.elapsed))
    }

    pub fn duration_text(&self) -> String {
        format_duration(self.duration)
    }
}
