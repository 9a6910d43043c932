//! Playback controller and the media sink contract it drives.
//!
//! The controller is the single authority over what is loaded and playing.
//! It turns user commands and sink notifications into `PlaybackState`
//! transitions; it never fails, invalid commands are ignored.

mod controller;
mod format;
mod sink;
mod state;

pub use controller::{PlaybackController, Queue};
pub use format::{format_duration, format_time, progress_fraction};
pub use sink::{MediaSink, SinkEvent};
pub use state::{PlaybackState, Status};
