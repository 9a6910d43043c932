//! Rodio-backed audio output.
//!
//! Decoding and output run on a dedicated thread; [`RodioSink`] is the
//! handle the playback controller drives.

mod player;
mod sink;
mod source;
mod thread;
mod types;

pub use player::RodioSink;

#[cfg(test)]
mod tests;
