use std::time::Duration;

/// Lifecycle notifications emitted by a media sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkEvent {
    /// Playback position advanced.
    TimeUpdated(Duration),
    /// The loaded source's length became known.
    DurationKnown(Duration),
    /// The loaded source played to its end (never sent while looping).
    Finished,
}

/// Something that can play one audio source at a time.
///
/// Commands return immediately; loading and decoding happen elsewhere and
/// surface later through `poll_event`.
pub trait MediaSink {
    fn load(&mut self, source: &str);
    fn play(&mut self);
    fn pause(&mut self);
    fn set_current_time(&mut self, position: Duration);
    fn current_time(&self) -> Duration;
    /// `None` until the loaded source's length is known.
    fn duration(&self) -> Option<Duration>;
    /// Repeat the loaded source natively instead of finishing.
    fn set_loop(&mut self, looping: bool);
    /// Next pending notification, in emission order.
    fn poll_event(&mut self) -> Option<SinkEvent>;
}
