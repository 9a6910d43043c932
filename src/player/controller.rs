use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::catalog::Track;

use super::sink::{MediaSink, SinkEvent};
use super::state::{PlaybackState, Status};

/// The ordered list of tracks being navigated, shared as a whole.
pub type Queue = Arc<[Arc<Track>]>;

pub struct PlaybackController<S: MediaSink> {
    sink: S,
    state: PlaybackState,
    queue: Queue,
    // Index into `queue`; `None` when the loaded track isn't part of it.
    position: Option<usize>,
}

impl<S: MediaSink> PlaybackController<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            state: PlaybackState::default(),
            queue: empty_queue(),
            position: None,
        }
    }

    /// Start with the loop flag set to `looping`.
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.state.looping = looping;
        self.sink.set_loop(looping);
        self
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn status(&self) -> Status {
        self.state.status()
    }

    pub fn queue(&self) -> &[Arc<Track>] {
        &self.queue
    }

    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// 1-based place of the loaded track in the queue, with the queue length.
    pub fn queue_slot(&self) -> Option<(usize, usize)> {
        self.position().map(|p| (p + 1, self.queue().len()))
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    #[cfg(test)]
    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Load `track` and start playing it.
    ///
    /// With a queue, the queue replaces the active one and navigation
    /// continues from `track`'s place in it (or is disabled when `track`
    /// isn't in it). Without one, the active queue is cleared.
    pub fn load_and_play(&mut self, track: Arc<Track>, queue: Option<Queue>) {
        match queue {
            Some(queue) => {
                self.position = queue.iter().position(|t| t.id == track.id);
                if self.position.is_none() {
                    debug!(id = %track.id, "track is not part of the new queue");
                }
                self.queue = queue;
            }
            None => {
                self.queue = empty_queue();
                self.position = None;
            }
        }
        self.start(track);
    }

    fn start(&mut self, track: Arc<Track>) {
        info!(id = %track.id, title = %track.title, "loading track");
        self.sink.load(&track.audio_url);
        self.sink.play();

        self.state.track = Some(track);
        self.state.playing = true;
        self.state.elapsed = Duration::ZERO;
        self.state.duration = None;
    }

    pub fn toggle_play_pause(&mut self) {
        match self.status() {
            Status::Empty => debug!("play/pause ignored: nothing loaded"),
            Status::Playing => {
                self.sink.pause();
                self.state.playing = false;
            }
            Status::Paused => {
                self.sink.play();
                self.state.playing = true;
            }
        }
    }

    pub fn next(&mut self) {
        self.step(true);
    }

    pub fn previous(&mut self) {
        self.step(false);
    }

    fn step(&mut self, forward: bool) {
        let len = self.queue.len();
        let Some(pos) = self.position.filter(|_| len > 0 && self.state.track.is_some()) else {
            debug!(forward, "navigation ignored: no queue position");
            return;
        };

        let pos = if forward {
            (pos + 1) % len
        } else {
            (pos + len - 1) % len
        };
        self.position = Some(pos);
        let track = Arc::clone(&self.queue[pos]);
        self.start(track);
    }

    pub fn toggle_loop(&mut self) {
        self.state.looping = !self.state.looping;
        self.sink.set_loop(self.state.looping);
    }

    /// Seek to `fraction` (clamped to `[0, 1]`) of the known duration.
    pub fn seek(&mut self, fraction: f64) {
        if !fraction.is_finite() {
            return;
        }
        let Some(total) = self.known_duration() else {
            debug!("seek ignored: duration unknown");
            return;
        };
        self.apply_seek(total.mul_f64(fraction.clamp(0.0, 1.0)));
    }

    /// Seek to an absolute position, clamped to the known duration.
    pub fn seek_to(&mut self, position: Duration) {
        let Some(total) = self.known_duration() else {
            debug!("seek ignored: duration unknown");
            return;
        };
        self.apply_seek(position.min(total));
    }

    /// Move the position by `delta_secs`, staying inside the track.
    pub fn seek_by(&mut self, delta_secs: i64) {
        let Some(total) = self.known_duration() else {
            debug!("scrub ignored: duration unknown");
            return;
        };
        let delta = Duration::from_secs(delta_secs.unsigned_abs());
        let target = if delta_secs >= 0 {
            self.state.elapsed.saturating_add(delta)
        } else {
            self.state.elapsed.saturating_sub(delta)
        };
        self.apply_seek(target.min(total));
    }

    fn known_duration(&self) -> Option<Duration> {
        self.state.track.as_ref()?;
        self.state.duration.filter(|d| !d.is_zero())
    }

    fn apply_seek(&mut self, target: Duration) {
        self.sink.set_current_time(target);
        self.state.elapsed = target;
    }

    pub fn time_updated(&mut self, elapsed: Duration) {
        if self.state.track.is_some() {
            self.state.elapsed = elapsed;
        }
    }

    pub fn duration_known(&mut self, duration: Duration) {
        if self.state.track.is_some() {
            self.state.duration = Some(duration);
        }
    }

    /// The sink reached the end of the loaded source.
    pub fn finished(&mut self) {
        if self.state.track.is_none() {
            return;
        }
        if self.state.looping {
            // Reported before the sink saw the loop flag; start the track over.
            if self.state.playing {
                self.sink.play();
            }
            return;
        }

        if self.position.is_some() && !self.queue.is_empty() {
            self.next();
        } else {
            // Nothing to advance to; stay on the track, stopped at its end.
            self.state.playing = false;
            if let Some(d) = self.state.duration {
                self.state.elapsed = d;
            }
        }
    }

    pub fn handle_event(&mut self, event: SinkEvent) {
        trace!(?event, "sink event");
        match event {
            SinkEvent::TimeUpdated(t) => self.time_updated(t),
            SinkEvent::DurationKnown(d) => self.duration_known(d),
            SinkEvent::Finished => self.finished(),
        }
    }

    /// Apply every notification the sink has queued. Returns how many.
    pub fn pump_events(&mut self) -> usize {
        let mut n = 0;
        while let Some(event) = self.sink.poll_event() {
            self.handle_event(event);
            n += 1;
        }
        n
    }
}

fn empty_queue() -> Queue {
    Vec::<Arc<Track>>::new().into()
}
