use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{debug, warn};

use crate::config::AudioSettings;
use crate::player::{MediaSink, SinkEvent};

use super::thread::spawn_audio_thread;
use super::types::{AudioCmd, Tagged};

/// [`MediaSink`] that forwards commands to the audio thread.
///
/// Each `load` starts a new generation; notifications still in flight for
/// an earlier load are dropped in [`MediaSink::poll_event`].
pub struct RodioSink {
    tx: Sender<AudioCmd>,
    events: Receiver<Tagged>,
    generation: u64,
    time: Duration,
    duration: Option<Duration>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl RodioSink {
    pub fn new(audio_settings: &AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events) = mpsc::channel::<Tagged>();
        let tick = Duration::from_millis(audio_settings.tick_ms.max(1));
        let audio_handle = spawn_audio_thread(rx, events_tx, tick);

        Self::from_parts(tx, events, Some(audio_handle))
    }

    fn from_parts(
        tx: Sender<AudioCmd>,
        events: Receiver<Tagged>,
        join: Option<JoinHandle<()>>,
    ) -> Self {
        Self {
            tx,
            events,
            generation: 0,
            time: Duration::ZERO,
            duration: None,
            join: Mutex::new(join),
        }
    }

    /// A sink with no audio thread behind it, fed by hand.
    #[cfg(test)]
    pub(super) fn detached() -> (Self, Receiver<AudioCmd>, Sender<Tagged>) {
        let (tx, rx) = mpsc::channel();
        let (events_tx, events) = mpsc::channel();
        (Self::from_parts(tx, events, None), rx, events_tx)
    }

    fn send(&self, cmd: AudioCmd) {
        if let Err(err) = self.tx.send(cmd) {
            warn!(cmd = ?err.0, "audio thread is gone");
        }
    }

    /// Fade out, stop the audio thread and wait for it.
    pub fn quit_softly(&self, fade_out: Duration) {
        self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}

impl MediaSink for RodioSink {
    fn load(&mut self, source: &str) {
        self.generation += 1;
        self.time = Duration::ZERO;
        self.duration = None;
        self.send(AudioCmd::Load {
            source: source.to_string(),
            generation: self.generation,
        });
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn set_current_time(&mut self, position: Duration) {
        self.time = position;
        self.send(AudioCmd::Seek(position));
    }

    fn current_time(&self) -> Duration {
        self.time
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn set_loop(&mut self, looping: bool) {
        self.send(AudioCmd::SetLoop(looping));
    }

    fn poll_event(&mut self) -> Option<SinkEvent> {
        while let Ok(Tagged { generation, event }) = self.events.try_recv() {
            if generation != self.generation {
                debug!(generation, current = self.generation, "dropping stale audio event");
                continue;
            }
            match event {
                SinkEvent::TimeUpdated(t) => self.time = t,
                SinkEvent::DurationKnown(d) => self.duration = Some(d),
                SinkEvent::Finished => {}
            }
            return Some(event);
        }
        None
    }
}
