use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, warn};

use crate::player::SinkEvent;

use super::sink::{create_sink_at, decoded_duration};
use super::source::{fetch, probe_duration};
use super::types::{AudioCmd, AudioError, Tagged};

/// The source currently held by the audio thread.
struct Loaded {
    uri: String,
    bytes: Arc<[u8]>,
    sink: Sink,
    generation: u64,
    // Where the sink's own position clock starts within the source.
    offset: Duration,
}

impl Loaded {
    fn open(
        stream: &OutputStream,
        uri: &str,
        bytes: Arc<[u8]>,
        generation: u64,
    ) -> Result<(Self, Option<Duration>), AudioError> {
        let duration = decoded_duration(uri, &bytes)?
            .filter(|d| !d.is_zero())
            .or_else(|| probe_duration(&bytes));
        let sink = create_sink_at(stream, uri, &bytes, Duration::ZERO)?;

        Ok((
            Self {
                uri: uri.to_string(),
                bytes,
                sink,
                generation,
                offset: Duration::ZERO,
            },
            duration,
        ))
    }

    fn position(&self) -> Duration {
        self.offset + self.sink.get_pos()
    }

    /// Replace the sink with a fresh one starting at `at`.
    fn restart_at(
        &mut self,
        stream: &OutputStream,
        at: Duration,
        playing: bool,
    ) -> Result<(), AudioError> {
        let sink = create_sink_at(stream, &self.uri, &self.bytes, at)?;
        self.sink.stop();
        if playing {
            sink.play();
        }
        self.sink = sink;
        self.offset = at;
        Ok(())
    }
}

/// Bytes downloaded off the audio thread for one load.
struct Fetched {
    source: String,
    generation: u64,
    result: Result<Arc<[u8]>, AudioError>,
}

fn spawn_fetch(source: String, generation: u64, done: Sender<Fetched>) {
    thread::spawn(move || {
        let result = fetch(&source);
        // The audio thread may have quit meanwhile.
        let _ = done.send(Fetched {
            source,
            generation,
            result,
        });
    });
}

/// Collapse a burst of queued commands.
///
/// A `Quit` wins over everything queued with it. Otherwise only the newest
/// `Load` survives, together with what follows it; earlier commands target
/// sources it replaces and are dropped, except `SetLoop`.
pub(super) fn coalesce(mut batch: Vec<AudioCmd>) -> Vec<AudioCmd> {
    if let Some(quit) = batch.iter().position(|c| matches!(c, AudioCmd::Quit { .. })) {
        return batch.into_iter().skip(quit).take(1).collect();
    }
    let Some(last_load) = batch.iter().rposition(|c| matches!(c, AudioCmd::Load { .. })) else {
        return batch;
    };

    let tail = batch.split_off(last_load);
    batch.retain(|c| matches!(c, AudioCmd::SetLoop(_)));
    batch.extend(tail);
    batch
}

fn fade_out_sink(sink: &Sink, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        sink.set_volume(0.0);
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    sink.set_volume(1.0);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        sink.set_volume(1.0 - t);
        thread::sleep(Duration::from_millis(step_ms));
    }
    sink.set_volume(0.0);
}

// Without an output device every command is accepted and dropped.
fn drain_until_quit(rx: &Receiver<AudioCmd>) {
    for cmd in rx.iter() {
        if let AudioCmd::Quit { .. } = cmd {
            break;
        }
    }
}

struct AudioThread {
    stream: OutputStream,
    events: Sender<Tagged>,
    fetched: Sender<Fetched>,
    current: Option<Loaded>,
    // Generation of the load still waiting for its bytes.
    pending: Option<u64>,
    playing: bool,
    looping: bool,
}

impl AudioThread {
    fn emit(&self, generation: u64, event: SinkEvent) {
        // The handle is gone once the receiver drops; nothing left to notify.
        let _ = self.events.send(Tagged { generation, event });
    }

    /// Apply one command. Returns `false` once the thread should stop.
    fn handle(&mut self, cmd: AudioCmd) -> bool {
        match cmd {
            AudioCmd::Load { source, generation } => {
                if let Some(old) = self.current.take() {
                    old.sink.stop();
                }
                self.playing = false;
                self.pending = Some(generation);
                spawn_fetch(source, generation, self.fetched.clone());
            }

            AudioCmd::Play => {
                self.playing = true;
                let Some(cur) = self.current.as_mut() else {
                    return true;
                };
                // Played to the end earlier: start over.
                if cur.sink.empty() {
                    if let Err(err) = cur.restart_at(&self.stream, Duration::ZERO, true) {
                        warn!(error = %err, "failed to restart track");
                        self.current = None;
                    }
                } else {
                    cur.sink.play();
                }
            }

            AudioCmd::Pause => {
                self.playing = false;
                if let Some(cur) = self.current.as_ref() {
                    cur.sink.pause();
                }
            }

            AudioCmd::Seek(pos) => {
                let Some(cur) = self.current.as_mut() else {
                    return true;
                };
                let seeked =
                    self.playing && !cur.sink.empty() && cur.sink.try_seek(pos).is_ok();
                if seeked {
                    cur.offset = Duration::ZERO;
                } else if let Err(err) = cur.restart_at(&self.stream, pos, self.playing) {
                    warn!(error = %err, "failed to seek");
                    self.current = None;
                    return true;
                }
                let generation = cur.generation;
                self.emit(generation, SinkEvent::TimeUpdated(pos));
            }

            AudioCmd::SetLoop(on) => {
                self.looping = on;
            }

            AudioCmd::Quit { fade_out_ms } => {
                if let Some(cur) = self.current.as_ref() {
                    // Fade out gently before stopping.
                    if self.playing {
                        fade_out_sink(&cur.sink, fade_out_ms);
                    }
                    cur.sink.stop();
                }
                return false;
            }
        }
        true
    }

    /// Open a finished download unless a newer load replaced it.
    fn finish_load(&mut self, fetched: Fetched) {
        let Fetched {
            source,
            generation,
            result,
        } = fetched;
        if self.pending != Some(generation) {
            debug!(%source, generation, "dropping superseded download");
            return;
        }
        self.pending = None;

        match result.and_then(|bytes| Loaded::open(&self.stream, &source, bytes, generation)) {
            Ok((loaded, duration)) => {
                debug!(%source, generation, ?duration, "source loaded");
                if let Some(d) = duration {
                    self.emit(generation, SinkEvent::DurationKnown(d));
                }
                if self.playing {
                    loaded.sink.play();
                }
                self.current = Some(loaded);
            }
            Err(err) => warn!(error = %err, %source, "failed to load track"),
        }
    }

    fn tick(&mut self) {
        if !self.playing {
            return;
        }
        let Some(cur) = self.current.as_mut() else {
            return;
        };
        let generation = cur.generation;

        if !cur.sink.empty() {
            let position = cur.position();
            self.emit(generation, SinkEvent::TimeUpdated(position));
        } else if self.looping {
            match cur.restart_at(&self.stream, Duration::ZERO, true) {
                Ok(()) => self.emit(generation, SinkEvent::TimeUpdated(Duration::ZERO)),
                Err(err) => {
                    warn!(error = %err, "failed to loop track");
                    self.current = None;
                }
            }
        } else {
            self.playing = false;
            self.emit(generation, SinkEvent::Finished);
        }
    }
}

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<Tagged>,
    tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => stream,
            Err(err) => {
                error!(error = %err, "no audio output device, playback disabled");
                drain_until_quit(&rx);
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped, which garbles the TUI.
        stream.log_on_drop(false);

        let (fetched_tx, fetched_rx) = mpsc::channel();
        let mut audio = AudioThread {
            stream,
            events,
            fetched: fetched_tx,
            current: None,
            pending: None,
            playing: false,
            looping: false,
        };

        loop {
            while let Ok(fetched) = fetched_rx.try_recv() {
                audio.finish_load(fetched);
            }

            match rx.recv_timeout(tick) {
                Ok(first) => {
                    let mut batch = vec![first];
                    batch.extend(rx.try_iter());
                    for cmd in coalesce(batch) {
                        if !audio.handle(cmd) {
                            return;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => audio.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    })
}
