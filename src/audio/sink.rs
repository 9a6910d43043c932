//! Building `rodio` sinks over an in-memory source.

use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::AudioError;

/// Total length as reported by the decoder.
pub(super) fn decoded_duration(uri: &str, bytes: &Arc<[u8]>) -> Result<Option<Duration>, AudioError> {
    Ok(decoder(uri, bytes)?.total_duration())
}

/// Create a paused `Sink` over `bytes` that starts playback at `start_at`.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    uri: &str,
    bytes: &Arc<[u8]>,
    start_at: Duration,
) -> Result<Sink, AudioError> {
    // `skip_duration` is our fallback seeking primitive; even Duration::ZERO is fine.
    let source = decoder(uri, bytes)?.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.append(source);
    sink.pause();
    Ok(sink)
}

fn decoder(uri: &str, bytes: &Arc<[u8]>) -> Result<Decoder<Cursor<Arc<[u8]>>>, AudioError> {
    Decoder::new(Cursor::new(Arc::clone(bytes))).map_err(|source| AudioError::Decode {
        source_uri: uri.to_string(),
        source,
    })
}
