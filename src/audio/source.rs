//! Turning a track's audio reference into bytes the decoder can read.

use std::io::Cursor;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use lofty::prelude::*;
use lofty::probe::Probe;
use tracing::debug;

use super::types::AudioError;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Location {
    File(PathBuf),
    Remote(String),
}

/// Classify an audio reference: `http(s)://` URLs are fetched, `file://`
/// URLs and bare paths are read from disk.
pub(super) fn locate(uri: &str) -> Result<Location, AudioError> {
    let uri = uri.trim();
    if uri.is_empty() {
        return Err(AudioError::Unsupported(uri.to_string()));
    }

    let lower = uri.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        return Ok(Location::Remote(uri.to_string()));
    }
    if let Some(path) = uri.strip_prefix("file://") {
        return Ok(Location::File(PathBuf::from(path)));
    }
    match uri.split_once("://") {
        Some(_) => Err(AudioError::Unsupported(uri.to_string())),
        None => Ok(Location::File(PathBuf::from(uri))),
    }
}

pub(super) fn fetch(uri: &str) -> Result<Arc<[u8]>, AudioError> {
    match locate(uri)? {
        Location::File(path) => {
            let bytes = std::fs::read(&path).map_err(|source| AudioError::Read {
                path: path.display().to_string(),
                source,
            })?;
            Ok(bytes.into())
        }
        Location::Remote(url) => {
            debug!(%url, "fetching remote audio");
            let fetch_err = |source: reqwest::Error| AudioError::Fetch {
                url: url.clone(),
                source,
            };
            let client = reqwest::blocking::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .build()
                .map_err(fetch_err)?;
            let bytes = client
                .get(&url)
                .send()
                .and_then(|r| r.error_for_status())
                .and_then(|r| r.bytes())
                .map_err(fetch_err)?;
            Ok(Arc::from(bytes.as_ref()))
        }
    }
}

/// Duration from the container headers, for decoders that can't tell.
pub(super) fn probe_duration(bytes: &Arc<[u8]>) -> Option<Duration> {
    let tagged = Probe::new(Cursor::new(Arc::clone(bytes)))
        .guess_file_type()
        .ok()?
        .read()
        .ok()?;
    let duration = tagged.properties().duration();
    (!duration.is_zero()).then_some(duration)
}
