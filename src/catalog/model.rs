use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::store::CatalogError;

/// A playable song record.
///
/// Stored with camelCase keys (`coverUrl`, `audioUrl`, `uploadedAt`); the
/// snake_case spellings are accepted on read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    pub id: String,
    pub title: String,
    pub artist: String,
    #[serde(default, alias = "cover_url", skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(alias = "audio_url")]
    pub audio_url: String,
    #[serde(default, alias = "uploaded_at", skip_serializing_if = "Option::is_none")]
    pub uploaded_at: Option<DateTime<Utc>>,
}

impl Track {
    /// `Artist - Title`, or just the title when the artist is blank.
    pub fn display(&self) -> String {
        match self.artist.trim() {
            "" => self.title.clone(),
            a => format!("{} - {}", a, self.title),
        }
    }

    /// Cover reference to render, falling back to `default` when unset.
    pub fn cover_or<'a>(&'a self, default: &'a str) -> &'a str {
        self.cover_url
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(default)
    }
}

/// Fields submitted when uploading a song record.
#[derive(Debug, Clone, Default)]
pub struct NewTrack {
    pub title: String,
    pub artist: String,
    pub cover_url: Option<String>,
    pub audio_url: String,
}

impl NewTrack {
    /// Trim every field, require title/artist/audio and stamp the record.
    pub(super) fn into_track(self, id: String, now: DateTime<Utc>) -> Result<Track, CatalogError> {
        let title = self.title.trim();
        let artist = self.artist.trim();
        let audio_url = self.audio_url.trim();

        if title.is_empty() {
            return Err(CatalogError::MissingField("title"));
        }
        if artist.is_empty() {
            return Err(CatalogError::MissingField("artist"));
        }
        if audio_url.is_empty() {
            return Err(CatalogError::MissingField("audio url"));
        }

        let cover_url = self
            .cover_url
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Track {
            id,
            title: title.to_string(),
            artist: artist.to_string(),
            cover_url,
            audio_url: audio_url.to_string(),
            uploaded_at: Some(now),
        })
    }
}
