use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::storage::write_atomically;

use super::model::{NewTrack, Track};

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("no song with id {0}")]
    NotFound(String),
    #[error("catalog io error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("catalog {} is malformed: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// The remote-document-store contract the catalog is built on.
pub trait CatalogStore {
    fn list(&self) -> Result<Vec<Track>, CatalogError>;
    fn create(&mut self, new: NewTrack) -> Result<Track, CatalogError>;
    fn delete(&mut self, id: &str) -> Result<(), CatalogError>;
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    songs: Vec<Track>,
}

/// Catalog persisted as a JSON document: `{"songs": [...]}`.
#[derive(Debug, Clone)]
pub struct JsonCatalogStore {
    path: PathBuf,
}

impl JsonCatalogStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<CatalogDocument, CatalogError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no catalog file yet");
                return Ok(CatalogDocument::default());
            }
            Err(source) => {
                return Err(CatalogError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        serde_json::from_str(&raw).map_err(|source| CatalogError::Malformed {
            path: self.path.clone(),
            source,
        })
    }

    fn write(&self, doc: &CatalogDocument) -> Result<(), CatalogError> {
        let bytes = serde_json::to_vec_pretty(doc).map_err(|source| CatalogError::Malformed {
            path: self.path.clone(),
            source,
        })?;
        write_atomically(&self.path, &bytes).map_err(|source| CatalogError::Io {
            path: self.path.clone(),
            source,
        })
    }
}

impl CatalogStore for JsonCatalogStore {
    fn list(&self) -> Result<Vec<Track>, CatalogError> {
        Ok(self.read()?.songs)
    }

    fn create(&mut self, new: NewTrack) -> Result<Track, CatalogError> {
        let track = new.into_track(Uuid::new_v4().to_string(), Utc::now())?;

        let mut doc = self.read()?;
        doc.songs.push(track.clone());
        self.write(&doc)?;

        info!(id = %track.id, title = %track.title, "song record created");
        Ok(track)
    }

    fn delete(&mut self, id: &str) -> Result<(), CatalogError> {
        let mut doc = self.read()?;
        let before = doc.songs.len();
        doc.songs.retain(|t| t.id != id);
        if doc.songs.len() == before {
            return Err(CatalogError::NotFound(id.to_string()));
        }
        self.write(&doc)?;

        info!(id, "song record deleted");
        Ok(())
    }
}
