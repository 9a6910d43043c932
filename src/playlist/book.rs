use thiserror::Error;
use tracing::{debug, info};

use crate::storage::{LocalStore, StoreError};

use super::model::Playlist;

/// Key the playlists are stored under.
pub const PLAYLISTS_KEY: &str = "playlists";

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("playlist name must not be empty")]
    EmptyName,
    #[error("a playlist named {0:?} already exists")]
    Duplicate(String),
    #[error("no playlist at position {0}")]
    NotFound(usize),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The user's playlists plus which one (if any) is currently selected.
///
/// Every mutation is written through to the backing store.
pub struct PlaylistBook<S: LocalStore> {
    store: S,
    playlists: Vec<Playlist>,
    selected: Option<String>,
}

impl<S: LocalStore> PlaylistBook<S> {
    /// Load the saved playlists; a store without any starts empty.
    pub fn load(store: S) -> Result<Self, PlaylistError> {
        let playlists: Vec<Playlist> = store.get(PLAYLISTS_KEY)?.unwrap_or_default();
        debug!(count = playlists.len(), "playlists loaded");
        Ok(Self {
            store,
            playlists,
            selected: None,
        })
    }

    pub fn playlists(&self) -> &[Playlist] {
        &self.playlists
    }

    pub fn get(&self, index: usize) -> Option<&Playlist> {
        self.playlists.get(index)
    }

    pub fn len(&self) -> usize {
        self.playlists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.playlists.is_empty()
    }

    /// The selected playlist; `None` means "all songs".
    pub fn selected(&self) -> Option<&Playlist> {
        let name = self.selected.as_deref()?;
        self.playlists.iter().find(|p| p.name == name)
    }

    pub fn selected_index(&self) -> Option<usize> {
        let name = self.selected.as_deref()?;
        self.playlists.iter().position(|p| p.name == name)
    }

    pub fn select(&mut self, index: usize) -> Result<&Playlist, PlaylistError> {
        let playlist = self
            .playlists
            .get(index)
            .ok_or(PlaylistError::NotFound(index))?;
        self.selected = Some(playlist.name.clone());
        Ok(playlist)
    }

    pub fn select_all(&mut self) {
        self.selected = None;
    }

    /// Create an empty playlist. The name is trimmed and must be unique.
    pub fn create(&mut self, name: &str) -> Result<&Playlist, PlaylistError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaylistError::EmptyName);
        }
        if self.playlists.iter().any(|p| p.name == name) {
            return Err(PlaylistError::Duplicate(name.to_string()));
        }

        let mut next = self.playlists.clone();
        next.push(Playlist::new(name));
        self.commit(next)?;
        info!(name, "playlist created");

        let last = self.playlists.len() - 1;
        Ok(&self.playlists[last])
    }

    /// Delete the playlist at `index`; deleting the selected one resets the
    /// selection to all songs.
    pub fn delete(&mut self, index: usize) -> Result<Playlist, PlaylistError> {
        if index >= self.playlists.len() {
            return Err(PlaylistError::NotFound(index));
        }

        let mut next = self.playlists.clone();
        let removed = next.remove(index);
        self.commit(next)?;
        if self.selected.as_deref() == Some(removed.name.as_str()) {
            self.selected = None;
        }
        info!(name = %removed.name, "playlist deleted");
        Ok(removed)
    }

    /// Append `track_id` to the playlist at `index`.
    ///
    /// Returns `false` when the track was already in it.
    pub fn add_track(&mut self, index: usize, track_id: &str) -> Result<bool, PlaylistError> {
        let playlist = self
            .playlists
            .get(index)
            .ok_or(PlaylistError::NotFound(index))?;
        if playlist.contains(track_id) {
            return Ok(false);
        }

        let mut next = self.playlists.clone();
        next[index].songs.push(track_id.to_string());
        self.commit(next)?;
        Ok(true)
    }

    /// Remove `track_id` from the playlist at `index`.
    ///
    /// Returns `false` when the track wasn't in it.
    pub fn remove_track(&mut self, index: usize, track_id: &str) -> Result<bool, PlaylistError> {
        let playlist = self
            .playlists
            .get(index)
            .ok_or(PlaylistError::NotFound(index))?;
        if !playlist.contains(track_id) {
            return Ok(false);
        }

        let mut next = self.playlists.clone();
        next[index].songs.retain(|s| s != track_id);
        self.commit(next)?;
        Ok(true)
    }

    /// Write `next` to the store, then adopt it. A failed write leaves the
    /// book untouched.
    fn commit(&mut self, next: Vec<Playlist>) -> Result<(), PlaylistError> {
        self.store.set(PLAYLISTS_KEY, &next)?;
        self.playlists = next;
        Ok(())
    }
}
