use std::sync::Arc;

use crate::playlist::Playlist;

use super::model::Track;
use super::store::{CatalogError, CatalogStore};

/// All known tracks, shared by reference with queues and the player.
pub struct Catalog {
    tracks: Vec<Arc<Track>>,
    // Lowercased (title, artist) per track so searching doesn't re-lowercase
    // the whole catalog on every keystroke.
    lower: Vec<(String, String)>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        let lower = tracks
            .iter()
            .map(|t| (t.title.to_lowercase(), t.artist.to_lowercase()))
            .collect();
        Self {
            tracks: tracks.into_iter().map(Arc::new).collect(),
            lower,
        }
    }

    pub fn load(store: &dyn CatalogStore) -> Result<Self, CatalogError> {
        Ok(Self::new(store.list()?))
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    #[cfg(test)]
    pub fn get(&self, id: &str) -> Option<&Arc<Track>> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Case-insensitive substring search on title or artist.
    ///
    /// The query is trimmed; an empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<Arc<Track>> {
        self.search_within(None, query)
    }

    /// Like [`Catalog::search`], limited to the tracks of `playlist` when one
    /// is given. Results keep catalog order; ids the catalog doesn't know are
    /// skipped.
    pub fn search_within(&self, playlist: Option<&Playlist>, query: &str) -> Vec<Arc<Track>> {
        let query = query.trim().to_lowercase();
        self.tracks
            .iter()
            .zip(&self.lower)
            .filter(|(t, _)| playlist.is_none_or(|p| p.contains(&t.id)))
            .filter(|(_, (title, artist))| {
                query.is_empty() || title.contains(&query) || artist.contains(&query)
            })
            .map(|(t, _)| Arc::clone(t))
            .collect()
    }

    /// Tracks belonging to `playlist`, in catalog order.
    pub fn tracks_for(&self, playlist: &Playlist) -> Vec<Arc<Track>> {
        self.search_within(Some(playlist), "")
    }
}
