use serde::{Deserialize, Serialize};

/// A named, ordered list of track ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Playlist {
    pub name: String,
    #[serde(default)]
    pub songs: Vec<String>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            songs: Vec::new(),
        }
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.songs.iter().any(|s| s == track_id)
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
