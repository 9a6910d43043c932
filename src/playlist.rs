//! Local playlists: named lists of track ids kept in the local store.

mod book;
mod model;

pub use book::{PlaylistBook, PlaylistError};
pub use model::Playlist;
