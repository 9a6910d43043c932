//! Application module: exposes the listener model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the catalog, playlists,
//! search and cursor state.

mod model;

pub use model::*;
