//! Listener model: what the song list shows and where the cursors are.

use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Catalog, Track};
use crate::player::Queue;
use crate::playlist::PlaylistBook;
use crate::storage::LocalStore;

/// Which pane receives `j`/`k` and `Enter`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    Songs,
    Playlists,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Normal,
    /// Typing a search query.
    Search,
    /// Typing the name of a new playlist.
    NewPlaylist,
    /// Waiting for y/n before deleting the playlist at this index.
    ConfirmDelete(usize),
}

pub struct App<S: LocalStore> {
    pub catalog: Catalog,
    pub playlists: PlaylistBook<S>,
    /// Cursor into `visible_tracks()`.
    pub selected: usize,
    /// Cursor into the sidebar; 0 is "All songs", `i + 1` is playlist `i`.
    pub sidebar_selected: usize,
    pub focus: Focus,
    pub mode: InputMode,
    pub search_query: String,
    /// Text typed at the playlist name prompt.
    pub input: String,
    pub status: Option<String>,
}

impl<S: LocalStore> App<S> {
    pub fn new(catalog: Catalog, playlists: PlaylistBook<S>) -> Self {
        Self {
            catalog,
            playlists,
            selected: 0,
            sidebar_selected: 0,
            focus: Focus::default(),
            mode: InputMode::default(),
            search_query: String::new(),
            input: String::new(),
            status: None,
        }
    }

    /// Songs of the selected playlist (or the whole catalog), narrowed by the
    /// search query.
    pub fn visible_tracks(&self) -> Vec<Arc<Track>> {
        match self.playlists.selected() {
            Some(playlist) => self.catalog.search_within(Some(playlist), &self.search_query),
            None => self.catalog.search(&self.search_query),
        }
    }

    pub fn selected_track(&self) -> Option<Arc<Track>> {
        self.visible_tracks().get(self.selected).cloned()
    }

    /// The selected song plus the displayed list to navigate through.
    pub fn play_request(&self) -> Option<(Arc<Track>, Queue)> {
        let visible = self.visible_tracks();
        let track = Arc::clone(visible.get(self.selected)?);
        Some((track, visible.into()))
    }

    /// Number of sidebar rows, "All songs" included.
    pub fn sidebar_len(&self) -> usize {
        self.playlists.len() + 1
    }

    /// Playlist index under the sidebar cursor, `None` on "All songs".
    pub fn highlighted_playlist(&self) -> Option<usize> {
        self.sidebar_selected.checked_sub(1)
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::Songs => Focus::Playlists,
            Focus::Playlists => Focus::Songs,
        };
    }

    /// Move the focused cursor down, wrapping to the top.
    pub fn next(&mut self) {
        match self.focus {
            Focus::Songs => self.selected = wrap_next(self.selected, self.visible_tracks().len()),
            Focus::Playlists => {
                self.sidebar_selected = wrap_next(self.sidebar_selected, self.sidebar_len())
            }
        }
    }

    /// Move the focused cursor up, wrapping to the bottom.
    pub fn prev(&mut self) {
        match self.focus {
            Focus::Songs => self.selected = wrap_prev(self.selected, self.visible_tracks().len()),
            Focus::Playlists => {
                self.sidebar_selected = wrap_prev(self.sidebar_selected, self.sidebar_len())
            }
        }
    }

    /// Show the sidebar entry under the cursor in the song list.
    pub fn open_highlighted(&mut self) {
        match self.highlighted_playlist() {
            None => self.playlists.select_all(),
            Some(i) => {
                if let Err(err) = self.playlists.select(i) {
                    self.status = Some(err.to_string());
                    return;
                }
            }
        }
        self.selected = 0;
    }

    pub fn enter_search(&mut self) {
        self.mode = InputMode::Search;
    }

    pub fn push_search_char(&mut self, c: char) {
        self.search_query.push(c);
        self.ensure_selected_visible();
    }

    pub fn pop_search_char(&mut self) {
        self.search_query.pop();
        self.ensure_selected_visible();
    }

    /// Leave the prompt and keep the query applied.
    pub fn apply_search(&mut self) {
        self.mode = InputMode::Normal;
    }

    pub fn clear_search(&mut self) {
        self.search_query.clear();
        self.mode = InputMode::Normal;
        self.ensure_selected_visible();
    }

    pub fn begin_new_playlist(&mut self) {
        self.input.clear();
        self.mode = InputMode::NewPlaylist;
    }

    pub fn push_input_char(&mut self, c: char) {
        self.input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.input.pop();
    }

    pub fn cancel_input(&mut self) {
        self.input.clear();
        self.mode = InputMode::Normal;
    }

    /// Create a playlist from the prompt text. Failures stay on the prompt
    /// with the reason in the status line.
    pub fn submit_new_playlist(&mut self) {
        match self.playlists.create(&self.input) {
            Ok(p) => {
                self.status = Some(format!("Created playlist {:?}", p.name));
                self.input.clear();
                self.mode = InputMode::Normal;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Ask for confirmation before deleting the highlighted playlist.
    pub fn request_delete(&mut self) {
        match self.highlighted_playlist() {
            Some(i) if i < self.playlists.len() => self.mode = InputMode::ConfirmDelete(i),
            _ => debug!("delete ignored: no playlist highlighted"),
        }
    }

    pub fn confirm_delete(&mut self, yes: bool) {
        let InputMode::ConfirmDelete(index) = self.mode else {
            return;
        };
        self.mode = InputMode::Normal;
        if !yes {
            return;
        }

        let was_selected = self.playlists.selected_index() == Some(index);
        match self.playlists.delete(index) {
            Ok(p) => {
                self.status = Some(format!("Deleted playlist {:?}", p.name));
                self.sidebar_selected = self.sidebar_selected.min(self.playlists.len());
                if was_selected {
                    self.selected = 0;
                }
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Add the selected song to the highlighted playlist.
    pub fn add_selected_to_playlist(&mut self) {
        if self.playlists.is_empty() {
            self.status = Some("No playlists yet; press n to create one".to_string());
            return;
        }
        let Some(index) = self.highlighted_playlist() else {
            self.status = Some("Highlight a playlist in the sidebar first".to_string());
            return;
        };
        let Some(track) = self.selected_track() else {
            return;
        };

        self.status = Some(match self.playlists.add_track(index, &track.id) {
            Ok(true) => format!("Added {:?}", track.title),
            Ok(false) => format!("{:?} is already in that playlist", track.title),
            Err(err) => err.to_string(),
        });
    }

    /// Remove the selected song from the playlist being shown.
    pub fn remove_selected_from_playlist(&mut self) {
        let Some(index) = self.playlists.selected_index() else {
            debug!("remove ignored: showing all songs");
            return;
        };
        let Some(track) = self.selected_track() else {
            return;
        };

        match self.playlists.remove_track(index, &track.id) {
            Ok(_) => {
                self.status = Some(format!("Removed {:?}", track.title));
                self.ensure_selected_visible();
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    fn ensure_selected_visible(&mut self) {
        let len = self.visible_tracks().len();
        if self.selected >= len {
            self.selected = len.saturating_sub(1);
        }
    }
}

fn wrap_next(current: usize, len: usize) -> usize {
    if len == 0 { 0 } else { (current + 1) % len }
}

fn wrap_prev(current: usize, len: usize) -> usize {
    match len {
        0 => 0,
        _ if current == 0 || current >= len => len - 1,
        _ => current - 1,
    }
}
