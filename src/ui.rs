//! UI rendering helpers for the terminal user interface.
//!
//! This module contains functions to render the TUI using `ratatui`.

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style, Stylize},
    text::Line,
    widgets::{Block, Borders, Gauge, List, ListItem, ListState, Padding, Paragraph, Wrap},
};
use std::{collections::BTreeMap, sync::LazyLock};

use crate::app::{App, Focus, InputMode};
use crate::config::{ControlsSettings, UiSettings};
use crate::player::{PlaybackState, Status};
use crate::storage::LocalStore;

static CONTROLS_MAP: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    let mut map = BTreeMap::new();
    map.insert("j/k", "up/down");
    map.insert("tab", "songs/playlists");
    map.insert("enter", "play song / open playlist");
    map.insert("space/p", "play/pause");
    map.insert("h/l", "prev/next song");
    // H/L is filled dynamically from config.
    map.insert("0-9", "seek to n/10");
    map.insert("r", "loop");
    map.insert("/", "search");
    map.insert("n", "new playlist");
    map.insert("d", "delete playlist");
    map.insert("a", "add to playlist");
    map.insert("x", "remove from playlist");
    map.insert("q", "quit");
    map
});

/// Render the controls help text, incorporating scrub seconds.
fn controls_text(scrub_seconds: u64) -> String {
    // Keep the rendered order stable and human-friendly.
    let order = [
        "j/k", "tab", "enter", "space/p", "h/l", "H/L", "0-9", "r", "/", "n", "d", "a", "x", "q",
    ];
    order
        .iter()
        .filter_map(|k| {
            if *k == "H/L" {
                Some(format!("[H/L] scrub -/+{}s", scrub_seconds))
            } else {
                CONTROLS_MAP.get(k).map(|v| format!("[{}] {}", k, v))
            }
        })
        .collect::<Vec<String>>()
        .join(" | ")
}

/// The prompt line for the active input mode, if any.
fn prompt_text<S: LocalStore>(app: &App<S>) -> Option<String> {
    match &app.mode {
        InputMode::Normal => None,
        InputMode::Search => Some(format!("search: {}_", app.search_query)),
        InputMode::NewPlaylist => Some(format!("new playlist name: {}_", app.input)),
        InputMode::ConfirmDelete(i) => {
            let name = app.playlists.get(*i).map_or("?", |p| p.name.as_str());
            Some(format!("delete playlist {:?}? [y/n]", name))
        }
    }
}

/// Lines of the now-playing box: track, cover, and the state flags.
/// `slot` is the loaded track's 1-based place in the queue and the queue length.
fn now_playing_lines(
    state: &PlaybackState,
    slot: Option<(usize, usize)>,
    ui: &UiSettings,
) -> Vec<Line<'static>> {
    let Some(track) = state.track.as_ref() else {
        return vec![Line::from(" Nothing loaded. Pick a song and press enter.")];
    };

    let status = match state.status() {
        Status::Playing => "Playing",
        Status::Paused => "Paused",
        Status::Empty => "Stopped",
    };
    let looping = if state.looping { "Loop: ON" } else { "Loop: OFF" };

    vec![
        Line::from(format!(" {} • {}", track.title, track.artist)).bold(),
        Line::from(format!(" Cover: {}", track.cover_or(&ui.default_cover))),
        Line::from(match slot {
            Some((n, len)) => format!(" {} • {} • {}/{}", status, looping, n, len),
            None => format!(" {} • {}", status, looping),
        }),
    ]
}

/// Start/end of the window into a list of `total` rows that keeps `selected`
/// near the middle of `height` rows.
fn visible_window(total: usize, selected: usize, height: usize) -> (usize, usize) {
    if total <= height || height == 0 {
        return (0, total);
    }
    let half = height / 2;
    let mut start = selected.saturating_sub(half);
    if start + height > total {
        start = total - height;
    }
    (start, start + height)
}

fn focused_block(title: &str, focused: bool) -> Block<'_> {
    let block = Block::default().borders(Borders::ALL).title(title);
    if focused {
        block.border_style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        block
    }
}

fn draw_sidebar<S: LocalStore>(frame: &mut Frame, app: &App<S>, area: Rect) {
    let open = app.playlists.selected_index();
    let mut items = vec![ListItem::new(if open.is_none() {
        "* All songs".to_string()
    } else {
        "  All songs".to_string()
    })];
    items.extend(app.playlists.playlists().iter().enumerate().map(|(i, p)| {
        let marker = if open == Some(i) { '*' } else { ' ' };
        if p.is_empty() {
            ListItem::new(format!("{} {} (empty)", marker, p.name))
        } else {
            let count = app.catalog.tracks_for(p).len();
            ListItem::new(format!("{} {} ({})", marker, p.name, count))
        }
    }));

    let list = List::new(items)
        .block(focused_block(" playlists ", app.focus == Focus::Playlists))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    state.select(Some(app.sidebar_selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_songs<S: LocalStore>(frame: &mut Frame, app: &App<S>, playing_id: Option<&str>, area: Rect) {
    let tracks = app.visible_tracks();
    let title = match app.playlists.selected() {
        Some(p) => format!(" {} ", p.name),
        None => " songs ".to_string(),
    };
    let title = match app.search_query.trim() {
        "" => title,
        q => format!("{}[/{}] ", title, q),
    };

    // Only build ListItems for the visible window (avoid allocating the entire list).
    let height = area.height.saturating_sub(2) as usize;
    let (start, end) = visible_window(tracks.len(), app.selected, height);
    let items: Vec<ListItem> = tracks[start..end]
        .iter()
        .map(|t| {
            let item = ListItem::new(t.display());
            if playing_id == Some(t.id.as_str()) {
                item.italic()
            } else {
                item
            }
        })
        .collect();

    let list = List::new(items)
        .block(focused_block(&title, app.focus == Focus::Songs))
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED))
        .highlight_symbol("> ");
    let mut state = ListState::default();
    if !tracks.is_empty() {
        state.select(Some(app.selected.saturating_sub(start)));
    }
    frame.render_stateful_widget(list, area, &mut state);
}

/// Render the entire UI into the provided `frame` using `app` state and settings.
pub fn draw<S: LocalStore>(
    frame: &mut Frame,
    app: &App<S>,
    playback: &PlaybackState,
    queue_slot: Option<(usize, usize)>,
    ui_settings: &UiSettings,
    controls_settings: &ControlsSettings,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Length(4),
        ])
        .split(frame.area());

    // Header
    let header = Paragraph::new(ui_settings.header_text.as_str())
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" tunedeck ")
                .title_alignment(Alignment::Center),
        );
    frame.render_widget(header, chunks[0]);

    // Sidebar + song list
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(10)])
        .split(chunks[1]);
    draw_sidebar(frame, app, body[0]);
    let playing_id = playback.track.as_ref().map(|t| t.id.as_str());
    draw_songs(frame, app, playing_id, body[1]);

    // Now playing
    let now_playing = Paragraph::new(now_playing_lines(playback, queue_slot, ui_settings))
        .block(Block::bordered().title(" now playing "))
        .wrap(Wrap { trim: true });
    frame.render_widget(now_playing, chunks[2]);

    let gauge = Gauge::default()
        .block(Block::bordered())
        .ratio(playback.progress())
        .label(format!(
            "{} / {}",
            playback.elapsed_text(),
            playback.duration_text()
        ));
    frame.render_widget(gauge, chunks[3]);

    // Footer: prompt or status line above the key help.
    let mut footer_lines = Vec::new();
    if let Some(prompt) = prompt_text(app) {
        footer_lines.push(Line::from(prompt).bold());
    } else if let Some(status) = &app.status {
        footer_lines.push(Line::from(status.as_str()));
    }
    footer_lines.push(Line::from(controls_text(controls_settings.scrub_seconds)));

    let footer = Paragraph::new(footer_lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" controls ")
                .padding(Padding {
                    left: 1,
                    right: 0,
                    top: 0,
                    bottom: 0,
                }),
        )
        .wrap(Wrap { trim: true });

    frame.render_widget(footer, chunks[4]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn controls_text_mentions_scrub_seconds() {
        let text = controls_text(7);
        assert!(text.contains("[H/L] scrub -/+7s"));
        assert!(text.starts_with("[j/k] up/down"));
        assert!(text.ends_with("[q] quit"));
    }

    fn text(lines: &[Line]) -> Vec<String> {
        lines.iter().map(|l| l.to_string()).collect()
    }

    #[test]
    fn now_playing_shows_queue_place_and_cover_fallback() {
        let ui = UiSettings::default();
        assert_eq!(
            text(&now_playing_lines(&PlaybackState::default(), None, &ui)),
            vec![" Nothing loaded. Pick a song and press enter."]
        );

        let state = PlaybackState {
            track: Some(std::sync::Arc::new(crate::catalog::Track {
                id: "1".into(),
                title: "Song".into(),
                artist: "Band".into(),
                cover_url: None,
                audio_url: "song.mp3".into(),
                uploaded_at: None,
            })),
            playing: true,
            ..PlaybackState::default()
        };
        let lines = text(&now_playing_lines(&state, Some((2, 5)), &ui));
        assert_eq!(lines[0], " Song • Band");
        assert_eq!(lines[1], format!(" Cover: {}", ui.default_cover));
        assert_eq!(lines[2], " Playing • Loop: OFF • 2/5");

        let lines = text(&now_playing_lines(&state, None, &ui));
        assert_eq!(lines[2], " Playing • Loop: OFF");
    }

    #[test]
    fn visible_window_keeps_selection_centered() {
        assert_eq!(visible_window(5, 4, 10), (0, 5));
        assert_eq!(visible_window(100, 50, 10), (45, 55));
        assert_eq!(visible_window(100, 2, 10), (0, 10));
        assert_eq!(visible_window(100, 99, 10), (90, 100));
    }
}
