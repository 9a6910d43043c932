use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus, InputMode};
use crate::audio::RodioSink;
use crate::config;
use crate::player::{MediaSink, PlaybackController};
use crate::storage::LocalStore;
use crate::ui;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Main terminal event loop: applies audio notifications, draws, and handles
/// input. Returns `Ok(())` when shutdown is requested.
pub fn run<S: LocalStore>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<S>,
    controller: &mut PlaybackController<RodioSink>,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        controller.pump_events();

        terminal.draw(|f| {
            ui::draw(
                f,
                app,
                controller.state(),
                controller.queue_slot(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, controller) == Flow::Quit {
                    controller
                        .sink()
                        .quit_softly(Duration::from_millis(settings.audio.quit_fade_out_ms));
                    break;
                }
            }
        }
    }

    Ok(())
}

pub fn handle_key_event<S: LocalStore, M: MediaSink>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App<S>,
    controller: &mut PlaybackController<M>,
) -> Flow {
    match app.mode {
        InputMode::Search => {
            match key.code {
                KeyCode::Esc => app.clear_search(),
                KeyCode::Enter => app.apply_search(),
                KeyCode::Backspace => app.pop_search_char(),
                KeyCode::Char(c) if !c.is_control() => app.push_search_char(c),
                _ => {}
            }
            return Flow::Continue;
        }
        InputMode::NewPlaylist => {
            match key.code {
                KeyCode::Esc => app.cancel_input(),
                KeyCode::Enter => app.submit_new_playlist(),
                KeyCode::Backspace => app.pop_input_char(),
                KeyCode::Char(c) if !c.is_control() => app.push_input_char(c),
                _ => {}
            }
            return Flow::Continue;
        }
        InputMode::ConfirmDelete(_) => {
            app.confirm_delete(matches!(key.code, KeyCode::Char('y' | 'Y')));
            return Flow::Continue;
        }
        InputMode::Normal => {}
    }

    app.status = None;
    let scrub = settings.controls.scrub_seconds.min(i64::MAX as u64) as i64;

    match key.code {
        KeyCode::Char('q') => return Flow::Quit,
        KeyCode::Tab => app.toggle_focus(),
        KeyCode::Char('j') | KeyCode::Down => app.next(),
        KeyCode::Char('k') | KeyCode::Up => app.prev(),
        KeyCode::Enter => match app.focus {
            Focus::Songs => {
                if let Some((track, queue)) = app.play_request() {
                    controller.load_and_play(track, Some(queue));
                }
            }
            Focus::Playlists => app.open_highlighted(),
        },
        KeyCode::Char('p') | KeyCode::Char(' ') => controller.toggle_play_pause(),
        KeyCode::Char('l') => controller.next(),
        KeyCode::Char('h') => controller.previous(),
        KeyCode::Char('L') => controller.seek_by(scrub),
        KeyCode::Char('H') => controller.seek_by(-scrub),
        KeyCode::Char(c @ '0'..='9') => {
            let tenth = c.to_digit(10).unwrap_or(0);
            controller.seek(f64::from(tenth) / 10.0);
        }
        KeyCode::Char('r') => controller.toggle_loop(),
        KeyCode::Char('/') => app.enter_search(),
        KeyCode::Char('n') => app.begin_new_playlist(),
        KeyCode::Char('d') => app.request_delete(),
        KeyCode::Char('a') => app.add_selected_to_playlist(),
        KeyCode::Char('x') => app.remove_selected_from_playlist(),
        _ => {}
    }

    Flow::Continue
}
