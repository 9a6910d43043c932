use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{debug, info, warn};

use crate::app::App;
use crate::audio::RodioSink;
use crate::catalog::{Catalog, JsonCatalogStore};
use crate::cli::Cli;
use crate::config::Settings;
use crate::player::PlaybackController;
use crate::playlist::PlaylistBook;
use crate::storage::JsonFileStore;

mod admin;
mod event_loop;
mod logging;
mod settings;

use logging::LogTarget;

pub fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let (settings, fallback_note) = settings::load_settings(cli.config);

    let target = match cli.command {
        None => LogTarget::File,
        Some(_) => LogTarget::Stderr,
    };
    logging::init(&settings.logging, target);
    if let Some(note) = fallback_note {
        warn!("{note}");
    }

    match cli.command {
        None => run_listener(&settings),
        Some(command) => admin::run(command, &settings),
    }
}

fn run_listener(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = Catalog::load(&JsonCatalogStore::open(&settings.catalog.path))?;
    let store = JsonFileStore::open(&settings.store.path);
    debug!(store = %store.path().display(), "opening local store");
    let playlists = PlaylistBook::load(store)?;
    info!(
        tracks = catalog.len(),
        playlists = playlists.len(),
        "library loaded"
    );
    if catalog.is_empty() {
        warn!(path = %settings.catalog.path.display(), "catalog is empty");
    }

    let mut app = App::new(catalog, playlists);
    let mut controller =
        PlaybackController::new(RodioSink::new(&settings.audio)).with_loop(settings.playback.loop_on_start);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(&mut terminal, settings, &mut app, &mut controller);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    run_result
}
