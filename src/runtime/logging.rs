use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingSettings;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to `logging.file`; the terminal belongs to the TUI.
    File,
    Stderr,
}

/// `RUST_LOG` when set, else `logging.filter`, else `info`.
fn env_filter(settings: &LoggingSettings) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&settings.filter))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn init(settings: &LoggingSettings, target: LogTarget) {
    let filter = env_filter(settings);
    let result = match target {
        LogTarget::Stderr => tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init(),
        LogTarget::File => {
            if let Some(dir) = settings.file.parent() {
                let _ = fs::create_dir_all(dir);
            }
            let file = match OpenOptions::new()
                .create(true)
                .append(true)
                .open(&settings.file)
            {
                Ok(f) => f,
                Err(e) => {
                    eprintln!(
                        "tunedeck: cannot open log file {}, logging disabled: {e}",
                        settings.file.display()
                    );
                    return;
                }
            };
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
                .try_init()
        }
    };

    if let Err(e) = result {
        eprintln!("tunedeck: logging already initialised: {e}");
    }
}
