use std::path::PathBuf;

use crate::config;

/// Load settings, falling back to defaults when the config can't be used.
///
/// The second value explains the fallback; it is logged once the
/// subscriber is up.
pub fn load_settings(explicit: Option<PathBuf>) -> (config::Settings, Option<String>) {
    match config::Settings::load_from(explicit) {
        Ok(s) => (s, None),
        // Config is optional; failures should not prevent the app from starting.
        Err(e) => (
            config::Settings::default(),
            Some(format!("failed to load config, using defaults: {e}")),
        ),
    }
}
