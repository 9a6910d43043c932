use super::load::{default_config_path, resolve_config_path};
use super::schema::*;
use super::ConfigError;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

fn env_lock() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|e| e.into_inner())
}

struct EnvGuard {
    key: &'static str,
    old: Option<std::ffi::OsString>,
}

impl EnvGuard {
    fn set(key: &'static str, val: &str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::set_var(key, val);
        }
        Self { key, old }
    }

    fn remove(key: &'static str) -> Self {
        let old = std::env::var_os(key);
        unsafe {
            std::env::remove_var(key);
        }
        Self { key, old }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        match self.old.take() {
            Some(v) => unsafe {
                std::env::set_var(self.key, v);
            },
            None => unsafe {
                std::env::remove_var(self.key);
            },
        }
    }
}

// Variables that would leak into `Settings::load_from` from the developer's shell.
fn clear_overrides() -> Vec<EnvGuard> {
    [
        "TUNEDECK__AUDIO__TICK_MS",
        "TUNEDECK__ADMIN__ALLOWED_ADMINS",
        "TUNEDECK__PLAYBACK__LOOP_ON_START",
        "TUNEDECK__CATALOG__PATH",
    ]
    .into_iter()
    .map(EnvGuard::remove)
    .collect()
}

#[test]
fn resolve_config_path_prefers_tunedeck_config_path() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("TUNEDECK_CONFIG_PATH", "/tmp/tunedeck-test-config.toml");
    assert_eq!(
        resolve_config_path().unwrap(),
        PathBuf::from("/tmp/tunedeck-test-config.toml")
    );
}

#[test]
fn default_config_path_prefers_xdg_config_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_CONFIG_HOME", "/tmp/xdg-config-home");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-should-not-win");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        PathBuf::from("/tmp/xdg-config-home")
            .join("tunedeck")
            .join("config.toml")
    );
}

#[test]
fn default_config_path_falls_back_to_home_dot_config() {
    let _lock = env_lock();
    let _g1 = EnvGuard::remove("XDG_CONFIG_HOME");
    let _g2 = EnvGuard::set("HOME", "/tmp/home-dir");

    let p = default_config_path().unwrap();
    assert_eq!(
        p,
        PathBuf::from("/tmp/home-dir")
            .join(".config")
            .join("tunedeck")
            .join("config.toml")
    );
}

#[test]
fn data_dir_follows_xdg_data_home() {
    let _lock = env_lock();
    let _g1 = EnvGuard::set("XDG_DATA_HOME", "/tmp/xdg-data");
    assert_eq!(data_dir(), PathBuf::from("/tmp/xdg-data/tunedeck"));
    assert_eq!(
        CatalogSettings::default().path,
        PathBuf::from("/tmp/xdg-data/tunedeck/catalog.json")
    );
}

#[test]
fn defaults_are_valid() {
    let s = Settings::default();
    assert!(s.validate().is_ok());
    assert!(!s.playback.loop_on_start);
    assert_eq!(s.ui.default_cover, "assets/default-song.jpg");
    assert!(s.admin.allowed_admins.is_empty());
}

#[test]
fn settings_load_from_config_file() {
    let _lock = env_lock();
    let _clear = clear_overrides();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(
        &cfg_path,
        r#"
[audio]
tick_ms = 100
quit_fade_out_ms = 123

[playback]
loop_on_start = true

[controls]
scrub_seconds = 9

[ui]
header_text = "hello"
default_cover = "covers/none.png"

[catalog]
path = "/srv/tunedeck/catalog.json"

[store]
path = "/home/me/.tunedeck.json"

[admin]
allowed_admins = ["boss@example.com"]

[logging]
filter = "tunedeck=debug"
file = "/tmp/tunedeck.log"
"#,
    )
    .unwrap();

    let _g1 = EnvGuard::set("TUNEDECK_CONFIG_PATH", cfg_path.to_str().unwrap());

    let s = Settings::load_from(None).unwrap();
    assert_eq!(s.audio.tick_ms, 100);
    assert_eq!(s.audio.quit_fade_out_ms, 123);
    assert!(s.playback.loop_on_start);
    assert_eq!(s.controls.scrub_seconds, 9);
    assert_eq!(s.ui.header_text, "hello");
    assert_eq!(s.ui.default_cover, "covers/none.png");
    assert_eq!(s.catalog.path, PathBuf::from("/srv/tunedeck/catalog.json"));
    assert_eq!(s.store.path, PathBuf::from("/home/me/.tunedeck.json"));
    assert_eq!(s.admin.allowed_admins, vec!["boss@example.com".to_string()]);
    assert_eq!(s.logging.filter, "tunedeck=debug");
    assert_eq!(s.logging.file, PathBuf::from("/tmp/tunedeck.log"));
}

#[test]
fn explicit_path_replaces_the_resolved_one() {
    let _lock = env_lock();
    let _clear = clear_overrides();

    let dir = tempfile::tempdir().unwrap();
    let env_cfg = dir.path().join("env.toml");
    let cli_cfg = dir.path().join("cli.toml");
    std::fs::write(&env_cfg, "[controls]\nscrub_seconds = 1\n").unwrap();
    std::fs::write(&cli_cfg, "[controls]\nscrub_seconds = 30\n").unwrap();

    let _g1 = EnvGuard::set("TUNEDECK_CONFIG_PATH", env_cfg.to_str().unwrap());

    let s = Settings::load_from(Some(cli_cfg)).unwrap();
    assert_eq!(s.controls.scrub_seconds, 30);
}

#[test]
fn missing_config_file_falls_back_to_defaults() {
    let _lock = env_lock();
    let _clear = clear_overrides();

    let dir = tempfile::tempdir().unwrap();
    let s = Settings::load_from(Some(dir.path().join("absent.toml"))).unwrap();
    assert_eq!(s.audio.tick_ms, AudioSettings::default().tick_ms);
}

#[test]
fn settings_env_overrides_config_file() {
    let _lock = env_lock();
    let _clear = clear_overrides();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[audio]\ntick_ms = 250\n").unwrap();

    let _g1 = EnvGuard::set("TUNEDECK__AUDIO__TICK_MS", "50");
    let _g2 = EnvGuard::set(
        "TUNEDECK__ADMIN__ALLOWED_ADMINS",
        "a@example.com,b@example.com",
    );

    let s = Settings::load_from(Some(cfg_path)).unwrap();
    assert_eq!(s.audio.tick_ms, 50);
    assert_eq!(
        s.admin.allowed_admins,
        vec!["a@example.com".to_string(), "b@example.com".to_string()]
    );
}

#[test]
fn zero_tick_is_rejected() {
    let _lock = env_lock();
    let _clear = clear_overrides();

    let dir = tempfile::tempdir().unwrap();
    let cfg_path = dir.path().join("config.toml");
    std::fs::write(&cfg_path, "[audio]\ntick_ms = 0\n").unwrap();

    assert!(matches!(
        Settings::load_from(Some(cfg_path)),
        Err(ConfigError::Invalid(_))
    ));
}

#[test]
fn empty_paths_are_rejected() {
    let mut s = Settings::default();
    s.store.path = PathBuf::new();
    assert!(matches!(s.validate(), Err(ConfigError::Invalid(m)) if m.contains("store.path")));
}

#[test]
fn settings_round_trip_through_toml() {
    let s = Settings::default();
    let text = toml::to_string_pretty(&s).unwrap();
    assert!(text.contains("[audio]"));
    assert!(text.contains("allowed_admins"));

    let back: Settings = toml::from_str(&text).unwrap();
    assert_eq!(back.audio.tick_ms, s.audio.tick_ms);
    assert_eq!(back.catalog.path, s.catalog.path);
}
