use std::time::Duration;

use fake_lock_screen::config::{Config, ConfigSource};
use tempfile::TempDir;

#[test]
fn test_load_full_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[hotkeys]
lock = "ctrl+shift+l"
unlock = "ctrl+shift+u"
quit = "ctrl+shift+q"

[cursor]
poll_interval_ms = 20
edge_margin = 15
hide_on_lock = true

[brightness]
enabled = false
locked_level = 10

[overlay]
hint = "{key}"

[logging]
level = "debug"
"#,
    )
    .unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.poll_interval(), Duration::from_millis(20));
    assert!(!config.brightness.enabled);

    let bindings = config.hotkey_bindings().unwrap();
    assert_eq!(bindings.lock.to_string(), "ctrl+shift+l");
    assert_eq!(config.render_hint(&bindings.unlock), "CTRL+SHIFT+U");
    assert!(bindings.quit.is_some());
}

#[test]
fn test_partial_file_keeps_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[hotkeys]\nunlock = \"ctrl+alt+k\"\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.hotkeys.lock, "ctrl+alt+l");
    assert_eq!(config.hotkeys.unlock, "ctrl+alt+k");
    assert_eq!(config.cursor, Config::default().cursor);
}

#[test]
fn test_load_or_default_reports_file_source() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[cursor]\nedge_margin = 8\n").unwrap();

    let (config, source) = Config::load_or_default(Some(&path));
    assert_eq!(config.cursor.edge_margin, 8);
    assert_eq!(source, ConfigSource::File(path));
}

#[test]
fn test_malformed_file_falls_back_to_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[hotkeys\nlock = ").unwrap();

    let (config, source) = Config::load_or_default(Some(&path));
    assert_eq!(config, Config::default());
    match source {
        ConfigSource::Fallback { path: p, reason } => {
            assert_eq!(p, path);
            assert!(!reason.is_empty());
        }
        other => panic!("unexpected source {:?}", other),
    }
}

#[test]
fn test_invalid_values_are_read_but_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");
    std::fs::write(&path, "[cursor]\nedge_margin = 40\n").unwrap();

    assert!(Config::read(&path).is_ok());
    assert!(Config::load(&path).is_err());
}

#[test]
fn test_cli_overrides_are_validated() {
    let config = Config::default().with_overrides(Some("ctrl+alt+x".to_string()), None);
    assert_eq!(config.hotkeys.lock, "ctrl+alt+x");
    assert!(config.validate().is_ok());

    let config = Config::default().with_overrides(None, Some("ctrl+alt+nope".to_string()));
    assert!(config.validate().is_err());
}

#[test]
fn test_dumped_config_round_trips() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("config.toml");

    let mut config = Config::default();
    config.hotkeys.quit = "ctrl+alt+q".to_string();
    std::fs::write(&path, config.to_toml().unwrap()).unwrap();

    assert_eq!(Config::load(&path).unwrap(), config);
}
