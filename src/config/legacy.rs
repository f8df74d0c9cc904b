//! Import of the JSON settings file written by earlier releases
//!
//! Earlier releases kept their settings in `~/.fakelockscreen/lock_settings.json`:
//!
//! ```json
//! { "unlock_key": "ctrl+alt+u", "lock_key": "ctrl+alt+l", "start_on_boot": false }
//! ```
//!
//! Only the hotkeys carry over. Autostart is managed outside the program now.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::Config;

/// Directory name under the home directory
const LEGACY_DIR: &str = ".fakelockscreen";

/// Settings file name
const LEGACY_FILE: &str = "lock_settings.json";

#[derive(Debug, Default, Deserialize)]
struct LegacySettings {
    #[serde(default)]
    unlock_key: Option<String>,
    #[serde(default)]
    lock_key: Option<String>,
}

/// Location of the legacy settings file for the current user
pub fn legacy_settings_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(LEGACY_DIR).join(LEGACY_FILE))
}

/// Apply hotkeys from a legacy settings file onto `config`
pub fn import_legacy(path: &Path, mut config: Config) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read legacy settings: {}", path.display()))?;
    let legacy: LegacySettings =
        serde_json::from_str(&content).context("Failed to parse legacy settings")?;

    if let Some(lock) = legacy.lock_key.filter(|k| !k.trim().is_empty()) {
        config.hotkeys.lock = lock;
    }
    if let Some(unlock) = legacy.unlock_key.filter(|k| !k.trim().is_empty()) {
        config.hotkeys.unlock = unlock;
    }

    Ok(config)
}
