//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - The legacy JSON settings file
//! - Environment variables and CLI arguments
//!
//! # Resolution
//!
//! ```text
//! --config PATH or <config_dir>/fake-lock-screen/config.toml
//!   ├─> exists and parses    ──> File
//!   ├─> exists, bad content  ──> Fallback (defaults, warning)
//!   └─> missing
//!         ├─> ~/.fakelockscreen/lock_settings.json ──> Legacy
//!         └─> nothing                               ──> Defaults
//! then: CLI overrides ──> validate (errors are fatal)
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub mod legacy;
pub mod types;

pub use types::{
    BrightnessConfig, CursorConfig, HotkeyConfig, LoggingConfig, OverlayConfig,
    HINT_KEY_PLACEHOLDER,
};

use crate::cursor::{EdgeGuard, SuppressorConfig, MAX_EDGE_MARGIN, MIN_EDGE_MARGIN};
use crate::input::{Hotkey, HotkeyBindings, HotkeyError};
use crate::platform::Point;

/// Directory name under the platform config dir
const CONFIG_DIR_NAME: &str = "fake-lock-screen";

/// Config file name
const CONFIG_FILE_NAME: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Config {
    /// Hotkey bindings
    #[serde(default)]
    pub hotkeys: HotkeyConfig,
    /// Cursor suppression
    #[serde(default)]
    pub cursor: CursorConfig,
    /// Brightness dimming
    #[serde(default)]
    pub brightness: BrightnessConfig,
    /// Lock overlay
    #[serde(default)]
    pub overlay: OverlayConfig,
    /// Logging
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the effective configuration came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Parsed from a TOML file
    File(PathBuf),
    /// Hotkeys imported from the legacy JSON settings
    Legacy(PathBuf),
    /// No file found
    Defaults,
    /// A file was found but unusable; defaults were used
    Fallback {
        /// Offending file
        path: PathBuf,
        /// Why it was rejected
        reason: String,
    },
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a config file without validating it
    pub fn read(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Resolve the configuration without failing
    ///
    /// Unreadable or malformed files fall back to defaults; the returned
    /// [`ConfigSource`] says which path was taken. The result is not
    /// validated.
    pub fn load_or_default(path: Option<&Path>) -> (Self, ConfigSource) {
        let path = path.map(Path::to_path_buf).or_else(Self::default_path);

        if let Some(path) = path.filter(|p| p.exists()) {
            return match Self::read(&path) {
                Ok(config) => (config, ConfigSource::File(path)),
                Err(e) => (
                    Self::default(),
                    ConfigSource::Fallback {
                        path,
                        reason: format!("{:#}", e),
                    },
                ),
            };
        }

        match legacy::legacy_settings_path().filter(|p| p.exists()) {
            Some(path) => match legacy::import_legacy(&path, Self::default()) {
                Ok(config) if config.hotkey_bindings().is_ok() => {
                    (config, ConfigSource::Legacy(path))
                }
                Ok(config) => {
                    let reason = config
                        .hotkey_bindings()
                        .err()
                        .map(|e| e.to_string())
                        .unwrap_or_default();
                    (Self::default(), ConfigSource::Fallback { path, reason })
                }
                Err(e) => (
                    Self::default(),
                    ConfigSource::Fallback {
                        path,
                        reason: format!("{:#}", e),
                    },
                ),
            },
            None => (Self::default(), ConfigSource::Defaults),
        }
    }

    /// Default config file location (`<config_dir>/fake-lock-screen/config.toml`)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Create default configuration
    pub fn default_config() -> Result<Self> {
        Ok(Config {
            hotkeys: HotkeyConfig::default(),
            cursor: CursorConfig::default(),
            brightness: BrightnessConfig::default(),
            overlay: OverlayConfig::default(),
            logging: LoggingConfig::default(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.hotkey_bindings().context("Invalid hotkey configuration")?;

        if !(1..=1000).contains(&self.cursor.poll_interval_ms) {
            anyhow::bail!(
                "cursor.poll_interval_ms must be between 1 and 1000 (got {})",
                self.cursor.poll_interval_ms
            );
        }

        if !(MIN_EDGE_MARGIN..=MAX_EDGE_MARGIN).contains(&self.cursor.edge_margin) {
            anyhow::bail!(
                "cursor.edge_margin must be between {} and {} (got {})",
                MIN_EDGE_MARGIN,
                MAX_EDGE_MARGIN,
                self.cursor.edge_margin
            );
        }

        if self.brightness.locked_level > 100 {
            anyhow::bail!(
                "brightness.locked_level must be at most 100 (got {})",
                self.brightness.locked_level
            );
        }
        if self.brightness.fallback_level > 100 {
            anyhow::bail!(
                "brightness.fallback_level must be at most 100 (got {})",
                self.brightness.fallback_level
            );
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, lock_key: Option<String>, unlock_key: Option<String>) -> Self {
        if let Some(lock) = lock_key {
            self.hotkeys.lock = lock;
        }
        if let Some(unlock) = unlock_key {
            self.hotkeys.unlock = unlock;
        }
        self
    }

    /// Parse the hotkey section
    pub fn hotkey_bindings(&self) -> std::result::Result<HotkeyBindings, HotkeyError> {
        let lock: Hotkey = self.hotkeys.lock.parse()?;
        let unlock: Hotkey = self.hotkeys.unlock.parse()?;
        let quit = match self.hotkeys.quit.trim() {
            "" => None,
            quit => Some(quit.parse()?),
        };
        HotkeyBindings::new(lock, unlock, quit)
    }

    /// Suppression loop settings
    pub fn suppressor_config(&self) -> SuppressorConfig {
        SuppressorConfig {
            interval: self.poll_interval(),
            guard: EdgeGuard::new(
                self.cursor.edge_margin,
                Point::new(self.cursor.safe_offset_x, self.cursor.safe_offset_y),
            ),
            hide_cursor: self.cursor.hide_on_lock,
        }
    }

    /// Suppression poll interval
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.cursor.poll_interval_ms)
    }

    /// Overlay text for a given unlock hotkey ("" when hints are off)
    pub fn render_hint(&self, unlock: &Hotkey) -> String {
        if !self.overlay.show_hint {
            return String::new();
        }
        self.overlay
            .hint
            .replace(HINT_KEY_PLACEHOLDER, &unlock.display_upper())
    }

    /// Serialize as TOML
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default_config().unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.hotkeys.unlock, "ctrl+alt+u");
        assert_eq!(config.cursor.poll_interval_ms, 10);
        assert_eq!(config.cursor.edge_margin, 10);
        assert_eq!(config.brightness.fallback_level, 50);
        config.validate().unwrap();
    }

    #[test]
    fn test_config_validation_poll_interval() {
        let mut config = Config::default();
        config.cursor.poll_interval_ms = 0;
        assert!(config.validate().is_err());
        config.cursor.poll_interval_ms = 1001;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_edge_margin() {
        let mut config = Config::default();
        config.cursor.edge_margin = 4;
        assert!(config.validate().is_err());
        config.cursor.edge_margin = 21;
        assert!(config.validate().is_err());
        config.cursor.edge_margin = 20;
        config.validate().unwrap();
    }

    #[test]
    fn test_config_validation_brightness() {
        let mut config = Config::default();
        config.brightness.locked_level = 101;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_hotkeys() {
        let mut config = Config::default();
        config.hotkeys.unlock = "u".to_string();
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.hotkeys.quit = "ctrl+alt+l".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_log_level() {
        let mut config = Config::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_overrides() {
        let config = Config::default()
            .with_overrides(Some("ctrl+shift+f12".into()), None);
        assert_eq!(config.hotkeys.lock, "ctrl+shift+f12");
        assert_eq!(config.hotkeys.unlock, "ctrl+alt+u");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: Config = toml::from_str("[cursor]\nedge_margin = 15\n").unwrap();
        assert_eq!(config.cursor.edge_margin, 15);
        assert_eq!(config.cursor.poll_interval_ms, 10);
        assert_eq!(config.hotkeys, HotkeyConfig::default());
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = Config::default();
        let text = config.to_toml().unwrap();
        let parsed: Config = toml::from_str(&text).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_render_hint() {
        let mut config = Config::default();
        let unlock: Hotkey = "ctrl+alt+u".parse().unwrap();
        assert_eq!(config.render_hint(&unlock), "Press CTRL+ALT+U to unlock");

        config.overlay.show_hint = false;
        assert_eq!(config.render_hint(&unlock), "");
    }

    #[test]
    fn test_suppressor_config() {
        let mut config = Config::default();
        config.cursor.poll_interval_ms = 25;
        config.cursor.hide_on_lock = false;
        let suppressor = config.suppressor_config();
        assert_eq!(suppressor.interval, Duration::from_millis(25));
        assert!(!suppressor.hide_cursor);
        assert_eq!(suppressor.guard.margin(), 10);
    }
}
