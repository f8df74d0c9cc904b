//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::brightness::{DEFAULT_FALLBACK_LEVEL, DEFAULT_LOCKED_LEVEL};
use crate::cursor::{DEFAULT_EDGE_MARGIN, DEFAULT_POLL_INTERVAL_MS};
use crate::input::{DEFAULT_LOCK_HOTKEY, DEFAULT_UNLOCK_HOTKEY};

/// Placeholder replaced by the unlock hotkey in the overlay hint
pub const HINT_KEY_PLACEHOLDER: &str = "{key}";

/// Global hotkey bindings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotkeyConfig {
    /// Combination that locks the screen (e.g. "ctrl+alt+l")
    pub lock: String,

    /// Combination that unlocks the screen
    pub unlock: String,

    /// Combination that exits the program ("" = disabled)
    pub quit: String,
}

impl Default for HotkeyConfig {
    fn default() -> Self {
        Self {
            lock: DEFAULT_LOCK_HOTKEY.to_string(),
            unlock: DEFAULT_UNLOCK_HOTKEY.to_string(),
            quit: String::new(),
        }
    }
}

/// Cursor suppression configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Milliseconds between suppression passes (1-1000)
    pub poll_interval_ms: u64,

    /// Distance from a screen edge that triggers relocation (5-20 px)
    pub edge_margin: i32,

    /// Horizontal offset of the safe point from the screen center
    pub safe_offset_x: i32,

    /// Vertical offset of the safe point from the screen center
    pub safe_offset_y: i32,

    /// Keep the pointer hidden while locked
    pub hide_on_lock: bool,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            edge_margin: DEFAULT_EDGE_MARGIN,
            safe_offset_x: 0,
            safe_offset_y: 0,
            hide_on_lock: true,
        }
    }
}

/// Brightness configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BrightnessConfig {
    /// Dim the display while locked
    pub enabled: bool,

    /// Level applied while locked (0-100)
    pub locked_level: u8,

    /// Level assumed when the current one cannot be read (0-100)
    pub fallback_level: u8,
}

impl Default for BrightnessConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            locked_level: DEFAULT_LOCKED_LEVEL,
            fallback_level: DEFAULT_FALLBACK_LEVEL,
        }
    }
}

/// Lock overlay configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Hint text; `{key}` expands to the unlock hotkey in upper case
    pub hint: String,

    /// Draw the hint at all
    pub show_hint: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            hint: format!("Press {} to unlock", HINT_KEY_PLACEHOLDER),
            show_hint: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level ("trace", "debug", "info", "warn", "error")
    pub level: String,

    /// Directory for log files (None = console only)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
