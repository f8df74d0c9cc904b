//! Crate-level error type

use thiserror::Error;

use crate::brightness::BrightnessError;
use crate::input::HotkeyError;
use crate::platform::PlatformError;

/// Result type for lock session operations
pub type Result<T> = std::result::Result<T, LockError>;

/// Errors surfaced by the lock session and application loop
#[derive(Error, Debug)]
pub enum LockError {
    /// OS backend failure
    #[error(transparent)]
    Platform(#[from] PlatformError),

    /// Hotkey could not be parsed or bound
    #[error(transparent)]
    Hotkey(#[from] HotkeyError),

    /// Brightness provider failure
    #[error(transparent)]
    Brightness(#[from] BrightnessError),

    /// The hotkey event source went away while the app was running
    #[error("Hotkey event channel closed")]
    EventsClosed,
}
