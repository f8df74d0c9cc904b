//! Brightness Error Types

use thiserror::Error;

/// Result type for brightness operations
pub type Result<T> = std::result::Result<T, BrightnessError>;

/// Brightness control errors
#[derive(Error, Debug)]
pub enum BrightnessError {
    /// No controllable display (external monitors without DDC/WMI support)
    #[error("Brightness control unavailable: {0}")]
    Unavailable(String),

    /// Reading the current level failed
    #[error("Failed to read brightness: {0}")]
    Query(String),

    /// Applying a level failed
    #[error("Failed to set brightness to {level}%: {reason}")]
    Set {
        /// Requested level
        level: u8,
        /// Provider message
        reason: String,
    },

    /// Provider output could not be parsed as a level
    #[error("Unexpected brightness value: {0:?}")]
    InvalidOutput(String),

    /// Blocking worker panicked or was cancelled
    #[error("Brightness task failed: {0}")]
    Task(String),

    /// IO error spawning the provider
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
