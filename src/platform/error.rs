//! Platform Error Types

use thiserror::Error;

/// Result type for platform operations
pub type Result<T> = std::result::Result<T, PlatformError>;

/// Platform backend errors
#[derive(Error, Debug)]
pub enum PlatformError {
    /// Reading pointer state failed
    #[error("Cursor query failed: {0}")]
    CursorQuery(String),

    /// Changing pointer state failed
    #[error("Cursor update failed: {0}")]
    CursorUpdate(String),

    /// Screen size could not be determined
    #[error("Screen metrics unavailable: {0}")]
    ScreenMetrics(String),

    /// Keyboard hook install/remove or input injection failed
    #[error("Keyboard hook error: {0}")]
    Hook(String),

    /// Overlay window creation or update failed
    #[error("Overlay window error: {0}")]
    Overlay(String),

    /// The UI thread has exited
    #[error("UI thread is not running")]
    UiThreadGone,

    /// Another instance holds the single-instance mutex
    #[error("Another instance is already running")]
    AlreadyRunning,

    /// Elevation request was refused or failed
    #[error("Elevation failed: {0}")]
    Elevation(String),

    /// Operation has no implementation on this platform
    #[error("Not supported on this platform: {0}")]
    Unsupported(&'static str),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
