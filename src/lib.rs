//! # fake-lock-screen
//!
//! A fake lock screen for Windows desktops: a hotkey blacks out the screen,
//! swallows keyboard input, hides the pointer and dims the display until the
//! unlock hotkey is pressed. The session is never actually locked.
//!
//! # Architecture
//!
//! ```text
//! fake-lock-screen
//!   ├─> Keyboard Hook + KeyFilter (global hotkeys, input blocking)
//!   ├─> App (hotkey event loop)
//!   └─> LockController
//!         ├─> Overlay (fullscreen black window)
//!         ├─> BrightnessManager (save / dim / restore)
//!         └─> CursorSuppressor (hide + pull pointer away from edges)
//! ```
//!
//! # Platforms
//!
//! The native backend targets Windows. Elsewhere the crate runs against an
//! in-memory simulated desktop, which is also what the test suite drives.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Hotkey event loop
pub mod app;

/// Monitor brightness control
pub mod brightness;

/// Configuration
pub mod config;

/// Cursor suppression while locked
pub mod cursor;

/// Crate-level error type
pub mod error;

/// Hotkey parsing and key filtering
pub mod input;

/// OS seams and backends
pub mod platform;

/// Lock session state and orchestration
pub mod session;

/// Diagnostics and error formatting
pub mod utils;

pub use error::{LockError, Result};
