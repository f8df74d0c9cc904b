//! Platform Seams
//!
//! Everything the lock session needs from the operating system is expressed
//! as a small trait so the session logic can run against either the native
//! Windows backend or the in-memory simulated desktop.
//!
//! # Traits
//!
//! | Trait | Native (Windows) | Simulated |
//! |-------|------------------|-----------|
//! | [`PointerControl`] | `ShowCursor` / `GetCursorInfo` / `SetCursorPos` | counter + position in memory |
//! | [`Overlay`] | top-most black popup window on the UI thread | records hint and visibility |
//! | [`KeyboardInterceptor`] | `WH_KEYBOARD_LL` hook + `SendInput` | records blocking state |
//! | [`BrightnessControl`](crate::brightness::BrightnessControl) | WMI via PowerShell | level in memory |
//!
//! # Threading
//!
//! ```text
//! tokio runtime
//!   ├─> App event loop ──> LockController ──> CursorSuppressor task
//!   │                          │
//!   │                          └─> Overlay::show/hide ──(crossbeam)──┐
//!   │                                                                 │
//! UI thread (Windows only)                                            │
//!   ├─> GetMessageW pump  <──────────────── PostThreadMessageW ───────┘
//!   ├─> overlay window
//!   └─> keyboard hook ──> KeyFilter ──(tokio mpsc)──> App event loop
//! ```

pub mod error;
pub mod simulated;

#[cfg(windows)]
pub mod windows;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::brightness::BrightnessControl;
use crate::input::{HotkeyAction, KeyFilter};

pub use error::{PlatformError, Result};
pub use simulated::{SimulatedBrightness, SimulatedDesktop};

/// Screen-space pointer position in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Point {
    /// Horizontal position (0 = left edge)
    pub x: i32,
    /// Vertical position (0 = top edge)
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Primary screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScreenBounds {
    /// Screen width
    pub width: i32,
    /// Screen height
    pub height: i32,
}

impl ScreenBounds {
    /// Create new screen bounds
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// Screen center
    pub fn center(&self) -> Point {
        Point::new(self.width / 2, self.height / 2)
    }

    /// Check whether a point lies on the screen
    pub fn contains(&self, p: Point) -> bool {
        p.x >= 0 && p.y >= 0 && p.x < self.width && p.y < self.height
    }
}

/// System pointer access
///
/// Mirrors the OS cursor API: visibility is a counter where negative means
/// hidden, and every hide/show call moves it by one.
pub trait PointerControl: Send + Sync {
    /// Whether the pointer is currently drawn
    fn is_cursor_visible(&self) -> Result<bool>;

    /// Decrement the visibility counter, returning the new value
    fn hide_cursor(&self) -> Result<i32>;

    /// Increment the visibility counter, returning the new value
    fn show_cursor(&self) -> Result<i32>;

    /// Current pointer position
    fn cursor_position(&self) -> Result<Point>;

    /// Move the pointer
    fn set_cursor_position(&self, position: Point) -> Result<()>;

    /// Primary screen size
    fn screen_bounds(&self) -> Result<ScreenBounds>;
}

/// Fullscreen lock overlay
pub trait Overlay: Send + Sync {
    /// Cover the screen, drawing `hint` centered (empty = no text)
    fn show(&self, hint: &str) -> Result<()>;

    /// Remove the overlay
    fn hide(&self) -> Result<()>;

    /// Whether the overlay is currently shown
    fn is_visible(&self) -> bool;
}

/// Global keyboard interception
pub trait KeyboardInterceptor: Send + Sync {
    /// Start or stop swallowing all keyboard input (except the unlock hotkey)
    fn set_blocking(&self, blocking: bool) -> Result<()>;

    /// Synthesize key-up events for Ctrl and Alt
    ///
    /// Modifier releases swallowed during the lock leave the OS believing the
    /// keys are still held.
    fn release_modifiers(&self) -> Result<()>;
}

/// Bundle of platform services used by a lock session
#[derive(Clone)]
pub struct Backend {
    /// Backend name for diagnostics
    pub name: &'static str,
    /// Pointer access
    pub pointer: Arc<dyn PointerControl>,
    /// Overlay window
    pub overlay: Arc<dyn Overlay>,
    /// Keyboard interception
    pub keyboard: Arc<dyn KeyboardInterceptor>,
    /// Brightness control (None = unavailable)
    pub brightness: Option<Arc<dyn BrightnessControl>>,
}

impl Backend {
    /// Create the native backend for the running platform
    ///
    /// On Windows this spawns the UI thread that owns the keyboard hook and
    /// the overlay window. Hotkey triggers detected by `filter` are delivered
    /// on `events`. Other platforms fall back to the simulated desktop.
    pub fn native(filter: Arc<KeyFilter>, events: UnboundedSender<HotkeyAction>) -> Result<Self> {
        #[cfg(windows)]
        {
            windows::create_backend(filter, events)
        }

        #[cfg(not(windows))]
        {
            let _ = events;
            tracing::warn!(
                "No native desktop backend for {}; running against the simulated desktop",
                std::env::consts::OS
            );
            let desktop = SimulatedDesktop::new(ScreenBounds::new(1920, 1080)).with_filter(filter);
            Ok(Self::simulated(desktop, Some(SimulatedBrightness::new(70))))
        }
    }

    /// Create a backend over the simulated desktop
    pub fn simulated(desktop: SimulatedDesktop, brightness: Option<SimulatedBrightness>) -> Self {
        let desktop = Arc::new(desktop);
        Self {
            name: "simulated",
            pointer: desktop.clone(),
            overlay: desktop.clone(),
            keyboard: desktop,
            brightness: brightness.map(|b| Arc::new(b) as Arc<dyn BrightnessControl>),
        }
    }
}

impl std::fmt::Debug for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backend")
            .field("name", &self.name)
            .field("brightness", &self.brightness.is_some())
            .finish()
    }
}

/// Held for the process lifetime to prevent a second instance
pub struct InstanceGuard {
    #[cfg(windows)]
    _mutex: windows::system::InstanceMutex,
}

/// Named mutex guarding against concurrent instances
pub const INSTANCE_MUTEX_NAME: &str = "FakeLockScreenSingletonMutex";

/// Acquire the single-instance guard
///
/// Fails with [`PlatformError::AlreadyRunning`] when another instance holds it.
pub fn acquire_single_instance() -> Result<InstanceGuard> {
    #[cfg(windows)]
    {
        Ok(InstanceGuard {
            _mutex: windows::system::InstanceMutex::acquire(INSTANCE_MUTEX_NAME)?,
        })
    }

    #[cfg(not(windows))]
    {
        Ok(InstanceGuard {})
    }
}

/// Whether the process runs with administrator rights
pub fn is_elevated() -> bool {
    #[cfg(windows)]
    {
        windows::system::is_elevated()
    }

    #[cfg(not(windows))]
    {
        true
    }
}

/// Relaunch the current executable elevated with `args`
pub fn relaunch_elevated(args: &[String]) -> Result<()> {
    #[cfg(windows)]
    {
        windows::system::relaunch_elevated(args)
    }

    #[cfg(not(windows))]
    {
        let _ = args;
        Err(PlatformError::Unsupported("elevation"))
    }
}

/// Show or hide the attached console window
pub fn set_console_visible(visible: bool) {
    #[cfg(windows)]
    windows::system::set_console_visible(visible);

    #[cfg(not(windows))]
    let _ = visible;
}

/// Join arguments into a command line that `CommandLineToArgvW` splits
/// back into the same arguments
///
/// Backslashes are literal except in front of a quote, where each pair
/// becomes one backslash; quoting an argument therefore doubles any run of
/// backslashes that precedes an embedded or the closing quote.
#[cfg_attr(not(windows), allow(dead_code))]
pub(crate) fn join_command_line(args: &[String]) -> String {
    args.iter()
        .map(|arg| quote_argument(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn quote_argument(arg: &str) -> String {
    if !arg.is_empty() && !arg.contains([' ', '\t', '"']) {
        return arg.to_string();
    }

    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    let mut backslashes = 0;
    for c in arg.chars() {
        if c == '\\' {
            backslashes += 1;
            continue;
        }
        let escapes = if c == '"' { backslashes * 2 + 1 } else { backslashes };
        quoted.extend(std::iter::repeat('\\').take(escapes));
        quoted.push(c);
        backslashes = 0;
    }
    quoted.extend(std::iter::repeat('\\').take(backslashes * 2));
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_command_line_plain_and_spaced() {
        assert_eq!(
            join_command_line(&args(&["--config", "C:\\My Settings\\config.toml", "--lock-now"])),
            "--config \"C:\\My Settings\\config.toml\" --lock-now"
        );
        assert_eq!(join_command_line(&args(&["", "-v"])), "\"\" -v");
    }

    #[test]
    fn test_command_line_trailing_backslash_doubled() {
        assert_eq!(
            join_command_line(&args(&["--config", "C:\\My Dir\\"])),
            "--config \"C:\\My Dir\\\\\""
        );
        // Unquoted arguments keep their backslashes as-is
        assert_eq!(join_command_line(&args(&["C:\\dir\\"])), "C:\\dir\\");
    }

    #[test]
    fn test_command_line_embedded_quotes() {
        assert_eq!(
            join_command_line(&args(&["say \"hi\""])),
            "\"say \\\"hi\\\"\""
        );
        assert_eq!(
            join_command_line(&args(&["a\\\"b"])),
            "\"a\\\\\\\"b\""
        );
    }

    #[test]
    fn test_screen_center() {
        let bounds = ScreenBounds::new(1920, 1080);
        assert_eq!(bounds.center(), Point::new(960, 540));
    }

    #[test]
    fn test_screen_contains() {
        let bounds = ScreenBounds::new(800, 600);
        assert!(bounds.contains(Point::new(0, 0)));
        assert!(bounds.contains(Point::new(799, 599)));
        assert!(!bounds.contains(Point::new(800, 10)));
        assert!(!bounds.contains(Point::new(-1, 10)));
    }

    #[test]
    fn test_point_display() {
        assert_eq!(Point::new(3, -4).to_string(), "(3, -4)");
    }
}
