//! Simulated Desktop
//!
//! In-memory stand-in for the OS pointer, overlay, keyboard and brightness
//! APIs. Used on platforms without a native backend and by the test suite.
//!
//! The pointer follows the OS counter semantics: the counter starts at 0,
//! the cursor is visible while it is non-negative, and each hide/show call
//! moves it by one.

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use super::{KeyboardInterceptor, Overlay, Point, PointerControl, PlatformError, Result, ScreenBounds};
use crate::brightness::{BrightnessControl, BrightnessError};
use crate::input::KeyFilter;

/// Observable state of the simulated desktop
#[derive(Debug, Clone)]
pub struct DesktopState {
    /// Cursor display counter (negative = hidden)
    pub display_counter: i32,
    /// Pointer position
    pub position: Point,
    /// Screen size
    pub bounds: ScreenBounds,
    /// Overlay currently shown
    pub overlay_visible: bool,
    /// Last hint drawn on the overlay
    pub overlay_hint: Option<String>,
    /// Keyboard currently blocked
    pub keyboard_blocking: bool,
    /// Number of modifier reset requests
    pub modifier_resets: u32,
    /// Number of successful `set_cursor_position` calls
    pub relocations: u32,
    /// Remaining pointer queries that should fail
    pub failing_queries: u32,
}

/// In-memory desktop implementing the pointer, overlay and keyboard seams
#[derive(Clone)]
pub struct SimulatedDesktop {
    state: Arc<Mutex<DesktopState>>,
    filter: Option<Arc<KeyFilter>>,
}

impl SimulatedDesktop {
    /// Create a desktop with the pointer at the screen center
    pub fn new(bounds: ScreenBounds) -> Self {
        Self {
            state: Arc::new(Mutex::new(DesktopState {
                display_counter: 0,
                position: bounds.center(),
                bounds,
                overlay_visible: false,
                overlay_hint: None,
                keyboard_blocking: false,
                modifier_resets: 0,
                relocations: 0,
                failing_queries: 0,
            })),
            filter: None,
        }
    }

    /// Forward keyboard blocking to a key filter
    pub fn with_filter(mut self, filter: Arc<KeyFilter>) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Snapshot of the current state
    pub fn snapshot(&self) -> DesktopState {
        self.state.lock().clone()
    }

    /// Move the pointer as if the user did
    pub fn move_pointer(&self, position: Point) {
        self.state.lock().position = position;
    }

    /// Raise the display counter as a focus change or redraw would
    pub fn reveal_cursor(&self) {
        let mut state = self.state.lock();
        if state.display_counter < 0 {
            state.display_counter = 0;
        }
    }

    /// Change the screen size
    pub fn resize(&self, bounds: ScreenBounds) {
        self.state.lock().bounds = bounds;
    }

    /// Make the next `count` pointer queries fail
    pub fn fail_next_queries(&self, count: u32) {
        self.state.lock().failing_queries = count;
    }

    fn take_failure(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.failing_queries > 0 {
            state.failing_queries -= 1;
            return Err(PlatformError::CursorQuery("simulated failure".to_string()));
        }
        Ok(())
    }
}

impl PointerControl for SimulatedDesktop {
    fn is_cursor_visible(&self) -> Result<bool> {
        self.take_failure()?;
        Ok(self.state.lock().display_counter >= 0)
    }

    fn hide_cursor(&self) -> Result<i32> {
        let mut state = self.state.lock();
        state.display_counter -= 1;
        Ok(state.display_counter)
    }

    fn show_cursor(&self) -> Result<i32> {
        let mut state = self.state.lock();
        state.display_counter += 1;
        Ok(state.display_counter)
    }

    fn cursor_position(&self) -> Result<Point> {
        self.take_failure()?;
        Ok(self.state.lock().position)
    }

    fn set_cursor_position(&self, position: Point) -> Result<()> {
        let mut state = self.state.lock();
        state.position = position;
        state.relocations += 1;
        Ok(())
    }

    fn screen_bounds(&self) -> Result<ScreenBounds> {
        Ok(self.state.lock().bounds)
    }
}

impl Overlay for SimulatedDesktop {
    fn show(&self, hint: &str) -> Result<()> {
        debug!("Simulated overlay shown: {:?}", hint);
        let mut state = self.state.lock();
        state.overlay_visible = true;
        state.overlay_hint = Some(hint.to_string());
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        debug!("Simulated overlay hidden");
        self.state.lock().overlay_visible = false;
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.state.lock().overlay_visible
    }
}

impl KeyboardInterceptor for SimulatedDesktop {
    fn set_blocking(&self, blocking: bool) -> Result<()> {
        self.state.lock().keyboard_blocking = blocking;
        if let Some(filter) = &self.filter {
            filter.set_blocking(blocking);
        }
        Ok(())
    }

    fn release_modifiers(&self) -> Result<()> {
        self.state.lock().modifier_resets += 1;
        if let Some(filter) = &self.filter {
            filter.reset_modifiers();
        }
        Ok(())
    }
}

/// In-memory brightness control
#[derive(Clone)]
pub struct SimulatedBrightness {
    level: Arc<Mutex<u8>>,
    readable: Arc<Mutex<bool>>,
}

impl SimulatedBrightness {
    /// Create with an initial level (0-100)
    pub fn new(level: u8) -> Self {
        Self {
            level: Arc::new(Mutex::new(level.min(100))),
            readable: Arc::new(Mutex::new(true)),
        }
    }

    /// Current level
    pub fn level(&self) -> u8 {
        *self.level.lock()
    }

    /// Make `current()` fail, as an unresponsive WMI provider would
    pub fn set_readable(&self, readable: bool) {
        *self.readable.lock() = readable;
    }
}

impl BrightnessControl for SimulatedBrightness {
    fn current(&self) -> std::result::Result<u8, BrightnessError> {
        if !*self.readable.lock() {
            return Err(BrightnessError::Query("simulated provider unreadable".to_string()));
        }
        Ok(*self.level.lock())
    }

    fn set(&self, level: u8) -> std::result::Result<(), BrightnessError> {
        *self.level.lock() = level.min(100);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_counter_semantics() {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(800, 600));
        assert!(desktop.is_cursor_visible().unwrap());
        assert_eq!(desktop.hide_cursor().unwrap(), -1);
        assert!(!desktop.is_cursor_visible().unwrap());
        assert_eq!(desktop.show_cursor().unwrap(), 0);
        assert!(desktop.is_cursor_visible().unwrap());
    }

    #[test]
    fn test_reveal_resets_counter() {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(800, 600));
        desktop.hide_cursor().unwrap();
        desktop.hide_cursor().unwrap();
        desktop.reveal_cursor();
        assert_eq!(desktop.snapshot().display_counter, 0);
    }

    #[test]
    fn test_scripted_failures() {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(800, 600));
        desktop.fail_next_queries(2);
        assert!(desktop.cursor_position().is_err());
        assert!(desktop.is_cursor_visible().is_err());
        assert_eq!(desktop.cursor_position().unwrap(), Point::new(400, 300));
    }

    #[test]
    fn test_overlay_records_hint() {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(800, 600));
        desktop.show("Press CTRL+ALT+U to unlock").unwrap();
        let state = desktop.snapshot();
        assert!(state.overlay_visible);
        assert_eq!(state.overlay_hint.as_deref(), Some("Press CTRL+ALT+U to unlock"));
        desktop.hide().unwrap();
        assert!(!desktop.is_visible());
    }

    #[test]
    fn test_brightness_clamps() {
        let brightness = SimulatedBrightness::new(150);
        assert_eq!(brightness.level(), 100);
        brightness.set(30).unwrap();
        assert_eq!(brightness.current().unwrap(), 30);
        brightness.set_readable(false);
        assert!(brightness.current().is_err());
    }
}
