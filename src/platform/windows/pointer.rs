//! Win32 pointer access
//!
//! `ShowCursor` adjusts a display counter that belongs to the calling
//! thread's input state. Tokio tasks hop between workers, so hide and show
//! are forwarded to the UI thread that owns the overlay window; the counter
//! they return is always that thread's. Position and screen queries are
//! global and run on the caller.

use std::sync::Arc;

use windows::Win32::Foundation::POINT;
use windows::Win32::UI::WindowsAndMessaging::{
    GetCursorInfo, GetCursorPos, GetSystemMetrics, SetCursorPos, CURSORINFO, CURSOR_SHOWING,
    SM_CXSCREEN, SM_CYSCREEN,
};

use super::ui_thread::UiThread;
use crate::platform::{Point, PlatformError, PointerControl, Result, ScreenBounds};

/// Pointer control through user32
pub struct WindowsPointer {
    ui: Arc<UiThread>,
}

impl WindowsPointer {
    /// Create a pointer handle bound to the UI thread
    pub fn new(ui: Arc<UiThread>) -> Self {
        Self { ui }
    }
}

impl PointerControl for WindowsPointer {
    fn is_cursor_visible(&self) -> Result<bool> {
        let mut info = CURSORINFO {
            cbSize: std::mem::size_of::<CURSORINFO>() as u32,
            ..Default::default()
        };
        // SAFETY: `info` is a properly sized, writable CURSORINFO
        unsafe { GetCursorInfo(&mut info) }
            .map_err(|e| PlatformError::CursorQuery(e.to_string()))?;
        Ok(info.flags.0 & CURSOR_SHOWING.0 != 0)
    }

    fn hide_cursor(&self) -> Result<i32> {
        self.ui.hide_cursor()
    }

    fn show_cursor(&self) -> Result<i32> {
        self.ui.show_cursor()
    }

    fn cursor_position(&self) -> Result<Point> {
        let mut pos = POINT::default();
        // SAFETY: `pos` is a writable POINT
        unsafe { GetCursorPos(&mut pos) }
            .map_err(|e| PlatformError::CursorQuery(e.to_string()))?;
        Ok(Point::new(pos.x, pos.y))
    }

    fn set_cursor_position(&self, position: Point) -> Result<()> {
        // SAFETY: no pointers involved
        unsafe { SetCursorPos(position.x, position.y) }
            .map_err(|e| PlatformError::CursorUpdate(e.to_string()))
    }

    fn screen_bounds(&self) -> Result<ScreenBounds> {
        // SAFETY: no pointers involved
        let (width, height) = unsafe { (GetSystemMetrics(SM_CXSCREEN), GetSystemMetrics(SM_CYSCREEN)) };
        if width <= 0 || height <= 0 {
            return Err(PlatformError::ScreenMetrics(format!(
                "GetSystemMetrics returned {}x{}",
                width, height
            )));
        }
        Ok(ScreenBounds::new(width, height))
    }
}
