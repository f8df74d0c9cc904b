//! Native Win32 backend
//!
//! | Seam | Implementation |
//! |------|----------------|
//! | pointer | `GetCursorInfo`, `GetCursorPos`/`SetCursorPos`, `GetSystemMetrics`; `ShowCursor` on the UI thread |
//! | overlay | top-most `WS_POPUP` window owned by the UI thread |
//! | keyboard | `WH_KEYBOARD_LL` hook on the UI thread, `SendInput` for modifier release |
//! | brightness | [`WmiBrightness`] when a provider answers the startup probe |
//!
//! Hooks and windows belong to the thread that created them, and low-level
//! hook callbacks are only delivered while that thread pumps messages. All
//! of that lives on one dedicated `std::thread` (see [`ui_thread`]).

#![allow(unsafe_code)]

mod keyboard;
mod pointer;
pub mod system;
mod ui_thread;

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;
use tracing::info;

use super::{Backend, Result};
use crate::brightness::{BrightnessControl, WmiBrightness};
use crate::input::{HotkeyAction, KeyFilter};

pub use keyboard::WindowsKeyboard;
pub use pointer::WindowsPointer;
pub use ui_thread::{UiThread, WindowsOverlay};

/// Start the UI thread and assemble the Win32 backend
pub fn create_backend(
    filter: Arc<KeyFilter>,
    events: UnboundedSender<HotkeyAction>,
) -> Result<Backend> {
    let ui = Arc::new(UiThread::spawn(filter.clone(), events)?);

    let brightness = match WmiBrightness::probe() {
        Ok(provider) => Some(Arc::new(provider) as Arc<dyn BrightnessControl>),
        Err(e) => {
            info!("{}", e);
            None
        }
    };

    Ok(Backend {
        name: "win32",
        pointer: Arc::new(WindowsPointer::new(ui.clone())),
        overlay: Arc::new(WindowsOverlay::new(ui.clone())),
        keyboard: Arc::new(WindowsKeyboard::new(filter, ui)),
        brightness,
    })
}

/// Encode a string as a NUL-terminated UTF-16 buffer
pub(crate) fn wide(s: &str) -> Vec<u16> {
    s.encode_utf16().chain(std::iter::once(0)).collect()
}
