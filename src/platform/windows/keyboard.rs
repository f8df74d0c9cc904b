//! Win32 keyboard interception
//!
//! The low-level hook is installed once at startup and consults the shared
//! [`KeyFilter`]; blocking is just a flag on that filter.

use std::sync::Arc;

use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYEVENTF_KEYUP, VIRTUAL_KEY,
    VK_CONTROL, VK_LCONTROL, VK_LMENU, VK_MENU, VK_RCONTROL, VK_RMENU,
};

use super::ui_thread::UiThread;
use crate::input::KeyFilter;
use crate::platform::{KeyboardInterceptor, PlatformError, Result};

/// Modifiers whose key-up events may have been swallowed during a lock
const STUCK_MODIFIERS: [VIRTUAL_KEY; 6] = [
    VK_CONTROL,
    VK_LCONTROL,
    VK_RCONTROL,
    VK_MENU,
    VK_LMENU,
    VK_RMENU,
];

/// Keyboard control through the UI thread's hook
pub struct WindowsKeyboard {
    filter: Arc<KeyFilter>,
    // Keeps the hook thread alive
    _ui: Arc<UiThread>,
}

impl WindowsKeyboard {
    /// Create a handle over the shared filter
    pub fn new(filter: Arc<KeyFilter>, ui: Arc<UiThread>) -> Self {
        Self { filter, _ui: ui }
    }
}

impl KeyboardInterceptor for WindowsKeyboard {
    fn set_blocking(&self, blocking: bool) -> Result<()> {
        self.filter.set_blocking(blocking);
        debug!("Keyboard blocking {}", if blocking { "on" } else { "off" });
        Ok(())
    }

    fn release_modifiers(&self) -> Result<()> {
        self.filter.reset_modifiers();

        let inputs: Vec<INPUT> = STUCK_MODIFIERS
            .iter()
            .map(|&vk| INPUT {
                r#type: INPUT_KEYBOARD,
                Anonymous: INPUT_0 {
                    ki: KEYBDINPUT {
                        wVk: vk,
                        wScan: 0,
                        dwFlags: KEYEVENTF_KEYUP,
                        time: 0,
                        dwExtraInfo: 0,
                    },
                },
            })
            .collect();

        // SAFETY: `inputs` is a valid slice of INPUT and cbsize matches
        let sent = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };
        if sent as usize != inputs.len() {
            return Err(PlatformError::Hook(format!(
                "SendInput injected {} of {} modifier releases",
                sent,
                inputs.len()
            )));
        }
        debug!("Released Ctrl/Alt modifiers");
        Ok(())
    }
}
