//! Lock-Time Key Filter
//!
//! Decides the fate of every key event seen by the global keyboard hook.
//!
//! ```text
//!                 ┌──────────── unlocked ────────────┐
//! key event ──>   │ lock combo    → Trigger(Lock)    │
//!                 │ quit combo    → Trigger(Quit)    │
//!                 │ anything else → Pass             │
//!                 ├───────────── blocking ───────────┤
//!                 │ unlock combo  → Trigger(Unlock)  │
//!                 │ anything else → Suppress         │
//!                 └──────────────────────────────────┘
//! ```
//!
//! Injected events (those the application synthesizes itself) always pass.
//! Modifier state is tracked from the event stream, including events that
//! get suppressed, so a combo held across the lock transition still matches.
//!
//! The filter runs inside the hook callback, so every path is lock-light and
//! never blocks on I/O.

use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use super::hotkey::{vk, HotkeyAction, HotkeyBindings, Modifiers};

/// One keyboard event as reported by the hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    /// Virtual-key code
    pub code: u16,
    /// Key pressed (true) or released (false)
    pub down: bool,
    /// Synthesized by software rather than typed
    pub injected: bool,
}

impl KeyEvent {
    /// Physical key press
    pub fn down(code: u16) -> Self {
        Self {
            code,
            down: true,
            injected: false,
        }
    }

    /// Physical key release
    pub fn up(code: u16) -> Self {
        Self {
            code,
            down: false,
            injected: false,
        }
    }
}

/// What the hook should do with an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterDecision {
    /// Let the event through to the system
    Pass,
    /// Swallow the event
    Suppress,
    /// Swallow the event and fire an action
    Trigger(HotkeyAction),
}

impl FilterDecision {
    /// Whether the event must be swallowed
    pub fn suppresses(&self) -> bool {
        !matches!(self, FilterDecision::Pass)
    }
}

/// Keyboard event filter shared between the hook and the lock session
pub struct KeyFilter {
    bindings: RwLock<HotkeyBindings>,
    modifiers: Mutex<Modifiers>,
    blocking: AtomicBool,
}

impl KeyFilter {
    /// Create a filter with the given bindings, not blocking
    pub fn new(bindings: HotkeyBindings) -> Self {
        Self {
            bindings: RwLock::new(bindings),
            modifiers: Mutex::new(Modifiers::NONE),
            blocking: AtomicBool::new(false),
        }
    }

    /// Replace the active bindings
    pub fn set_bindings(&self, bindings: HotkeyBindings) {
        debug!(
            "Hotkeys: lock={}, unlock={}, quit={}",
            bindings.lock,
            bindings.unlock,
            bindings
                .quit
                .map(|q| q.to_string())
                .unwrap_or_else(|| "none".to_string())
        );
        *self.bindings.write() = bindings;
    }

    /// Current bindings
    pub fn bindings(&self) -> HotkeyBindings {
        self.bindings.read().clone()
    }

    /// Enter or leave blocking mode
    pub fn set_blocking(&self, blocking: bool) {
        self.blocking.store(blocking, Ordering::SeqCst);
    }

    /// Whether all input is currently swallowed
    pub fn is_blocking(&self) -> bool {
        self.blocking.load(Ordering::SeqCst)
    }

    /// Forget tracked modifier state
    pub fn reset_modifiers(&self) {
        *self.modifiers.lock() = Modifiers::NONE;
    }

    /// Tracked modifier state
    pub fn modifiers(&self) -> Modifiers {
        *self.modifiers.lock()
    }

    /// Classify one event
    pub fn on_event(&self, event: &KeyEvent) -> FilterDecision {
        if event.injected {
            return FilterDecision::Pass;
        }

        let modifiers = {
            let mut modifiers = self.modifiers.lock();
            if track_modifier(&mut modifiers, event) {
                let blocking = self.is_blocking();
                trace!("Modifier change: {:?} (blocking={})", *modifiers, blocking);
                return if blocking {
                    FilterDecision::Suppress
                } else {
                    FilterDecision::Pass
                };
            }
            *modifiers
        };

        if self.is_blocking() {
            if event.down && self.bindings.read().unlock.matches(event.code, modifiers) {
                debug!("Unlock hotkey pressed");
                return FilterDecision::Trigger(HotkeyAction::Unlock);
            }
            return FilterDecision::Suppress;
        }

        if event.down {
            let bindings = self.bindings.read();
            if bindings.lock.matches(event.code, modifiers) {
                debug!("Lock hotkey pressed");
                return FilterDecision::Trigger(HotkeyAction::Lock);
            }
            if bindings
                .quit
                .is_some_and(|quit| quit.matches(event.code, modifiers))
            {
                debug!("Quit hotkey pressed");
                return FilterDecision::Trigger(HotkeyAction::Quit);
            }
        }

        FilterDecision::Pass
    }
}

/// Update modifier state, returning true if the event was a modifier key
fn track_modifier(modifiers: &mut Modifiers, event: &KeyEvent) -> bool {
    match event.code {
        vk::CONTROL | vk::LCONTROL | vk::RCONTROL => modifiers.ctrl = event.down,
        vk::MENU | vk::LMENU | vk::RMENU => modifiers.alt = event.down,
        vk::SHIFT | vk::LSHIFT | vk::RSHIFT => modifiers.shift = event.down,
        vk::LWIN | vk::RWIN => {}
        _ => return false,
    }
    true
}
