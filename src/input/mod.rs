//! Keyboard Input Handling
//!
//! Hotkey parsing and the filter that sits behind the global keyboard hook.
//!
//! # Architecture
//!
//! ```text
//! OS keyboard hook (UI thread)
//!       ↓ KeyEvent { code, down, injected }
//! ┌─────────────────────────┐
//! │  KeyFilter              │ ← modifier tracking
//! │  - blocking flag        │ ← set by LockController
//! │  - HotkeyBindings       │ ← from config
//! └─────────────────────────┘
//!       ↓ FilterDecision
//! Pass / Suppress / Trigger(HotkeyAction) ──> App event loop
//! ```
//!
//! # Usage Example
//!
//! ```rust
//! use fake_lock_screen::input::{
//!     FilterDecision, HotkeyAction, HotkeyBindings, KeyEvent, KeyFilter,
//! };
//!
//! let filter = KeyFilter::new(HotkeyBindings::default());
//! filter.set_blocking(true);
//!
//! // Ctrl + Alt + U
//! filter.on_event(&KeyEvent::down(0xA2));
//! filter.on_event(&KeyEvent::down(0xA4));
//! assert_eq!(
//!     filter.on_event(&KeyEvent::down(0x55)),
//!     FilterDecision::Trigger(HotkeyAction::Unlock)
//! );
//! ```

pub mod error;
pub mod filter;
pub mod hotkey;

pub use error::{HotkeyError, Result};
pub use filter::{FilterDecision, KeyEvent, KeyFilter};
pub use hotkey::{
    vk, Hotkey, HotkeyAction, HotkeyBindings, Key, Modifiers, DEFAULT_LOCK_HOTKEY,
    DEFAULT_UNLOCK_HOTKEY,
};
