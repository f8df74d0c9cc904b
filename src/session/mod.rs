//! Lock Session
//!
//! A lock session is the span between a lock and the matching unlock. It
//! owns one cursor suppression task and the saved brightness level.
//!
//! # Architecture
//!
//! ```text
//! LockController::lock()
//!   ├─> LockState = locked
//!   ├─> BrightnessManager::dim()
//!   ├─> force_hidden(pointer)
//!   ├─> Overlay::show(hint)
//!   ├─> KeyboardInterceptor::set_blocking(true)
//!   └─> CursorSuppressor::spawn(LockState, CancellationToken)
//!
//! LockController::unlock()
//!   ├─> LockState = unlocked, cancel + join suppressor
//!   ├─> force_visible(pointer)
//!   ├─> BrightnessManager::restore()
//!   ├─> KeyboardInterceptor::set_blocking(false)
//!   ├─> KeyboardInterceptor::release_modifiers()
//!   └─> Overlay::hide()
//! ```
//!
//! Transitions are serialized: a lock that races an unlock waits for it to
//! finish before looking at the flag.

mod controller;
mod state;

pub use controller::LockController;
pub use state::LockState;
