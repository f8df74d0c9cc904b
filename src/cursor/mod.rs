//! Cursor suppression while locked
//!
//! A hidden pointer still moves, and on most desktops a pointer resting
//! against an edge wakes hot corners, auto-hide task bars and edge swipes.
//! While the session is locked this module keeps the pointer hidden and
//! pulls it back from the edges on a fixed cadence.
//!
//! # Components
//!
//! | Component | Role |
//! |-----------|------|
//! | [`EdgeGuard`] | Pure geometry: is a position too close to an edge, where to move it |
//! | [`CursorSuppressor`] | Periodic task applying the guard through [`PointerControl`] |
//! | [`force_hidden`] / [`force_visible`] | Drive the OS display counter to a sign |
//!
//! # Loop
//!
//! ```text
//! every poll interval (default 10 ms)
//!   ├─> cancelled or LockState cleared? ──> exit with SuppressionStats
//!   ├─> pointer visible?          ──> hide_cursor()
//!   └─> pointer within margin?    ──> set_cursor_position(safe point)
//! ```
//!
//! Every OS failure inside the loop is logged and counted, never propagated.
//! The loop only ends on cancellation or when the lock flag clears.

mod edge;
mod suppressor;

pub use edge::{EdgeGuard, DEFAULT_EDGE_MARGIN, MAX_EDGE_MARGIN, MIN_EDGE_MARGIN};
pub use suppressor::{CursorSuppressor, SuppressionHandle, SuppressionStats, SuppressorConfig};

use tracing::{debug, warn};

use crate::platform::PointerControl;

/// Default suppression poll interval (ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 10;

/// Upper bound on hide/show calls when driving the display counter
///
/// Other components in the process may have pushed the counter far from
/// zero; past this many calls something is wrong and we stop trying.
pub const MAX_COUNTER_STEPS: usize = 64;

/// Call `hide_cursor` until the display counter is negative
///
/// Returns the final counter value.
pub fn force_hidden(pointer: &dyn PointerControl) -> crate::platform::Result<i32> {
    let mut counter = pointer.hide_cursor()?;
    let mut steps = 1;
    while counter >= 0 && steps < MAX_COUNTER_STEPS {
        counter = pointer.hide_cursor()?;
        steps += 1;
    }
    if counter >= 0 {
        warn!("Cursor still visible after {} hide calls (counter={})", steps, counter);
    } else {
        debug!("Cursor hidden (counter={})", counter);
    }
    Ok(counter)
}

/// Call `show_cursor` until the display counter is non-negative
///
/// Returns the final counter value.
pub fn force_visible(pointer: &dyn PointerControl) -> crate::platform::Result<i32> {
    let mut counter = pointer.show_cursor()?;
    let mut steps = 1;
    while counter < 0 && steps < MAX_COUNTER_STEPS {
        counter = pointer.show_cursor()?;
        steps += 1;
    }
    if counter < 0 {
        warn!("Cursor still hidden after {} show calls (counter={})", steps, counter);
    } else {
        debug!("Cursor shown (counter={})", counter);
    }
    Ok(counter)
}
