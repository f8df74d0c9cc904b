//! Shared lock flag

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Cloneable handle to the process-wide "locked" flag
///
/// Every clone observes the same flag. The suppression loop polls it once
/// per tick, so a cleared flag stops the loop within one poll interval even
/// if its cancellation token is never fired.
#[derive(Debug, Clone, Default)]
pub struct LockState {
    locked: Arc<AtomicBool>,
}

impl LockState {
    /// Create an unlocked state
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the session is locked
    pub fn is_locked(&self) -> bool {
        self.locked.load(Ordering::SeqCst)
    }

    /// Set the flag; returns true if it was previously clear
    pub fn lock(&self) -> bool {
        !self.locked.swap(true, Ordering::SeqCst)
    }

    /// Clear the flag; returns true if it was previously set
    pub fn unlock(&self) -> bool {
        self.locked.swap(false, Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions_report_change() {
        let state = LockState::new();
        assert!(!state.is_locked());
        assert!(state.lock());
        assert!(!state.lock());
        assert!(state.is_locked());
        assert!(state.unlock());
        assert!(!state.unlock());
        assert!(!state.is_locked());
    }

    #[test]
    fn test_clones_share_flag() {
        let state = LockState::new();
        let observer = state.clone();
        state.lock();
        assert!(observer.is_locked());
        observer.unlock();
        assert!(!state.is_locked());
    }
}
