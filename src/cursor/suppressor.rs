//! Cursor Suppression Loop
//!
//! Background task that runs for the duration of one lock. Each tick hides
//! the pointer if the OS reports it visible and moves it to the safe point
//! when it sits within the edge margin.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use super::edge::EdgeGuard;
use super::DEFAULT_POLL_INTERVAL_MS;
use crate::platform::{PlatformError, PointerControl};
use crate::session::LockState;

/// Suppression loop configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SuppressorConfig {
    /// Time between ticks
    pub interval: Duration,
    /// Edge geometry
    pub guard: EdgeGuard,
    /// Hide the pointer whenever it becomes visible
    pub hide_cursor: bool,
}

impl Default for SuppressorConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            guard: EdgeGuard::default(),
            hide_cursor: true,
        }
    }
}

/// Counters reported when the loop exits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SuppressionStats {
    /// Ticks executed while locked
    pub ticks: u64,
    /// Times the pointer was found visible and hidden again
    pub hides: u64,
    /// Times the pointer was moved away from an edge
    pub relocations: u64,
    /// OS calls that failed (logged and skipped)
    pub errors: u64,
}

/// Periodic pointer corrector
pub struct CursorSuppressor {
    pointer: Arc<dyn PointerControl>,
    config: SuppressorConfig,
}

impl CursorSuppressor {
    /// Create a suppressor over `pointer`
    pub fn new(pointer: Arc<dyn PointerControl>, config: SuppressorConfig) -> Self {
        Self { pointer, config }
    }

    /// Active configuration
    pub fn config(&self) -> &SuppressorConfig {
        &self.config
    }

    /// Run one correction pass
    pub fn tick(&self, stats: &mut SuppressionStats) {
        stats.ticks += 1;

        if self.config.hide_cursor {
            match self.pointer.is_cursor_visible() {
                Ok(true) => match self.pointer.hide_cursor() {
                    Ok(counter) => {
                        stats.hides += 1;
                        trace!("Re-hid visible cursor (counter={})", counter);
                    }
                    Err(e) => record_error(stats, "hide cursor", &e),
                },
                Ok(false) => {}
                Err(e) => record_error(stats, "query cursor visibility", &e),
            }
        }

        let bounds = match self.pointer.screen_bounds() {
            Ok(bounds) => bounds,
            Err(e) => return record_error(stats, "query screen size", &e),
        };
        let position = match self.pointer.cursor_position() {
            Ok(position) => position,
            Err(e) => return record_error(stats, "query cursor position", &e),
        };

        if !self.config.guard.fits(bounds) {
            debug!(
                "Screen {}x{} too small for edge margin; skipping relocation",
                bounds.width, bounds.height
            );
            return;
        }

        if let Some(target) = self.config.guard.correction(position, bounds) {
            match self.pointer.set_cursor_position(target) {
                Ok(()) => {
                    stats.relocations += 1;
                    trace!("Pulled cursor from {} to {}", position, target);
                }
                Err(e) => record_error(stats, "move cursor", &e),
            }
        }
    }

    /// Run until `token` is cancelled or `state` is unlocked
    ///
    /// The first pass runs immediately, later passes every `interval`.
    pub async fn run(self, state: LockState, token: CancellationToken) -> SuppressionStats {
        let mut stats = SuppressionStats::default();
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        debug!(
            "Cursor suppression started (interval={:?}, margin={}px)",
            self.config.interval,
            self.config.guard.margin()
        );

        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = ticker.tick() => {}
            }
            if !state.is_locked() {
                break;
            }
            self.tick(&mut stats);
        }

        info!(
            "Cursor suppression stopped: {} ticks, {} hides, {} relocations, {} errors",
            stats.ticks, stats.hides, stats.relocations, stats.errors
        );
        stats
    }

    /// Spawn [`run`](Self::run) on the current runtime
    pub fn spawn(self, state: LockState, token: CancellationToken) -> SuppressionHandle {
        let task = tokio::spawn(self.run(state, token.clone()));
        SuppressionHandle { task, token }
    }
}

fn record_error(stats: &mut SuppressionStats, action: &str, error: &PlatformError) {
    stats.errors += 1;
    warn!("Failed to {}: {}", action, error);
}

/// Handle to a running suppression task
#[derive(Debug)]
pub struct SuppressionHandle {
    task: JoinHandle<SuppressionStats>,
    token: CancellationToken,
}

impl SuppressionHandle {
    /// Request the loop to stop
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Cancel and wait up to `timeout` for the loop to exit
    ///
    /// Returns None when the task overran the timeout (it is aborted) or
    /// panicked.
    pub async fn stop(self, timeout: Duration) -> Option<SuppressionStats> {
        self.token.cancel();
        let abort = self.task.abort_handle();
        match tokio::time::timeout(timeout, self.task).await {
            Ok(Ok(stats)) => Some(stats),
            Ok(Err(e)) => {
                warn!("Cursor suppression task failed: {}", e);
                None
            }
            Err(_) => {
                warn!("Cursor suppression task did not stop within {:?}; aborting", timeout);
                abort.abort();
                None
            }
        }
    }
}
