//! Lock / unlock orchestration
//!
//! Every step of a transition is best-effort: a failure is logged and the
//! sequence carries on, so a machine without brightness control (or with a
//! flaky cursor API) still locks and, more importantly, always unlocks.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::state::LockState;
use crate::brightness::BrightnessManager;
use crate::config::Config;
use crate::cursor::{self, CursorSuppressor, SuppressionHandle, SuppressorConfig};
use crate::error::Result;
use crate::platform::Backend;

/// Poll intervals to wait for the suppression loop on unlock
const STOP_TIMEOUT_INTERVALS: u32 = 10;

/// Drives a [`Backend`] through lock and unlock transitions
pub struct LockController {
    backend: Backend,
    state: LockState,
    brightness: Option<BrightnessManager>,
    locked_level: u8,
    suppressor: SuppressorConfig,
    hint: String,
    session: Mutex<Option<SuppressionHandle>>,
}

impl LockController {
    /// Create a controller from the effective configuration
    pub fn new(backend: Backend, config: &Config) -> Result<Self> {
        let bindings = config.hotkey_bindings()?;
        let hint = config.render_hint(&bindings.unlock);

        let brightness = match (&backend.brightness, config.brightness.enabled) {
            (Some(control), true) => Some(BrightnessManager::new(
                control.clone(),
                config.brightness.fallback_level,
            )),
            (None, true) => {
                info!("Brightness control unavailable; locking without dimming");
                None
            }
            (_, false) => None,
        };

        Ok(Self {
            backend,
            state: LockState::new(),
            brightness,
            locked_level: config.brightness.locked_level,
            suppressor: config.suppressor_config(),
            hint,
            session: Mutex::new(None),
        })
    }

    /// Shared lock flag
    pub fn state(&self) -> LockState {
        self.state.clone()
    }

    /// Whether the session is locked
    pub fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Text drawn on the overlay
    pub fn hint(&self) -> &str {
        &self.hint
    }

    /// Platform services in use
    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Engage the lock
    ///
    /// Returns false if already locked.
    pub async fn lock(&self) -> bool {
        let mut session = self.session.lock().await;
        if !self.state.lock() {
            debug!("Lock requested while already locked");
            return false;
        }
        info!("Locking screen");

        if let Some(brightness) = &self.brightness {
            if let Err(e) = brightness.dim(self.locked_level).await {
                warn!("Failed to dim display: {}", e);
            }
        }

        if self.suppressor.hide_cursor {
            if let Err(e) = cursor::force_hidden(self.backend.pointer.as_ref()) {
                warn!("Failed to hide cursor: {}", e);
            }
        }

        if let Err(e) = self.backend.overlay.show(&self.hint) {
            warn!("Failed to show lock overlay: {}", e);
        }

        if let Err(e) = self.backend.keyboard.set_blocking(true) {
            warn!("Failed to block keyboard: {}", e);
        }

        let suppressor = CursorSuppressor::new(self.backend.pointer.clone(), self.suppressor);
        *session = Some(suppressor.spawn(self.state.clone(), CancellationToken::new()));

        info!("Screen locked");
        true
    }

    /// Release the lock
    ///
    /// Returns false if not locked.
    pub async fn unlock(&self) -> bool {
        let mut session = self.session.lock().await;
        if !self.state.unlock() {
            debug!("Unlock requested while not locked");
            return false;
        }
        info!("Unlocking screen");

        if let Some(handle) = session.take() {
            let timeout = self.suppressor.interval * STOP_TIMEOUT_INTERVALS;
            if let Some(stats) = handle.stop(timeout).await {
                debug!(
                    "Suppression stats: ticks={}, hides={}, relocations={}, errors={}",
                    stats.ticks, stats.hides, stats.relocations, stats.errors
                );
            }
        }

        // Before the brightness restore, which may shell out for a while
        if let Err(e) = cursor::force_visible(self.backend.pointer.as_ref()) {
            warn!("Failed to show cursor: {}", e);
        }

        if let Some(brightness) = &self.brightness {
            if let Err(e) = brightness.restore().await {
                warn!("Failed to restore brightness: {}", e);
            }
        }

        if let Err(e) = self.backend.keyboard.set_blocking(false) {
            warn!("Failed to release keyboard: {}", e);
        }

        if let Err(e) = self.backend.keyboard.release_modifiers() {
            warn!("Failed to reset modifier keys: {}", e);
        }

        if let Err(e) = self.backend.overlay.hide() {
            warn!("Failed to hide lock overlay: {}", e);
        }

        info!("Screen unlocked");
        true
    }

    /// Toggle between locked and unlocked
    pub async fn toggle(&self) -> bool {
        if self.is_locked() {
            self.unlock().await
        } else {
            self.lock().await
        }
    }

    /// Poll interval used by the suppression loop
    pub fn poll_interval(&self) -> Duration {
        self.suppressor.interval
    }
}

impl std::fmt::Debug for LockController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockController")
            .field("backend", &self.backend)
            .field("locked", &self.is_locked())
            .field("hint", &self.hint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Point, ScreenBounds, SimulatedBrightness, SimulatedDesktop};

    fn controller(config: &Config) -> (LockController, SimulatedDesktop, SimulatedBrightness) {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(1920, 1080));
        let brightness = SimulatedBrightness::new(70);
        let backend = Backend::simulated(desktop.clone(), Some(brightness.clone()));
        (
            LockController::new(backend, config).unwrap(),
            desktop,
            brightness,
        )
    }

    #[tokio::test]
    async fn test_lock_engages_everything() {
        let (controller, desktop, brightness) = controller(&Config::default());

        assert!(controller.lock().await);
        let snapshot = desktop.snapshot();
        assert!(controller.is_locked());
        assert!(snapshot.overlay_visible);
        assert_eq!(
            snapshot.overlay_hint.as_deref(),
            Some("Press CTRL+ALT+U to unlock")
        );
        assert!(snapshot.keyboard_blocking);
        assert!(snapshot.display_counter < 0);
        assert_eq!(brightness.level(), 0);

        controller.unlock().await;
    }

    #[tokio::test]
    async fn test_unlock_restores_everything() {
        let (controller, desktop, brightness) = controller(&Config::default());

        controller.lock().await;
        assert!(controller.unlock().await);

        let snapshot = desktop.snapshot();
        assert!(!controller.is_locked());
        assert!(!snapshot.overlay_visible);
        assert!(!snapshot.keyboard_blocking);
        assert!(snapshot.display_counter >= 0);
        assert_eq!(snapshot.modifier_resets, 1);
        assert_eq!(brightness.level(), 70);
    }

    #[tokio::test]
    async fn test_cursor_shown_before_brightness_restore() {
        use crate::brightness::MockBrightnessControl;
        use mockall::predicate::eq;
        use parking_lot::Mutex;
        use std::sync::Arc;

        let desktop = SimulatedDesktop::new(ScreenBounds::new(1920, 1080));
        let counter_at_restore = Arc::new(Mutex::new(None));

        let mut mock = MockBrightnessControl::new();
        mock.expect_current().returning(|| Ok(60));
        mock.expect_set().with(eq(0)).returning(|_| Ok(()));
        let seen = counter_at_restore.clone();
        let observed = desktop.clone();
        mock.expect_set().with(eq(60)).times(1).returning(move |_| {
            *seen.lock() = Some(observed.snapshot().display_counter);
            Ok(())
        });

        let mut backend = Backend::simulated(desktop.clone(), None);
        backend.brightness = Some(Arc::new(mock));
        let controller = LockController::new(backend, &Config::default()).unwrap();

        controller.lock().await;
        assert!(desktop.snapshot().display_counter < 0);
        controller.unlock().await;

        let counter = counter_at_restore.lock().expect("brightness was restored");
        assert!(counter >= 0, "cursor still hidden during restore: {}", counter);
    }

    #[tokio::test]
    async fn test_lock_and_unlock_idempotent() {
        let (controller, desktop, _) = controller(&Config::default());

        assert!(!controller.unlock().await);
        assert!(controller.lock().await);
        assert!(!controller.lock().await);
        assert!(controller.unlock().await);
        assert!(!controller.unlock().await);
        assert_eq!(desktop.snapshot().modifier_resets, 1);
    }

    #[tokio::test]
    async fn test_lock_without_brightness_control() {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(1920, 1080));
        let backend = Backend::simulated(desktop.clone(), None);
        let controller = LockController::new(backend, &Config::default()).unwrap();

        assert!(controller.lock().await);
        assert!(desktop.snapshot().overlay_visible);
        assert!(controller.unlock().await);
    }

    #[tokio::test]
    async fn test_brightness_disabled_in_config() {
        let mut config = Config::default();
        config.brightness.enabled = false;
        let (controller, _, brightness) = controller(&config);

        controller.lock().await;
        assert_eq!(brightness.level(), 70);
        controller.unlock().await;
    }

    #[tokio::test]
    async fn test_unreadable_brightness_restores_fallback() {
        let (controller, _, brightness) = controller(&Config::default());
        brightness.set_readable(false);

        controller.lock().await;
        assert_eq!(brightness.level(), 0);
        controller.unlock().await;
        assert_eq!(brightness.level(), 50);
    }

    #[tokio::test]
    async fn test_toggle() {
        let (controller, desktop, _) = controller(&Config::default());
        desktop.move_pointer(Point::new(0, 0));

        assert!(controller.toggle().await);
        assert!(controller.is_locked());
        assert!(controller.toggle().await);
        assert!(!controller.is_locked());
    }

    #[test]
    fn test_invalid_hotkey_rejected() {
        let mut config = Config::default();
        config.hotkeys.unlock = "nonsense+key".to_string();
        let backend = Backend::simulated(SimulatedDesktop::new(ScreenBounds::new(800, 600)), None);
        assert!(LockController::new(backend, &config).is_err());
    }
}
