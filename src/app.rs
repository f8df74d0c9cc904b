//! Application event loop
//!
//! Routes hotkey actions from the keyboard hook into the lock controller
//! until a quit is requested. Leaving the loop never leaves the machine
//! locked.

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{LockError, Result};
use crate::input::HotkeyAction;
use crate::session::LockController;

/// Hotkey-driven application loop
pub struct App {
    controller: Arc<LockController>,
    events: UnboundedReceiver<HotkeyAction>,
    shutdown: CancellationToken,
}

impl App {
    /// Create the loop over a controller and the hotkey event stream
    pub fn new(controller: Arc<LockController>, events: UnboundedReceiver<HotkeyAction>) -> Self {
        Self {
            controller,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    /// Token that stops [`run`](Self::run) when cancelled
    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Lock controller driven by this loop
    pub fn controller(&self) -> &Arc<LockController> {
        &self.controller
    }

    /// Process events until quit, Ctrl+C, or shutdown
    pub async fn run(mut self) -> Result<()> {
        info!("Waiting for hotkeys");

        let ctrl_c = self.shutdown.clone();
        let signal_task = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Ctrl+C received, shutting down");
                    ctrl_c.cancel();
                }
                Err(e) => warn!("Failed to listen for Ctrl+C: {}", e),
            }
        });

        let result = loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break Ok(()),
                event = self.events.recv() => match event {
                    Some(action) => {
                        if !self.handle(action).await {
                            break Ok(());
                        }
                    }
                    None => break Err(LockError::EventsClosed),
                },
            }
        };

        signal_task.abort();

        if self.controller.is_locked() {
            info!("Releasing lock before exit");
            self.controller.unlock().await;
        }

        result
    }

    /// Apply one action; returns false when the loop should stop
    pub async fn handle(&self, action: HotkeyAction) -> bool {
        debug!("Hotkey action: {}", action.name());
        match action {
            HotkeyAction::Lock => {
                self.controller.lock().await;
                true
            }
            HotkeyAction::Unlock => {
                self.controller.unlock().await;
                true
            }
            HotkeyAction::Quit => {
                info!("Quit hotkey pressed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::platform::{Backend, ScreenBounds, SimulatedDesktop};
    use tokio::sync::mpsc;

    fn app() -> (App, mpsc::UnboundedSender<HotkeyAction>, SimulatedDesktop) {
        let desktop = SimulatedDesktop::new(ScreenBounds::new(1280, 720));
        let backend = Backend::simulated(desktop.clone(), None);
        let controller = Arc::new(LockController::new(backend, &Config::default()).unwrap());
        let (tx, rx) = mpsc::unbounded_channel();
        (App::new(controller, rx), tx, desktop)
    }

    #[tokio::test]
    async fn test_quit_while_locked_unlocks() {
        let (app, tx, desktop) = app();
        let controller = app.controller().clone();

        tx.send(HotkeyAction::Lock).unwrap();
        tx.send(HotkeyAction::Quit).unwrap();
        app.run().await.unwrap();

        assert!(!controller.is_locked());
        assert!(!desktop.snapshot().overlay_visible);
    }

    #[tokio::test]
    async fn test_closed_channel_is_an_error() {
        let (app, tx, _) = app();
        drop(tx);
        assert!(matches!(app.run().await, Err(LockError::EventsClosed)));
    }

    #[tokio::test]
    async fn test_shutdown_token_stops_loop() {
        let (app, _tx, _) = app();
        app.shutdown_token().cancel();
        app.run().await.unwrap();
    }

    #[tokio::test]
    async fn test_handle_lock_unlock() {
        let (app, _tx, desktop) = app();
        assert!(app.handle(HotkeyAction::Lock).await);
        assert!(desktop.snapshot().keyboard_blocking);
        assert!(app.handle(HotkeyAction::Unlock).await);
        assert!(!desktop.snapshot().keyboard_blocking);
        assert!(!app.handle(HotkeyAction::Quit).await);
    }
}
