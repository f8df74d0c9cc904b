//! Cursor suppression against the simulated desktop

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use fake_lock_screen::brightness::{BrightnessControl, BrightnessError};
use fake_lock_screen::config::Config;
use fake_lock_screen::platform::{Backend, Point, ScreenBounds, SimulatedDesktop};
use fake_lock_screen::session::LockController;
use parking_lot::Mutex;

const INTERVAL: Duration = Duration::from_millis(10);

fn locked_desktop() -> (LockController, SimulatedDesktop) {
    let desktop = SimulatedDesktop::new(ScreenBounds::new(1920, 1080));
    let backend = Backend::simulated(desktop.clone(), None);
    let controller = LockController::new(backend, &Config::default()).unwrap();
    (controller, desktop)
}

#[tokio::test(start_paused = true)]
async fn test_pointer_at_edge_is_pulled_back_within_one_interval() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;

    for edge in [
        Point::new(0, 500),
        Point::new(1919, 500),
        Point::new(800, 3),
        Point::new(800, 1075),
    ] {
        desktop.move_pointer(edge);
        tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
        assert_eq!(desktop.snapshot().position, Point::new(960, 540), "from {:?}", edge);
    }

    controller.unlock().await;
}

#[tokio::test(start_paused = true)]
async fn test_interior_pointer_is_left_alone() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;

    desktop.move_pointer(Point::new(400, 300));
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(desktop.snapshot().position, Point::new(400, 300));

    controller.unlock().await;
}

#[tokio::test(start_paused = true)]
async fn test_revealed_cursor_is_hidden_again() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;

    desktop.reveal_cursor();
    assert!(desktop.snapshot().display_counter >= 0);
    tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
    assert!(desktop.snapshot().display_counter < 0);

    controller.unlock().await;
}

#[tokio::test(start_paused = true)]
async fn test_no_corrections_after_unlock() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;
    tokio::time::sleep(INTERVAL * 3).await;
    controller.unlock().await;

    tokio::time::sleep(INTERVAL).await;
    let relocations = desktop.snapshot().relocations;

    desktop.move_pointer(Point::new(1, 1));
    tokio::time::sleep(INTERVAL * 10).await;

    let state = desktop.snapshot();
    assert_eq!(state.position, Point::new(1, 1));
    assert_eq!(state.relocations, relocations);
}

#[tokio::test(start_paused = true)]
async fn test_cursor_visible_after_unlock() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;
    tokio::time::sleep(INTERVAL * 4).await;
    controller.unlock().await;

    assert!(desktop.snapshot().display_counter >= 0);
}

#[tokio::test(start_paused = true)]
async fn test_query_failures_do_not_stop_suppression() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;

    desktop.fail_next_queries(3);
    desktop.move_pointer(Point::new(2, 2));
    tokio::time::sleep(INTERVAL * 6).await;

    assert!(controller.is_locked());
    assert_eq!(desktop.snapshot().position, Point::new(960, 540));

    controller.unlock().await;
}

#[tokio::test(start_paused = true)]
async fn test_resolution_change_moves_safe_point() {
    let (controller, desktop) = locked_desktop();
    controller.lock().await;

    desktop.resize(ScreenBounds::new(1280, 720));
    desktop.move_pointer(Point::new(1279, 100));
    tokio::time::sleep(INTERVAL + Duration::from_millis(1)).await;
    assert_eq!(desktop.snapshot().position, Point::new(640, 360));

    controller.unlock().await;
}

/// Brightness provider whose `set` parks until released once armed,
/// standing in for a slow WMI round trip
struct GatedBrightness {
    level: Mutex<u8>,
    armed: AtomicBool,
    entered: Sender<u8>,
    release: Receiver<()>,
}

impl BrightnessControl for GatedBrightness {
    fn current(&self) -> Result<u8, BrightnessError> {
        Ok(*self.level.lock())
    }

    fn set(&self, level: u8) -> Result<(), BrightnessError> {
        if self.armed.load(Ordering::SeqCst) {
            let _ = self.entered.send(level);
            let _ = self.release.recv_timeout(Duration::from_secs(5));
        }
        *self.level.lock() = level;
        Ok(())
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_cursor_visible_while_brightness_restore_is_slow() {
    let (entered_tx, entered_rx) = crossbeam_channel::bounded(1);
    let (release_tx, release_rx) = crossbeam_channel::bounded(1);
    let brightness = Arc::new(GatedBrightness {
        level: Mutex::new(75),
        armed: AtomicBool::new(false),
        entered: entered_tx,
        release: release_rx,
    });

    let desktop = SimulatedDesktop::new(ScreenBounds::new(1920, 1080));
    let mut backend = Backend::simulated(desktop.clone(), None);
    backend.brightness = Some(brightness.clone() as Arc<dyn BrightnessControl>);
    let controller = Arc::new(LockController::new(backend, &Config::default()).unwrap());

    controller.lock().await;
    tokio::time::sleep(INTERVAL * 3).await;
    assert!(desktop.snapshot().display_counter < 0);

    brightness.armed.store(true, Ordering::SeqCst);
    let unlocking = tokio::spawn({
        let controller = controller.clone();
        async move { controller.unlock().await }
    });

    let restoring = tokio::task::spawn_blocking(move || entered_rx.recv_timeout(Duration::from_secs(5)))
        .await
        .unwrap()
        .expect("restore should start");
    assert_eq!(restoring, 75);

    // Restore is still parked: the pointer must already be back
    let state = desktop.snapshot();
    assert!(state.display_counter >= 0, "counter {}", state.display_counter);
    assert!(!unlocking.is_finished());

    release_tx.send(()).unwrap();
    assert!(unlocking.await.unwrap());
    assert_eq!(*brightness.level.lock(), 75);
}
