//! Monitor brightness around a lock session
//!
//! Locking dims the display to the configured level and unlocking puts the
//! previous level back. The OS provider is slow (hundreds of milliseconds
//! for a WMI round trip) so every call runs on the blocking pool.
//!
//! ```text
//! lock   ──> current() ──> saved = level ──> set(locked_level)
//! unlock ──> set(saved) ──> saved = None
//! ```
//!
//! A level that cannot be read is treated as the fallback level, so a dim
//! is still followed by a sensible restore.

pub mod error;
pub mod wmi;

use std::sync::Arc;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

pub use error::{BrightnessError, Result};
pub use wmi::WmiBrightness;

/// Default level applied while locked
pub const DEFAULT_LOCKED_LEVEL: u8 = 0;

/// Default level assumed when the current one cannot be read
pub const DEFAULT_FALLBACK_LEVEL: u8 = 50;

/// Display brightness provider (levels are percentages, 0-100)
#[cfg_attr(test, mockall::automock)]
pub trait BrightnessControl: Send + Sync {
    /// Read the current level
    fn current(&self) -> Result<u8>;

    /// Apply a level
    fn set(&self, level: u8) -> Result<()>;
}

/// Saves, dims and restores brightness for one lock at a time
pub struct BrightnessManager {
    control: Arc<dyn BrightnessControl>,
    fallback_level: u8,
    saved: Mutex<Option<u8>>,
}

impl BrightnessManager {
    /// Create a manager over `control`
    pub fn new(control: Arc<dyn BrightnessControl>, fallback_level: u8) -> Self {
        Self {
            control,
            fallback_level: fallback_level.min(100),
            saved: Mutex::new(None),
        }
    }

    /// Level captured by the last `dim`, if not yet restored
    pub fn saved_level(&self) -> Option<u8> {
        *self.saved.lock()
    }

    /// Save the current level, then apply `level`
    ///
    /// Returns the saved level. A second `dim` before `restore` keeps the
    /// level saved by the first one.
    pub async fn dim(&self, level: u8) -> Result<u8> {
        let level = level.min(100);

        let saved = match self.saved_level() {
            Some(saved) => saved,
            None => {
                let control = self.control.clone();
                let read = tokio::task::spawn_blocking(move || control.current())
                    .await
                    .map_err(|e| BrightnessError::Task(e.to_string()))?;
                let saved = match read {
                    Ok(current) => current,
                    Err(e) => {
                        warn!(
                            "Could not read brightness ({}); assuming {}%",
                            e, self.fallback_level
                        );
                        self.fallback_level
                    }
                };
                *self.saved.lock() = Some(saved);
                saved
            }
        };
        debug!("Saved brightness: {}%", saved);

        self.apply(level).await?;
        info!("Brightness dimmed {}% -> {}%", saved, level);
        Ok(saved)
    }

    /// Put back the saved level
    ///
    /// Returns `Ok(false)` when nothing was saved. The saved level is kept if
    /// applying it fails so a later call can retry.
    pub async fn restore(&self) -> Result<bool> {
        let Some(saved) = self.saved_level() else {
            debug!("No saved brightness to restore");
            return Ok(false);
        };

        self.apply(saved).await?;
        *self.saved.lock() = None;
        info!("Brightness restored to {}%", saved);
        Ok(true)
    }

    async fn apply(&self, level: u8) -> Result<()> {
        let control = self.control.clone();
        tokio::task::spawn_blocking(move || control.set(level))
            .await
            .map_err(|e| BrightnessError::Task(e.to_string()))?
    }
}

impl std::fmt::Debug for BrightnessManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrightnessManager")
            .field("fallback_level", &self.fallback_level)
            .field("saved", &self.saved_level())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[tokio::test]
    async fn test_dim_then_restore() {
        let mut mock = MockBrightnessControl::new();
        let mut seq = Sequence::new();
        mock.expect_current()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(80));
        mock.expect_set()
            .with(eq(0))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        mock.expect_set()
            .with(eq(80))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let manager = BrightnessManager::new(Arc::new(mock), DEFAULT_FALLBACK_LEVEL);
        assert_eq!(manager.dim(0).await.unwrap(), 80);
        assert_eq!(manager.saved_level(), Some(80));
        assert!(manager.restore().await.unwrap());
        assert_eq!(manager.saved_level(), None);
    }

    #[tokio::test]
    async fn test_unreadable_level_uses_fallback() {
        let mut mock = MockBrightnessControl::new();
        mock.expect_current()
            .returning(|| Err(BrightnessError::Query("no provider".into())));
        mock.expect_set().with(eq(10)).times(1).returning(|_| Ok(()));
        mock.expect_set().with(eq(50)).times(1).returning(|_| Ok(()));

        let manager = BrightnessManager::new(Arc::new(mock), 50);
        assert_eq!(manager.dim(10).await.unwrap(), 50);
        assert!(manager.restore().await.unwrap());
    }

    #[tokio::test]
    async fn test_restore_without_dim() {
        let mut mock = MockBrightnessControl::new();
        mock.expect_set().never();

        let manager = BrightnessManager::new(Arc::new(mock), 50);
        assert!(!manager.restore().await.unwrap());
    }

    #[tokio::test]
    async fn test_second_dim_keeps_first_saved_level() {
        let mut mock = MockBrightnessControl::new();
        mock.expect_current().times(1).returning(|| Ok(65));
        mock.expect_set().returning(|_| Ok(()));

        let manager = BrightnessManager::new(Arc::new(mock), 50);
        manager.dim(0).await.unwrap();
        assert_eq!(manager.dim(0).await.unwrap(), 65);
    }

    #[tokio::test]
    async fn test_failed_restore_keeps_saved_level() {
        let mut mock = MockBrightnessControl::new();
        mock.expect_current().returning(|| Ok(40));
        mock.expect_set().with(eq(0)).returning(|_| Ok(()));
        mock.expect_set().with(eq(40)).returning(|level| {
            Err(BrightnessError::Set {
                level,
                reason: "provider busy".into(),
            })
        });

        let manager = BrightnessManager::new(Arc::new(mock), 50);
        manager.dim(0).await.unwrap();
        assert!(manager.restore().await.is_err());
        assert_eq!(manager.saved_level(), Some(40));
    }

    #[tokio::test]
    async fn test_dim_level_clamped() {
        let mut mock = MockBrightnessControl::new();
        mock.expect_current().returning(|| Ok(30));
        mock.expect_set().with(eq(100)).times(1).returning(|_| Ok(()));

        let manager = BrightnessManager::new(Arc::new(mock), 50);
        manager.dim(250).await.unwrap();
    }
}
