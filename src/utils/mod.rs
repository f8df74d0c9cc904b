//! Utility Functions and Diagnostics
//!
//! System diagnostics and user-friendly error formatting.
//!
//! ## Diagnostics
//!
//! The [`diagnostics`] module logs the runtime environment at startup:
//!
//! ```rust
//! use fake_lock_screen::utils::SystemInfo;
//!
//! let sys_info = SystemInfo::gather();
//! sys_info.log();  // Logs: OS, kernel, CPU count, memory
//! ```
//!
//! ## Error Formatting
//!
//! The [`errors`] module turns fatal errors into messages with
//! troubleshooting hints:
//!
//! ```rust
//! use fake_lock_screen::utils::format_user_error;
//!
//! let error = anyhow::anyhow!("cursor.edge_margin must be between 5 and 20 (got 40)")
//!     .context("Invalid configuration");
//! eprintln!("{}", format_user_error(&error));
//! ```
//!
//! Error categories with context-aware help:
//! - Single instance → another copy is running
//! - Hotkey errors → accepted syntax, common mistakes
//! - Hook errors → antivirus, elevation
//! - Brightness errors → external monitors, disabling dimming
//! - Config errors → valid ranges, regenerating defaults

pub mod diagnostics;
pub mod errors;

pub use diagnostics::{count_same_name_processes, log_startup_diagnostics, SystemInfo};
pub use errors::format_user_error;
