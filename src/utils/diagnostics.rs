//! System Diagnostics
//!
//! Startup information that makes bug reports useful: OS and hardware,
//! which desktop backend is active, and whether the process is elevated.

use sysinfo::System;
use tracing::info;

use crate::platform::Backend;

/// System information for diagnostics
#[derive(Debug, Clone)]
pub struct SystemInfo {
    /// Operating system name (e.g., "Windows")
    pub os_name: String,
    /// Operating system version string
    pub os_version: String,

    /// Kernel version string
    pub kernel_version: String,

    /// Number of logical CPU cores
    pub cpu_count: usize,

    /// Total system memory in megabytes
    pub total_memory_mb: u64,

    /// System hostname
    pub hostname: String,
}

impl SystemInfo {
    /// Gather system information
    pub fn gather() -> Self {
        let mut sys = System::new();
        sys.refresh_cpu();
        sys.refresh_memory();

        Self {
            os_name: System::name().unwrap_or_else(|| "Unknown".to_string()),
            os_version: System::os_version().unwrap_or_else(|| "Unknown".to_string()),
            kernel_version: System::kernel_version().unwrap_or_else(|| "Unknown".to_string()),
            cpu_count: sys.cpus().len(),
            total_memory_mb: sys.total_memory() / 1024 / 1024,
            hostname: System::host_name().unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// Log system information
    pub fn log(&self) {
        info!("=== System Information ===");
        info!("  OS: {} {}", self.os_name, self.os_version);
        info!("  Kernel: {}", self.kernel_version);
        info!("  Hostname: {}", self.hostname);
        info!("  CPUs: {}", self.cpu_count);
        info!("  Memory: {} MB", self.total_memory_mb);
    }
}

/// Count processes sharing this executable's name (including this one)
pub fn count_same_name_processes() -> usize {
    let Some(name) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.file_name().map(|n| n.to_string_lossy().into_owned()))
    else {
        return 0;
    };

    let mut sys = System::new();
    sys.refresh_processes();
    sys.processes()
        .values()
        .filter(|process| process.name() == name)
        .count()
}

/// Log complete diagnostics on startup
pub fn log_startup_diagnostics(backend: &Backend, elevated: bool) {
    info!("╔════════════════════════════════════════════════════════════╗");
    info!("║          Startup Diagnostics                              ║");
    info!("╚════════════════════════════════════════════════════════════╝");

    let sys_info = SystemInfo::gather();
    sys_info.log();

    info!("=== Desktop ===");
    info!("  Backend: {}", backend.name);
    match backend.pointer.screen_bounds() {
        Ok(bounds) => info!("  Primary screen: {}x{}", bounds.width, bounds.height),
        Err(e) => info!("  Primary screen: unknown ({})", e),
    }
    info!(
        "  Brightness control: {}",
        if backend.brightness.is_some() {
            "available"
        } else {
            "unavailable"
        }
    );
    info!("  Elevated: {}", elevated);

    info!("=== Build ===");
    info!("  Version: {}", env!("CARGO_PKG_VERSION"));
    info!("  Built: {} {}", env!("BUILD_DATE"), env!("BUILD_TIME"));
    #[cfg(debug_assertions)]
    info!("  Build: debug");
    #[cfg(not(debug_assertions))]
    info!("  Build: release");

    info!("╚════════════════════════════════════════════════════════════╝");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_info_gather() {
        let info = SystemInfo::gather();
        assert!(!info.os_name.is_empty());
        assert!(info.cpu_count > 0);
    }

    #[test]
    fn test_build_stamp_is_a_real_timestamp() {
        assert!(chrono::NaiveDate::parse_from_str(env!("BUILD_DATE"), "%Y-%m-%d").is_ok());
        assert!(chrono::NaiveTime::parse_from_str(env!("BUILD_TIME"), "%H:%M:%S").is_ok());
    }

    #[test]
    fn test_same_name_processes_includes_self() {
        assert!(count_same_name_processes() >= 1);
    }
}
