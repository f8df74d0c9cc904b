//! Process-level Win32 helpers: single instance, elevation, console

use tracing::{debug, info};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{CloseHandle, GetLastError, ERROR_ALREADY_EXISTS, FALSE, HANDLE};
use windows::Win32::System::Console::GetConsoleWindow;
use windows::Win32::System::Threading::CreateMutexW;
use windows::Win32::UI::Shell::{IsUserAnAdmin, ShellExecuteW};
use windows::Win32::UI::WindowsAndMessaging::{ShowWindow, SW_HIDE, SW_SHOW, SW_SHOWNORMAL};

use super::wide;
use crate::platform::{join_command_line, PlatformError, Result};

/// Named mutex held for the life of the process
pub struct InstanceMutex {
    handle: HANDLE,
}

// SAFETY: a mutex handle is a process-wide kernel object reference
unsafe impl Send for InstanceMutex {}
unsafe impl Sync for InstanceMutex {}

impl InstanceMutex {
    /// Create the named mutex, failing if it already exists
    pub fn acquire(name: &str) -> Result<Self> {
        let name = wide(name);
        // SAFETY: `name` is NUL-terminated and outlives the call
        let handle = unsafe { CreateMutexW(None, FALSE, PCWSTR(name.as_ptr())) }
            .map_err(|e| PlatformError::Io(std::io::Error::other(e)))?;

        // SAFETY: reads the calling thread's last-error value
        if unsafe { GetLastError() } == ERROR_ALREADY_EXISTS {
            // SAFETY: `handle` was just returned by CreateMutexW
            let _ = unsafe { CloseHandle(handle) };
            return Err(PlatformError::AlreadyRunning);
        }

        debug!("Single-instance mutex acquired");
        Ok(Self { handle })
    }
}

impl Drop for InstanceMutex {
    fn drop(&mut self) {
        // SAFETY: `handle` is owned by this value
        let _ = unsafe { CloseHandle(self.handle) };
    }
}

/// Whether the process token is in the Administrators group
pub fn is_elevated() -> bool {
    // SAFETY: no pointers involved
    unsafe { IsUserAnAdmin() }.as_bool()
}

/// Start the current executable again through the UAC "runas" verb
pub fn relaunch_elevated(args: &[String]) -> Result<()> {
    let exe = std::env::current_exe()?;
    let exe = wide(&exe.to_string_lossy());
    let params = wide(&join_command_line(args));
    let verb = wide("runas");

    // SAFETY: all strings are NUL-terminated and outlive the call
    let result = unsafe {
        ShellExecuteW(
            None,
            PCWSTR(verb.as_ptr()),
            PCWSTR(exe.as_ptr()),
            PCWSTR(params.as_ptr()),
            PCWSTR::null(),
            SW_SHOWNORMAL,
        )
    };

    // ShellExecuteW reports success with a value above 32
    let code = result.0 as isize;
    if code <= 32 {
        return Err(PlatformError::Elevation(format!(
            "ShellExecuteW returned {}",
            code
        )));
    }
    info!("Relaunched with administrator rights");
    Ok(())
}

/// Show or hide the console window this process is attached to
pub fn set_console_visible(visible: bool) {
    // SAFETY: no pointers involved
    let console = unsafe { GetConsoleWindow() };
    if console.0.is_null() {
        return;
    }
    // SAFETY: `console` is a valid window handle
    let _ = unsafe { ShowWindow(console, if visible { SW_SHOW } else { SW_HIDE }) };
}
