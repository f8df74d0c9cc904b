//! Win32 UI thread: keyboard hook and lock overlay
//!
//! ```text
//! tokio side                              UI thread
//! ──────────                              ─────────
//! WindowsOverlay::show(hint) ──crossbeam──> command queue
//!          └──── PostThreadMessageW(WM_APP) ──> GetMessageW wakes
//!                                            ├─> drain commands
//!                                            ├─> create / destroy window
//!                                            └─> ShowCursor, reply ──crossbeam──> caller
//!
//! keyboard ──> hook_proc ──> KeyFilter::on_event
//!                               └─ Trigger ──tokio mpsc──> App
//! ```
//!
//! The hook context lives in a process-wide `OnceLock` because the hook
//! procedure is a bare `extern "system"` function.
//!
//! `ShowCursor` changes the display counter of the calling thread only, so
//! every counter change is made here, on the thread that owns the overlay.
//! Callers block on a `bounded(1)` reply channel for the new counter.

use std::cell::RefCell;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use std::thread::JoinHandle;
use std::time::Duration;

use crossbeam_channel::{Receiver, Sender};
use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, error, info, trace, warn};
use windows::core::PCWSTR;
use windows::Win32::Foundation::{COLORREF, FALSE, HWND, LPARAM, LRESULT, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, DrawTextW, EndPaint, FillRect, GetStockObject, InvalidateRect, SetBkMode,
    SetTextColor, BLACK_BRUSH, DT_CENTER, DT_SINGLELINE, DT_VCENTER, HBRUSH, PAINTSTRUCT,
    TRANSPARENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::System::Threading::GetCurrentThreadId;
use windows::Win32::UI::WindowsAndMessaging::{
    CallNextHookEx, CreateWindowExW, DefWindowProcW, DestroyWindow, DispatchMessageW,
    GetClientRect, GetMessageW, GetSystemMetrics, PeekMessageW, PostThreadMessageW,
    RegisterClassW, SetCursor, SetForegroundWindow, SetWindowsHookExW, ShowCursor, ShowWindow,
    TranslateMessage, UnhookWindowsHookEx, HC_ACTION, HHOOK, KBDLLHOOKSTRUCT, LLKHF_INJECTED, MSG,
    PM_NOREMOVE, SM_CXSCREEN, SM_CYSCREEN, SW_SHOW, WH_KEYBOARD_LL, WM_APP, WM_CLOSE,
    WM_ERASEBKGND, WM_KEYDOWN, WM_PAINT, WM_SETCURSOR, WM_SYSKEYDOWN, WM_USER, WNDCLASSW,
    WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP,
};

use super::wide;
use crate::input::{FilterDecision, HotkeyAction, KeyEvent, KeyFilter};
use crate::platform::{Overlay, PlatformError, Result};

/// Window class of the overlay
const OVERLAY_CLASS: &str = "FakeLockScreenOverlay";

/// Hint text color (mid gray)
const HINT_COLOR: COLORREF = COLORREF(0x0080_8080);

/// How long to wait for the UI thread to install its hook
const STARTUP_TIMEOUT: Duration = Duration::from_secs(5);

/// How long a caller waits for a cursor counter reply
const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// Work for the UI thread
#[derive(Debug)]
pub enum UiCommand {
    /// Create (or update) the overlay with a hint
    ShowOverlay(String),
    /// Destroy the overlay
    HideOverlay,
    /// `ShowCursor(FALSE)`; replies with the new display counter
    HideCursor(Sender<i32>),
    /// `ShowCursor(TRUE)`; replies with the new display counter
    ShowCursor(Sender<i32>),
    /// Leave the message loop
    Shutdown,
}

struct HookContext {
    filter: Arc<KeyFilter>,
    events: UnboundedSender<HotkeyAction>,
}

static HOOK_CONTEXT: OnceLock<HookContext> = OnceLock::new();

thread_local! {
    static OVERLAY_HWND: RefCell<Option<HWND>> = const { RefCell::new(None) };
    static OVERLAY_HINT: RefCell<Vec<u16>> = const { RefCell::new(Vec::new()) };
}

/// Handle to the running UI thread
pub struct UiThread {
    thread_id: u32,
    commands: Sender<UiCommand>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl UiThread {
    /// Spawn the thread and wait until the keyboard hook is installed
    pub fn spawn(filter: Arc<KeyFilter>, events: UnboundedSender<HotkeyAction>) -> Result<Self> {
        HOOK_CONTEXT
            .set(HookContext { filter, events })
            .map_err(|_| PlatformError::Hook("keyboard hook already installed".to_string()))?;

        let (commands, command_rx) = crossbeam_channel::unbounded();
        let (ready_tx, ready_rx) = crossbeam_channel::bounded(1);

        let join = std::thread::Builder::new()
            .name("ui-thread".to_string())
            .spawn(move || run(command_rx, ready_tx))?;

        let thread_id = ready_rx
            .recv_timeout(STARTUP_TIMEOUT)
            .map_err(|_| PlatformError::UiThreadGone)??;

        info!("UI thread started (thread id {})", thread_id);
        Ok(Self {
            thread_id,
            commands,
            join: Mutex::new(Some(join)),
        })
    }

    /// Queue a command and wake the message loop
    pub fn send(&self, command: UiCommand) -> Result<()> {
        trace!("UI command: {:?}", command);
        self.commands
            .send(command)
            .map_err(|_| PlatformError::UiThreadGone)?;
        // SAFETY: posting a message carries no pointers
        unsafe { PostThreadMessageW(self.thread_id, WM_APP, WPARAM(0), LPARAM(0)) }
            .map_err(|_| PlatformError::UiThreadGone)
    }

    /// Hide the cursor on the UI thread and return its new display counter
    pub fn hide_cursor(&self) -> Result<i32> {
        self.request(UiCommand::HideCursor)
    }

    /// Show the cursor on the UI thread and return its new display counter
    pub fn show_cursor(&self) -> Result<i32> {
        self.request(UiCommand::ShowCursor)
    }

    fn request(&self, command: impl FnOnce(Sender<i32>) -> UiCommand) -> Result<i32> {
        let (reply_tx, reply_rx) = crossbeam_channel::bounded(1);
        self.send(command(reply_tx))?;
        reply_rx
            .recv_timeout(REPLY_TIMEOUT)
            .map_err(|_| PlatformError::UiThreadGone)
    }
}

impl Drop for UiThread {
    fn drop(&mut self) {
        if self.send(UiCommand::Shutdown).is_err() {
            return;
        }
        if let Some(join) = self.join.lock().take() {
            if join.join().is_err() {
                error!("UI thread panicked during shutdown");
            }
        }
    }
}

fn run(commands: Receiver<UiCommand>, ready: Sender<Result<u32>>) {
    let mut msg = MSG::default();

    // SAFETY: all pointers passed are to locals that outlive the calls
    unsafe {
        // Make sure the thread has a message queue before anyone posts to it
        let _ = PeekMessageW(&mut msg, None, WM_USER, WM_USER, PM_NOREMOVE);
    }

    let hook = match install_hook() {
        Ok(hook) => hook,
        Err(e) => {
            let _ = ready.send(Err(e));
            return;
        }
    };

    // SAFETY: no pointers involved
    let thread_id = unsafe { GetCurrentThreadId() };
    let _ = ready.send(Ok(thread_id));
    debug!("Keyboard hook installed, entering message loop");

    'pump: loop {
        // SAFETY: `msg` is a writable MSG
        let status = unsafe { GetMessageW(&mut msg, None, 0, 0) };
        if status.0 <= 0 {
            if status.0 < 0 {
                error!("GetMessageW failed; UI thread exiting");
            }
            break;
        }

        if msg.hwnd.0.is_null() && msg.message == WM_APP {
            for command in commands.try_iter() {
                match command {
                    UiCommand::ShowOverlay(hint) => {
                        if let Err(e) = show_overlay(&hint) {
                            error!("Failed to show overlay: {}", e);
                        }
                    }
                    UiCommand::HideOverlay => hide_overlay(),
                    UiCommand::HideCursor(reply) => {
                        // SAFETY: no pointers involved
                        let _ = reply.send(unsafe { ShowCursor(FALSE) });
                    }
                    UiCommand::ShowCursor(reply) => {
                        // SAFETY: no pointers involved
                        let _ = reply.send(unsafe { ShowCursor(TRUE) });
                    }
                    UiCommand::Shutdown => break 'pump,
                }
            }
            continue;
        }

        // SAFETY: `msg` was filled by GetMessageW
        unsafe {
            let _ = TranslateMessage(&msg);
            DispatchMessageW(&msg);
        }
    }

    hide_overlay();
    // SAFETY: `hook` was returned by SetWindowsHookExW on this thread
    if let Err(e) = unsafe { UnhookWindowsHookEx(hook) } {
        warn!("Failed to remove keyboard hook: {}", e);
    }
    debug!("UI thread stopped");
}

fn install_hook() -> Result<HHOOK> {
    // SAFETY: a null module name returns the current executable's handle
    let module = unsafe { GetModuleHandleW(PCWSTR::null()) }
        .map_err(|e| PlatformError::Hook(e.to_string()))?;
    // SAFETY: `hook_proc` matches HOOKPROC and lives for the whole program
    unsafe { SetWindowsHookExW(WH_KEYBOARD_LL, Some(hook_proc), module, 0) }
        .map_err(|e| PlatformError::Hook(e.to_string()))
}

unsafe extern "system" fn hook_proc(code: i32, wparam: WPARAM, lparam: LPARAM) -> LRESULT {
    if code == HC_ACTION as i32 {
        if let Some(ctx) = HOOK_CONTEXT.get() {
            // SAFETY: for HC_ACTION, lparam points to a KBDLLHOOKSTRUCT
            let info = unsafe { &*(lparam.0 as *const KBDLLHOOKSTRUCT) };
            let message = wparam.0 as u32;
            let event = KeyEvent {
                code: info.vkCode as u16,
                down: message == WM_KEYDOWN || message == WM_SYSKEYDOWN,
                injected: info.flags.0 & LLKHF_INJECTED.0 != 0,
            };

            match ctx.filter.on_event(&event) {
                FilterDecision::Pass => {}
                FilterDecision::Suppress => return LRESULT(1),
                FilterDecision::Trigger(action) => {
                    if ctx.events.send(action).is_err() {
                        warn!("Hotkey {} dropped: event loop is gone", action.name());
                    }
                    return LRESULT(1);
                }
            }
        }
    }
    // SAFETY: forwarding the unmodified hook arguments
    unsafe { CallNextHookEx(None, code, wparam, lparam) }
}

fn show_overlay(hint: &str) -> windows::core::Result<()> {
    OVERLAY_HINT.with(|h| *h.borrow_mut() = hint.encode_utf16().collect());

    if let Some(hwnd) = OVERLAY_HWND.with(|w| *w.borrow()) {
        // SAFETY: `hwnd` was created on this thread and is still alive
        unsafe {
            let _ = InvalidateRect(hwnd, None, TRUE);
        }
        return Ok(());
    }

    let class_name = wide(OVERLAY_CLASS);
    // SAFETY: every pointer handed to user32 outlives the call
    let hwnd = unsafe {
        let module = GetModuleHandleW(PCWSTR::null())?;
        let class = WNDCLASSW {
            lpfnWndProc: Some(overlay_proc),
            hInstance: module.into(),
            hbrBackground: HBRUSH(GetStockObject(BLACK_BRUSH).0),
            lpszClassName: PCWSTR(class_name.as_ptr()),
            ..Default::default()
        };
        // Fails harmlessly with ERROR_CLASS_ALREADY_EXISTS on the second lock
        let _ = RegisterClassW(&class);

        let hwnd = CreateWindowExW(
            WS_EX_TOPMOST | WS_EX_TOOLWINDOW,
            PCWSTR(class_name.as_ptr()),
            PCWSTR::null(),
            WS_POPUP,
            0,
            0,
            GetSystemMetrics(SM_CXSCREEN),
            GetSystemMetrics(SM_CYSCREEN),
            None,
            None,
            module,
            None,
        )?;
        let _ = ShowWindow(hwnd, SW_SHOW);
        let _ = SetForegroundWindow(hwnd);
        hwnd
    };

    OVERLAY_HWND.with(|w| *w.borrow_mut() = Some(hwnd));
    debug!("Overlay window created");
    Ok(())
}

fn hide_overlay() {
    if let Some(hwnd) = OVERLAY_HWND.with(|w| w.borrow_mut().take()) {
        // SAFETY: `hwnd` was created on this thread
        if let Err(e) = unsafe { DestroyWindow(hwnd) } {
            warn!("Failed to destroy overlay window: {}", e);
        } else {
            debug!("Overlay window destroyed");
        }
    }
}

unsafe extern "system" fn overlay_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_SETCURSOR => {
            // SAFETY: clearing the cursor takes no pointers
            unsafe { SetCursor(None) };
            LRESULT(1)
        }
        WM_ERASEBKGND => LRESULT(1),
        WM_PAINT => {
            // SAFETY: BeginPaint/EndPaint bracket painting of our own window
            unsafe { paint_overlay(hwnd) };
            LRESULT(0)
        }
        // Alt+F4 and friends
        WM_CLOSE => LRESULT(0),
        // SAFETY: default handling of our own window's messages
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

unsafe fn paint_overlay(hwnd: HWND) {
    let mut ps = PAINTSTRUCT::default();
    // SAFETY: called from WM_PAINT on the owning thread
    unsafe {
        let hdc = BeginPaint(hwnd, &mut ps);
        let mut rect = RECT::default();
        let _ = GetClientRect(hwnd, &mut rect);
        let _ = FillRect(hdc, &rect, HBRUSH(GetStockObject(BLACK_BRUSH).0));

        OVERLAY_HINT.with(|hint| {
            let mut text = hint.borrow().clone();
            if !text.is_empty() {
                let _ = SetBkMode(hdc, TRANSPARENT);
                let _ = SetTextColor(hdc, HINT_COLOR);
                let _ = DrawTextW(
                    hdc,
                    &mut text,
                    &mut rect,
                    DT_CENTER | DT_VCENTER | DT_SINGLELINE,
                );
            }
        });

        let _ = EndPaint(hwnd, &ps);
    }
}

/// Overlay window driven through the UI thread
pub struct WindowsOverlay {
    ui: Arc<UiThread>,
    visible: AtomicBool,
}

impl WindowsOverlay {
    /// Create an overlay handle
    pub fn new(ui: Arc<UiThread>) -> Self {
        Self {
            ui,
            visible: AtomicBool::new(false),
        }
    }
}

impl Overlay for WindowsOverlay {
    fn show(&self, hint: &str) -> Result<()> {
        self.ui.send(UiCommand::ShowOverlay(hint.to_string()))?;
        self.visible.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn hide(&self) -> Result<()> {
        self.ui.send(UiCommand::HideOverlay)?;
        self.visible.store(false, Ordering::SeqCst);
        Ok(())
    }

    fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}
