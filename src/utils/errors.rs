//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

use crate::brightness::BrightnessError;
use crate::error::LockError;
use crate::input::HotkeyError;
use crate::platform::PlatformError;

/// Broad error category used to pick troubleshooting hints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorKind {
    AlreadyRunning,
    Hotkey,
    Hook,
    Brightness,
    Elevation,
    Config,
    Generic,
}

fn classify(error: &anyhow::Error) -> ErrorKind {
    for cause in error.chain() {
        if let Some(e) = cause.downcast_ref::<PlatformError>() {
            return classify_platform(e);
        }
        if cause.downcast_ref::<HotkeyError>().is_some() {
            return ErrorKind::Hotkey;
        }
        if cause.downcast_ref::<BrightnessError>().is_some() {
            return ErrorKind::Brightness;
        }
        if let Some(e) = cause.downcast_ref::<LockError>() {
            return match e {
                LockError::Platform(p) => classify_platform(p),
                LockError::Hotkey(_) => ErrorKind::Hotkey,
                LockError::Brightness(_) => ErrorKind::Brightness,
                LockError::EventsClosed => ErrorKind::Hook,
            };
        }
    }

    let message = format!("{:#}", error).to_lowercase();
    if message.contains("config") || message.contains("toml") {
        ErrorKind::Config
    } else {
        ErrorKind::Generic
    }
}

fn classify_platform(error: &PlatformError) -> ErrorKind {
    match error {
        PlatformError::AlreadyRunning => ErrorKind::AlreadyRunning,
        PlatformError::Hook(_) | PlatformError::Overlay(_) | PlatformError::UiThreadGone => {
            ErrorKind::Hook
        }
        PlatformError::Elevation(_) => ErrorKind::Elevation,
        _ => ErrorKind::Generic,
    }
}

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &anyhow::Error) -> String {
    let mut output = String::new();

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                     ERROR                                  ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    match classify(error) {
        ErrorKind::AlreadyRunning => format_instance_error(&mut output),
        ErrorKind::Hotkey => format_hotkey_error(&mut output),
        ErrorKind::Hook => format_hook_error(&mut output),
        ErrorKind::Brightness => format_brightness_error(&mut output),
        ErrorKind::Elevation => format_elevation_error(&mut output),
        ErrorKind::Config => format_config_error(&mut output),
        ErrorKind::Generic => format_generic_error(&mut output, &error.to_string()),
    }

    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{:#}", error).ok();
    writeln!(&mut output).ok();

    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --debug -vv for detailed logs: fake-lock-screen --debug -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - Print the effective settings: fake-lock-screen --dump-config"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_instance_error(output: &mut String) {
    writeln!(output, "Already Running").ok();
    writeln!(output).ok();
    writeln!(output, "Another copy of fake-lock-screen is active.").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Use the running copy's hotkeys").ok();
    writeln!(output, "     → Default lock: CTRL+ALT+L, unlock: CTRL+ALT+U").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Stop the other copy first").ok();
    writeln!(output, "     → Task Manager → Details → fake-lock-screen.exe").ok();
}

fn format_hotkey_error(output: &mut String) {
    writeln!(output, "Hotkey Error").ok();
    writeln!(output).ok();
    writeln!(output, "A hotkey in the configuration could not be used.").ok();
    writeln!(output).ok();
    writeln!(output, "Hotkeys are written as modifiers plus one key:").ok();
    writeln!(output, "  ctrl+alt+u    ctrl+shift+f12    alt+space").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. No modifier (ctrl, alt or shift) in the combination").ok();
    writeln!(output, "  2. A Windows key modifier (not supported)").ok();
    writeln!(output, "  3. The quit hotkey repeats the lock or unlock hotkey").ok();
}

fn format_hook_error(output: &mut String) {
    writeln!(output, "Keyboard Hook Error").ok();
    writeln!(output).ok();
    writeln!(output, "The global keyboard hook or lock overlay stopped working.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Security software blocked the low-level keyboard hook").ok();
    writeln!(output, "     → Allow fake-lock-screen in your antivirus settings").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Missing administrator rights").ok();
    writeln!(output, "     → Run without --no-elevate and accept the UAC prompt").ok();
}

fn format_brightness_error(output: &mut String) {
    writeln!(output, "Brightness Control Error").ok();
    writeln!(output).ok();
    writeln!(output, "The display brightness could not be changed.").ok();
    writeln!(output).ok();
    writeln!(output, "  → External monitors usually have no WMI brightness provider").ok();
    writeln!(output, "  → Set [brightness] enabled = false to lock without dimming").ok();
}

fn format_elevation_error(output: &mut String) {
    writeln!(output, "Elevation Error").ok();
    writeln!(output).ok();
    writeln!(output, "Administrator rights were requested but not granted.").ok();
    writeln!(output).ok();
    writeln!(output, "  → Accept the UAC prompt, or").ok();
    writeln!(output, "  → Start with --no-elevate (hooks may miss elevated windows)").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "There is a problem with the configuration file.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Value out of range").ok();
    writeln!(output, "     → cursor.poll_interval_ms: 1-1000").ok();
    writeln!(output, "     → cursor.edge_margin: 5-20").ok();
    writeln!(output, "     → brightness levels: 0-100").ok();
    writeln!(output).ok();
    writeln!(output, "  2. Start over from the defaults").ok();
    writeln!(
        output,
        "     → fake-lock-screen --dump-config > config.toml"
    )
    .ok();
}

fn format_generic_error(output: &mut String, error: &str) {
    writeln!(output, "An error occurred:").ok();
    writeln!(output).ok();
    writeln!(output, "  {}", error).ok();
    writeln!(output).ok();
    writeln!(output, "Troubleshooting:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Run with --debug -vv to see what happened").ok();
    writeln!(output, "  2. Check the debug log next to the executable").ok();
}
