//! Hotkey Parsing
//!
//! Hotkeys are written the way users type them: `ctrl+alt+u`. Names are
//! case-insensitive, modifiers may appear in any order, and the canonical
//! form is always `ctrl`, `alt`, `shift`, then the main key.
//!
//! Key identity uses Windows virtual-key codes so the native hook can match
//! `KBDLLHOOKSTRUCT::vkCode` directly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::{HotkeyError, Result};

/// Virtual-key codes for modifier keys
pub mod vk {
    /// Either Shift
    pub const SHIFT: u16 = 0x10;
    /// Either Ctrl
    pub const CONTROL: u16 = 0x11;
    /// Either Alt
    pub const MENU: u16 = 0x12;
    /// Left Windows key
    pub const LWIN: u16 = 0x5B;
    /// Right Windows key
    pub const RWIN: u16 = 0x5C;
    /// Left Shift
    pub const LSHIFT: u16 = 0xA0;
    /// Right Shift
    pub const RSHIFT: u16 = 0xA1;
    /// Left Ctrl
    pub const LCONTROL: u16 = 0xA2;
    /// Right Ctrl
    pub const RCONTROL: u16 = 0xA3;
    /// Left Alt
    pub const LMENU: u16 = 0xA4;
    /// Right Alt
    pub const RMENU: u16 = 0xA5;
}

/// Named keys that are not letters, digits or function keys
const NAMED_KEYS: &[(&str, u16)] = &[
    ("backspace", 0x08),
    ("tab", 0x09),
    ("enter", 0x0D),
    ("pause", 0x13),
    ("esc", 0x1B),
    ("space", 0x20),
    ("pageup", 0x21),
    ("pagedown", 0x22),
    ("end", 0x23),
    ("home", 0x24),
    ("left", 0x25),
    ("up", 0x26),
    ("right", 0x27),
    ("down", 0x28),
    ("printscreen", 0x2C),
    ("insert", 0x2D),
    ("delete", 0x2E),
];

/// Alternate spellings accepted on input
const KEY_ALIASES: &[(&str, &str)] = &[
    ("escape", "esc"),
    ("return", "enter"),
    ("del", "delete"),
    ("ins", "insert"),
    ("pgup", "pageup"),
    ("pgdn", "pagedown"),
    ("page up", "pageup"),
    ("page down", "pagedown"),
    ("print screen", "printscreen"),
];

/// A non-modifier key, identified by virtual-key code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key(u16);

impl Key {
    /// Virtual-key code
    pub fn code(self) -> u16 {
        self.0
    }

    /// Look up a key from its virtual-key code
    pub fn from_code(code: u16) -> Option<Self> {
        let key = Key(code);
        key.name().map(|_| key)
    }

    /// Canonical lowercase name
    pub fn name(self) -> Option<String> {
        match self.0 {
            0x41..=0x5A => Some(((self.0 as u8) as char).to_ascii_lowercase().to_string()),
            0x30..=0x39 => Some(((self.0 as u8) as char).to_string()),
            0x70..=0x87 => Some(format!("f{}", self.0 - 0x70 + 1)),
            code => NAMED_KEYS
                .iter()
                .find(|(_, c)| *c == code)
                .map(|(name, _)| (*name).to_string()),
        }
    }

    fn parse(name: &str) -> Option<Self> {
        let name = KEY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == name)
            .map(|(_, canonical)| *canonical)
            .unwrap_or(name);

        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_lowercase() {
                return Some(Key(c.to_ascii_uppercase() as u16));
            }
            if c.is_ascii_digit() {
                return Some(Key(c as u16));
            }
        }

        if let Some(n) = name.strip_prefix('f').and_then(|n| n.parse::<u16>().ok()) {
            if (1..=24).contains(&n) {
                return Some(Key(0x70 + n - 1));
            }
        }

        NAMED_KEYS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, code)| Key(*code))
    }
}

/// Modifier key state
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Modifiers {
    /// Left or right Ctrl pressed
    pub ctrl: bool,
    /// Left or right Alt pressed
    pub alt: bool,
    /// Left or right Shift pressed
    pub shift: bool,
}

impl Modifiers {
    /// No modifier pressed
    pub const NONE: Modifiers = Modifiers {
        ctrl: false,
        alt: false,
        shift: false,
    };

    /// Whether any modifier is pressed
    pub fn any(&self) -> bool {
        self.ctrl || self.alt || self.shift
    }
}

/// A modifier combination plus one main key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hotkey {
    modifiers: Modifiers,
    key: Key,
}

impl Hotkey {
    /// Build a hotkey, requiring at least one modifier
    pub fn new(modifiers: Modifiers, key: Key) -> Result<Self> {
        let hotkey = Self { modifiers, key };
        if !modifiers.any() {
            return Err(HotkeyError::NoModifier(hotkey.to_string()));
        }
        Ok(hotkey)
    }

    /// Required modifiers
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    /// Main key
    pub fn key(&self) -> Key {
        self.key
    }

    /// Check a key-down against this hotkey
    ///
    /// The modifier set must match exactly: `ctrl+alt+u` does not fire for
    /// `ctrl+alt+shift+u`.
    pub fn matches(&self, code: u16, modifiers: Modifiers) -> bool {
        self.key.code() == code && self.modifiers == modifiers
    }

    /// Upper-case form used in the overlay hint
    pub fn display_upper(&self) -> String {
        self.to_string().to_uppercase()
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.ctrl {
            write!(f, "ctrl+")?;
        }
        if self.modifiers.alt {
            write!(f, "alt+")?;
        }
        if self.modifiers.shift {
            write!(f, "shift+")?;
        }
        match self.key.name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "0x{:02X}", self.key.code()),
        }
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut modifiers = Modifiers::NONE;
        let mut key = None;

        for part in normalized.split('+').map(str::trim) {
            match part {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" | "menu" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "" => return Err(HotkeyError::UnknownKey(s.to_string())),
                "win" | "cmd" | "super" | "meta" => {
                    return Err(HotkeyError::UnknownKey(part.to_string()))
                }
                name => {
                    let parsed =
                        Key::parse(name).ok_or_else(|| HotkeyError::UnknownKey(name.to_string()))?;
                    if key.replace(parsed).is_some() {
                        return Err(HotkeyError::MultipleKeys(s.to_string()));
                    }
                }
            }
        }

        let key = key.ok_or_else(|| HotkeyError::MissingKey(s.to_string()))?;
        Hotkey::new(modifiers, key)
    }
}

impl Serialize for Hotkey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Hotkey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Actions a hotkey can trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    /// Engage the fake lock
    Lock,
    /// Release the fake lock
    Unlock,
    /// Exit the application
    Quit,
}

impl HotkeyAction {
    /// Lowercase action name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Lock => "lock",
            Self::Unlock => "unlock",
            Self::Quit => "quit",
        }
    }
}

/// The full set of active hotkeys
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotkeyBindings {
    /// Lock hotkey (active while unlocked)
    pub lock: Hotkey,
    /// Unlock hotkey (active while locked)
    pub unlock: Hotkey,
    /// Optional quit hotkey (active while unlocked)
    pub quit: Option<Hotkey>,
}

impl HotkeyBindings {
    /// Validate and build a binding set
    ///
    /// Lock and unlock may share a combination (it then acts as a toggle),
    /// but quit must not collide with either.
    pub fn new(lock: Hotkey, unlock: Hotkey, quit: Option<Hotkey>) -> Result<Self> {
        if let Some(quit) = quit {
            for (other, name) in [(lock, "lock"), (unlock, "unlock")] {
                if quit == other {
                    return Err(HotkeyError::Conflict {
                        combo: quit.to_string(),
                        first: "quit",
                        second: name,
                    });
                }
            }
        }
        Ok(Self { lock, unlock, quit })
    }
}

impl Default for HotkeyBindings {
    fn default() -> Self {
        Self {
            lock: DEFAULT_LOCK_HOTKEY.parse().expect("default lock hotkey is valid"),
            unlock: DEFAULT_UNLOCK_HOTKEY.parse().expect("default unlock hotkey is valid"),
            quit: None,
        }
    }
}

/// Default lock combination
pub const DEFAULT_LOCK_HOTKEY: &str = "ctrl+alt+l";

/// Default unlock combination
pub const DEFAULT_UNLOCK_HOTKEY: &str = "ctrl+alt+u";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_hotkeys() {
        let unlock: Hotkey = "ctrl+alt+u".parse().unwrap();
        assert!(unlock.modifiers().ctrl);
        assert!(unlock.modifiers().alt);
        assert!(!unlock.modifiers().shift);
        assert_eq!(unlock.key().code(), 0x55);
    }

    #[test]
    fn test_canonical_display() {
        let hotkey: Hotkey = " Shift + U + Ctrl ".parse().unwrap();
        assert_eq!(hotkey.to_string(), "ctrl+shift+u");
        assert_eq!(hotkey.display_upper(), "CTRL+SHIFT+U");
    }

    #[test]
    fn test_named_and_function_keys() {
        assert_eq!("alt+f4".parse::<Hotkey>().unwrap().key().code(), 0x73);
        assert_eq!("ctrl+f24".parse::<Hotkey>().unwrap().key().code(), 0x87);
        assert_eq!("ctrl+escape".parse::<Hotkey>().unwrap().to_string(), "ctrl+esc");
        assert_eq!("ctrl+alt+7".parse::<Hotkey>().unwrap().key().code(), 0x37);
        assert_eq!("shift+space".parse::<Hotkey>().unwrap().key().code(), 0x20);
    }

    #[test]
    fn test_rejects_invalid() {
        assert_eq!("".parse::<Hotkey>(), Err(HotkeyError::Empty));
        assert!(matches!("u".parse::<Hotkey>(), Err(HotkeyError::NoModifier(_))));
        assert!(matches!("ctrl+alt".parse::<Hotkey>(), Err(HotkeyError::MissingKey(_))));
        assert!(matches!("ctrl+a+b".parse::<Hotkey>(), Err(HotkeyError::MultipleKeys(_))));
        assert!(matches!("ctrl+foo".parse::<Hotkey>(), Err(HotkeyError::UnknownKey(_))));
        assert!(matches!("ctrl+f25".parse::<Hotkey>(), Err(HotkeyError::UnknownKey(_))));
        assert!(matches!("win+l".parse::<Hotkey>(), Err(HotkeyError::UnknownKey(_))));
        assert!(matches!("ctrl++u".parse::<Hotkey>(), Err(HotkeyError::UnknownKey(_))));
    }

    #[test]
    fn test_exact_modifier_match() {
        let hotkey: Hotkey = "ctrl+alt+u".parse().unwrap();
        let ctrl_alt = Modifiers {
            ctrl: true,
            alt: true,
            shift: false,
        };
        assert!(hotkey.matches(0x55, ctrl_alt));
        assert!(!hotkey.matches(0x55, Modifiers { shift: true, ..ctrl_alt }));
        assert!(!hotkey.matches(0x55, Modifiers { alt: false, ..ctrl_alt }));
        assert!(!hotkey.matches(0x56, ctrl_alt));
    }

    #[test]
    fn test_key_from_code() {
        assert_eq!(Key::from_code(0x41).and_then(Key::name).as_deref(), Some("a"));
        assert_eq!(Key::from_code(0x2E).and_then(Key::name).as_deref(), Some("delete"));
        assert!(Key::from_code(0xFF).is_none());
    }

    #[test]
    fn test_serde_as_string() {
        #[derive(Serialize, Deserialize)]
        struct Wrapper {
            key: Hotkey,
        }
        let parsed: Wrapper = toml::from_str("key = \"Alt+Ctrl+L\"").unwrap();
        assert_eq!(parsed.key.to_string(), "ctrl+alt+l");
        let rendered = toml::to_string(&parsed).unwrap();
        assert_eq!(rendered.trim(), "key = \"ctrl+alt+l\"");
        assert!(toml::from_str::<Wrapper>("key = \"l\"").is_err());
    }

    #[test]
    fn test_bindings_conflict() {
        let lock: Hotkey = "ctrl+alt+l".parse().unwrap();
        let unlock: Hotkey = "ctrl+alt+u".parse().unwrap();
        assert!(HotkeyBindings::new(lock, unlock, Some(lock)).is_err());
        assert!(HotkeyBindings::new(lock, lock, None).is_ok());
        let quit: Hotkey = "ctrl+alt+q".parse().unwrap();
        assert_eq!(
            HotkeyBindings::new(lock, unlock, Some(quit)).unwrap().quit,
            Some(quit)
        );
    }

    #[test]
    fn test_default_bindings() {
        let bindings = HotkeyBindings::default();
        assert_eq!(bindings.lock.to_string(), DEFAULT_LOCK_HOTKEY);
        assert_eq!(bindings.unlock.to_string(), DEFAULT_UNLOCK_HOTKEY);
        assert!(bindings.quit.is_none());
    }
}
