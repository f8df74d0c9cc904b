//! Hotkey Error Types

use thiserror::Error;

/// Result type for hotkey operations
pub type Result<T> = std::result::Result<T, HotkeyError>;

/// Hotkey parsing and binding errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyError {
    /// Empty hotkey string
    #[error("Hotkey is empty")]
    Empty,

    /// Unrecognized key name
    #[error("Unknown key: {0}")]
    UnknownKey(String),

    /// Only modifiers were given
    #[error("Hotkey has no main key: {0}")]
    MissingKey(String),

    /// More than one non-modifier key
    #[error("Hotkey has more than one main key: {0}")]
    MultipleKeys(String),

    /// Combination without ctrl/alt/shift
    #[error("Hotkey needs at least one modifier (ctrl, alt, shift): {0}")]
    NoModifier(String),

    /// Two bindings share the same combination
    #[error("Hotkey {combo} is bound to both {first} and {second}")]
    Conflict {
        /// Conflicting combination
        combo: String,
        /// First action name
        first: &'static str,
        /// Second action name
        second: &'static str,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            HotkeyError::UnknownKey("foo".into()).to_string(),
            "Unknown key: foo"
        );
        let err = HotkeyError::Conflict {
            combo: "ctrl+alt+q".into(),
            first: "quit",
            second: "lock",
        };
        assert_eq!(err.to_string(), "Hotkey ctrl+alt+q is bound to both quit and lock");
    }
}
