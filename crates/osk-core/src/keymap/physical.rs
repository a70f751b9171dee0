//! Physical key positions, identified by their USB HID Usage ID.
//!
//! A [`PhysicalKey`] names *where* a key sits on the keyboard, not what it
//! types.  The key to the right of Tab is always [`PhysicalKey::KeyQ`], even
//! on an AZERTY keyboard where it is labelled "A".  This is what lets the
//! same highlight logic drive every layout: the hook reports positions, the
//! layouts describe positions, and only the labels differ.
//!
//! # Why HID Usage IDs? (for beginners)
//!
//! The USB HID standard already assigns a number to every key position on
//! the Keyboard/Keypad page (0x07).  Reusing those numbers as enum
//! discriminants gives every variant a stable, documented value that does not
//! depend on the operating system or on the active input language:
//!
//! | Position     | HID Usage ID |
//! |--------------|-------------|
//! | Letter A     | 0x04        |
//! | Enter        | 0x28        |
//! | Caps Lock    | 0x39        |
//! | Left Shift   | 0xE1        |
//!
//! # Closed world
//!
//! The set is deliberately closed: it covers every key a built-in layout can
//! reference plus the function row, navigation cluster and lock keys the
//! system hook may report.  Anything outside the set (numpad, media keys,
//! mouse buttons) never becomes a `PhysicalKey`, so it can never reach a
//! highlight sink.

use std::fmt;

/// Locale-independent identifier for one physical key position.
///
/// The numeric value of each variant is its HID Usage ID on page 0x07.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum PhysicalKey {
    // Letters (HID 0x04–0x1D)
    KeyA = 0x04,
    KeyB = 0x05,
    KeyC = 0x06,
    KeyD = 0x07,
    KeyE = 0x08,
    KeyF = 0x09,
    KeyG = 0x0A,
    KeyH = 0x0B,
    KeyI = 0x0C,
    KeyJ = 0x0D,
    KeyK = 0x0E,
    KeyL = 0x0F,
    KeyM = 0x10,
    KeyN = 0x11,
    KeyO = 0x12,
    KeyP = 0x13,
    KeyQ = 0x14,
    KeyR = 0x15,
    KeyS = 0x16,
    KeyT = 0x17,
    KeyU = 0x18,
    KeyV = 0x19,
    KeyW = 0x1A,
    KeyX = 0x1B,
    KeyY = 0x1C,
    KeyZ = 0x1D,

    // Digits (HID 0x1E–0x27)
    Digit1 = 0x1E,
    Digit2 = 0x1F,
    Digit3 = 0x20,
    Digit4 = 0x21,
    Digit5 = 0x22,
    Digit6 = 0x23,
    Digit7 = 0x24,
    Digit8 = 0x25,
    Digit9 = 0x26,
    Digit0 = 0x27,

    // Control and punctuation keys (HID 0x28–0x38)
    Enter = 0x28,
    Escape = 0x29,
    Backspace = 0x2A,
    Tab = 0x2B,
    Space = 0x2C,
    Minus = 0x2D,
    Equal = 0x2E,
    BracketLeft = 0x2F,
    BracketRight = 0x30,
    Backslash = 0x31,
    Semicolon = 0x33,
    Quote = 0x34,
    Backquote = 0x35,
    Comma = 0x36,
    Period = 0x37,
    Slash = 0x38,

    CapsLock = 0x39,

    // Function keys (HID 0x3A–0x45)
    F1 = 0x3A,
    F2 = 0x3B,
    F3 = 0x3C,
    F4 = 0x3D,
    F5 = 0x3E,
    F6 = 0x3F,
    F7 = 0x40,
    F8 = 0x41,
    F9 = 0x42,
    F10 = 0x43,
    F11 = 0x44,
    F12 = 0x45,

    // Navigation cluster (HID 0x46–0x52)
    PrintScreen = 0x46,
    ScrollLock = 0x47,
    Pause = 0x48,
    Insert = 0x49,
    Home = 0x4A,
    PageUp = 0x4B,
    Delete = 0x4C,
    End = 0x4D,
    PageDown = 0x4E,
    ArrowRight = 0x4F,
    ArrowLeft = 0x50,
    ArrowDown = 0x51,
    ArrowUp = 0x52,

    NumLock = 0x53,

    /// The extra ISO key between left Shift and Z (`<` `>` on Spanish boards).
    IntlBackslash = 0x64,
    ContextMenu = 0x65,

    // Modifier keys (HID 0xE0–0xE7)
    ControlLeft = 0xE0,
    ShiftLeft = 0xE1,
    AltLeft = 0xE2,
    MetaLeft = 0xE3,
    ControlRight = 0xE4,
    ShiftRight = 0xE5,
    AltRight = 0xE6,
    MetaRight = 0xE7,
}

impl PhysicalKey {
    /// Every variant, in HID order.
    pub const ALL: [PhysicalKey; 89] = {
        use PhysicalKey::*;
        [
            KeyA, KeyB, KeyC, KeyD, KeyE, KeyF, KeyG, KeyH, KeyI, KeyJ, KeyK, KeyL, KeyM,
            KeyN, KeyO, KeyP, KeyQ, KeyR, KeyS, KeyT, KeyU, KeyV, KeyW, KeyX, KeyY, KeyZ,
            Digit1, Digit2, Digit3, Digit4, Digit5, Digit6, Digit7, Digit8, Digit9, Digit0,
            Enter, Escape, Backspace, Tab, Space, Minus, Equal, BracketLeft, BracketRight,
            Backslash, Semicolon, Quote, Backquote, Comma, Period, Slash,
            CapsLock,
            F1, F2, F3, F4, F5, F6, F7, F8, F9, F10, F11, F12,
            PrintScreen, ScrollLock, Pause, Insert, Home, PageUp, Delete, End, PageDown,
            ArrowRight, ArrowLeft, ArrowDown, ArrowUp,
            NumLock, IntlBackslash, ContextMenu,
            ControlLeft, ShiftLeft, AltLeft, MetaLeft,
            ControlRight, ShiftRight, AltRight, MetaRight,
        ]
    };

    /// Returns the HID Usage ID for this position.
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    /// Returns `true` for the keys whose highlight mirrors a sampled modifier
    /// state instead of transient press/release: Caps Lock and both Shifts.
    pub const fn is_state_key(self) -> bool {
        matches!(
            self,
            PhysicalKey::CapsLock | PhysicalKey::ShiftLeft | PhysicalKey::ShiftRight
        )
    }

    /// Returns `true` for either Shift key.
    pub const fn is_shift(self) -> bool {
        matches!(self, PhysicalKey::ShiftLeft | PhysicalKey::ShiftRight)
    }

    /// Returns the W3C `KeyboardEvent.code` style name, e.g. `"KeyA"`.
    pub fn name(self) -> &'static str {
        use PhysicalKey::*;
        match self {
            KeyA => "KeyA",
            KeyB => "KeyB",
            KeyC => "KeyC",
            KeyD => "KeyD",
            KeyE => "KeyE",
            KeyF => "KeyF",
            KeyG => "KeyG",
            KeyH => "KeyH",
            KeyI => "KeyI",
            KeyJ => "KeyJ",
            KeyK => "KeyK",
            KeyL => "KeyL",
            KeyM => "KeyM",
            KeyN => "KeyN",
            KeyO => "KeyO",
            KeyP => "KeyP",
            KeyQ => "KeyQ",
            KeyR => "KeyR",
            KeyS => "KeyS",
            KeyT => "KeyT",
            KeyU => "KeyU",
            KeyV => "KeyV",
            KeyW => "KeyW",
            KeyX => "KeyX",
            KeyY => "KeyY",
            KeyZ => "KeyZ",
            Digit1 => "Digit1",
            Digit2 => "Digit2",
            Digit3 => "Digit3",
            Digit4 => "Digit4",
            Digit5 => "Digit5",
            Digit6 => "Digit6",
            Digit7 => "Digit7",
            Digit8 => "Digit8",
            Digit9 => "Digit9",
            Digit0 => "Digit0",
            Enter => "Enter",
            Escape => "Escape",
            Backspace => "Backspace",
            Tab => "Tab",
            Space => "Space",
            Minus => "Minus",
            Equal => "Equal",
            BracketLeft => "BracketLeft",
            BracketRight => "BracketRight",
            Backslash => "Backslash",
            Semicolon => "Semicolon",
            Quote => "Quote",
            Backquote => "Backquote",
            Comma => "Comma",
            Period => "Period",
            Slash => "Slash",
            CapsLock => "CapsLock",
            F1 => "F1",
            F2 => "F2",
            F3 => "F3",
            F4 => "F4",
            F5 => "F5",
            F6 => "F6",
            F7 => "F7",
            F8 => "F8",
            F9 => "F9",
            F10 => "F10",
            F11 => "F11",
            F12 => "F12",
            PrintScreen => "PrintScreen",
            ScrollLock => "ScrollLock",
            Pause => "Pause",
            Insert => "Insert",
            Home => "Home",
            PageUp => "PageUp",
            Delete => "Delete",
            End => "End",
            PageDown => "PageDown",
            ArrowRight => "ArrowRight",
            ArrowLeft => "ArrowLeft",
            ArrowDown => "ArrowDown",
            ArrowUp => "ArrowUp",
            NumLock => "NumLock",
            IntlBackslash => "IntlBackslash",
            ContextMenu => "ContextMenu",
            ControlLeft => "ControlLeft",
            ShiftLeft => "ShiftLeft",
            AltLeft => "AltLeft",
            MetaLeft => "MetaLeft",
            ControlRight => "ControlRight",
            ShiftRight => "ShiftRight",
            AltRight => "AltRight",
            MetaRight => "MetaRight",
        }
    }

    /// Parses a name produced by [`PhysicalKey::name`], ignoring ASCII case.
    ///
    /// Returns `None` for names outside the closed set.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|key| key.name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_contains_every_variant_exactly_once() {
        let unique: HashSet<PhysicalKey> = PhysicalKey::ALL.iter().copied().collect();
        assert_eq!(unique.len(), PhysicalKey::ALL.len(), "ALL must not repeat a key");
    }

    #[test]
    fn test_all_is_sorted_by_hid_usage_id() {
        let ids: Vec<u16> = PhysicalKey::ALL.iter().map(|k| k.as_u16()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_letter_keys_occupy_hid_range_04_to_1d() {
        let letters: Vec<PhysicalKey> = PhysicalKey::ALL[..26].to_vec();
        for (i, letter) in letters.iter().enumerate() {
            let expected = 0x04u16 + i as u16;
            assert_eq!(letter.as_u16(), expected, "{letter:?} should be 0x{expected:02X}");
        }
    }

    #[test]
    fn test_state_keys_are_caps_lock_and_both_shifts() {
        let state_keys: Vec<PhysicalKey> = PhysicalKey::ALL
            .iter()
            .copied()
            .filter(|k| k.is_state_key())
            .collect();
        assert_eq!(
            state_keys,
            vec![PhysicalKey::CapsLock, PhysicalKey::ShiftLeft, PhysicalKey::ShiftRight]
        );
    }

    #[test]
    fn test_control_and_alt_are_not_state_keys() {
        for key in [
            PhysicalKey::ControlLeft,
            PhysicalKey::ControlRight,
            PhysicalKey::AltLeft,
            PhysicalKey::AltRight,
            PhysicalKey::NumLock,
        ] {
            assert!(!key.is_state_key(), "{key:?} must not be a state key");
        }
    }

    #[test]
    fn test_from_name_accepts_every_name_it_prints() {
        for key in PhysicalKey::ALL {
            assert_eq!(PhysicalKey::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn test_from_name_ignores_case_and_whitespace() {
        assert_eq!(PhysicalKey::from_name("  shiftleft "), Some(PhysicalKey::ShiftLeft));
        assert_eq!(PhysicalKey::from_name("KEYA"), Some(PhysicalKey::KeyA));
    }

    #[test]
    fn test_from_name_rejects_keys_outside_the_closed_set() {
        assert_eq!(PhysicalKey::from_name("Numpad5"), None);
        assert_eq!(PhysicalKey::from_name(""), None);
    }

    #[test]
    fn test_display_matches_name() {
        assert_eq!(PhysicalKey::BracketLeft.to_string(), "BracketLeft");
    }
}
