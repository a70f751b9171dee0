//! Physical key position to Windows Virtual Key (VK) code translation table.
//!
//! Reference: Windows Virtual-Key Codes (winuser.h).
//!
//! # Which VK codes? (for beginners)
//!
//! Windows reports the *side-specific* modifier codes from its low-level hook
//! (`VK_LSHIFT = 0xA0`, `VK_RSHIFT = 0xA1`, …), never the generic `VK_SHIFT`.
//! The table below therefore uses the side-specific codes so that a code sent
//! through `SendInput` and the code observed by the hook name the same key.
//!
//! # How the two directions work
//!
//! - [`physical_to_vk`] is an exhaustive `match`.  Adding a [`PhysicalKey`]
//!   variant without a VK arm is a compile error, so the map cannot be partial.
//! - [`vk_to_physical`] indexes `VK_TO_PHYSICAL_TABLE`, a 256-entry array built
//!   at compile time by inverting [`physical_to_vk`] over [`PhysicalKey::ALL`].
//!   Codes outside the closed set (mouse buttons, generic modifiers, numpad)
//!   hold `None`.

use super::physical::PhysicalKey;

/// Translates a physical key position to its Windows VK code.
pub const fn physical_to_vk(key: PhysicalKey) -> u8 {
    use PhysicalKey::*;
    match key {
        // ── Alphabet keys (VK_A=0x41 … VK_Z=0x5A) ────────────────────────────
        KeyA => 0x41,
        KeyB => 0x42,
        KeyC => 0x43,
        KeyD => 0x44,
        KeyE => 0x45,
        KeyF => 0x46,
        KeyG => 0x47,
        KeyH => 0x48,
        KeyI => 0x49,
        KeyJ => 0x4A,
        KeyK => 0x4B,
        KeyL => 0x4C,
        KeyM => 0x4D,
        KeyN => 0x4E,
        KeyO => 0x4F,
        KeyP => 0x50,
        KeyQ => 0x51,
        KeyR => 0x52,
        KeyS => 0x53,
        KeyT => 0x54,
        KeyU => 0x55,
        KeyV => 0x56,
        KeyW => 0x57,
        KeyX => 0x58,
        KeyY => 0x59,
        KeyZ => 0x5A,

        // ── Digit row (VK_0=0x30 … VK_9=0x39) ───────────────────────────────
        Digit0 => 0x30,
        Digit1 => 0x31,
        Digit2 => 0x32,
        Digit3 => 0x33,
        Digit4 => 0x34,
        Digit5 => 0x35,
        Digit6 => 0x36,
        Digit7 => 0x37,
        Digit8 => 0x38,
        Digit9 => 0x39,

        // ── Control keys ─────────────────────────────────────────────────────
        Enter => 0x0D,       // VK_RETURN
        Escape => 0x1B,      // VK_ESCAPE
        Backspace => 0x08,   // VK_BACK
        Tab => 0x09,         // VK_TAB
        Space => 0x20,       // VK_SPACE
        CapsLock => 0x14,    // VK_CAPITAL
        NumLock => 0x90,     // VK_NUMLOCK
        ScrollLock => 0x91,  // VK_SCROLL
        Pause => 0x13,       // VK_PAUSE
        PrintScreen => 0x2C, // VK_SNAPSHOT
        ContextMenu => 0x5D, // VK_APPS

        // ── Navigation ───────────────────────────────────────────────────────
        Insert => 0x2D,
        Delete => 0x2E,
        Home => 0x24,
        End => 0x23,
        PageUp => 0x21,   // VK_PRIOR
        PageDown => 0x22, // VK_NEXT
        ArrowLeft => 0x25,
        ArrowUp => 0x26,
        ArrowRight => 0x27,
        ArrowDown => 0x28,

        // ── Function keys (VK_F1=0x70 … VK_F12=0x7B) ─────────────────────────
        F1 => 0x70,
        F2 => 0x71,
        F3 => 0x72,
        F4 => 0x73,
        F5 => 0x74,
        F6 => 0x75,
        F7 => 0x76,
        F8 => 0x77,
        F9 => 0x78,
        F10 => 0x79,
        F11 => 0x7A,
        F12 => 0x7B,

        // ── Punctuation / OEM keys ───────────────────────────────────────────
        Minus => 0xBD,         // VK_OEM_MINUS
        Equal => 0xBB,         // VK_OEM_PLUS
        BracketLeft => 0xDB,   // VK_OEM_4
        BracketRight => 0xDD,  // VK_OEM_6
        Backslash => 0xDC,     // VK_OEM_5
        Semicolon => 0xBA,     // VK_OEM_1
        Quote => 0xDE,         // VK_OEM_7
        Backquote => 0xC0,     // VK_OEM_3
        Comma => 0xBC,         // VK_OEM_COMMA
        Period => 0xBE,        // VK_OEM_PERIOD
        Slash => 0xBF,         // VK_OEM_2
        IntlBackslash => 0xE2, // VK_OEM_102

        // ── Modifier keys (side-specific) ────────────────────────────────────
        ShiftLeft => 0xA0,    // VK_LSHIFT
        ShiftRight => 0xA1,   // VK_RSHIFT
        ControlLeft => 0xA2,  // VK_LCONTROL
        ControlRight => 0xA3, // VK_RCONTROL
        AltLeft => 0xA4,      // VK_LMENU
        AltRight => 0xA5,     // VK_RMENU
        MetaLeft => 0x5B,     // VK_LWIN
        MetaRight => 0x5C,    // VK_RWIN
    }
}

/// Translates a Windows VK code back to a physical key position.
///
/// Returns `None` for VK codes outside the closed [`PhysicalKey`] set.
pub fn vk_to_physical(vk: u8) -> Option<PhysicalKey> {
    VK_TO_PHYSICAL_TABLE[vk as usize]
}

/// Returns `true` if `SendInput` must carry `KEYEVENTF_EXTENDEDKEY` for `vk`.
///
/// Covers the navigation cluster, the Windows keys, the application key and the
/// right-hand Control/Alt.
pub fn is_extended_vk(vk: u8) -> bool {
    matches!(
        vk,
        0x21..=0x28 | 0x2D | 0x2E | 0x5B | 0x5C | 0x5D | 0xA3 | 0xA5
    )
}

/// Reverse table indexed by VK code (0x00–0xFF).
const VK_TO_PHYSICAL_TABLE: [Option<PhysicalKey>; 256] = {
    let mut t: [Option<PhysicalKey>; 256] = [None; 256];
    let mut i = 0;
    while i < PhysicalKey::ALL.len() {
        let key = PhysicalKey::ALL[i];
        t[physical_to_vk(key) as usize] = Some(key);
        i += 1;
    }
    t
};
