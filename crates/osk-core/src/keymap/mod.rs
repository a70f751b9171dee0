//! Key identifiers and the process-wide physical ⇄ virtual key code map.
//!
//! Everything inside the keyboard model speaks [`PhysicalKey`].  The
//! platform-facing [`VirtualKeyCode`] only appears at the two OS boundaries:
//! when a click is turned into a synthetic key press, and when the system
//! hook reports a hardware key event.

pub mod physical;
pub mod windows_vk;

use std::fmt;

pub use physical::PhysicalKey;

/// Platform virtual key code understood by the input-simulation primitive.
///
/// On Windows this is the `VK_*` value from `winuser.h`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VirtualKeyCode(u8);

impl VirtualKeyCode {
    /// Wraps a raw VK value.
    pub const fn new(raw: u8) -> Self {
        Self(raw)
    }

    /// Returns the raw VK value.
    pub const fn value(self) -> u8 {
        self.0
    }
}

impl fmt::Display for VirtualKeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VK 0x{:02X}", self.0)
    }
}

/// Static bidirectional map between [`PhysicalKey`] and [`VirtualKeyCode`].
///
/// The map is immutable and has no runtime initialisation: both directions
/// are compile-time tables.
pub struct KeyCodeMap;

impl KeyCodeMap {
    /// Returns the virtual key code for `key`.
    ///
    /// Total over [`PhysicalKey`]; there is no error path.
    pub const fn physical_to_virtual(key: PhysicalKey) -> VirtualKeyCode {
        VirtualKeyCode(windows_vk::physical_to_vk(key))
    }

    /// Returns the physical key for a code observed at the OS boundary, or
    /// `None` if the code is outside the closed key set.
    pub fn virtual_to_physical(code: VirtualKeyCode) -> Option<PhysicalKey> {
        windows_vk::vk_to_physical(code.0)
    }

    /// Returns `true` if the code must be injected with the extended-key flag.
    pub fn is_extended(code: VirtualKeyCode) -> bool {
        windows_vk::is_extended_vk(code.0)
    }
}
