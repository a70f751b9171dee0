//! Windows modifier state queries.
//!
//! - Caps Lock: low bit of `GetKeyState(VK_CAPITAL)` is the toggle state.
//! - Shift: high bit of `GetAsyncKeyState(VK_SHIFT)` (negative result) means
//!   the key is down right now, regardless of which thread owns the focus.

#![cfg(target_os = "windows")]

use windows::Win32::UI::Input::KeyboardAndMouse::{
    GetAsyncKeyState, GetKeyState, VK_CAPITAL, VK_SHIFT,
};

use super::{ModifierSampler, ModifierState};

/// Windows implementation of [`ModifierSampler`].
#[derive(Debug, Default)]
pub struct WindowsModifierSampler;

impl ModifierSampler for WindowsModifierSampler {
    fn sample(&self) -> ModifierState {
        // SAFETY: Both calls are pure queries with no pointer arguments.
        let (caps, shift) = unsafe {
            (
                GetKeyState(VK_CAPITAL.0 as i32),
                GetAsyncKeyState(VK_SHIFT.0 as i32),
            )
        };
        ModifierState {
            caps_lock_on: caps & 1 != 0,
            shift_down: shift < 0,
        }
    }
}
