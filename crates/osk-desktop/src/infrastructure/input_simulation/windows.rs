//! Windows input simulation via the SendInput API.
//!
//! A simulated tap is a single `SendInput` call carrying two `KEYBDINPUT`
//! records, down then up.  Submitting both in one call keeps another
//! program's injected input from landing between them.

#![cfg(target_os = "windows")]

use osk_core::{KeyCodeMap, VirtualKeyCode};
use tracing::debug;
use windows::Win32::UI::Input::KeyboardAndMouse::{
    SendInput, INPUT, INPUT_0, INPUT_KEYBOARD, KEYBDINPUT, KEYBD_EVENT_FLAGS,
    KEYEVENTF_EXTENDEDKEY, KEYEVENTF_KEYUP, VIRTUAL_KEY,
};

use super::{InputSimulator, SimulationError, SYNTHETIC_EVENT_MARKER};

/// Windows implementation of [`InputSimulator`] using SendInput.
pub struct WindowsInputSimulator;

impl WindowsInputSimulator {
    pub fn new() -> Self {
        Self
    }
}

impl Default for WindowsInputSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl InputSimulator for WindowsInputSimulator {
    fn simulate(&self, code: VirtualKeyCode) -> Result<(), SimulationError> {
        let inputs = [key_input(code, false), key_input(code, true)];

        // SAFETY: `inputs` is a valid array of INPUT structures on the stack and
        // cbsize is the size of one element, as SendInput requires.
        let accepted = unsafe { SendInput(&inputs, std::mem::size_of::<INPUT>() as i32) };

        if accepted as usize != inputs.len() {
            return Err(SimulationError::Rejected {
                code,
                submitted: inputs.len() as u32,
                accepted,
            });
        }
        debug!(%code, "synthetic key tap submitted");
        Ok(())
    }
}

// ── Helpers ───────────────────────────────────────────────────────────────────

fn key_flags(code: VirtualKeyCode, key_up: bool) -> KEYBD_EVENT_FLAGS {
    let mut flags = KEYBD_EVENT_FLAGS::default();
    if key_up {
        flags |= KEYEVENTF_KEYUP;
    }
    // Navigation keys and the right-hand modifiers need the extended flag or
    // Windows delivers the numpad / left-hand variant instead.
    if KeyCodeMap::is_extended(code) {
        flags |= KEYEVENTF_EXTENDEDKEY;
    }
    flags
}

fn key_input(code: VirtualKeyCode, key_up: bool) -> INPUT {
    INPUT {
        r#type: INPUT_KEYBOARD,
        Anonymous: INPUT_0 {
            ki: KEYBDINPUT {
                wVk: VIRTUAL_KEY(code.value() as u16),
                wScan: 0,
                dwFlags: key_flags(code, key_up),
                time: 0,
                dwExtraInfo: SYNTHETIC_EVENT_MARKER,
            },
        },
    }
}
