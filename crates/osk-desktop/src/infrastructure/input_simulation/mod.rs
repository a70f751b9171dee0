//! Synthetic key press injection.
//!
//! [`InputSimulator::simulate`] submits one key-down immediately followed by
//! one key-up for a virtual key code, as if a physical key had been tapped.
//! It is synchronous with respect to *submission* only: the hook observes the
//! resulting events later, on its own thread.
//!
//! # Tagging synthetic events
//!
//! Every event this program injects carries [`SYNTHETIC_EVENT_MARKER`] in its
//! extra-info field.  The keyboard hook reads the marker back and flags the
//! event as `injected`, which lets the coordinator recognise its own presses
//! even when they arrive after the suppression window has closed.
//!
//! The correct implementation is selected at compile time via
//! `#[cfg(target_os = ...)]`.

use std::sync::Arc;

use osk_core::VirtualKeyCode;
use thiserror::Error;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Value placed in `dwExtraInfo` of every injected event ("OSK" + 0x5E).
pub const SYNTHETIC_EVENT_MARKER: usize = 0x4F53_4B5E;

/// Error type for input simulation.
///
/// Callers log and discard these; a click still flashes when injection fails.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// The OS accepted fewer events than were submitted.
    #[error("OS accepted {accepted} of {submitted} synthetic key events for {code}")]
    Rejected {
        code: VirtualKeyCode,
        submitted: u32,
        accepted: u32,
    },
    /// A platform API call failed.
    #[error("platform error: {0}")]
    Platform(String),
    /// No input injection exists for this platform.
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting OS-level synthetic key presses.
///
/// The production implementation uses `SendInput`; tests use
/// [`mock::MockInputSimulator`].
pub trait InputSimulator: Send + Sync {
    /// Emits a key-down followed by a key-up for `code`.
    fn simulate(&self, code: VirtualKeyCode) -> Result<(), SimulationError>;
}

/// Simulator used on platforms without input injection.
#[derive(Debug, Default)]
pub struct UnsupportedInputSimulator;

impl InputSimulator for UnsupportedInputSimulator {
    fn simulate(&self, _code: VirtualKeyCode) -> Result<(), SimulationError> {
        Err(SimulationError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }
}

/// Returns the input simulator for the current platform.
pub fn platform_simulator() -> Arc<dyn InputSimulator> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsInputSimulator::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedInputSimulator)
    }
}
