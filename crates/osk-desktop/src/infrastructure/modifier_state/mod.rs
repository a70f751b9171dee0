//! Point queries of Caps Lock and Shift state.
//!
//! The OS raises no event when Caps Lock toggles from another source or when
//! Shift is released outside a key hook, so the coordinator polls
//! [`ModifierSampler::sample`] on a fixed period instead.  A sample must be
//! cheap and must never block.

use std::sync::Arc;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Snapshot of the modifier state that affects key labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModifierState {
    /// Caps Lock toggle is latched on.
    pub caps_lock_on: bool,
    /// Either Shift key is physically held.
    pub shift_down: bool,
}

impl ModifierState {
    pub const fn new(caps_lock_on: bool, shift_down: bool) -> Self {
        Self {
            caps_lock_on,
            shift_down,
        }
    }

    /// Letters render upper case when exactly one of Caps Lock and Shift is active.
    pub const fn is_uppercase(self) -> bool {
        self.caps_lock_on ^ self.shift_down
    }
}

/// Trait abstracting the modifier state query.
pub trait ModifierSampler: Send + Sync {
    /// Returns the current modifier state.
    fn sample(&self) -> ModifierState;
}

/// Sampler used on platforms without a key state query; always reports
/// both modifiers off.
#[derive(Debug, Default)]
pub struct UnsupportedModifierSampler;

impl ModifierSampler for UnsupportedModifierSampler {
    fn sample(&self) -> ModifierState {
        ModifierState::default()
    }
}

/// Returns the modifier sampler for the current platform.
pub fn platform_sampler() -> Arc<dyn ModifierSampler> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsModifierSampler)
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedModifierSampler)
    }
}
