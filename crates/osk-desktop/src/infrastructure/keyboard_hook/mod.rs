//! System-wide keyboard hook infrastructure.
//!
//! On Windows, this installs a low-level keyboard hook (`WH_KEYBOARD_LL`) on a
//! dedicated Win32 message-loop thread.  Every key transition on the machine,
//! whatever window has focus, is translated to a [`HookEvent`] and handed to a
//! [`HookSink`] on that thread.
//!
//! # The hook runs on its own thread (for beginners)
//!
//! The sink is called from the hook thread, **not** from the coordinator's
//! task.  A sink must therefore never touch view state directly: it marshals
//! the event onto the coordinator's channel and returns.  The OS removes a
//! low-level hook whose callback takes longer than ~300 ms, so a sink must
//! also never block.
//!
//! # Lifecycle
//!
//! ```text
//! Uninstalled ──start()──▶ Installed ──stop()──▶ Uninstalled
//! ```
//!
//! A second `start()` while installed fails with
//! [`HookError::AlreadyInstalled`]; `stop()` while uninstalled does nothing.
//!
//! # Testability
//!
//! The [`KeyboardHook`] trait lets tests drive the coordinator with
//! [`mock::MockKeyboardHook`] instead of a real OS hook.

use std::sync::Arc;

use osk_core::PhysicalKey;
use thiserror::Error;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// A key transition observed by the hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookEvent {
    /// A key went down.
    KeyDown {
        key: PhysicalKey,
        /// `true` when the event carries this program's synthetic-event marker.
        injected: bool,
    },
    /// A key was released.
    KeyUp { key: PhysicalKey, injected: bool },
}

impl HookEvent {
    /// The physical key this event is about.
    pub fn key(&self) -> PhysicalKey {
        match *self {
            HookEvent::KeyDown { key, .. } | HookEvent::KeyUp { key, .. } => key,
        }
    }

    /// Returns `true` if this program injected the event itself.
    pub fn is_injected(&self) -> bool {
        match *self {
            HookEvent::KeyDown { injected, .. } | HookEvent::KeyUp { injected, .. } => injected,
        }
    }

    /// Returns `true` for [`HookEvent::KeyDown`].
    pub fn is_down(&self) -> bool {
        matches!(self, HookEvent::KeyDown { .. })
    }
}

/// Callback invoked on the hook thread for every translated key event.
pub type HookSink = Arc<dyn Fn(HookEvent) + Send + Sync>;

/// Error type for keyboard hook operations.
#[derive(Debug, Error)]
pub enum HookError {
    /// The OS refused to install the hook.
    #[error("failed to install keyboard hook: {0}")]
    InstallFailed(String),
    /// `start()` was called while the hook is already installed.
    #[error("keyboard hook is already installed")]
    AlreadyInstalled,
    /// No hook implementation exists for this platform.
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting the system-wide keyboard hook.
///
/// The production implementation uses `WH_KEYBOARD_LL`; tests use
/// [`mock::MockKeyboardHook`].
pub trait KeyboardHook: Send + Sync {
    /// Installs the hook and starts delivering events to `sink`.
    fn start(&self, sink: HookSink) -> Result<(), HookError>;
    /// Uninstalls the hook.  No-op when not installed.
    fn stop(&self);
    /// Returns `true` while the hook is installed.
    fn is_installed(&self) -> bool;
}

/// Hook used on platforms without a low-level keyboard hook.
///
/// `start()` always fails, which puts the coordinator in click-only mode.
#[derive(Debug, Default)]
pub struct UnsupportedKeyboardHook;

impl KeyboardHook for UnsupportedKeyboardHook {
    fn start(&self, _sink: HookSink) -> Result<(), HookError> {
        Err(HookError::UnsupportedPlatform(std::env::consts::OS.to_string()))
    }

    fn stop(&self) {}

    fn is_installed(&self) -> bool {
        false
    }
}

/// Returns the keyboard hook for the current platform.
pub fn platform_hook() -> Arc<dyn KeyboardHook> {
    #[cfg(target_os = "windows")]
    {
        Arc::new(windows::WindowsKeyboardHook::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Arc::new(UnsupportedKeyboardHook)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_event_accessors() {
        let down = HookEvent::KeyDown { key: PhysicalKey::KeyA, injected: false };
        let up = HookEvent::KeyUp { key: PhysicalKey::Space, injected: true };

        assert_eq!(down.key(), PhysicalKey::KeyA);
        assert!(down.is_down());
        assert!(!down.is_injected());

        assert_eq!(up.key(), PhysicalKey::Space);
        assert!(!up.is_down());
        assert!(up.is_injected());
    }

    #[test]
    fn test_unsupported_hook_refuses_to_start() {
        // Arrange
        let hook = UnsupportedKeyboardHook;
        let sink: HookSink = Arc::new(|_| {});

        // Act
        let result = hook.start(sink);

        // Assert
        assert!(matches!(result, Err(HookError::UnsupportedPlatform(_))));
        assert!(!hook.is_installed());
        hook.stop();
    }
}
