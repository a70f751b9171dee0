//! Mock keyboard hook for unit testing.
//!
//! Allows tests to deliver synthetic [`HookEvent`]s through the installed
//! [`HookSink`] without a Win32 message loop.  Events are delivered
//! synchronously on the calling thread, which stands in for the hook thread.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use osk_core::PhysicalKey;

use super::{HookError, HookEvent, HookSink, KeyboardHook};

/// A mock implementation of [`KeyboardHook`] that lets tests emit events.
#[derive(Default)]
pub struct MockKeyboardHook {
    sink: Mutex<Option<HookSink>>,
    fail_install: AtomicBool,
}

impl MockKeyboardHook {
    /// Creates a new, uninstalled mock hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock hook whose `start()` fails, as when the OS refuses the hook.
    pub fn failing() -> Self {
        let hook = Self::default();
        hook.fail_install.store(true, Ordering::SeqCst);
        hook
    }

    /// Delivers `event` to the installed sink.
    ///
    /// Returns `false` (and drops the event) when the hook is not installed.
    pub fn emit(&self, event: HookEvent) -> bool {
        // Clone the sink out so the lock is not held while it runs.
        let sink = self.sink.lock().expect("lock poisoned").clone();
        match sink {
            Some(sink) => {
                sink(event);
                true
            }
            None => false,
        }
    }

    /// Emits a physical (non-injected) key-down.
    pub fn press(&self, key: PhysicalKey) -> bool {
        self.emit(HookEvent::KeyDown { key, injected: false })
    }

    /// Emits a physical (non-injected) key-up.
    pub fn release(&self, key: PhysicalKey) -> bool {
        self.emit(HookEvent::KeyUp { key, injected: false })
    }
}

impl KeyboardHook for MockKeyboardHook {
    fn start(&self, sink: HookSink) -> Result<(), HookError> {
        if self.fail_install.load(Ordering::SeqCst) {
            return Err(HookError::InstallFailed("mock hook configured to fail".to_string()));
        }
        let mut guard = self.sink.lock().expect("lock poisoned");
        if guard.is_some() {
            return Err(HookError::AlreadyInstalled);
        }
        *guard = Some(sink);
        Ok(())
    }

    fn stop(&self) {
        *self.sink.lock().expect("lock poisoned") = None;
    }

    fn is_installed(&self) -> bool {
        self.sink.lock().expect("lock poisoned").is_some()
    }
}
