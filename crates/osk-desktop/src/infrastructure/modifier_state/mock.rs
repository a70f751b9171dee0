//! Mock modifier sampler with settable state.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use super::{ModifierSampler, ModifierState};

/// A sampler whose reported state is set by the test.
#[derive(Debug, Default)]
pub struct MockModifierSampler {
    caps_lock_on: AtomicBool,
    shift_down: AtomicBool,
    samples: AtomicUsize,
}

impl MockModifierSampler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the state reported by subsequent samples.
    pub fn set(&self, state: ModifierState) {
        self.caps_lock_on.store(state.caps_lock_on, Ordering::SeqCst);
        self.shift_down.store(state.shift_down, Ordering::SeqCst);
    }

    pub fn set_caps_lock(&self, on: bool) {
        self.caps_lock_on.store(on, Ordering::SeqCst);
    }

    pub fn set_shift(&self, down: bool) {
        self.shift_down.store(down, Ordering::SeqCst);
    }

    /// Number of times `sample()` has been called.
    pub fn sample_count(&self) -> usize {
        self.samples.load(Ordering::SeqCst)
    }
}

impl ModifierSampler for MockModifierSampler {
    fn sample(&self) -> ModifierState {
        self.samples.fetch_add(1, Ordering::SeqCst);
        ModifierState {
            caps_lock_on: self.caps_lock_on.load(Ordering::SeqCst),
            shift_down: self.shift_down.load(Ordering::SeqCst),
        }
    }
}
