//! Mock input simulator for unit testing.
//!
//! # Why a mock simulator?
//!
//! The real simulator injects key presses into the OS input stream.  In a test
//! that would type into whatever window has focus on the test machine, and the
//! result cannot be observed from Rust code anyway.
//!
//! `MockInputSimulator` records every emitted transition in order instead, so
//! tests can assert that a click produced exactly one down followed by exactly
//! one up for the right code.
//!
//! # Emulating the hook echo
//!
//! On a real system the hook may observe the synthetic key-down while the
//! simulation is still in flight.  [`MockInputSimulator::on_between`] installs
//! a callback that runs after the down record and before the up record; tests
//! use it to emit a hook event at exactly that moment.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Mutex,
};

use osk_core::VirtualKeyCode;

use super::{InputSimulator, SimulationError};

/// Direction of one recorded synthetic transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyDirection {
    Down,
    Up,
}

type BetweenCallback = Box<dyn Fn(VirtualKeyCode) + Send + Sync>;

/// A mock simulator that records transitions without calling the OS.
#[derive(Default)]
pub struct MockInputSimulator {
    transitions: Mutex<Vec<(VirtualKeyCode, KeyDirection)>>,
    between: Mutex<Option<BetweenCallback>>,
    should_fail: AtomicBool,
}

impl MockInputSimulator {
    /// Creates a mock with no records and failures disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `simulate()` call fail without recording.
    pub fn set_should_fail(&self, fail: bool) {
        self.should_fail.store(fail, Ordering::SeqCst);
    }

    /// Installs a callback run between the down and the up record.
    pub fn on_between(&self, callback: impl Fn(VirtualKeyCode) + Send + Sync + 'static) {
        *self.between.lock().expect("lock poisoned") = Some(Box::new(callback));
    }

    /// Every recorded transition, in emission order.
    pub fn transitions(&self) -> Vec<(VirtualKeyCode, KeyDirection)> {
        self.transitions.lock().expect("lock poisoned").clone()
    }

    /// Codes of every completed simulate call, in order.
    pub fn simulated_codes(&self) -> Vec<VirtualKeyCode> {
        self.transitions()
            .into_iter()
            .filter(|&(_, direction)| direction == KeyDirection::Down)
            .map(|(code, _)| code)
            .collect()
    }
}

impl InputSimulator for MockInputSimulator {
    fn simulate(&self, code: VirtualKeyCode) -> Result<(), SimulationError> {
        if self.should_fail.load(Ordering::SeqCst) {
            return Err(SimulationError::Platform("mock simulator configured to fail".to_string()));
        }

        self.transitions
            .lock()
            .expect("lock poisoned")
            .push((code, KeyDirection::Down));

        if let Some(callback) = self.between.lock().expect("lock poisoned").as_ref() {
            callback(code);
        }

        self.transitions
            .lock()
            .expect("lock poisoned")
            .push((code, KeyDirection::Up));
        Ok(())
    }
}
