//! Infrastructure layer for the on-screen keyboard.
//!
//! Contains OS-facing adapters: the low-level keyboard hook, synthetic input
//! injection, modifier state queries, the headless view and configuration
//! storage.  Each adapter has a Windows implementation, a mock for tests, and
//! a fallback for platforms without the underlying API.

pub mod input_simulation;
pub mod keyboard_hook;
pub mod modifier_state;
pub mod storage;
pub mod view;
