//! # osk-core
//!
//! Shared data model for the on-screen keyboard: physical key identifiers,
//! the physical ⇄ virtual key code map, and the built-in keyboard layouts.
//!
//! This crate has no dependencies on OS APIs, UI frameworks or async runtimes,
//! so everything in it can be tested on any platform.
//!
//! # Architecture overview (for beginners)
//!
//! The on-screen keyboard mirrors the physical keyboard and can also drive
//! it.  Three things happen concurrently:
//!
//! 1. The user clicks a key on screen and the program injects a synthetic
//!    key press into the OS.
//! 2. A system-wide hook reports every real key press so the matching
//!    on-screen key can light up.
//! 3. A timer samples Caps Lock / Shift so letters render in the right case.
//!
//! All three speak about keys using the types defined here:
//!
//! - **`keymap`** – [`PhysicalKey`] (a key *position*), [`VirtualKeyCode`] (the
//!   OS code used to inject and observe keys) and [`KeyCodeMap`] between them.
//!
//! - **`domain`** – [`Layout`], [`KeyRow`] and [`KeyDescriptor`] describing what
//!   each key looks like in a given locale, plus [`LayoutRegistry`].

pub mod domain;
pub mod keymap;

pub use domain::layout::{KeyDescriptor, KeyRow, Layout, LayoutError};
pub use domain::registry::{LayoutRegistry, DEFAULT_LAYOUT_NAME};
pub use keymap::{KeyCodeMap, PhysicalKey, VirtualKeyCode};
