//! Keyboard layout domain model.
//!
//! Pure data with no OS or UI dependencies: descriptors, rows, layouts and
//! the registry that resolves a layout name.
//!
//! # Where does a layout go at runtime? (for beginners)
//!
//! The desktop crate asks [`registry::LayoutRegistry`] for a layout by name,
//! builds a runtime index from it (physical key → on-screen key), and hands
//! the same layout to the view so it can draw the keys.  The layout itself is
//! never modified; switching layouts means building a new index from a
//! different `&'static Layout`.

pub mod builtin;
pub mod layout;
pub mod registry;
