//! Capabilities the coordinator needs from whatever draws the keyboard.
//!
//! The coordinator never holds widget handles.  It addresses keys by
//! [`PhysicalKey`] through these traits, and the view decides which widgets
//! (possibly several, e.g. the two-row Spanish Enter) represent that key.

use osk_core::{Layout, PhysicalKey};

/// Shows or clears the "pressed" highlight of a key.
pub trait HighlightSink {
    fn set_pressed(&mut self, key: PhysicalKey);
    fn set_idle(&mut self, key: PhysicalKey);
}

/// Replaces the label of a letter or shift-substitutable key.
pub trait LabelSink {
    fn set_label(&mut self, key: PhysicalKey, text: &str);
}

/// Builds the visual keyboard for a layout.
///
/// Called once per layout switch, after the coordinator has dropped every
/// reference to the previous layout's keys.
pub trait LayoutRenderer {
    fn render(&mut self, layout: &Layout);
}

/// Everything the coordinator drives.  Implemented automatically for any
/// type providing all three capabilities.
pub trait KeyboardView: HighlightSink + LabelSink + LayoutRenderer + Send {}

impl<T> KeyboardView for T where T: HighlightSink + LabelSink + LayoutRenderer + Send {}
