//! Keyboard layout model: key descriptors, rows and whole layouts.
//!
//! A [`Layout`] is an ordered list of [`KeyRow`]s (top to bottom), and each
//! row is an ordered list of [`KeyDescriptor`]s (left to right).  Layouts are
//! built once as static data and never mutated afterwards.
//!
//! # Letters vs. shift-substitutable keys (for beginners)
//!
//! Keys change their label in one of two ways when modifiers are active:
//!
//! - **Letters** (`is_letter == true`) are *case-folded*: "q" becomes "Q"
//!   when exactly one of Caps Lock / Shift is active.
//! - **Symbol keys** with a non-empty `shift_display_text` are *substituted*:
//!   "1" becomes "!" while Shift is held.  Caps Lock does not affect them.
//!
//! Everything else (Tab, Enter, icon keys…) keeps its label.

use std::collections::HashSet;

use thiserror::Error;

use crate::keymap::{KeyCodeMap, PhysicalKey, VirtualKeyCode};

/// Errors reported by [`Layout::validate`].
///
/// These describe inconsistencies in static layout data; they are caught by
/// tests, never handled at runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// A state key (Caps Lock or a Shift) appears more than once.
    #[error("layout {layout}: state key {key} appears more than once")]
    DuplicateStateKey { layout: String, key: PhysicalKey },

    /// A letter key carries a shifted glyph; letters are case-folded instead.
    #[error("layout {layout}: letter key {key} must not have a shifted glyph")]
    LetterWithShiftGlyph { layout: String, key: PhysicalKey },

    /// A descriptor's virtual key code disagrees with the [`KeyCodeMap`].
    #[error("layout {layout}: {key} carries {actual}, key code map says {expected}")]
    VirtualCodeMismatch {
        layout: String,
        key: PhysicalKey,
        expected: VirtualKeyCode,
        actual: VirtualKeyCode,
    },

    /// The layout has no rows or a row has no keys.
    #[error("layout {layout}: row {row} is empty")]
    EmptyRow { layout: String, row: usize },
}

/// One on-screen key.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDescriptor {
    /// Unshifted label, or an icon token the view layer renders itself.
    pub display_text: String,
    /// Label shown while Shift is held; empty when the key has none.
    pub shift_display_text: String,
    /// Code sent to the OS when the key is clicked.
    pub virtual_key_code: VirtualKeyCode,
    /// Position this key describes.
    pub physical_key: PhysicalKey,
    /// Width relative to a standard key.  Sizing only; no behavioural effect.
    pub width_factor: f32,
    /// `true` for alphabetic keys that are case-folded rather than substituted.
    pub is_letter: bool,
}

impl KeyDescriptor {
    /// A key with a fixed label (Tab, Enter, modifiers, icon keys).
    pub fn key(physical_key: PhysicalKey, display_text: &str) -> Self {
        Self {
            display_text: display_text.to_string(),
            shift_display_text: String::new(),
            virtual_key_code: KeyCodeMap::physical_to_virtual(physical_key),
            physical_key,
            width_factor: 1.0,
            is_letter: false,
        }
    }

    /// An alphabetic key whose label is case-folded by Caps Lock / Shift.
    pub fn letter(physical_key: PhysicalKey, display_text: &str) -> Self {
        Self {
            is_letter: true,
            ..Self::key(physical_key, display_text)
        }
    }

    /// A symbol key whose label is replaced by `shift_display_text` under Shift.
    pub fn shifted(physical_key: PhysicalKey, display_text: &str, shift_display_text: &str) -> Self {
        Self {
            shift_display_text: shift_display_text.to_string(),
            ..Self::key(physical_key, display_text)
        }
    }

    /// Sets the relative width.
    pub fn width(mut self, width_factor: f32) -> Self {
        self.width_factor = width_factor;
        self
    }

    /// Returns `true` for Caps Lock and both Shift keys.
    pub fn is_state_key(&self) -> bool {
        self.physical_key.is_state_key()
    }

    /// Returns `true` if the key swaps its label while Shift is held.
    pub fn is_shift_substitutable(&self) -> bool {
        !self.shift_display_text.is_empty()
    }

    /// The lower-case base letter of a letter key.
    pub fn base_letter(&self) -> String {
        self.display_text.to_lowercase()
    }
}

/// An ordered, left-to-right sequence of keys.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct KeyRow {
    pub keys: Vec<KeyDescriptor>,
}

impl KeyRow {
    pub fn new(keys: Vec<KeyDescriptor>) -> Self {
        Self { keys }
    }

    /// Sum of the width factors of every key in the row.
    pub fn total_width(&self) -> f32 {
        self.keys.iter().map(|k| k.width_factor).sum()
    }
}

/// A named, top-to-bottom arrangement of key rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    name: String,
    rows: Vec<KeyRow>,
}

impl Layout {
    /// Creates a layout from its name and rows.
    pub fn new(name: &str, rows: Vec<KeyRow>) -> Self {
        Self {
            name: name.to_string(),
            rows,
        }
    }

    /// The registry name of this layout (e.g. `"US"`).
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The rows, top to bottom.
    pub fn rows(&self) -> &[KeyRow] {
        &self.rows
    }

    /// Every descriptor in row-major order.
    pub fn descriptors(&self) -> impl Iterator<Item = &KeyDescriptor> {
        self.rows.iter().flat_map(|row| row.keys.iter())
    }

    /// Returns `true` if any descriptor describes `key`.
    pub fn contains(&self, key: PhysicalKey) -> bool {
        self.descriptors().any(|d| d.physical_key == key)
    }

    /// Checks the static-data invariants of the layout.
    ///
    /// # Errors
    ///
    /// Returns the first [`LayoutError`] found.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let mut seen_state_keys = HashSet::new();

        for (index, row) in self.rows.iter().enumerate() {
            if row.keys.is_empty() {
                return Err(LayoutError::EmptyRow {
                    layout: self.name.clone(),
                    row: index,
                });
            }
        }
        if self.rows.is_empty() {
            return Err(LayoutError::EmptyRow {
                layout: self.name.clone(),
                row: 0,
            });
        }

        for descriptor in self.descriptors() {
            let key = descriptor.physical_key;

            let expected = KeyCodeMap::physical_to_virtual(key);
            if descriptor.virtual_key_code != expected {
                return Err(LayoutError::VirtualCodeMismatch {
                    layout: self.name.clone(),
                    key,
                    expected,
                    actual: descriptor.virtual_key_code,
                });
            }

            if descriptor.is_letter && descriptor.is_shift_substitutable() {
                return Err(LayoutError::LetterWithShiftGlyph {
                    layout: self.name.clone(),
                    key,
                });
            }

            if descriptor.is_state_key() && !seen_state_keys.insert(key) {
                return Err(LayoutError::DuplicateStateKey {
                    layout: self.name.clone(),
                    key,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_layout() -> Layout {
        Layout::new(
            "TEST",
            vec![
                KeyRow::new(vec![
                    KeyDescriptor::shifted(PhysicalKey::Digit1, "1", "!"),
                    KeyDescriptor::key(PhysicalKey::Backspace, "\u{E756}").width(2.0),
                ]),
                KeyRow::new(vec![
                    KeyDescriptor::key(PhysicalKey::CapsLock, "Caps").width(1.75),
                    KeyDescriptor::letter(PhysicalKey::KeyA, "a"),
                ]),
            ],
        )
    }

    #[test]
    fn test_key_builder_takes_virtual_code_from_key_code_map() {
        let descriptor = KeyDescriptor::key(PhysicalKey::Enter, "Enter");
        assert_eq!(descriptor.virtual_key_code, VirtualKeyCode::new(0x0D));
        assert_eq!(descriptor.width_factor, 1.0);
        assert!(!descriptor.is_letter);
    }

    #[test]
    fn test_letter_builder_marks_letter_and_has_no_shift_glyph() {
        let descriptor = KeyDescriptor::letter(PhysicalKey::KeyQ, "q");
        assert!(descriptor.is_letter);
        assert!(!descriptor.is_shift_substitutable());
        assert_eq!(descriptor.base_letter(), "q");
    }

    #[test]
    fn test_base_letter_lowercases_non_ascii_letters() {
        let descriptor = KeyDescriptor::letter(PhysicalKey::Semicolon, "Ñ");
        assert_eq!(descriptor.base_letter(), "ñ");
    }

    #[test]
    fn test_descriptors_iterates_row_major() {
        let layout = sample_layout();
        let keys: Vec<PhysicalKey> = layout.descriptors().map(|d| d.physical_key).collect();
        assert_eq!(
            keys,
            vec![
                PhysicalKey::Digit1,
                PhysicalKey::Backspace,
                PhysicalKey::CapsLock,
                PhysicalKey::KeyA
            ]
        );
    }

    #[test]
    fn test_row_total_width_sums_width_factors() {
        let layout = sample_layout();
        assert_eq!(layout.rows()[0].total_width(), 3.0);
    }

    #[test]
    fn test_validate_accepts_consistent_layout() {
        assert_eq!(sample_layout().validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_duplicate_state_key() {
        // Arrange
        let layout = Layout::new(
            "DUP",
            vec![KeyRow::new(vec![
                KeyDescriptor::key(PhysicalKey::ShiftLeft, "Shift"),
                KeyDescriptor::key(PhysicalKey::ShiftLeft, "Shift"),
            ])],
        );

        // Act
        let result = layout.validate();

        // Assert
        assert!(matches!(
            result,
            Err(LayoutError::DuplicateStateKey { key: PhysicalKey::ShiftLeft, .. })
        ));
    }

    #[test]
    fn test_validate_allows_non_state_key_repeated_across_rows() {
        // The Spanish layout draws Enter on two rows.
        let layout = Layout::new(
            "ENTER",
            vec![
                KeyRow::new(vec![KeyDescriptor::key(PhysicalKey::Enter, "Enter")]),
                KeyRow::new(vec![KeyDescriptor::key(PhysicalKey::Enter, "Enter")]),
            ],
        );
        assert_eq!(layout.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_virtual_code_mismatch() {
        let mut descriptor = KeyDescriptor::letter(PhysicalKey::KeyA, "a");
        descriptor.virtual_key_code = VirtualKeyCode::new(0x42);
        let layout = Layout::new("BAD", vec![KeyRow::new(vec![descriptor])]);

        assert!(matches!(
            layout.validate(),
            Err(LayoutError::VirtualCodeMismatch { key: PhysicalKey::KeyA, .. })
        ));
    }

    #[test]
    fn test_validate_rejects_letter_with_shift_glyph() {
        let mut descriptor = KeyDescriptor::letter(PhysicalKey::KeyA, "a");
        descriptor.shift_display_text = "@".to_string();
        let layout = Layout::new("BAD", vec![KeyRow::new(vec![descriptor])]);

        assert!(matches!(
            layout.validate(),
            Err(LayoutError::LetterWithShiftGlyph { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_empty_row() {
        let layout = Layout::new("EMPTY", vec![KeyRow::default()]);
        assert!(matches!(layout.validate(), Err(LayoutError::EmptyRow { row: 0, .. })));
    }

    #[test]
    fn test_contains_reports_membership() {
        let layout = sample_layout();
        assert!(layout.contains(PhysicalKey::KeyA));
        assert!(!layout.contains(PhysicalKey::F5));
    }
}
