//! RuntimeKeyIndex: the coordinator's per-layout lookup tables.
//!
//! The index answers every question the coordinator asks at runtime:
//!
//! - Is this physical key on the current keyboard, and which code does it send?
//! - Which keys are letters (case-folded) and which are shift-substitutable?
//! - Which keys are the Caps Lock / Shift state keys?
//! - (compatibility only) Which key carries this display text?
//!
//! # Replace, never patch
//!
//! The index is built in one go from a [`Layout`] and replaced wholesale on
//! every layout switch.  There is no incremental update, so a half-built
//! index is never observable.  Each index carries the `epoch` it was built
//! for; delayed work stamped with an older epoch is discarded.

use std::collections::HashMap;

use osk_core::{Layout, PhysicalKey, VirtualKeyCode};

/// Per-key data needed on the click and hook paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexedKey {
    pub virtual_key_code: VirtualKeyCode,
    /// Caps Lock or Shift; highlight driven by sampled modifier state only.
    pub state_key: bool,
}

/// A case-folded letter key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LetterEntry {
    pub key: PhysicalKey,
    /// Lower-case form of the letter.
    pub base: String,
}

impl LetterEntry {
    /// Label for the given case.
    pub fn label(&self, uppercase: bool) -> String {
        if uppercase {
            self.base.to_uppercase()
        } else {
            self.base.clone()
        }
    }
}

/// A key whose label is swapped while Shift is held.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShiftableEntry {
    pub key: PhysicalKey,
    pub unshifted: String,
    pub shifted: String,
}

impl ShiftableEntry {
    pub fn label(&self, shift_down: bool) -> &str {
        if shift_down {
            &self.shifted
        } else {
            &self.unshifted
        }
    }
}

/// Lookup tables for one loaded layout.
#[derive(Debug, Clone, Default)]
pub struct RuntimeKeyIndex {
    epoch: u64,
    keys: HashMap<PhysicalKey, IndexedKey>,
    letters: Vec<LetterEntry>,
    shiftables: Vec<ShiftableEntry>,
    caps_lock: Option<PhysicalKey>,
    shifts: Vec<PhysicalKey>,
    labels: HashMap<String, PhysicalKey>,
}

impl RuntimeKeyIndex {
    /// Builds the index for `layout`, stamped with `epoch`.
    ///
    /// A key drawn more than once (the Spanish two-row Enter) gets a single
    /// entry; the view lights every widget for that key.
    pub fn build(layout: &Layout, epoch: u64) -> Self {
        let mut index = Self {
            epoch,
            ..Self::default()
        };

        for descriptor in layout.descriptors() {
            let key = descriptor.physical_key;
            let state_key = descriptor.is_state_key();

            let first_occurrence = index
                .keys
                .insert(
                    key,
                    IndexedKey {
                        virtual_key_code: descriptor.virtual_key_code,
                        state_key,
                    },
                )
                .is_none();
            if !first_occurrence {
                continue;
            }

            if descriptor.is_letter {
                let base = descriptor.base_letter();
                index.labels.entry(base.to_uppercase()).or_insert(key);
                index.labels.entry(base.clone()).or_insert(key);
                index.letters.push(LetterEntry { key, base });
            } else {
                index
                    .labels
                    .entry(descriptor.display_text.clone())
                    .or_insert(key);
                if descriptor.is_shift_substitutable() {
                    index
                        .labels
                        .entry(descriptor.shift_display_text.clone())
                        .or_insert(key);
                    index.shiftables.push(ShiftableEntry {
                        key,
                        unshifted: descriptor.display_text.clone(),
                        shifted: descriptor.shift_display_text.clone(),
                    });
                }
            }

            if key == PhysicalKey::CapsLock {
                index.caps_lock = Some(key);
            } else if key.is_shift() {
                index.shifts.push(key);
            }
        }

        index
    }

    /// Drops every entry.  The epoch is kept so stale work still compares
    /// against the last layout that was loaded.
    pub fn clear(&mut self) {
        self.keys.clear();
        self.letters.clear();
        self.shiftables.clear();
        self.caps_lock = None;
        self.shifts.clear();
        self.labels.clear();
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn get(&self, key: PhysicalKey) -> Option<&IndexedKey> {
        self.keys.get(&key)
    }

    pub fn contains(&self, key: PhysicalKey) -> bool {
        self.keys.contains_key(&key)
    }

    pub fn letters(&self) -> &[LetterEntry] {
        &self.letters
    }

    pub fn shiftables(&self) -> &[ShiftableEntry] {
        &self.shiftables
    }

    pub fn caps_lock(&self) -> Option<PhysicalKey> {
        self.caps_lock
    }

    pub fn shifts(&self) -> &[PhysicalKey] {
        &self.shifts
    }

    /// Resolves a rendered label back to a key.
    ///
    /// Compatibility path for callers that only know what a key shows.  When
    /// two keys share a label (both Shifts, both Ctrls) the left-most one in
    /// row-major order wins.
    pub fn key_for_label(&self, text: &str) -> Option<PhysicalKey> {
        self.labels.get(text).copied()
    }

    /// Compares two indexes entry by entry, ignoring their epochs.
    pub fn same_entries(&self, other: &Self) -> bool {
        self.keys == other.keys
            && self.letters == other.letters
            && self.shiftables == other.shiftables
            && self.caps_lock == other.caps_lock
            && self.shifts == other.shifts
            && self.labels == other.labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use osk_core::LayoutRegistry;

    #[test]
    fn test_build_indexes_every_distinct_key() {
        // Arrange
        let layout = LayoutRegistry::get_layout("ES");
        let distinct: std::collections::HashSet<PhysicalKey> =
            layout.descriptors().map(|d| d.physical_key).collect();

        // Act
        let index = RuntimeKeyIndex::build(layout, 1);

        // Assert
        assert_eq!(index.len(), distinct.len());
        assert_eq!(index.epoch(), 1);
        assert!(index.contains(PhysicalKey::IntlBackslash));
    }

    #[test]
    fn test_build_classifies_letters_and_shiftables() {
        let index = RuntimeKeyIndex::build(LayoutRegistry::get_layout("US"), 0);

        assert_eq!(index.letters().len(), 26);
        assert!(index.letters().iter().all(|l| l.base.chars().all(|c| c.is_lowercase())));

        let one = index
            .shiftables()
            .iter()
            .find(|s| s.key == PhysicalKey::Digit1)
            .expect("Digit1 is shift-substitutable");
        assert_eq!(one.label(false), "1");
        assert_eq!(one.label(true), "!");
        assert!(index.shiftables().iter().all(|s| !index.get(s.key).unwrap().state_key));
    }

    #[test]
    fn test_build_records_state_key_handles() {
        let index = RuntimeKeyIndex::build(LayoutRegistry::get_layout("US"), 0);

        assert_eq!(index.caps_lock(), Some(PhysicalKey::CapsLock));
        assert_eq!(index.shifts(), &[PhysicalKey::ShiftLeft, PhysicalKey::ShiftRight]);
        assert!(index.get(PhysicalKey::CapsLock).unwrap().state_key);
        assert!(!index.get(PhysicalKey::Enter).unwrap().state_key);
    }

    #[test]
    fn test_letter_label_follows_case() {
        let entry = LetterEntry { key: PhysicalKey::Semicolon, base: "ñ".to_string() };
        assert_eq!(entry.label(false), "ñ");
        assert_eq!(entry.label(true), "Ñ");
    }

    #[test]
    fn test_key_for_label_prefers_left_hand_duplicate() {
        let index = RuntimeKeyIndex::build(LayoutRegistry::get_layout("US"), 0);

        assert_eq!(index.key_for_label("Shift"), Some(PhysicalKey::ShiftLeft));
        assert_eq!(index.key_for_label("Ctrl"), Some(PhysicalKey::ControlLeft));
        assert_eq!(index.key_for_label("q"), Some(PhysicalKey::KeyQ));
        assert_eq!(index.key_for_label("Q"), Some(PhysicalKey::KeyQ));
        assert_eq!(index.key_for_label("!"), Some(PhysicalKey::Digit1));
        assert_eq!(index.key_for_label("nope"), None);
    }

    #[test]
    fn test_clear_empties_every_table() {
        // Arrange
        let mut index = RuntimeKeyIndex::build(LayoutRegistry::get_layout("ES"), 4);

        // Act
        index.clear();

        // Assert
        assert!(index.is_empty());
        assert!(index.letters().is_empty());
        assert!(index.shiftables().is_empty());
        assert_eq!(index.caps_lock(), None);
        assert!(index.shifts().is_empty());
        assert_eq!(index.key_for_label("a"), None);
        assert_eq!(index.epoch(), 4);
    }

    #[test]
    fn test_same_entries_ignores_epoch() {
        let layout = LayoutRegistry::get_layout("ES");
        assert!(RuntimeKeyIndex::build(layout, 1).same_entries(&RuntimeKeyIndex::build(layout, 9)));
        assert!(!RuntimeKeyIndex::build(layout, 1)
            .same_entries(&RuntimeKeyIndex::build(LayoutRegistry::get_layout("US"), 1)));
    }
}
