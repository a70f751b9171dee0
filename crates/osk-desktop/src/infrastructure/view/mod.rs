//! Headless keyboard view.
//!
//! [`TracingView`] stands in for the visual layer: it logs every highlight
//! and label transition through `tracing` and keeps the current state so the
//! front end can print a text rendering of the keyboard.
//!
//! Clones share the same state, so the binary keeps one clone for `show`
//! while the coordinator owns the other.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use osk_core::{Layout, PhysicalKey};
use tracing::{debug, info};

use crate::application::view::{HighlightSink, LabelSink, LayoutRenderer};

pub mod mock;

#[derive(Debug, Default)]
struct ViewState {
    layout: Option<Layout>,
    labels: BTreeMap<PhysicalKey, String>,
    pressed: BTreeSet<PhysicalKey>,
}

/// A view that logs transitions and remembers the resulting state.
#[derive(Debug, Clone, Default)]
pub struct TracingView {
    state: Arc<Mutex<ViewState>>,
}

impl TracingView {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ViewState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Name of the rendered layout, if any.
    pub fn layout_name(&self) -> Option<String> {
        self.lock().layout.as_ref().map(|l| l.name().to_string())
    }

    /// Current label of `key`, if it is on the rendered layout.
    pub fn label(&self, key: PhysicalKey) -> Option<String> {
        self.lock().labels.get(&key).cloned()
    }

    /// Returns `true` while `key` is highlighted.
    pub fn is_pressed(&self, key: PhysicalKey) -> bool {
        self.lock().pressed.contains(&key)
    }

    /// Every highlighted key.
    pub fn pressed_keys(&self) -> Vec<PhysicalKey> {
        self.lock().pressed.iter().copied().collect()
    }

    /// Renders the keyboard as text, one line per row.  Highlighted keys are
    /// wrapped in brackets and multi-line labels are joined with a space.
    pub fn render_text(&self) -> String {
        let state = self.lock();
        let Some(layout) = state.layout.as_ref() else {
            return "(no layout)".to_string();
        };

        let mut out = format!("layout {}\n", layout.name());
        for row in layout.rows() {
            let cells: Vec<String> = row
                .keys
                .iter()
                .map(|descriptor| {
                    let key = descriptor.physical_key;
                    let label = state
                        .labels
                        .get(&key)
                        .map(String::as_str)
                        .unwrap_or(descriptor.display_text.as_str())
                        .replace('\n', " ");
                    if state.pressed.contains(&key) {
                        format!("[{label}]")
                    } else {
                        label
                    }
                })
                .collect();
            out.push_str(&cells.join(" "));
            out.push('\n');
        }
        out
    }
}

impl HighlightSink for TracingView {
    fn set_pressed(&mut self, key: PhysicalKey) {
        if self.lock().pressed.insert(key) {
            debug!(%key, "highlight on");
        }
    }

    fn set_idle(&mut self, key: PhysicalKey) {
        if self.lock().pressed.remove(&key) {
            debug!(%key, "highlight off");
        }
    }
}

impl LabelSink for TracingView {
    fn set_label(&mut self, key: PhysicalKey, text: &str) {
        let mut state = self.lock();
        if state.labels.get(&key).map(String::as_str) != Some(text) {
            debug!(%key, text, "label changed");
            state.labels.insert(key, text.to_string());
        }
    }
}

impl LayoutRenderer for TracingView {
    fn render(&mut self, layout: &Layout) {
        let mut state = self.lock();
        state.pressed.clear();
        state.labels = layout
            .descriptors()
            .map(|d| (d.physical_key, d.display_text.clone()))
            .collect();
        state.layout = Some(layout.clone());
        info!(layout = layout.name(), rows = layout.rows().len(), "keyboard rendered");
    }
}
