//! Recording view for unit and integration tests.
//!
//! Every call the coordinator makes is appended to a shared log, so tests
//! can assert on the exact sequence of transitions and not only on the
//! final state.

use std::sync::{Arc, Mutex};

use osk_core::{Layout, PhysicalKey};

use crate::application::view::{HighlightSink, LabelSink, LayoutRenderer};

/// One call received by [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    Pressed(PhysicalKey),
    Idle(PhysicalKey),
    Label(PhysicalKey, String),
    Render(String),
}

/// A view that records calls; clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    calls: Arc<Mutex<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().expect("lock poisoned").clone()
    }

    /// Empties the log.
    pub fn clear(&self) {
        self.calls.lock().expect("lock poisoned").clear();
    }

    /// Highlight transitions (`Pressed`/`Idle`) for `key`, in order.
    pub fn highlights_for(&self, key: PhysicalKey) -> Vec<ViewCall> {
        self.calls()
            .into_iter()
            .filter(|call| matches!(call, ViewCall::Pressed(k) | ViewCall::Idle(k) if *k == key))
            .collect()
    }

    /// The most recent label set for `key`.
    pub fn last_label(&self, key: PhysicalKey) -> Option<String> {
        self.calls().into_iter().rev().find_map(|call| match call {
            ViewCall::Label(k, text) if k == key => Some(text),
            _ => None,
        })
    }

    /// Number of `Label` calls recorded.
    pub fn label_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, ViewCall::Label(..)))
            .count()
    }

    fn push(&self, call: ViewCall) {
        self.calls.lock().expect("lock poisoned").push(call);
    }
}

impl HighlightSink for RecordingView {
    fn set_pressed(&mut self, key: PhysicalKey) {
        self.push(ViewCall::Pressed(key));
    }

    fn set_idle(&mut self, key: PhysicalKey) {
        self.push(ViewCall::Idle(key));
    }
}

impl LabelSink for RecordingView {
    fn set_label(&mut self, key: PhysicalKey, text: &str) {
        self.push(ViewCall::Label(key, text.to_string()));
    }
}

impl LayoutRenderer for RecordingView {
    fn render(&mut self, layout: &Layout) {
        self.push(ViewCall::Render(layout.name().to_string()));
    }
}
