//! SynchronizationCoordinator: keeps the on-screen keyboard in step with the
//! physical one.
//!
//! # Three input channels (for beginners)
//!
//! The keyboard view is driven from three places at once:
//!
//! 1. **Clicks** on on-screen keys, which inject a synthetic key press.
//! 2. **The system hook**, which reports every physical key event, including
//!    the synthetic presses this program injected itself.
//! 3. **The modifier sampler**, polled periodically for Caps Lock / Shift.
//!
//! Without care, (1) feeds back into (2): a click flashes the key, the OS
//! echoes the synthetic press through the hook, and the key flashes again.
//! The coordinator prevents this with two filters:
//!
//! - A [`SuppressionGate`] that is closed while a simulation is in flight.
//!   The hook thread checks it before marshaling an event, and the
//!   coordinator checks it again when the event arrives.  This is a time
//!   window, not a causal link.
//! - The `injected` marker on [`HookEvent`], set when the OS hands back an
//!   event carrying this program's synthetic-event tag.  This catches echoes
//!   that arrive after the window has closed.
//!
//! # State machine
//!
//! ```text
//!            press()                 simulate() returns
//!   Idle ─────────────▶ Simulating ─────────────────────▶ Idle
//! ```
//!
//! There is no queue: the gate is a single flag, and a press is one
//! synchronous call on the coordinator's own task.
//!
//! # Threading
//!
//! The coordinator itself is single-threaded.  It is owned by the runtime
//! task (see [`crate::application::runtime`]), which serialises clicks,
//! marshaled hook events, sampler ticks and delayed flash steps.  Only the
//! [`SuppressionGate`] is shared with the hook thread.

use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use osk_core::{Layout, LayoutRegistry, PhysicalKey};
use tracing::{debug, info, warn};

use crate::application::key_index::RuntimeKeyIndex;
use crate::application::view::KeyboardView;
use crate::infrastructure::input_simulation::InputSimulator;
use crate::infrastructure::keyboard_hook::HookEvent;
use crate::infrastructure::modifier_state::{ModifierSampler, ModifierState};

// ── Suppression gate ──────────────────────────────────────────────────────────

/// Whether a synthetic key press is currently being submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Idle,
    Simulating,
}

/// Shared flag that is set for the duration of a simulated press.
///
/// Cloning shares the flag.  The hook thread holds a clone and drops events
/// while [`SuppressionGate::is_simulating`] returns `true`.
#[derive(Debug, Clone, Default)]
pub struct SuppressionGate {
    simulating: Arc<AtomicBool>,
}

impl SuppressionGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_simulating(&self) -> bool {
        self.simulating.load(Ordering::SeqCst)
    }

    /// Closes the gate until the returned guard is dropped.
    fn hold(&self) -> SuppressionGuard<'_> {
        self.simulating.store(true, Ordering::SeqCst);
        SuppressionGuard { gate: self }
    }
}

struct SuppressionGuard<'a> {
    gate: &'a SuppressionGate,
}

impl Drop for SuppressionGuard<'_> {
    fn drop(&mut self) {
        self.gate.simulating.store(false, Ordering::SeqCst);
    }
}

// ── Flash tickets ─────────────────────────────────────────────────────────────

/// Identifies one click-initiated flash so its delayed steps can tell
/// whether they are still current.
///
/// A ticket is stale once the layout has changed, the coordinator has shut
/// down, or a newer click on the same key has superseded it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlashTicket {
    key: PhysicalKey,
    epoch: u64,
    sequence: u64,
    release: bool,
}

impl FlashTicket {
    pub fn key(&self) -> PhysicalKey {
        self.key
    }

    /// Layout epoch the ticket was issued under.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// `false` for state keys, whose highlight the sampler owns.
    pub fn needs_release(&self) -> bool {
        self.release
    }
}

// ── Coordinator ───────────────────────────────────────────────────────────────

/// The feedback-suppressing state machine between clicks, hook and sampler.
pub struct SynchronizationCoordinator<V: KeyboardView> {
    simulator: Arc<dyn InputSimulator>,
    sampler: Arc<dyn ModifierSampler>,
    view: V,
    index: RuntimeKeyIndex,
    layout: Option<&'static Layout>,
    gate: SuppressionGate,
    last_epoch: u64,
    last_flash: u64,
    /// Latest unreleased flash per key.
    pending_flashes: HashMap<PhysicalKey, u64>,
    /// Modifier state last pushed to the view; `None` forces the next
    /// reconciliation to push labels and state-key highlights again.
    applied: Option<ModifierState>,
    running: bool,
}

impl<V: KeyboardView> SynchronizationCoordinator<V> {
    /// Creates a coordinator with no layout loaded.
    pub fn new(
        simulator: Arc<dyn InputSimulator>,
        sampler: Arc<dyn ModifierSampler>,
        view: V,
    ) -> Self {
        Self {
            simulator,
            sampler,
            view,
            index: RuntimeKeyIndex::default(),
            layout: None,
            gate: SuppressionGate::new(),
            last_epoch: 0,
            last_flash: 0,
            pending_flashes: HashMap::new(),
            applied: None,
            running: true,
        }
    }

    /// A clone of the gate, for the hook thread.
    pub fn gate(&self) -> SuppressionGate {
        self.gate.clone()
    }

    pub fn state(&self) -> CoordinatorState {
        if self.gate.is_simulating() {
            CoordinatorState::Simulating
        } else {
            CoordinatorState::Idle
        }
    }

    pub fn current_layout(&self) -> Option<&'static Layout> {
        self.layout
    }

    pub fn index(&self) -> &RuntimeKeyIndex {
        &self.index
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Switches to the layout registered under `name`.
    ///
    /// Unknown names load the default layout.  The old index is cleared
    /// before the view re-renders, the new index is built only after that,
    /// and labels are reconciled last.  Returns `None` after shutdown.
    pub fn load_layout(&mut self, name: &str) -> Option<&'static Layout> {
        if !self.running {
            debug!(name, "layout switch ignored after shutdown");
            return None;
        }

        self.index.clear();
        self.pending_flashes.clear();
        self.applied = None;

        let layout = LayoutRegistry::get_layout(name);
        self.last_epoch += 1;

        self.view.render(layout);
        self.index = RuntimeKeyIndex::build(layout, self.last_epoch);
        self.layout = Some(layout);
        info!(
            requested = name,
            layout = layout.name(),
            keys = self.index.len(),
            "layout loaded"
        );

        self.reconcile();
        Some(layout)
    }

    /// Handles a click on `key`: highlight, then inject a synthetic tap.
    ///
    /// Returns a ticket for the delayed reconcile/release steps, or `None`
    /// when the key is not on the current layout or the coordinator has
    /// shut down.  Injection failures are logged and otherwise ignored; the
    /// key still flashes.
    pub fn press(&mut self, key: PhysicalKey) -> Option<FlashTicket> {
        if !self.running {
            return None;
        }
        let Some(entry) = self.index.get(key).copied() else {
            debug!(%key, "click on key not in current layout");
            return None;
        };

        self.view.set_pressed(key);

        {
            let _simulating = self.gate.hold();
            if let Err(e) = self.simulator.simulate(entry.virtual_key_code) {
                warn!(%key, "synthetic key press failed: {e}");
            }
        }
        debug!(%key, code = %entry.virtual_key_code, "simulated click");

        if entry.state_key {
            // The click may have toggled Caps Lock or left Shift up again;
            // the next reconciliation must restore the state-key highlight.
            self.applied = None;
        }

        self.last_flash += 1;
        let release = !entry.state_key;
        if release {
            self.pending_flashes.insert(key, self.last_flash);
        }
        Some(FlashTicket {
            key,
            epoch: self.index.epoch(),
            sequence: self.last_flash,
            release,
        })
    }

    /// Compatibility path: presses the key currently showing `text`.
    ///
    /// Prefer [`press`](Self::press); labels are ambiguous (both Shift keys
    /// read "Shift") and change with the modifier state.
    pub fn press_label(&mut self, text: &str) -> Option<FlashTicket> {
        match self.index.key_for_label(text) {
            Some(key) => self.press(key),
            None => {
                debug!(text, "no key carries this label");
                None
            }
        }
    }

    /// Mirrors a physical key event from the hook onto the view.
    ///
    /// Dropped while a simulation is in flight or when the event carries
    /// the synthetic-event marker.  State keys are ignored; keys absent
    /// from the current layout are a no-op.
    pub fn handle_hook_event(&mut self, event: HookEvent) {
        if !self.running {
            return;
        }
        let key = event.key();
        if event.is_injected() {
            debug!(%key, "dropped injected hook event");
            return;
        }
        if self.gate.is_simulating() {
            debug!(%key, "dropped hook event during simulation");
            return;
        }

        match self.index.get(key) {
            None => debug!(%key, "hook event for key not in current layout"),
            Some(entry) if entry.state_key => {}
            Some(_) if event.is_down() => {
                // A real press takes over the highlight from any pending flash.
                self.pending_flashes.remove(&key);
                self.view.set_pressed(key);
            }
            Some(_) => self.view.set_idle(key),
        }
    }

    /// Samples the modifier state and updates labels and state-key
    /// highlights if it changed since the last pass.
    pub fn reconcile(&mut self) {
        if !self.running || self.layout.is_none() {
            return;
        }
        let state = self.sampler.sample();
        if self.applied == Some(state) {
            return;
        }

        let uppercase = state.is_uppercase();
        for letter in self.index.letters() {
            self.view.set_label(letter.key, &letter.label(uppercase));
        }
        for shiftable in self.index.shiftables() {
            self.view.set_label(shiftable.key, shiftable.label(state.shift_down));
        }
        if let Some(caps) = self.index.caps_lock() {
            set_highlight(&mut self.view, caps, state.caps_lock_on);
        }
        for &shift in self.index.shifts() {
            set_highlight(&mut self.view, shift, state.shift_down);
        }

        debug!(
            caps_lock = state.caps_lock_on,
            shift = state.shift_down,
            "modifier state applied"
        );
        self.applied = Some(state);
    }

    /// Ends a click flash.  Returns `true` if the highlight was cleared.
    ///
    /// Stale tickets (older layout, superseded click, after shutdown) are
    /// ignored.
    pub fn release_flash(&mut self, ticket: FlashTicket) -> bool {
        if !self.running
            || !ticket.release
            || ticket.epoch != self.index.epoch()
            || !self.index.contains(ticket.key)
        {
            return false;
        }
        match self.pending_flashes.get(&ticket.key) {
            Some(&sequence) if sequence == ticket.sequence => {
                self.pending_flashes.remove(&ticket.key);
                self.view.set_idle(ticket.key);
                true
            }
            _ => false,
        }
    }

    /// Stops all further processing.  Every later call is a no-op.
    pub fn shutdown(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.index.clear();
        self.pending_flashes.clear();
        info!("coordinator stopped");
    }
}

fn set_highlight<V: KeyboardView>(view: &mut V, key: PhysicalKey, on: bool) {
    if on {
        view.set_pressed(key);
    } else {
        view.set_idle(key);
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::input_simulation::mock::MockInputSimulator;
    use crate::infrastructure::modifier_state::mock::MockModifierSampler;
    use crate::infrastructure::view::mock::{RecordingView, ViewCall};
    use osk_core::{KeyCodeMap, DEFAULT_LAYOUT_NAME};

    struct Fixture {
        coordinator: SynchronizationCoordinator<RecordingView>,
        simulator: Arc<MockInputSimulator>,
        sampler: Arc<MockModifierSampler>,
        view: RecordingView,
    }

    fn fixture(layout: &str) -> Fixture {
        let simulator = Arc::new(MockInputSimulator::new());
        let sampler = Arc::new(MockModifierSampler::new());
        let view = RecordingView::new();
        let mut coordinator = SynchronizationCoordinator::new(
            Arc::clone(&simulator) as Arc<dyn InputSimulator>,
            Arc::clone(&sampler) as Arc<dyn ModifierSampler>,
            view.clone(),
        );
        coordinator.load_layout(layout);
        view.clear();
        Fixture { coordinator, simulator, sampler, view }
    }

    fn down(key: PhysicalKey) -> HookEvent {
        HookEvent::KeyDown { key, injected: false }
    }

    fn up(key: PhysicalKey) -> HookEvent {
        HookEvent::KeyUp { key, injected: false }
    }

    // ── Layout loading ────────────────────────────────────────────────────────

    #[test]
    fn test_load_layout_renders_then_reconciles() {
        // Arrange
        let view = RecordingView::new();
        let mut coordinator = SynchronizationCoordinator::new(
            Arc::new(MockInputSimulator::new()),
            Arc::new(MockModifierSampler::new()),
            view.clone(),
        );

        // Act
        let layout = coordinator.load_layout("us").expect("running");

        // Assert
        assert_eq!(layout.name(), "US");
        let calls = view.calls();
        assert_eq!(calls[0], ViewCall::Render("US".to_string()));
        assert!(calls[1..].iter().all(|c| !matches!(c, ViewCall::Render(_))));
        assert_eq!(view.last_label(PhysicalKey::KeyQ).as_deref(), Some("q"));
        assert_eq!(view.last_label(PhysicalKey::Digit1).as_deref(), Some("1"));
    }

    #[test]
    fn test_unknown_layout_name_loads_default() {
        let mut f = fixture("US");
        let layout = f.coordinator.load_layout("XX").expect("running");
        assert_eq!(layout.name(), DEFAULT_LAYOUT_NAME);
        assert_eq!(f.coordinator.current_layout().map(Layout::name), Some(DEFAULT_LAYOUT_NAME));
    }

    #[test]
    fn test_layout_switch_bumps_epoch() {
        let mut f = fixture("US");
        let before = f.coordinator.index().epoch();
        f.coordinator.load_layout("ES");
        assert_eq!(f.coordinator.index().epoch(), before + 1);
    }

    // ── Click path ────────────────────────────────────────────────────────────

    #[test]
    fn test_press_highlights_and_simulates_once() {
        // Arrange
        let mut f = fixture("US");

        // Act
        let ticket = f.coordinator.press(PhysicalKey::KeyA).expect("A is on US");

        // Assert
        assert_eq!(
            f.simulator.simulated_codes(),
            vec![KeyCodeMap::physical_to_virtual(PhysicalKey::KeyA)]
        );
        assert_eq!(f.view.calls(), vec![ViewCall::Pressed(PhysicalKey::KeyA)]);
        assert!(ticket.needs_release());
        assert_eq!(f.coordinator.state(), CoordinatorState::Idle);
    }

    #[test]
    fn test_gate_is_closed_only_while_simulating() {
        // Arrange
        let mut f = fixture("US");
        let gate = f.coordinator.gate();
        let observed = Arc::new(std::sync::Mutex::new(Vec::new()));
        let (gate_clone, observed_clone) = (gate.clone(), Arc::clone(&observed));
        f.simulator
            .on_between(move |_| observed_clone.lock().unwrap().push(gate_clone.is_simulating()));

        // Act
        f.coordinator.press(PhysicalKey::KeyA);

        // Assert
        assert_eq!(*observed.lock().unwrap(), vec![true]);
        assert!(!gate.is_simulating());
    }

    #[test]
    fn test_press_still_flashes_when_simulation_fails() {
        let mut f = fixture("US");
        f.simulator.set_should_fail(true);

        let ticket = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");

        assert_eq!(f.view.calls(), vec![ViewCall::Pressed(PhysicalKey::KeyA)]);
        assert!(f.coordinator.release_flash(ticket));
        assert_eq!(f.coordinator.state(), CoordinatorState::Idle);
    }

    #[test]
    fn test_press_key_absent_from_layout_is_noop() {
        // IntlBackslash exists on ES only.
        let mut f = fixture("US");
        assert!(f.coordinator.press(PhysicalKey::IntlBackslash).is_none());
        assert!(f.simulator.transitions().is_empty());
        assert!(f.view.calls().is_empty());
    }

    #[test]
    fn test_release_flash_clears_highlight_once() {
        // Arrange
        let mut f = fixture("US");
        let ticket = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");

        // Act
        let first = f.coordinator.release_flash(ticket);
        let second = f.coordinator.release_flash(ticket);

        // Assert
        assert!(first);
        assert!(!second);
        assert_eq!(
            f.view.highlights_for(PhysicalKey::KeyA),
            vec![ViewCall::Pressed(PhysicalKey::KeyA), ViewCall::Idle(PhysicalKey::KeyA)]
        );
    }

    #[test]
    fn test_newer_click_supersedes_older_ticket() {
        let mut f = fixture("US");
        let first = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");
        let second = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");

        assert!(!f.coordinator.release_flash(first));
        assert!(f.coordinator.release_flash(second));
    }

    #[test]
    fn test_ticket_from_previous_layout_is_ignored() {
        // Arrange
        let mut f = fixture("US");
        let ticket = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");

        // Act
        f.coordinator.load_layout("ES");
        f.view.clear();
        let released = f.coordinator.release_flash(ticket);

        // Assert
        assert!(!released);
        assert!(f.view.calls().is_empty());
    }

    #[test]
    fn test_state_key_click_is_not_released_and_forces_reconcile() {
        // Arrange
        let mut f = fixture("US");

        // Act
        let ticket = f.coordinator.press(PhysicalKey::ShiftLeft).expect("ticket");
        f.coordinator.reconcile();

        // Assert
        assert!(!ticket.needs_release());
        assert!(!f.coordinator.release_flash(ticket));
        // Shift is not held after the tap, so reconciliation returns it to idle.
        assert_eq!(
            f.view.highlights_for(PhysicalKey::ShiftLeft),
            vec![ViewCall::Pressed(PhysicalKey::ShiftLeft), ViewCall::Idle(PhysicalKey::ShiftLeft)]
        );
    }

    #[test]
    fn test_press_label_resolves_displayed_text() {
        let mut f = fixture("ES");
        f.coordinator.press_label("ñ").expect("ñ is on ES");
        assert_eq!(
            f.simulator.simulated_codes(),
            vec![KeyCodeMap::physical_to_virtual(PhysicalKey::Semicolon)]
        );
        assert!(f.coordinator.press_label("does-not-exist").is_none());
    }

    // ── Hook path ─────────────────────────────────────────────────────────────

    #[test]
    fn test_hook_down_and_up_drive_highlight() {
        let mut f = fixture("US");

        f.coordinator.handle_hook_event(down(PhysicalKey::KeyZ));
        f.coordinator.handle_hook_event(up(PhysicalKey::KeyZ));

        assert_eq!(
            f.view.calls(),
            vec![ViewCall::Pressed(PhysicalKey::KeyZ), ViewCall::Idle(PhysicalKey::KeyZ)]
        );
    }

    #[test]
    fn test_hook_events_for_state_keys_are_ignored() {
        let mut f = fixture("US");

        for key in [PhysicalKey::CapsLock, PhysicalKey::ShiftLeft, PhysicalKey::ShiftRight] {
            f.coordinator.handle_hook_event(down(key));
            f.coordinator.handle_hook_event(up(key));
        }

        assert!(f.view.calls().is_empty());
    }

    #[test]
    fn test_hook_event_for_key_not_in_layout_is_noop() {
        let mut f = fixture("US");
        f.coordinator.handle_hook_event(down(PhysicalKey::F5));
        f.coordinator.handle_hook_event(down(PhysicalKey::IntlBackslash));
        assert!(f.view.calls().is_empty());
    }

    #[test]
    fn test_injected_hook_event_is_dropped() {
        let mut f = fixture("US");
        f.coordinator
            .handle_hook_event(HookEvent::KeyDown { key: PhysicalKey::KeyA, injected: true });
        assert!(f.view.calls().is_empty());
    }

    #[test]
    fn test_physical_press_cancels_pending_flash_release() {
        // Arrange
        let mut f = fixture("US");
        let ticket = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");

        // Act: the user holds A down physically before the flash ends.
        f.coordinator.handle_hook_event(down(PhysicalKey::KeyA));

        // Assert
        assert!(!f.coordinator.release_flash(ticket));
    }

    // ── Modifier reconciliation ───────────────────────────────────────────────

    #[test]
    fn test_reconcile_applies_case_for_all_modifier_combinations() {
        for caps in [false, true] {
            for shift in [false, true] {
                // Arrange
                let mut f = fixture("ES");
                f.sampler.set(ModifierState::new(caps, shift));

                // Act
                f.coordinator.reconcile();

                // Assert
                let uppercase = caps ^ shift;
                for letter in f.coordinator.index().letters() {
                    let expected = if uppercase {
                        letter.base.to_uppercase()
                    } else {
                        letter.base.clone()
                    };
                    let label = f.view.last_label(letter.key);
                    if (caps, shift) == (false, false) {
                        // Unchanged from the load-time pass; nothing re-sent.
                        assert_eq!(label, None);
                    } else {
                        assert_eq!(label.as_deref(), Some(expected.as_str()), "caps={caps} shift={shift}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_shift_substitutes_symbols_but_caps_lock_does_not() {
        // Arrange
        let mut f = fixture("US");

        // Act / Assert: Caps Lock alone
        f.sampler.set(ModifierState::new(true, false));
        f.coordinator.reconcile();
        assert_eq!(f.view.last_label(PhysicalKey::Digit1).as_deref(), Some("1"));
        assert_eq!(f.view.last_label(PhysicalKey::KeyA).as_deref(), Some("A"));

        // Act / Assert: Caps Lock and Shift
        f.sampler.set(ModifierState::new(true, true));
        f.coordinator.reconcile();
        assert_eq!(f.view.last_label(PhysicalKey::Digit1).as_deref(), Some("!"));
        assert_eq!(f.view.last_label(PhysicalKey::KeyA).as_deref(), Some("a"));
    }

    #[test]
    fn test_reconcile_drives_state_key_highlights() {
        // Arrange
        let mut f = fixture("US");
        f.sampler.set(ModifierState::new(true, true));

        // Act
        f.coordinator.reconcile();

        // Assert
        let calls = f.view.calls();
        assert!(calls.contains(&ViewCall::Pressed(PhysicalKey::CapsLock)));
        assert!(calls.contains(&ViewCall::Pressed(PhysicalKey::ShiftLeft)));
        assert!(calls.contains(&ViewCall::Pressed(PhysicalKey::ShiftRight)));
    }

    #[test]
    fn test_reconcile_is_silent_when_state_unchanged() {
        let mut f = fixture("US");
        f.coordinator.reconcile();
        f.coordinator.reconcile();
        assert!(f.view.calls().is_empty());
        assert_eq!(f.simulator.transitions().len(), 0);
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────

    #[test]
    fn test_shutdown_makes_every_operation_a_noop() {
        // Arrange
        let mut f = fixture("US");
        let ticket = f.coordinator.press(PhysicalKey::KeyA).expect("ticket");
        f.view.clear();

        // Act
        f.coordinator.shutdown();
        f.sampler.set_caps_lock(true);
        let released = f.coordinator.release_flash(ticket);
        f.coordinator.reconcile();
        f.coordinator.handle_hook_event(down(PhysicalKey::KeyB));
        let pressed = f.coordinator.press(PhysicalKey::KeyB);
        let loaded = f.coordinator.load_layout("ES");

        // Assert
        assert!(!released);
        assert!(pressed.is_none());
        assert!(loaded.is_none());
        assert!(f.view.calls().is_empty());
        assert!(!f.coordinator.is_running());
        assert!(f.coordinator.index().is_empty());
    }
}
