//! CoordinatorRuntime: the single task that owns the coordinator.
//!
//! Everything that mutates the keyboard view runs on this task, one step at
//! a time:
//!
//! ```text
//! CoordinatorHandle ───▶ mpsc ──┐  ┌────────────────────────────┐
//!   (click, layout)              ├─▶│ CoordinatorRuntime::run     │
//! hook thread ───────▶ mpsc ─────┘  │   select! {                 │
//!   (HookSink)                      │     command  → coordinator  │
//!                                   │     hook     → coordinator  │
//!                                   │     interval → reconcile()  │
//!                                   │     delays   → flash steps  │
//!                                   │   }                         │
//!                                   └────────────────────────────┘
//! ```
//!
//! Hook events travel on their own channel so that only handles keep the
//! command channel open: dropping the last [`CoordinatorHandle`] shuts the
//! runtime down exactly like [`CoordinatorHandle::shutdown`].
//!
//! # Why a channel for the hook? (for beginners)
//!
//! The hook callback runs on the OS hook thread.  Touching the view from
//! there would race with clicks handled on this task.  The sink therefore
//! only filters (suppression gate, injected marker) and sends the event down
//! an unbounded channel.  `UnboundedSender::send` never blocks and does not
//! need a Tokio context, so it is safe to call from a plain OS thread.
//!
//! # Flash timing
//!
//! A click is followed by two delayed steps: after `reconcile_delay` the
//! modifier state is re-sampled (the click may have toggled Caps Lock), and
//! after a further `release_delay` the highlight is cleared.  Each delay is a
//! task in a [`JoinSet`]; shutdown aborts them all, and any step that still
//! slips through is rejected by its stale [`FlashTicket`].

use std::sync::Arc;
use std::time::Duration;

use osk_core::{PhysicalKey, DEFAULT_LAYOUT_NAME};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, error, info};

use crate::application::coordinator::{FlashTicket, SuppressionGate, SynchronizationCoordinator};
use crate::application::view::KeyboardView;
use crate::infrastructure::input_simulation::InputSimulator;
use crate::infrastructure::keyboard_hook::{HookEvent, HookSink, KeyboardHook};
use crate::infrastructure::modifier_state::ModifierSampler;

/// Default modifier polling period.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
/// Default delay between a click and the follow-up reconciliation.
pub const DEFAULT_RECONCILE_DELAY: Duration = Duration::from_millis(50);
/// Default delay between that reconciliation and the highlight release.
pub const DEFAULT_RELEASE_DELAY: Duration = Duration::from_millis(50);

/// Timing and startup settings for the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Layout loaded at startup.
    pub layout: String,
    pub poll_interval: Duration,
    pub reconcile_delay: Duration,
    pub release_delay: Duration,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            layout: DEFAULT_LAYOUT_NAME.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            reconcile_delay: DEFAULT_RECONCILE_DELAY,
            release_delay: DEFAULT_RELEASE_DELAY,
        }
    }
}

/// Error returned by [`CoordinatorHandle`] once the runtime has stopped.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("coordinator runtime has stopped")]
    Stopped,
}

enum Command {
    LoadLayout(String),
    Click(PhysicalKey),
    ClickLabel(String),
    Shutdown(oneshot::Sender<()>),
}

enum FlashStep {
    Reconcile(FlashTicket),
    Release(FlashTicket),
}

/// Cloneable handle for driving a running coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorHandle {
    commands: mpsc::UnboundedSender<Command>,
}

impl std::fmt::Debug for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::LoadLayout(name) => write!(f, "LoadLayout({name:?})"),
            Command::Click(key) => write!(f, "Click({key})"),
            Command::ClickLabel(text) => write!(f, "ClickLabel({text:?})"),
            Command::Shutdown(_) => f.write_str("Shutdown"),
        }
    }
}

impl CoordinatorHandle {
    /// Requests a layout switch.
    pub fn load_layout(&self, name: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Command::LoadLayout(name.into()))
    }

    /// Requests a click on `key`.
    pub fn click(&self, key: PhysicalKey) -> Result<(), RuntimeError> {
        self.send(Command::Click(key))
    }

    /// Requests a click on the key currently labelled `text`.
    pub fn click_label(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Command::ClickLabel(text.into()))
    }

    /// Stops the runtime and waits until the hook is uninstalled and the
    /// coordinator is shut down.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.send(Command::Shutdown(ack_tx))?;
        ack_rx.await.map_err(|_| RuntimeError::Stopped)
    }

    /// Returns `true` while the runtime task is accepting commands.
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    fn send(&self, command: Command) -> Result<(), RuntimeError> {
        self.commands.send(command).map_err(|_| RuntimeError::Stopped)
    }
}

/// The UI/update context: owns the coordinator and serialises all work on it.
pub struct CoordinatorRuntime<V: KeyboardView> {
    coordinator: SynchronizationCoordinator<V>,
    hook: Arc<dyn KeyboardHook>,
    config: RuntimeConfig,
    commands: mpsc::UnboundedReceiver<Command>,
    hook_events: mpsc::UnboundedReceiver<HookEvent>,
    /// Cleared once the hook side of `hook_events` is gone.
    hook_open: bool,
    delays: JoinSet<FlashStep>,
}

impl<V: KeyboardView + 'static> CoordinatorRuntime<V> {
    /// Installs the hook, loads the configured layout and spawns the runtime
    /// task.  Must be called from within a Tokio runtime.
    ///
    /// A hook installation failure is logged and the keyboard continues in
    /// click-only mode.  The runtime stops on [`CoordinatorHandle::shutdown`]
    /// or when the last handle is dropped.
    pub fn start(
        config: RuntimeConfig,
        hook: Arc<dyn KeyboardHook>,
        simulator: Arc<dyn InputSimulator>,
        sampler: Arc<dyn ModifierSampler>,
        view: V,
    ) -> (CoordinatorHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let (hook_tx, hook_rx) = mpsc::unbounded_channel();
        let mut coordinator = SynchronizationCoordinator::new(simulator, sampler, view);

        let sink = hook_sink(coordinator.gate(), hook_tx);
        match hook.start(sink) {
            Ok(()) => info!("physical key highlighting enabled"),
            Err(e) => error!("keyboard hook unavailable, running in click-only mode: {e}"),
        }

        coordinator.load_layout(&config.layout);

        let runtime = Self {
            coordinator,
            hook,
            config,
            commands: rx,
            hook_events: hook_rx,
            hook_open: true,
            delays: JoinSet::new(),
        };
        let task = tokio::spawn(runtime.run());
        (CoordinatorHandle { commands: tx }, task)
    }

    async fn run(mut self) {
        let period = self.config.poll_interval.max(Duration::from_millis(1));
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        let ack = loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown(ack)) => break Some(ack),
                    Some(command) => self.handle_command(command),
                    None => {
                        info!("all coordinator handles dropped");
                        break None;
                    }
                },
                event = self.hook_events.recv(), if self.hook_open => match event {
                    Some(event) => self.coordinator.handle_hook_event(event),
                    None => self.hook_open = false,
                },
                _ = ticker.tick() => self.coordinator.reconcile(),
                Some(step) = self.delays.join_next(), if !self.delays.is_empty() => match step {
                    Ok(step) => self.handle_step(step),
                    Err(e) => debug!("flash step did not complete: {e}"),
                },
            }
        };

        // Refuse further commands before acknowledging.
        self.commands.close();
        self.hook.stop();
        self.hook_events.close();
        self.delays.abort_all();
        self.coordinator.shutdown();
        info!("coordinator runtime stopped");

        if let Some(ack) = ack {
            let _ = ack.send(());
        }
    }

    fn handle_command(&mut self, command: Command) {
        debug!(?command, "command received");
        match command {
            Command::LoadLayout(name) => {
                self.coordinator.load_layout(&name);
            }
            Command::Click(key) => {
                let ticket = self.coordinator.press(key);
                self.schedule_reconcile(ticket);
            }
            Command::ClickLabel(text) => {
                let ticket = self.coordinator.press_label(&text);
                self.schedule_reconcile(ticket);
            }
            // Handled by the loop itself.
            Command::Shutdown(_) => {}
        }
    }

    fn handle_step(&mut self, step: FlashStep) {
        match step {
            FlashStep::Reconcile(ticket) => {
                self.coordinator.reconcile();
                if ticket.needs_release() {
                    self.schedule(FlashStep::Release(ticket), self.config.release_delay);
                }
            }
            FlashStep::Release(ticket) => {
                if !self.coordinator.release_flash(ticket) {
                    debug!(key = %ticket.key(), "stale flash release ignored");
                }
            }
        }
    }

    fn schedule_reconcile(&mut self, ticket: Option<FlashTicket>) {
        if let Some(ticket) = ticket {
            self.schedule(FlashStep::Reconcile(ticket), self.config.reconcile_delay);
        }
    }

    fn schedule(&mut self, step: FlashStep, delay: Duration) {
        self.delays.spawn(async move {
            time::sleep(delay).await;
            step
        });
    }
}

/// Builds the sink handed to the hook.  Runs on the hook thread: filters,
/// then marshals onto the runtime channel.
fn hook_sink(gate: SuppressionGate, events: mpsc::UnboundedSender<HookEvent>) -> HookSink {
    Arc::new(move |event: HookEvent| {
        if event.is_injected() || gate.is_simulating() {
            return;
        }
        // A closed channel means the runtime is shutting down.
        let _ = events.send(event);
    })
}
