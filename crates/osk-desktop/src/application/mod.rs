//! Application layer: the synchronization engine.
//!
//! # What is the "application" layer? (for beginners)
//!
//! In Clean Architecture the *application* layer sits between the domain
//! (here: `osk-core`'s keys and layouts) and the infrastructure (OS hooks,
//! input injection, the view).
//!
//! Code in this layer:
//!
//! - **Orchestrates** domain objects to fulfil a user goal ("flash the key the
//!   user clicked and type it into the focused window").
//! - **Depends on abstractions** (traits) rather than concrete
//!   implementations, so every OS adapter can be replaced by a mock in tests.
//! - **Makes no OS calls itself.**
//!
//! # Sub-modules
//!
//! - **`view`** – Capability traits implemented by whatever draws the keyboard.
//!
//! - **`key_index`** – Per-layout lookup tables rebuilt on every layout switch.
//!
//! - **`coordinator`** – The feedback-suppressing state machine between
//!   clicks, the hook and the modifier sampler.
//!
//! - **`runtime`** – The Tokio task that owns the coordinator and serialises
//!   clicks, hook events, sampler ticks and delayed flash steps.

pub mod coordinator;
pub mod key_index;
pub mod runtime;
pub mod view;
