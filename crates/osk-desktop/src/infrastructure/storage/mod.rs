//! Storage infrastructure: configuration file persistence.
//!
//! The `config` sub-module handles:
//!
//! - Reading the TOML configuration file from the platform-appropriate directory.
//! - Providing defaults when the file does not exist yet (first run).
//! - Writing an initial template on request.
//!
//! The keyboard keeps no state across runs; nothing here is written while the
//! keyboard is running.

pub mod config;
