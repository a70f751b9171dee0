//! On-screen keyboard entry point.
//!
//! Wires the platform adapters (keyboard hook, input simulator, modifier
//! sampler) to the synchronization runtime and drives it from a small line
//! console on stdin.
//!
//! # Usage
//!
//! ```text
//! osk-desktop [OPTIONS]
//!
//! Options:
//!   --layout <NAME>          Layout to load at startup [default: from config]
//!   --config <PATH>          Config file [default: platform config dir]
//!   --log-level <FILTER>     Log filter when RUST_LOG is unset
//!   --write-default-config   Write a default config file and exit
//! ```
//!
//! # Console commands
//!
//! | Command          | Effect                                         |
//! |------------------|------------------------------------------------|
//! | `click <Key>`    | Click a key by name, e.g. `click KeyA`         |
//! | `label <text>`   | Click the key currently showing `<text>`       |
//! | `layout <name>`  | Switch layout (`ES`, `US`; unknown → default)  |
//! | `layouts`        | List registered layouts                        |
//! | `show`           | Print the keyboard with pressed keys marked    |
//! | `quit`           | Shut down                                      |
//!
//! # Architecture overview
//!
//! ```text
//! stdin console ──► CoordinatorHandle ──► CoordinatorRuntime (Tokio task)
//!                                             ├─ SynchronizationCoordinator
//! KeyboardHook thread ──► hook sink ─────────►│    ├─ InputSimulator
//!                                             │    ├─ ModifierSampler
//!                                             │    └─ TracingView
//!                                             └─ poll interval / flash steps
//! ```

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use osk_core::{LayoutRegistry, PhysicalKey};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use osk_desktop::application::runtime::{CoordinatorHandle, CoordinatorRuntime};
use osk_desktop::infrastructure::input_simulation::platform_simulator;
use osk_desktop::infrastructure::keyboard_hook::platform_hook;
use osk_desktop::infrastructure::modifier_state::platform_sampler;
use osk_desktop::infrastructure::storage::config::{self, OskConfig};
use osk_desktop::infrastructure::view::TracingView;

// ── CLI argument definitions ──────────────────────────────────────────────────

/// On-screen keyboard that mirrors the physical keyboard.
#[derive(Debug, Parser)]
#[command(
    name = "osk-desktop",
    about = "On-screen keyboard synchronized with the physical keyboard",
    version
)]
struct Cli {
    /// Layout to load at startup; overrides `keyboard.layout` from the config.
    #[arg(long, env = "OSK_LAYOUT")]
    layout: Option<String>,

    /// Path of the TOML config file.
    #[arg(long, env = "OSK_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter used when `RUST_LOG` is unset; overrides `logging.level`.
    #[arg(long, env = "OSK_LOG_LEVEL")]
    log_level: Option<String>,

    /// Write a default config file to the config path and exit.
    #[arg(long)]
    write_default_config: bool,
}

impl Cli {
    /// Loads the config file and applies CLI overrides on top of it.
    fn resolve_config(&self) -> anyhow::Result<OskConfig> {
        let mut cfg = match &self.config {
            Some(path) => config::load_config_from(path)
                .with_context(|| format!("failed to load config from {}", path.display()))?,
            None => config::load_config().context("failed to load config")?,
        };

        if let Some(layout) = &self.layout {
            cfg.keyboard.layout = layout.clone();
        }
        if let Some(level) = &self.log_level {
            cfg.logging.level = level.clone();
        }
        Ok(cfg)
    }
}

// ── Console commands ──────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq)]
enum ConsoleCommand {
    Click(PhysicalKey),
    Label(String),
    Layout(String),
    Layouts,
    Show,
    Quit,
}

/// Parses one console line.  Blank lines yield `Ok(None)`.
fn parse_command(line: &str) -> Result<Option<ConsoleCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let (verb, arg) = match line.split_once(char::is_whitespace) {
        Some((verb, arg)) => (verb, arg.trim()),
        None => (line, ""),
    };

    let command = match (verb, arg) {
        ("click", "") | ("label", "") => return Err(format!("usage: {verb} <argument>")),
        ("click", name) => PhysicalKey::from_name(name)
            .map(ConsoleCommand::Click)
            .ok_or_else(|| format!("unknown key name: {name}"))?,
        ("label", text) => ConsoleCommand::Label(text.to_string()),
        ("layout", name) => ConsoleCommand::Layout(name.to_string()),
        ("layouts", _) => ConsoleCommand::Layouts,
        ("show", _) => ConsoleCommand::Show,
        ("quit" | "exit", _) => ConsoleCommand::Quit,
        _ => return Err(format!("unknown command: {verb}")),
    };
    Ok(Some(command))
}

/// Forwards one parsed command.  Returns `false` once the console should stop.
fn dispatch(command: ConsoleCommand, handle: &CoordinatorHandle, view: &TracingView) -> bool {
    let sent = match command {
        ConsoleCommand::Click(key) => handle.click(key),
        ConsoleCommand::Label(text) => handle.click_label(text),
        ConsoleCommand::Layout(name) => {
            if !LayoutRegistry::contains(&name) {
                warn!("unknown layout '{name}', loading the default layout");
            }
            handle.load_layout(name)
        }
        ConsoleCommand::Layouts => {
            println!("{}", LayoutRegistry::names().collect::<Vec<_>>().join(" "));
            Ok(())
        }
        ConsoleCommand::Show => {
            println!("{}", view.render_text());
            Ok(())
        }
        ConsoleCommand::Quit => return false,
    };

    match sent {
        Ok(()) => true,
        Err(e) => {
            error!("{e}");
            false
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

/// Program entry point.
///
/// # What happens at startup
///
/// 1. CLI arguments are parsed with `clap`.
/// 2. The config file is loaded (defaults if absent) and CLI overrides applied.
/// 3. `tracing_subscriber` is initialised.  `RUST_LOG` wins over the config.
/// 4. The runtime is started with the platform adapters and a [`TracingView`].
/// 5. Console lines are forwarded until `quit`, end of input, or Ctrl+C.
/// 6. The runtime is shut down: hook removed, pending flash steps cancelled.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.write_default_config {
        let cfg = OskConfig::default();
        let path = match &cli.config {
            Some(path) => {
                config::save_config_to(&cfg, path)?;
                path.clone()
            }
            None => config::save_config(&cfg)?,
        };
        println!("wrote default config to {}", path.display());
        return Ok(());
    }

    let cfg = cli.resolve_config()?;

    // ── Logging setup ─────────────────────────────────────────────────────────
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&cfg.logging.level)),
        )
        .init();

    info!("on-screen keyboard starting with layout '{}'", cfg.keyboard.layout);

    // ── Runtime ───────────────────────────────────────────────────────────────
    let view = TracingView::new();
    let (handle, task) = CoordinatorRuntime::start(
        cfg.keyboard.to_runtime_config(),
        platform_hook(),
        platform_simulator(),
        platform_sampler(),
        view.clone(),
    );

    // ── Console loop ──────────────────────────────────────────────────────────
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(Some(command)) => {
                        if !dispatch(command, &handle, &view) {
                            break;
                        }
                    }
                    Ok(None) => {}
                    Err(message) => eprintln!("{message}"),
                },
                Ok(None) => break,
                Err(e) => {
                    error!("failed to read console input: {e}");
                    break;
                }
            },
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("failed to listen for Ctrl+C signal: {e}");
                }
                info!("received Ctrl+C, shutting down");
                break;
            }
        }
    }

    // ── Shutdown ──────────────────────────────────────────────────────────────
    if let Err(e) = handle.shutdown().await {
        warn!("runtime already stopped: {e}");
    }
    task.await.context("coordinator task panicked")?;

    info!("on-screen keyboard stopped");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
