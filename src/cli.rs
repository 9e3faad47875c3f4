//! Command-line interface and REPL
//!
//! Lines typed at the prompt are parsed into [`Command`]s and applied to a
//! live overlay by [`LiveSession`]. Reading happens on a blocking thread so
//! the async loop can keep firing timers while the user types.

use std::collections::BTreeMap;

use anyhow::{bail, Context, Result};
use colored::*;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::controls::{ButtonState, ControlId, DoubleTapButton, EmulationMode};
use crate::overlay::{Overlay, OverlayMode};
use crate::sink::ControllerSink;
use crate::touch::{ActivePointers, PointerId};

pub const HELP: &str = "\
Commands:
  down <id> <x> <y>   put finger <id> down at (x, y)
  move <id> <x> <y>   move finger <id>
  up <id>             lift finger <id>
  edit on|off         toggle layout-edit mode
  recenter on|off     toggle relative joystick centering
  opacity <0-255>     set overlay opacity
  axes                show the latest axis values
  help                show this help
  quit                exit";

/// One parsed REPL line
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Down { pointer: u32, x: f32, y: f32 },
    Move { pointer: u32, x: f32, y: f32 },
    Up { pointer: u32 },
    Edit(bool),
    Recenter(bool),
    Opacity(u8),
    Axes,
    Help,
    Quit,
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let parts: Vec<&str> = line.split_whitespace().collect();
    let command = match parts.as_slice() {
        ["down", id, x, y] => Command::Down {
            pointer: parse_arg(id, "pointer id")?,
            x: parse_arg(x, "x")?,
            y: parse_arg(y, "y")?,
        },
        ["move", id, x, y] => Command::Move {
            pointer: parse_arg(id, "pointer id")?,
            x: parse_arg(x, "x")?,
            y: parse_arg(y, "y")?,
        },
        ["up", id] => Command::Up {
            pointer: parse_arg(id, "pointer id")?,
        },
        ["edit", flag] => Command::Edit(parse_flag(flag)?),
        ["recenter", flag] => Command::Recenter(parse_flag(flag)?),
        ["opacity", value] => Command::Opacity(parse_arg(value, "opacity (0-255)")?),
        ["axes"] => Command::Axes,
        ["help"] | ["?"] => Command::Help,
        ["quit"] | ["exit"] => Command::Quit,
        _ => bail!("Unknown command: {} (type 'help')", line),
    };
    Ok(Some(command))
}

fn parse_arg<T: std::str::FromStr>(value: &str, what: &str) -> Result<T>
where
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.parse().with_context(|| format!("Invalid {}: {}", what, value))
}

fn parse_flag(value: &str) -> Result<bool> {
    match value {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => bail!("Expected on/off, got: {}", value),
    }
}

/// Read prompt lines on a blocking thread.
///
/// The channel closes on Ctrl-C, Ctrl-D or a terminal error.
pub fn spawn_readline(prompt: &'static str) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);

    tokio::task::spawn_blocking(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                warn!("Failed to start line editor: {}", e);
                return;
            }
        };

        loop {
            match rl.readline(prompt) {
                Ok(line) => {
                    let _ = rl.add_history_entry(line.as_str());
                    if tx.blocking_send(line).is_err() {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
                Err(e) => {
                    warn!("Readline error: {}", e);
                    break;
                }
            }
        }
        debug!("Readline thread exiting");
    });

    rx
}

/// Sink that prints buttons as they happen and remembers axis values
#[derive(Debug, Default)]
pub struct ConsoleSink {
    axes: BTreeMap<ControlId, f32>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn axes(&self) -> &BTreeMap<ControlId, f32> {
        &self.axes
    }

    pub fn print_axes(&self) {
        if self.axes.is_empty() {
            println!("{}", "(no axis output yet)".dimmed());
            return;
        }
        for (id, value) in &self.axes {
            let text = format!("{:+.3}", value);
            let text = if *value == 0.0 { text.dimmed() } else { text.green() };
            println!("  {:>6}  {}", id.to_string().yellow(), text);
        }
    }
}

impl ControllerSink for ConsoleSink {
    fn on_button(&mut self, button: ControlId, state: ButtonState) {
        let state = match state {
            ButtonState::Pressed => "pressed".green().bold(),
            ButtonState::Released => "released".red(),
        };
        println!("button {} {}", button.to_string().yellow(), state);
    }

    fn on_axis(&mut self, axis: ControlId, value: f32) {
        self.axes.insert(axis, value);
    }
}

/// Live overlay driven from the REPL
#[derive(Debug)]
pub struct LiveSession {
    pub overlay: Overlay,
    pub sink: ConsoleSink,
    fingers: ActivePointers,
}

impl LiveSession {
    pub fn new(overlay: Overlay) -> Self {
        Self {
            overlay,
            sink: ConsoleSink::new(),
            fingers: ActivePointers::new(),
        }
    }

    /// Swap in a rebuilt overlay. Fingers on the old one are forgotten.
    pub fn replace_overlay(&mut self, overlay: Overlay) {
        let mode = self.overlay.mode();
        self.overlay.shutdown();
        self.overlay = overlay;
        self.overlay.set_mode(mode);
        self.fingers = ActivePointers::new();
    }

    /// Fire timers due by `now_ms`
    pub fn advance(&mut self, now_ms: u64) -> usize {
        self.overlay.advance(now_ms, &mut self.sink)
    }

    /// Apply one command at `now_ms`. Returns `false` when the session should end.
    pub fn execute(&mut self, command: Command, now_ms: u64) -> Result<bool> {
        let event = match command {
            Command::Down { pointer, x, y } => self.fingers.press(PointerId(pointer), x, y),
            Command::Move { pointer, x, y } => {
                if self.fingers.get(PointerId(pointer)).is_none() {
                    bail!("Finger {} is not down", pointer);
                }
                self.fingers.move_to(PointerId(pointer), x, y)
            }
            Command::Up { pointer } => self
                .fingers
                .release(PointerId(pointer))
                .with_context(|| format!("Finger {} is not down", pointer))?,
            Command::Edit(on) => {
                let mode = if on { OverlayMode::LayoutEdit } else { OverlayMode::Gameplay };
                self.overlay.set_mode(mode);
                println!("mode: {:?}", mode);
                return Ok(true);
            }
            Command::Recenter(on) => {
                self.overlay.set_relative_center(on);
                println!("relative center: {}", on);
                return Ok(true);
            }
            Command::Opacity(value) => {
                self.overlay.set_opacity(value);
                println!("opacity: {}", value);
                return Ok(true);
            }
            Command::Axes => {
                self.sink.print_axes();
                return Ok(true);
            }
            Command::Help => {
                println!("{}", HELP);
                return Ok(true);
            }
            Command::Quit => return Ok(false),
        };

        let consumed = self.overlay.handle_touch(&event, now_ms, &mut self.sink);
        if !consumed {
            println!("{}", "(not consumed)".dimmed());
        } else if self.overlay.mode() == OverlayMode::LayoutEdit {
            for joystick in self.overlay.joysticks() {
                println!("  {} at {}", joystick.control().to_string().yellow(), joystick.bounds());
            }
        }
        Ok(true)
    }
}

/// Print the selectable emulation modes and double-tap buttons
pub fn print_options() {
    println!("\n{}", "Joystick emulation modes:".bold());
    for mode in EmulationMode::ALL {
        println!("  {:<18} {}", mode.to_string().yellow(), mode.id().to_string().dimmed());
    }

    println!("\n{}", "Double-tap buttons:".bold());
    for button in DoubleTapButton::ALL {
        println!("  {:<18} {}", button.to_string().yellow(), button.id().to_string().dimmed());
    }
    println!();
}
