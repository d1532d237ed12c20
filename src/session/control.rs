//! Control surface: input polling and rendering.
//!
//! The control task is the only reader of the surface. It forwards directions
//! to the live input slot and turns quit and checkpoint keys into halts.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;

use log::{debug, info, warn};
use tokio::sync::mpsc;

use crate::game::state::Session;
use crate::game::systems::render_frame;
use crate::session::coordinator::tick;
use crate::session::messages::{ControlInput, HaltReason, SessionResult};

pub trait ControlSurface: Send {
    fn render(&mut self, frame: &str);

    /// Next pending input, without blocking.
    fn poll_input(&mut self) -> Option<ControlInput>;
}

/// Surface shared by the control tasks of every branch of a game.
pub type SharedSurface = Arc<Mutex<dyn ControlSurface>>;

/// One render and poll iteration.
pub fn control_cycle(session: &Session, surface: &SharedSurface) -> SessionResult {
    let input = {
        let mut surface = surface.lock().unwrap_or_else(PoisonError::into_inner);
        surface.render(&render_frame(session));
        surface.poll_input()
    };

    match input {
        Some(ControlInput::Move(direction)) => session.inject_direction(direction),
        Some(ControlInput::Quit) => {
            info!("[Control] quit requested in branch {}", session.branch_id);
            session.halt(HaltReason::Quit);
            return SessionResult::Quit;
        }
        Some(ControlInput::Checkpoint) if session.is_checkpoint() => {
            debug!("[Control] already inside a checkpoint, request ignored");
        }
        Some(ControlInput::Checkpoint) => {
            info!("[Control] checkpoint requested in branch {}", session.branch_id);
            session.halt(HaltReason::CheckpointRequested);
        }
        None => {}
    }

    match session.halt_reason() {
        Some(HaltReason::PortalReached) => SessionResult::NextLevel,
        Some(HaltReason::Quit | HaltReason::PlayersDestroyed) => SessionResult::Quit,
        _ => SessionResult::Continue,
    }
}

pub async fn control_task(session: Arc<Session>, surface: SharedSurface) {
    while session.is_running() {
        if control_cycle(&session, &surface) != SessionResult::Continue {
            break;
        }
        tick(session.tempo()).await;
    }
}

/// Replays a fixed list of inputs, one per poll, and keeps every frame drawn.
#[derive(Debug, Default)]
pub struct ScriptedSurface {
    inputs: VecDeque<Option<ControlInput>>,
    frames: Vec<String>,
}

impl ScriptedSurface {
    pub fn new(inputs: impl IntoIterator<Item = Option<ControlInput>>) -> Self {
        Self { inputs: inputs.into_iter().collect(), frames: Vec::new() }
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    /// Inputs not yet polled.
    pub fn remaining(&self) -> usize {
        self.inputs.len()
    }
}

impl ControlSurface for ScriptedSurface {
    fn render(&mut self, frame: &str) {
        self.frames.push(frame.to_string());
    }

    fn poll_input(&mut self) -> Option<ControlInput> {
        self.inputs.pop_front().flatten()
    }
}

/// Terminal front end. Stdin is read line by line on a background thread;
/// every bound key of a line becomes one input.
pub struct TerminalSurface {
    inputs: mpsc::UnboundedReceiver<ControlInput>,
}

impl TerminalSurface {
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("[Control] stdin closed: {}", err);
                        break;
                    }
                };
                for input in line.chars().filter_map(ControlInput::from_key) {
                    if tx.send(input).is_err() {
                        return;
                    }
                }
            }
        });
        Self { inputs: rx }
    }
}

impl ControlSurface for TerminalSurface {
    fn render(&mut self, frame: &str) {
        let mut out = io::stdout().lock();
        let drawn = write!(out, "\x1B[2J\x1B[H{}", frame).and_then(|_| out.flush());
        if let Err(err) = drawn {
            warn!("[Control] failed to draw frame: {}", err);
        }
    }

    fn poll_input(&mut self) -> Option<ControlInput> {
        self.inputs.try_recv().ok()
    }
}
