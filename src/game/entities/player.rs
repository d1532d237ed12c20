//! Player entity.
//!
//! Position, cadence, schedule and score belong to the player's own task and
//! sit behind a mutex. `alive` is atomic because adversaries flip it from
//! their tasks while holding the lock of the player's cell.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::game::entities::schedule::{CommandSchedule, Pace};
use crate::game::types::Position;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    pub pos: Position,
    pub pace: Pace,
    pub schedule: CommandSchedule,
    pub score: u32,
}

impl PlayerState {
    pub fn new(pos: Position, cadence: u32, schedule: CommandSchedule, score: u32) -> Self {
        Self { pos, pace: Pace::new(cadence), schedule, score }
    }
}

/// Plain copy of a player, taken while no task runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub state: PlayerState,
    pub alive: bool,
}

#[derive(Debug)]
pub struct Player {
    pub id: usize,
    alive: AtomicBool,
    state: Mutex<PlayerState>,
}

impl Player {
    pub fn new(id: usize, state: PlayerState) -> Self {
        Self { id, alive: AtomicBool::new(true), state: Mutex::new(state) }
    }

    pub fn from_snapshot(id: usize, snapshot: PlayerSnapshot) -> Self {
        Self { id, alive: AtomicBool::new(snapshot.alive), state: Mutex::new(snapshot.state) }
    }

    pub fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Marks the player dead. Returns `false` if it already was.
    pub fn destroy(&self) -> bool {
        self.alive.swap(false, Ordering::AcqRel)
    }

    pub fn state(&self) -> MutexGuard<'_, PlayerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn score(&self) -> u32 {
        self.state().score
    }

    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot { state: self.state().clone(), alive: self.is_alive() }
    }
}
