//! Session state.
//!
//! A [`Session`] is one live level: the grid, its actors, the shared running
//! flag and the live input slot. It is shared by `Arc` between the actor
//! tasks of one branch. [`SessionSnapshot`] is its plain, serializable copy
//! and the unit a checkpoint duplicates.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CheckpointError;
use crate::game::entities::{Adversary, AdversaryState, Player, PlayerSnapshot};
use crate::game::grid::{Cell, GridStore};
use crate::game::systems::{move_adversary, move_player};
use crate::game::types::{Command, Direction, MoveOutcome};
use crate::session::messages::HaltReason;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelInfo {
    pub name: String,
    /// Tick interval in milliseconds; 0 means "as fast as possible".
    pub tempo_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub width: usize,
    pub height: usize,
    /// Row-major, `width * height` cells.
    pub cells: Vec<Cell>,
    pub players: Vec<PlayerSnapshot>,
    pub adversaries: Vec<AdversaryState>,
    pub level: LevelInfo,
}

impl SessionSnapshot {
    pub fn to_json(&self) -> Result<Vec<u8>, CheckpointError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decodes a snapshot and checks that its cells cover the grid.
    pub fn from_json(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let snapshot: Self = serde_json::from_slice(bytes)?;
        snapshot.validate()?;
        Ok(snapshot)
    }

    pub fn validate(&self) -> Result<(), CheckpointError> {
        let expected = self.width * self.height;
        if self.cells.len() != expected {
            return Err(CheckpointError::SnapshotMismatch { expected, actual: self.cells.len() });
        }
        Ok(())
    }

    pub fn score(&self) -> u32 {
        self.players.iter().map(|p| p.state.score).sum()
    }
}

pub struct Session {
    /// Identifies the branch in logs.
    pub branch_id: Uuid,
    pub grid: GridStore,
    pub players: Vec<Player>,
    pub adversaries: Vec<Adversary>,
    pub level: LevelInfo,
    is_checkpoint: bool,
    running: AtomicBool,
    halt: Mutex<Option<HaltReason>>,
    next_direction: Mutex<Option<Direction>>,
}

impl Session {
    /// Builds a stopped session from a snapshot.
    pub fn from_snapshot(snapshot: SessionSnapshot, is_checkpoint: bool) -> Self {
        let SessionSnapshot { width, height, cells, players, adversaries, level } = snapshot;
        Self {
            branch_id: Uuid::new_v4(),
            grid: GridStore::from_cells(width, height, cells),
            players: players
                .into_iter()
                .enumerate()
                .map(|(id, snapshot)| Player::from_snapshot(id, snapshot))
                .collect(),
            adversaries: adversaries
                .into_iter()
                .enumerate()
                .map(|(id, state)| Adversary::new(id, state))
                .collect(),
            level,
            is_checkpoint,
            running: AtomicBool::new(false),
            halt: Mutex::new(None),
            next_direction: Mutex::new(None),
        }
    }

    /// Copies the whole session. Only meaningful once every actor task has
    /// been joined.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            width: self.grid.width(),
            height: self.grid.height(),
            cells: self.grid.snapshot(),
            players: self.players.iter().map(Player::snapshot).collect(),
            adversaries: self.adversaries.iter().map(Adversary::snapshot).collect(),
            level: self.level.clone(),
        }
    }

    pub fn tempo(&self) -> Duration {
        Duration::from_millis(self.level.tempo_ms)
    }

    /// Whether this session is a checkpoint branch (which may not checkpoint again).
    pub fn is_checkpoint(&self) -> bool {
        self.is_checkpoint
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// Clears the previous halt and any stale input, then raises the running flag.
    pub fn resume(&self) {
        *lock(&self.halt) = None;
        *lock(&self.next_direction) = None;
        self.running.store(true, Ordering::Release);
    }

    /// Clears the running flag. Returns `true` if `reason` is the first one recorded.
    pub fn halt(&self, reason: HaltReason) -> bool {
        let mut halt = lock(&self.halt);
        let first = halt.is_none();
        if first {
            *halt = Some(reason);
        }
        self.running.store(false, Ordering::Release);
        first
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        *lock(&self.halt)
    }

    /// Writes the live input slot, replacing any unread direction.
    pub fn inject_direction(&self, direction: Direction) {
        *lock(&self.next_direction) = Some(direction);
    }

    /// Reads and empties the live input slot.
    pub fn take_direction(&self) -> Option<Direction> {
        lock(&self.next_direction).take()
    }

    pub fn any_player_alive(&self) -> bool {
        self.players.iter().any(Player::is_alive)
    }

    pub fn score(&self) -> u32 {
        self.players.iter().map(Player::score).sum()
    }

    /// Runs one tick of a player: the recorded command under its cursor, or
    /// the live direction if its schedule is empty. `None` when there was no
    /// command to act on.
    pub fn step_player(&self, index: usize) -> Option<MoveOutcome> {
        let player = self.players.get(index)?;
        let recorded = {
            let state = player.state();
            if state.schedule.is_live() { None } else { state.schedule.current() }
        };
        let command = match recorded {
            Some(command) => command,
            None => Command::Move(self.take_direction()?),
        };
        Some(move_player(&self.grid, player, command))
    }

    /// Runs one tick of an adversary. Adversaries without commands idle.
    pub fn step_adversary(&self, index: usize) -> Option<MoveOutcome> {
        let adversary = self.adversaries.get(index)?;
        let command = adversary.state().schedule.current()?;
        Some(move_adversary(&self.grid, &self.players, adversary, command))
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
