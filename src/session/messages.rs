//! Values exchanged between the control surface, the actor tasks and the
//! checkpoint controller.

use serde::{Deserialize, Serialize};

use crate::config::checkpoint::{ADVANCED_LEVEL_CODE, DIED_CODE, QUIT_CODE};
use crate::config::control::{KEY_CHECKPOINT, KEY_DOWN, KEY_LEFT, KEY_QUIT, KEY_RIGHT, KEY_UP};
use crate::game::types::Direction;

/// Single-key command read from the control surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ControlInput {
    Move(Direction),
    Quit,
    Checkpoint,
}

impl ControlInput {
    /// Maps a key to a command. Unbound keys yield `None`.
    pub fn from_key(key: char) -> Option<Self> {
        match key.to_ascii_lowercase() {
            KEY_UP => Some(ControlInput::Move(Direction::Up)),
            KEY_DOWN => Some(ControlInput::Move(Direction::Down)),
            KEY_LEFT => Some(ControlInput::Move(Direction::Left)),
            KEY_RIGHT => Some(ControlInput::Move(Direction::Right)),
            KEY_QUIT => Some(ControlInput::Quit),
            KEY_CHECKPOINT => Some(ControlInput::Checkpoint),
            _ => None,
        }
    }
}

/// Why a session stopped running. The first reason recorded wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HaltReason {
    PortalReached,
    PlayersDestroyed,
    Quit,
    CheckpointRequested,
}

/// Terminal result of a branch, delivered to whoever started it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchOutcome {
    Died,
    AdvancedLevel,
    Quit,
}

impl BranchOutcome {
    /// Reserved integer code of the outcome.
    pub fn code(self) -> i32 {
        match self {
            BranchOutcome::Died => DIED_CODE,
            BranchOutcome::AdvancedLevel => ADVANCED_LEVEL_CODE,
            BranchOutcome::Quit => QUIT_CODE,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            DIED_CODE => Some(BranchOutcome::Died),
            ADVANCED_LEVEL_CODE => Some(BranchOutcome::AdvancedLevel),
            QUIT_CODE => Some(BranchOutcome::Quit),
            _ => None,
        }
    }

    /// What the level progression does with this outcome.
    pub fn session_result(self) -> SessionResult {
        match self {
            BranchOutcome::AdvancedLevel => SessionResult::NextLevel,
            BranchOutcome::Died | BranchOutcome::Quit => SessionResult::Quit,
        }
    }
}

/// Result of one control-loop iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionResult {
    Continue,
    NextLevel,
    Quit,
}
