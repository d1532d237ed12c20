//! Adversary entity.

use std::sync::{Mutex, MutexGuard, PoisonError};

use serde::{Deserialize, Serialize};

use crate::game::entities::schedule::{CommandSchedule, Pace};
use crate::game::types::Position;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdversaryState {
    pub pos: Position,
    pub pace: Pace,
    pub schedule: CommandSchedule,
    /// Armed by a charge command, spent by the next directional one.
    pub charged: bool,
}

impl AdversaryState {
    pub fn new(pos: Position, cadence: u32, schedule: CommandSchedule) -> Self {
        Self { pos, pace: Pace::new(cadence), schedule, charged: false }
    }
}

#[derive(Debug)]
pub struct Adversary {
    pub id: usize,
    state: Mutex<AdversaryState>,
}

impl Adversary {
    pub fn new(id: usize, state: AdversaryState) -> Self {
        Self { id, state: Mutex::new(state) }
    }

    pub fn state(&self) -> MutexGuard<'_, AdversaryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn snapshot(&self) -> AdversaryState {
        self.state().clone()
    }
}
