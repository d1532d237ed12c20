//! Shared value types of the engine: grid coordinates, directions,
//! recorded commands, cell content and move outcomes.

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Grid coordinate. `x` is the column, `y` is the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub const fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    /// Draws one of the four cardinal directions uniformly.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.random_range(0..Self::ALL.len())]
    }

    /// Column and row offsets of a single step.
    pub fn delta(self) -> (isize, isize) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// One entry of an actor's schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Move(Direction),
    Random,
    /// Occupies `turns` acted ticks; `remaining` counts down to the next cursor advance.
    Wait { turns: u32, remaining: u32 },
    /// Arms the adversary's ranged sweep for its next directional command.
    Charge,
}

impl Command {
    pub fn wait(turns: u32) -> Self {
        let turns = turns.max(1);
        Command::Wait { turns, remaining: turns }
    }
}

/// Occupant marker of a grid cell. Dots and portals are flags on the cell, not content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellContent {
    Empty,
    Wall,
    /// Index of the player in the session.
    Player(usize),
    /// Index of the adversary in the session.
    Adversary(usize),
}

impl CellContent {
    pub fn is_occupant(self) -> bool {
        matches!(self, CellContent::Player(_) | CellContent::Adversary(_))
    }
}

/// Result of a single movement step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MoveOutcome {
    Valid,
    Invalid,
    ReachedPortal,
    ActorDestroyed,
}
