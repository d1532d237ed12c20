//! Command schedules and cadence shared by every actor.

use serde::{Deserialize, Serialize};

use crate::game::types::Command;

/// Ordered command sequence with a cyclic cursor. An empty schedule means
/// the actor is driven by live input instead.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSchedule {
    commands: Vec<Command>,
    cursor: usize,
}

impl CommandSchedule {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands, cursor: 0 }
    }

    /// Schedule for an externally driven actor.
    pub fn live() -> Self {
        Self::default()
    }

    pub fn is_live(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn commands(&self) -> &[Command] {
        &self.commands
    }

    /// Command under the cursor, if any are recorded.
    pub fn current(&self) -> Option<Command> {
        self.commands.get(self.cursor).copied()
    }

    /// Moves the cursor to the next command, wrapping at the end.
    pub fn advance(&mut self) {
        if !self.commands.is_empty() {
            self.cursor = (self.cursor + 1) % self.commands.len();
        }
    }

    /// Counts one tick off the wait under the cursor. Returns `true` when the
    /// wait finished, in which case its counter is rearmed and the cursor moves on.
    pub fn tick_wait(&mut self) -> bool {
        let finished = match self.commands.get_mut(self.cursor) {
            Some(Command::Wait { turns, remaining }) => {
                *remaining = remaining.saturating_sub(1);
                if *remaining == 0 {
                    *remaining = (*turns).max(1);
                    true
                } else {
                    false
                }
            }
            _ => return false,
        };
        if finished {
            self.advance();
        }
        finished
    }
}

/// Cadence gate: an actor acts once, then skips `cadence` ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pace {
    cadence: u32,
    waiting: u32,
}

impl Pace {
    /// A fresh actor starts by waiting out one full cadence.
    pub fn new(cadence: u32) -> Self {
        Self { cadence, waiting: cadence }
    }

    pub fn cadence(&self) -> u32 {
        self.cadence
    }

    pub fn waiting(&self) -> u32 {
        self.waiting
    }

    /// Returns `true` when the actor acts on this tick.
    pub fn ready(&mut self) -> bool {
        if self.waiting > 0 {
            self.waiting -= 1;
            return false;
        }
        self.waiting = self.cadence;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::types::Direction;

    #[test]
    fn test_cursor_wraps_within_bounds() {
        let mut schedule = CommandSchedule::new(vec![
            Command::Move(Direction::Up),
            Command::Random,
            Command::Charge,
        ]);
        for _ in 0..1_000 {
            schedule.advance();
            assert!(schedule.cursor() < schedule.len());
        }
        assert_eq!(schedule.cursor(), 1_000 % 3);
    }

    #[test]
    fn test_live_schedule_never_advances() {
        let mut schedule = CommandSchedule::live();
        schedule.advance();
        assert!(schedule.is_live());
        assert_eq!(schedule.current(), None);
        assert!(!schedule.tick_wait());
    }

    #[test]
    fn test_wait_occupies_exact_tick_count() {
        let mut schedule = CommandSchedule::new(vec![Command::wait(3), Command::Move(Direction::Left)]);
        assert!(!schedule.tick_wait());
        assert!(!schedule.tick_wait());
        assert_eq!(schedule.cursor(), 0);
        assert!(schedule.tick_wait());
        assert_eq!(schedule.current(), Some(Command::Move(Direction::Left)));

        // The wait is rearmed for the next lap.
        schedule.advance();
        assert_eq!(schedule.current(), Some(Command::wait(3)));
    }

    #[test]
    fn test_pace_skips_cadence_ticks() {
        let mut pace = Pace::new(2);
        let acted: Vec<bool> = (0..6).map(|_| pace.ready()).collect();
        assert_eq!(acted, vec![false, false, true, false, false, true]);
        assert_eq!(pace.waiting(), 2);

        let mut eager = Pace::new(0);
        assert!((0..4).all(|_| eager.ready()));
    }
}
