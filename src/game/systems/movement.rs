//! Movement system.
//!
//! One step of a player or an adversary. Every read and write of cell content
//! that decides a move happens inside a grid transaction, which is released
//! on every return path when it drops.

use log::debug;

use crate::game::entities::{Adversary, AdversaryState, CommandSchedule, Player};
use crate::game::grid::GridStore;
use crate::game::types::{CellContent, Command, Direction, MoveOutcome, Position};

/// A command after random and schedule-only entries are dealt with.
enum Resolved {
    Step(Direction),
    Done(MoveOutcome),
}

fn resolve(command: Command, schedule: &mut CommandSchedule) -> Resolved {
    match command {
        Command::Move(direction) => Resolved::Step(direction),
        Command::Random => Resolved::Step(Direction::random(&mut rand::rng())),
        Command::Wait { .. } => {
            schedule.tick_wait();
            Resolved::Done(MoveOutcome::Valid)
        }
        Command::Charge => Resolved::Done(MoveOutcome::Invalid),
    }
}

/// Move the player one step according to `command`.
pub fn move_player(grid: &GridStore, player: &Player, command: Command) -> MoveOutcome {
    if !player.is_alive() {
        return MoveOutcome::ActorDestroyed;
    }

    let mut state = player.state();
    if !state.pace.ready() {
        return MoveOutcome::Valid;
    }

    let direction = match resolve(command, &mut state.schedule) {
        Resolved::Step(direction) => direction,
        Resolved::Done(outcome) => {
            if command == Command::Charge {
                // Players cannot charge; skip the entry so the schedule keeps going.
                state.schedule.advance();
            }
            return outcome;
        }
    };
    state.schedule.advance();

    let Some(target) = grid.neighbor(state.pos, direction) else {
        return MoveOutcome::Invalid;
    };

    let mut tx = grid.try_enter(state.pos, target);

    // An adversary may have taken our cell while we waited for the locks.
    if !player.is_alive() {
        return MoveOutcome::ActorDestroyed;
    }

    if tx.destination().has_portal {
        tx.origin_mut().content = CellContent::Empty;
        tx.destination_mut().content = CellContent::Player(player.id);
        state.pos = target;
        return MoveOutcome::ReachedPortal;
    }

    match tx.destination().content {
        CellContent::Wall | CellContent::Player(_) => return MoveOutcome::Invalid,
        CellContent::Adversary(_) => {
            player.destroy();
            tx.origin_mut().content = CellContent::Empty;
            debug!("[Movement] player {} walked into an adversary at {:?}", player.id, target);
            return MoveOutcome::ActorDestroyed;
        }
        CellContent::Empty => {}
    }

    if tx.destination().has_dot {
        state.score += 1;
        tx.destination_mut().has_dot = false;
    }

    tx.origin_mut().content = CellContent::Empty;
    tx.destination_mut().content = CellContent::Player(player.id);
    state.pos = target;
    MoveOutcome::Valid
}

/// Move the adversary one step according to `command`.
pub fn move_adversary(
    grid: &GridStore,
    players: &[Player],
    adversary: &Adversary,
    command: Command,
) -> MoveOutcome {
    let mut state = adversary.state();
    if !state.pace.ready() {
        return MoveOutcome::Valid;
    }

    if command == Command::Charge {
        state.schedule.advance();
        state.charged = true;
        return MoveOutcome::Valid;
    }

    let direction = match resolve(command, &mut state.schedule) {
        Resolved::Step(direction) => direction,
        Resolved::Done(outcome) => return outcome,
    };
    state.schedule.advance();

    if state.charged {
        state.charged = false;
        return charged_move(grid, players, adversary.id, &mut state, direction);
    }

    let Some(target) = grid.neighbor(state.pos, direction) else {
        return MoveOutcome::Invalid;
    };

    let mut tx = grid.try_enter(state.pos, target);
    let outcome = match tx.destination().content {
        CellContent::Wall | CellContent::Adversary(_) => return MoveOutcome::Invalid,
        CellContent::Player(victim) => destroy_player(players, victim),
        CellContent::Empty => MoveOutcome::Valid,
    };

    tx.origin_mut().content = CellContent::Empty;
    tx.destination_mut().content = CellContent::Adversary(adversary.id);
    state.pos = target;
    outcome
}

/// Ranged sweep: slide toward the edge until something is in the way.
///
/// The scan locks each cell on its own. The landing cell is then checked
/// again inside the final transaction, since another actor may have moved
/// in between the scan and the commit.
fn charged_move(
    grid: &GridStore,
    players: &[Player],
    id: usize,
    state: &mut AdversaryState,
    direction: Direction,
) -> MoveOutcome {
    if grid.neighbor(state.pos, direction).is_none() {
        return MoveOutcome::Invalid;
    }

    let landing = sweep(grid, state.pos, direction);
    if landing == state.pos {
        return MoveOutcome::Valid;
    }

    let mut tx = grid.try_enter(state.pos, landing);
    let outcome = match tx.destination().content {
        CellContent::Empty => MoveOutcome::Valid,
        CellContent::Player(victim) => destroy_player(players, victim),
        CellContent::Wall | CellContent::Adversary(_) => {
            debug!("[Movement] adversary {} lost its landing cell {:?}", id, landing);
            return MoveOutcome::Valid;
        }
    };

    tx.origin_mut().content = CellContent::Empty;
    tx.destination_mut().content = CellContent::Adversary(id);
    state.pos = landing;
    outcome
}

/// Last cell reachable from `start` in `direction`: the cell before the first
/// wall or adversary, the first player cell, or the grid edge.
fn sweep(grid: &GridStore, start: Position, direction: Direction) -> Position {
    let mut landing = start;
    while let Some(next) = grid.neighbor(landing, direction) {
        let content = grid.peek(next);
        if matches!(content, CellContent::Wall | CellContent::Adversary(_)) {
            break;
        }
        landing = next;
        if matches!(content, CellContent::Player(_)) {
            break;
        }
    }
    landing
}

/// Called with the victim's cell locked; the caller overwrites that cell.
fn destroy_player(players: &[Player], victim: usize) -> MoveOutcome {
    match players.get(victim) {
        Some(player) => {
            player.destroy();
            debug!("[Movement] player {} destroyed", victim);
            MoveOutcome::ActorDestroyed
        }
        None => MoveOutcome::Valid,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::entities::PlayerState;
    use crate::game::grid::Cell;

    /// Builds a grid from rows: `X` wall, `o` dot, `@` portal, anything else empty.
    fn grid(rows: &[&str]) -> GridStore {
        let width = rows[0].len();
        let cells = rows
            .iter()
            .flat_map(|row| row.chars())
            .map(|c| match c {
                'X' => Cell::wall(),
                'o' => Cell::dot(),
                '@' => Cell::portal(),
                _ => Cell::empty(),
            })
            .collect();
        GridStore::from_cells(width, rows.len(), cells)
    }

    fn place_player(grid: &GridStore, id: usize, pos: Position) -> Player {
        grid.try_enter(pos, pos).destination_mut().content = CellContent::Player(id);
        Player::new(id, PlayerState::new(pos, 0, CommandSchedule::live(), 0))
    }

    fn place_adversary(grid: &GridStore, id: usize, pos: Position) -> Adversary {
        grid.try_enter(pos, pos).destination_mut().content = CellContent::Adversary(id);
        Adversary::new(id, AdversaryState::new(pos, 0, CommandSchedule::live()))
    }

    fn step(direction: Direction) -> Command {
        Command::Move(direction)
    }

    #[test]
    fn test_player_blocked_by_wall() {
        let grid = grid(&["   ", " X ", "   "]);
        let player = place_player(&grid, 0, Position::new(0, 1));

        assert_eq!(move_player(&grid, &player, step(Direction::Right)), MoveOutcome::Invalid);
        assert_eq!(player.state().pos, Position::new(0, 1));
        assert_eq!(grid.peek(Position::new(0, 1)), CellContent::Player(0));
    }

    #[test]
    fn test_player_blocked_by_edge() {
        let grid = grid(&["  "]);
        let player = place_player(&grid, 0, Position::new(0, 0));

        assert_eq!(move_player(&grid, &player, step(Direction::Left)), MoveOutcome::Invalid);
        assert_eq!(move_player(&grid, &player, step(Direction::Up)), MoveOutcome::Invalid);
        assert_eq!(player.state().pos, Position::new(0, 0));
    }

    #[test]
    fn test_player_reaches_portal() {
        let grid = grid(&[" @"]);
        let player = place_player(&grid, 0, Position::new(0, 0));

        assert_eq!(move_player(&grid, &player, step(Direction::Right)), MoveOutcome::ReachedPortal);
        assert_eq!(player.state().pos, Position::new(1, 0));
        assert_eq!(grid.peek(Position::new(0, 0)), CellContent::Empty);
        assert_eq!(grid.peek(Position::new(1, 0)), CellContent::Player(0));
    }

    #[test]
    fn test_dot_collected_once() {
        let grid = grid(&["oo "]);
        let player = place_player(&grid, 0, Position::new(0, 0));

        assert_eq!(move_player(&grid, &player, step(Direction::Right)), MoveOutcome::Valid);
        assert_eq!(player.score(), 1);
        assert!(!grid.inspect(Position::new(1, 0)).has_dot);

        move_player(&grid, &player, step(Direction::Right));
        move_player(&grid, &player, step(Direction::Left));
        assert_eq!(player.score(), 1);
        assert!(!grid.inspect(Position::new(1, 0)).has_dot);
    }

    #[test]
    fn test_player_destroyed_by_walking_into_adversary() {
        let grid = grid(&["   "]);
        let player = place_player(&grid, 0, Position::new(0, 0));
        let _adversary = place_adversary(&grid, 0, Position::new(1, 0));

        assert_eq!(move_player(&grid, &player, step(Direction::Right)), MoveOutcome::ActorDestroyed);
        assert!(!player.is_alive());
        assert_eq!(grid.peek(Position::new(0, 0)), CellContent::Empty);
        assert_eq!(grid.peek(Position::new(1, 0)), CellContent::Adversary(0));
    }

    #[test]
    fn test_cadence_gate_skips_ticks() {
        let grid = grid(&["    "]);
        grid.try_enter(Position::new(0, 0), Position::new(0, 0)).destination_mut().content =
            CellContent::Player(0);
        let player = Player::new(0, PlayerState::new(Position::new(0, 0), 1, CommandSchedule::live(), 0));

        assert_eq!(move_player(&grid, &player, step(Direction::Right)), MoveOutcome::Valid);
        assert_eq!(player.state().pos, Position::new(0, 0));
        move_player(&grid, &player, step(Direction::Right));
        assert_eq!(player.state().pos, Position::new(1, 0));
    }

    #[test]
    fn test_adversary_step_destroys_player() {
        let grid = grid(&["   "]);
        let players = vec![place_player(&grid, 0, Position::new(2, 0))];
        let adversary = place_adversary(&grid, 0, Position::new(1, 0));

        let outcome = move_adversary(&grid, &players, &adversary, step(Direction::Right));
        assert_eq!(outcome, MoveOutcome::ActorDestroyed);
        assert!(!players[0].is_alive());
        assert_eq!(adversary.state().pos, Position::new(2, 0));
        assert_eq!(grid.peek(Position::new(2, 0)), CellContent::Adversary(0));
        assert_eq!(grid.peek(Position::new(1, 0)), CellContent::Empty);
    }

    #[test]
    fn test_adversary_ignores_dots_and_portals() {
        let grid = grid(&[" o@"]);
        let adversary = place_adversary(&grid, 0, Position::new(0, 0));

        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Right)), MoveOutcome::Valid);
        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Right)), MoveOutcome::Valid);
        assert_eq!(adversary.state().pos, Position::new(2, 0));
        assert!(grid.inspect(Position::new(1, 0)).has_dot);
    }

    #[test]
    fn test_charge_arms_without_moving() {
        let grid = grid(&["   "]);
        let adversary = place_adversary(&grid, 0, Position::new(0, 0));

        assert_eq!(move_adversary(&grid, &[], &adversary, Command::Charge), MoveOutcome::Valid);
        assert!(adversary.state().charged);
        assert_eq!(adversary.state().pos, Position::new(0, 0));
    }

    #[test]
    fn test_charged_sweep_destroys_player_in_row() {
        let grid = grid(&["     "]);
        let players = vec![place_player(&grid, 0, Position::new(1, 0))];
        let adversary = place_adversary(&grid, 0, Position::new(4, 0));
        adversary.state().charged = true;

        let outcome = move_adversary(&grid, &players, &adversary, step(Direction::Left));
        assert_eq!(outcome, MoveOutcome::ActorDestroyed);
        assert!(!players[0].is_alive());
        assert_eq!(adversary.state().pos, Position::new(1, 0));
        assert!(!adversary.state().charged);
        assert_eq!(grid.peek(Position::new(1, 0)), CellContent::Adversary(0));
        assert_eq!(grid.peek(Position::new(4, 0)), CellContent::Empty);
    }

    #[test]
    fn test_charged_sweep_stops_before_wall() {
        let grid = grid(&["X    "]);
        let adversary = place_adversary(&grid, 0, Position::new(4, 0));
        adversary.state().charged = true;

        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Left)), MoveOutcome::Valid);
        assert_eq!(adversary.state().pos, Position::new(1, 0));
    }

    #[test]
    fn test_charged_sweep_column_hits_adversary() {
        let grid = grid(&[" ", " ", " ", " "]);
        let _blocker = place_adversary(&grid, 1, Position::new(0, 3));
        let adversary = place_adversary(&grid, 0, Position::new(0, 0));
        adversary.state().charged = true;

        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Down)), MoveOutcome::Valid);
        assert_eq!(adversary.state().pos, Position::new(0, 2));
    }

    #[test]
    fn test_charged_sweep_adjacent_wall_stays_put() {
        let grid = grid(&["X "]);
        let adversary = place_adversary(&grid, 0, Position::new(1, 0));
        adversary.state().charged = true;

        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Left)), MoveOutcome::Valid);
        assert_eq!(adversary.state().pos, Position::new(1, 0));
        assert!(!adversary.state().charged);
    }

    #[test]
    fn test_charged_sweep_open_row_stops_at_edge() {
        let grid = grid(&["     "]);
        let adversary = place_adversary(&grid, 0, Position::new(3, 0));
        adversary.state().charged = true;

        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Left)), MoveOutcome::Valid);
        assert_eq!(adversary.state().pos, Position::new(0, 0));
        assert!(!adversary.state().charged);
        assert_eq!(grid.peek(Position::new(3, 0)), CellContent::Empty);
        assert_eq!(grid.peek(Position::new(0, 0)), CellContent::Adversary(0));
    }

    #[test]
    fn test_charged_sweep_at_edge_is_invalid() {
        let grid = grid(&["  "]);
        let adversary = place_adversary(&grid, 0, Position::new(0, 0));
        adversary.state().charged = true;

        assert_eq!(move_adversary(&grid, &[], &adversary, step(Direction::Left)), MoveOutcome::Invalid);
        assert!(!adversary.state().charged);
    }
}
