//! Grid store.
//!
//! Every cell sits behind its own lock. Moves that touch two cells go through
//! [`GridStore::try_enter`], which always locks the lower cell index first, so
//! two actors walking into each other can never wait on one another in a cycle.
//! Callers only ever see a [`Transaction`]; raw lock guards never leave this module.

use std::sync::{Mutex, MutexGuard, PoisonError};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::game::types::{CellContent, Direction, Position};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub content: CellContent,
    /// Cleared once collected, never set again.
    pub has_dot: bool,
    /// Fixed at load time.
    pub has_portal: bool,
}

impl Cell {
    pub const fn empty() -> Self {
        Self { content: CellContent::Empty, has_dot: false, has_portal: false }
    }

    pub const fn wall() -> Self {
        Self { content: CellContent::Wall, has_dot: false, has_portal: false }
    }

    pub const fn dot() -> Self {
        Self { content: CellContent::Empty, has_dot: true, has_portal: false }
    }

    pub const fn portal() -> Self {
        Self { content: CellContent::Empty, has_dot: false, has_portal: true }
    }
}

pub struct GridStore {
    width: usize,
    height: usize,
    cells: Vec<Mutex<Cell>>,
}

impl GridStore {
    /// Builds a store from row-major cells. Missing cells are filled with
    /// empty ones and surplus cells are dropped.
    pub fn from_cells(width: usize, height: usize, cells: Vec<Cell>) -> Self {
        let size = width * height;
        if cells.len() != size {
            debug!("[Grid] resizing {} cells to {}x{}", cells.len(), height, width);
        }
        let cells = cells
            .into_iter()
            .chain(std::iter::repeat(Cell::empty()))
            .take(size)
            .map(Mutex::new)
            .collect();
        Self { width, height, cells }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn index(&self, pos: Position) -> usize {
        pos.y * self.width + pos.x
    }

    /// The cell one step away in `direction`, or `None` past the grid edge.
    pub fn neighbor(&self, pos: Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = pos.x.checked_add_signed(dx)?;
        let y = pos.y.checked_add_signed(dy)?;
        let next = Position::new(x, y);
        self.contains(next).then_some(next)
    }

    /// Current occupant of a cell, read under that cell's lock.
    pub fn peek(&self, pos: Position) -> CellContent {
        self.lock(self.index(pos)).content
    }

    /// Copy of a whole cell, read under that cell's lock.
    pub fn inspect(&self, pos: Position) -> Cell {
        *self.lock(self.index(pos))
    }

    /// Locks the `from`/`to` pair in ascending index order. Equal cells are locked once.
    pub fn try_enter(&self, from: Position, to: Position) -> Transaction<'_> {
        let origin = self.index(from);
        let destination = self.index(to);

        if origin == destination {
            return Transaction { origin_is_lower: true, lower: self.lock(origin), upper: None };
        }

        let lower = self.lock(origin.min(destination));
        let upper = self.lock(origin.max(destination));
        Transaction { origin_is_lower: origin < destination, lower, upper: Some(upper) }
    }

    /// Ends a transaction. Dropping it has the same effect.
    pub fn release(&self, transaction: Transaction<'_>) {
        drop(transaction);
    }

    /// Copies every cell in row-major order, locking one cell at a time.
    pub fn snapshot(&self) -> Vec<Cell> {
        (0..self.cells.len()).map(|index| *self.lock(index)).collect()
    }

    fn lock(&self, index: usize) -> MutexGuard<'_, Cell> {
        self.cells[index].lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Exclusive hold on the origin and destination cells of one move.
pub struct Transaction<'a> {
    origin_is_lower: bool,
    lower: MutexGuard<'a, Cell>,
    upper: Option<MutexGuard<'a, Cell>>,
}

impl Transaction<'_> {
    pub fn origin(&self) -> &Cell {
        self.slot(true)
    }

    pub fn origin_mut(&mut self) -> &mut Cell {
        self.slot_mut(true)
    }

    pub fn destination(&self) -> &Cell {
        self.slot(false)
    }

    pub fn destination_mut(&mut self) -> &mut Cell {
        self.slot_mut(false)
    }

    fn slot(&self, origin: bool) -> &Cell {
        match &self.upper {
            Some(upper) if origin != self.origin_is_lower => &**upper,
            _ => &*self.lower,
        }
    }

    fn slot_mut(&mut self, origin: bool) -> &mut Cell {
        let origin_is_lower = self.origin_is_lower;
        match &mut self.upper {
            Some(upper) if origin != origin_is_lower => &mut **upper,
            _ => &mut *self.lower,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn open_grid(width: usize, height: usize) -> GridStore {
        GridStore::from_cells(width, height, vec![Cell::empty(); width * height])
    }

    #[test]
    fn test_from_cells_pads_and_truncates() {
        let short = GridStore::from_cells(2, 2, vec![Cell::wall()]);
        assert_eq!(short.snapshot().len(), 4);
        assert_eq!(short.peek(Position::new(0, 0)), CellContent::Wall);
        assert_eq!(short.peek(Position::new(1, 1)), CellContent::Empty);

        let long = GridStore::from_cells(1, 1, vec![Cell::empty(), Cell::wall()]);
        assert_eq!(long.snapshot(), vec![Cell::empty()]);
    }

    #[test]
    fn test_neighbor_stops_at_edges() {
        let grid = open_grid(3, 2);
        assert_eq!(grid.neighbor(Position::new(0, 0), Direction::Left), None);
        assert_eq!(grid.neighbor(Position::new(0, 0), Direction::Up), None);
        assert_eq!(grid.neighbor(Position::new(2, 1), Direction::Right), None);
        assert_eq!(grid.neighbor(Position::new(2, 1), Direction::Down), None);
        assert_eq!(grid.neighbor(Position::new(1, 0), Direction::Down), Some(Position::new(1, 1)));
    }

    #[test]
    fn test_transaction_maps_origin_and_destination() {
        let grid = open_grid(3, 1);
        {
            // Destination has the lower index here.
            let mut tx = grid.try_enter(Position::new(2, 0), Position::new(0, 0));
            tx.origin_mut().content = CellContent::Player(0);
            tx.destination_mut().content = CellContent::Adversary(1);
            assert_eq!(tx.origin().content, CellContent::Player(0));
            grid.release(tx);
        }
        assert_eq!(grid.peek(Position::new(2, 0)), CellContent::Player(0));
        assert_eq!(grid.peek(Position::new(0, 0)), CellContent::Adversary(1));
    }

    #[test]
    fn test_same_cell_transaction_locks_once() {
        let grid = open_grid(2, 2);
        let pos = Position::new(1, 1);
        let mut tx = grid.try_enter(pos, pos);
        tx.destination_mut().has_dot = true;
        assert!(tx.origin().has_dot);
        drop(tx);
        assert!(grid.inspect(pos).has_dot);
    }

    #[test]
    fn test_opposing_transactions_do_not_deadlock() {
        let grid = Arc::new(open_grid(2, 1));
        let left = Position::new(0, 0);
        let right = Position::new(1, 0);

        let handles: Vec<_> = (0..4)
            .map(|worker| {
                let grid = Arc::clone(&grid);
                thread::spawn(move || {
                    for _ in 0..2_000 {
                        let (from, to) = if worker % 2 == 0 { (left, right) } else { (right, left) };
                        let mut tx = grid.try_enter(from, to);
                        tx.destination_mut().has_dot = !tx.destination().has_dot;
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().expect("worker panicked");
        }
    }
}
