//! Game rendering system (text).
//!
//! Builds the frame the control surface draws: the grid followed by a
//! status line.

use crate::game::grid::{Cell, GridStore};
use crate::game::state::Session;
use crate::game::types::{CellContent, Position};

/// Character drawn for a single cell. Occupants take priority over portals and dots.
pub fn cell_symbol(cell: &Cell) -> char {
    match cell.content {
        CellContent::Wall => 'X',
        CellContent::Player(_) => 'P',
        CellContent::Adversary(_) => 'M',
        CellContent::Empty if cell.has_portal => '@',
        CellContent::Empty if cell.has_dot => '.',
        CellContent::Empty => ' ',
    }
}

/// Draw the grid row by row, reading one cell at a time.
pub fn render_grid(grid: &GridStore) -> String {
    let mut out = String::with_capacity((grid.width() + 1) * grid.height());
    for y in 0..grid.height() {
        for x in 0..grid.width() {
            out.push(cell_symbol(&grid.inspect(Position::new(x, y))));
        }
        out.push('\n');
    }
    out
}

/// Level name, score and branch marker.
pub fn render_status(session: &Session) -> String {
    let mut status = format!("{} | score {}", session.level.name, session.score());
    if session.is_checkpoint() {
        status.push_str(" | checkpoint");
    }
    if !session.any_player_alive() {
        status.push_str(" | destroyed");
    }
    status
}

pub fn render_frame(session: &Session) -> String {
    let mut frame = render_grid(&session.grid);
    frame.push_str(&render_status(session));
    frame.push('\n');
    frame
}
