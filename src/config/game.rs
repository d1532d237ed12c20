/// Game configuration constants.
/// 
/// This module defines the built-in level used when no level directory is
/// given (or a level file cannot be loaded), and level file conventions.
pub const DEFAULT_TEMPO_MS: u64 = 10; // Tick interval of the built-in level.

/// Number of rows of the built-in level.
pub const DEFAULT_ROWS: usize = 5;

/// Number of columns of the built-in level.
pub const DEFAULT_COLS: usize = 10;

/// Portal cell of the built-in level, as (x, y).
pub const DEFAULT_PORTAL: (usize, usize) = (8, 4);

/// Spawn cell of the default player, as (x, y).
pub const DEFAULT_PLAYER_POS: (usize, usize) = (1, 1);

/// Largest playable grid, in cells. Bigger `DIM` values are rejected.
pub const MAX_CELLS: usize = 1 << 20;

/// Extension of level files picked up from a level directory.
pub const LEVEL_EXTENSION: &str = "lvl";

/// Pause (in milliseconds) after showing a win or game-over banner.
pub const OUTCOME_PAUSE_MS: u64 = 2000;
