//! Turns level definitions into session snapshots.
//!
//! Loading never fails from the caller's point of view: an unreadable or
//! malformed level becomes the built-in level, and an unusable actor file
//! becomes a wait-only placeholder on the first free cell.

use std::fs;
use std::path::Path;

use log::{info, warn};

use crate::config::game::{DEFAULT_COLS, DEFAULT_PLAYER_POS, DEFAULT_PORTAL, DEFAULT_ROWS, DEFAULT_TEMPO_MS};
use crate::error::LoadError;
use crate::game::entities::{AdversaryState, CommandSchedule, PlayerSnapshot, PlayerState};
use crate::game::grid::Cell;
use crate::game::level::catalog::LevelSource;
use crate::game::level::parser::{parse_actor, parse_level, ActorDefinition, LevelDefinition};
use crate::game::state::{LevelInfo, SessionSnapshot};
use crate::game::types::{CellContent, Command, Direction, Position};

/// Incrementally places actors on a parsed board.
pub struct LevelBuilder {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    players: Vec<PlayerSnapshot>,
    adversaries: Vec<AdversaryState>,
    level: LevelInfo,
}

impl LevelBuilder {
    pub fn new(layout: &LevelDefinition, name: impl Into<String>) -> Self {
        let mut cells = vec![Cell::empty(); layout.width * layout.height];
        for (y, row) in layout.rows.iter().take(layout.height).enumerate() {
            for (x, symbol) in row.chars().take(layout.width).enumerate() {
                cells[y * layout.width + x] = match symbol {
                    'X' => Cell::wall(),
                    'o' => Cell::dot(),
                    '@' => Cell::portal(),
                    _ => Cell::empty(),
                };
            }
        }
        Self {
            width: layout.width,
            height: layout.height,
            cells,
            players: Vec::new(),
            adversaries: Vec::new(),
            level: LevelInfo { name: name.into(), tempo_ms: layout.tempo_ms },
        }
    }

    /// Empty, portal-free cell inside the grid.
    pub fn is_free(&self, pos: Position) -> bool {
        pos.x < self.width
            && pos.y < self.height
            && matches!(self.cells[pos.y * self.width + pos.x], Cell { content: CellContent::Empty, has_portal: false, .. })
    }

    pub fn first_free(&self) -> Option<Position> {
        (0..self.height)
            .flat_map(|y| (0..self.width).map(move |x| Position::new(x, y)))
            .find(|pos| self.is_free(*pos))
    }

    /// Adds a player, falling back to a placeholder if `loaded` is unusable.
    pub fn add_player(&mut self, loaded: Result<ActorDefinition, LoadError>, score: u32) -> &mut Self {
        if let Some(actor) = self.settle(loaded, "player") {
            let id = self.players.len();
            self.occupy(actor.pos, CellContent::Player(id));
            let state = PlayerState::new(actor.pos, actor.cadence, CommandSchedule::new(actor.commands), score);
            self.players.push(PlayerSnapshot { state, alive: true });
        }
        self
    }

    /// Adds an adversary, falling back to a placeholder if `loaded` is unusable.
    pub fn add_adversary(&mut self, loaded: Result<ActorDefinition, LoadError>) -> &mut Self {
        if let Some(actor) = self.settle(loaded, "adversary") {
            let id = self.adversaries.len();
            self.occupy(actor.pos, CellContent::Adversary(id));
            self.adversaries
                .push(AdversaryState::new(actor.pos, actor.cadence, CommandSchedule::new(actor.commands)));
        }
        self
    }

    /// Adds a player with no recorded commands, on `preferred` if free.
    pub fn add_live_player(&mut self, preferred: Position, score: u32) -> &mut Self {
        let pos = if self.is_free(preferred) { Some(preferred) } else { self.first_free() };
        match pos {
            Some(pos) => self.add_player(Ok(ActorDefinition::live(pos)), score),
            None => {
                warn!("[Level] no free cell for the player");
                self
            }
        }
    }

    pub fn build(&self) -> SessionSnapshot {
        SessionSnapshot {
            width: self.width,
            height: self.height,
            cells: self.cells.clone(),
            players: self.players.clone(),
            adversaries: self.adversaries.clone(),
            level: self.level.clone(),
        }
    }

    fn settle(&self, loaded: Result<ActorDefinition, LoadError>, label: &str) -> Option<ActorDefinition> {
        let checked = loaded.and_then(|actor| {
            if self.is_free(actor.pos) {
                Ok(actor)
            } else {
                Err(LoadError::BadPosition { x: actor.pos.x, y: actor.pos.y })
            }
        });
        match checked {
            Ok(actor) => Some(actor),
            Err(err) => {
                warn!("[Level] {} unusable ({}); placing a placeholder", label, err);
                let fallback = self.first_free().map(ActorDefinition::placeholder);
                if fallback.is_none() {
                    warn!("[Level] no free cell for the {} placeholder", label);
                }
                fallback
            }
        }
    }

    fn occupy(&mut self, pos: Position, content: CellContent) {
        self.cells[pos.y * self.width + pos.x].content = content;
    }
}

/// The level played when no level directory is given or a level file fails to load.
pub fn builtin_level(points: u32) -> SessionSnapshot {
    let (portal_x, portal_y) = DEFAULT_PORTAL;
    let rows: Vec<String> = (0..DEFAULT_ROWS)
        .map(|y| {
            (0..DEFAULT_COLS)
                .map(|x| {
                    if y == 0 || x == 0 || x == DEFAULT_COLS - 1 {
                        'X'
                    } else if (x, y) == (portal_x, portal_y) {
                        '@'
                    } else {
                        'o'
                    }
                })
                .collect::<String>()
        })
        .collect();
    let layout = LevelDefinition {
        height: DEFAULT_ROWS,
        width: DEFAULT_COLS,
        tempo_ms: DEFAULT_TEMPO_MS,
        player_file: None,
        adversary_files: Vec::new(),
        rows,
    };

    let patrol = std::iter::repeat_n(Command::Move(Direction::Right), 8)
        .chain(std::iter::repeat_n(Command::Move(Direction::Left), 8))
        .collect();

    let mut builder = LevelBuilder::new(&layout, "Built-in level");
    builder
        .add_live_player(Position::new(DEFAULT_PLAYER_POS.0, DEFAULT_PLAYER_POS.1), points)
        .add_adversary(Ok(ActorDefinition { cadence: 0, pos: Position::new(1, 3), commands: patrol }))
        .add_adversary(Ok(ActorDefinition { cadence: 1, pos: Position::new(4, 2), commands: vec![Command::Random] }));

    builder.build()
}

fn read(path: &Path) -> Result<String, LoadError> {
    fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })
}

fn load_actor(path: &Path) -> Result<ActorDefinition, LoadError> {
    parse_actor(&read(path)?)
}

/// Loads a level file and its actor files, with per-actor fallbacks.
pub fn load_level_file(path: &Path, points: u32) -> Result<SessionSnapshot, LoadError> {
    let layout = parse_level(&read(path)?)?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));
    let name = path
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut builder = LevelBuilder::new(&layout, name);
    match &layout.player_file {
        Some(file) => builder.add_player(load_actor(&base.join(file)), points),
        None => builder.add_live_player(Position::new(DEFAULT_PLAYER_POS.0, DEFAULT_PLAYER_POS.1), points),
    };
    for file in &layout.adversary_files {
        builder.add_adversary(load_actor(&base.join(file)));
    }
    Ok(builder.build())
}

/// Loads whatever `source` names, falling back to the built-in level.
pub fn load_level(source: &LevelSource, points: u32) -> SessionSnapshot {
    match source {
        LevelSource::Builtin => builtin_level(points),
        LevelSource::File(path) => match load_level_file(path, points) {
            Ok(snapshot) => {
                info!("[Level] loaded {} ({}x{})", path.display(), snapshot.height, snapshot.width);
                snapshot
            }
            Err(err) => {
                warn!("[Level] {}: {}; using the built-in level", path.display(), err);
                builtin_level(points)
            }
        },
    }
}
