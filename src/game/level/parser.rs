//! Level and actor file parsing.
//!
//! Both formats are line oriented; blank lines and lines starting with `#`
//! are ignored.

use std::str::FromStr;

use log::warn;

use crate::config::game::{DEFAULT_TEMPO_MS, MAX_CELLS};
use crate::error::LoadError;
use crate::game::types::{Command, Direction, Position};

/// Parsed `.lvl` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelDefinition {
    pub height: usize,
    pub width: usize,
    pub tempo_ms: u64,
    /// Actor file of the player, relative to the level file.
    pub player_file: Option<String>,
    /// Actor files of the adversaries, relative to the level file.
    pub adversary_files: Vec<String>,
    /// Board rows as written; `X` wall, `o` dot, `@` portal.
    pub rows: Vec<String>,
}

/// Parsed actor file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorDefinition {
    pub cadence: u32,
    pub pos: Position,
    pub commands: Vec<Command>,
}

impl ActorDefinition {
    /// Stand-in for an actor whose file could not be used: it only waits.
    pub fn placeholder(pos: Position) -> Self {
        Self { cadence: 0, pos, commands: vec![Command::wait(1)] }
    }

    /// Actor driven by the control surface.
    pub fn live(pos: Position) -> Self {
        Self { cadence: 0, pos, commands: Vec::new() }
    }
}

fn meaningful_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.trim_end_matches('\r'))
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
}

fn number<T: FromStr>(directive: &'static str, token: Option<&str>, expected: usize) -> Result<T, LoadError> {
    let token = token.ok_or(LoadError::TooFewTokens { directive, expected })?;
    token
        .parse()
        .map_err(|_| LoadError::BadNumber { directive, value: token.to_string() })
}

pub fn parse_level(text: &str) -> Result<LevelDefinition, LoadError> {
    let mut dimensions = None;
    let mut tempo_ms = DEFAULT_TEMPO_MS;
    let mut player_file = None;
    let mut adversary_files = Vec::new();
    let mut rows = Vec::new();

    for line in meaningful_lines(text) {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("DIM") => {
                let height: usize = number("DIM", tokens.next(), 2)?;
                let width = number("DIM", tokens.next(), 2)?;
                dimensions = Some((height, width));
            }
            Some("TEMPO") => tempo_ms = number("TEMPO", tokens.next(), 1)?,
            Some("PAC") => {
                let file = tokens.next().ok_or(LoadError::TooFewTokens { directive: "PAC", expected: 1 })?;
                player_file = Some(file.to_string());
            }
            Some("MON") => {
                let before = adversary_files.len();
                adversary_files.extend(tokens.map(str::to_string));
                if adversary_files.len() == before {
                    return Err(LoadError::TooFewTokens { directive: "MON", expected: 1 });
                }
            }
            _ => rows.push(line.to_string()),
        }
    }

    let (height, width) = dimensions.ok_or(LoadError::MissingDirective("DIM"))?;
    let cells = height.checked_mul(width).unwrap_or(usize::MAX);
    if height == 0 || width == 0 || cells > MAX_CELLS {
        return Err(LoadError::BadDimensions { height, width });
    }

    Ok(LevelDefinition { height, width, tempo_ms, player_file, adversary_files, rows })
}

fn move_letter(token: &str) -> Option<Command> {
    let mut chars = token.chars();
    let letter = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    match letter.to_ascii_uppercase() {
        'W' => Some(Command::Move(Direction::Up)),
        'S' => Some(Command::Move(Direction::Down)),
        'A' => Some(Command::Move(Direction::Left)),
        'D' => Some(Command::Move(Direction::Right)),
        'R' => Some(Command::Random),
        'C' => Some(Command::Charge),
        _ => None,
    }
}

pub fn parse_actor(text: &str) -> Result<ActorDefinition, LoadError> {
    let mut cadence = None;
    let mut pos = None;
    let mut commands = Vec::new();

    for line in meaningful_lines(text) {
        let mut tokens = line.split_whitespace();
        let Some(head) = tokens.next() else {
            continue;
        };
        match head {
            "PASSO" => cadence = Some(number("PASSO", tokens.next(), 1)?),
            "POS" => {
                let y = number("POS", tokens.next(), 2)?;
                let x = number("POS", tokens.next(), 2)?;
                pos = Some(Position::new(x, y));
            }
            "T" => commands.push(Command::wait(number("T", tokens.next(), 1)?)),
            other => match move_letter(other) {
                Some(command) => commands.push(command),
                None => warn!("[Level] skipping unknown move {:?}", other),
            },
        }
    }

    Ok(ActorDefinition {
        cadence: cadence.ok_or(LoadError::MissingDirective("PASSO"))?,
        pos: pos.ok_or(LoadError::MissingDirective("POS"))?,
        commands,
    })
}
