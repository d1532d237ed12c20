//! Level progression: plays the catalog in order, carrying the score forward.

use std::sync::Arc;
use std::time::Duration;

use log::info;
use serde::{Deserialize, Serialize};

use crate::config::game::OUTCOME_PAUSE_MS;
use crate::game::level::{load_level, LevelCatalog};
use crate::game::state::Session;
use crate::session::checkpoint::run_branch;
use crate::session::control::SharedSurface;
use crate::session::messages::{BranchOutcome, SessionResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEnd {
    /// Every level of the catalog was cleared.
    Completed,
    Died,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSummary {
    pub levels_cleared: usize,
    pub score: u32,
    pub end: GameEnd,
}

pub struct Progression {
    catalog: LevelCatalog,
    tempo_override: Option<u64>,
    outcome_pause: Duration,
}

impl Progression {
    pub fn new(catalog: LevelCatalog) -> Self {
        Self { catalog, tempo_override: None, outcome_pause: Duration::from_millis(OUTCOME_PAUSE_MS) }
    }

    /// Replaces the tempo of every level.
    pub fn with_tempo(mut self, tempo_ms: Option<u64>) -> Self {
        self.tempo_override = tempo_ms;
        self
    }

    /// How long the closing banner stays up.
    pub fn with_outcome_pause(mut self, pause: Duration) -> Self {
        self.outcome_pause = pause;
        self
    }

    pub async fn run(&self, surface: SharedSurface) -> GameSummary {
        let mut score = 0;
        let mut levels_cleared = 0;

        for source in self.catalog.levels() {
            let mut snapshot = load_level(source, score);
            if let Some(tempo_ms) = self.tempo_override {
                snapshot.level.tempo_ms = tempo_ms;
            }
            let name = snapshot.level.name.clone();
            let session = Arc::new(Session::from_snapshot(snapshot, false));
            info!("[Progression] level {} started: {}", levels_cleared + 1, name);

            let exit = run_branch(session, surface.clone()).await;
            score = exit.final_state.score();

            match exit.outcome.session_result() {
                SessionResult::NextLevel => {
                    levels_cleared += 1;
                    info!("[Progression] level {} cleared, score {}", name, score);
                }
                _ => {
                    let end = match exit.outcome {
                        BranchOutcome::Died => GameEnd::Died,
                        _ => GameEnd::Quit,
                    };
                    return self.finish(&surface, GameSummary { levels_cleared, score, end }).await;
                }
            }
        }

        self.finish(&surface, GameSummary { levels_cleared, score, end: GameEnd::Completed }).await
    }

    async fn finish(&self, surface: &SharedSurface, summary: GameSummary) -> GameSummary {
        let banner = match summary.end {
            GameEnd::Completed => "You win!",
            GameEnd::Died => "Game over.",
            GameEnd::Quit => "Bye.",
        };
        info!(
            "[Progression] game ended: {:?} after {} level(s), score {}",
            summary.end, summary.levels_cleared, summary.score
        );
        surface
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .render(&format!("{}\nscore {}\n", banner, summary.score));
        if summary.end != GameEnd::Quit {
            tokio::time::sleep(self.outcome_pause).await;
        }
        summary
    }
}
