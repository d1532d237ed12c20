//! Actor tasks of one branch.
//!
//! [`run_until_halt`] spawns one task per actor plus the control task, then
//! joins every one of them before reading the halt reason. Nothing looks at
//! actor state between `running` being cleared and that barrier.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info};
use tokio::task::JoinSet;

use crate::game::state::Session;
use crate::game::systems::render_frame;
use crate::game::types::MoveOutcome;
use crate::session::control::{control_task, SharedSurface};
use crate::session::messages::HaltReason;

/// Suspends for one tick. A zero tempo still yields to the other tasks.
pub async fn tick(tempo: Duration) {
    if tempo.is_zero() {
        tokio::task::yield_now().await;
    } else {
        tokio::time::sleep(tempo).await;
    }
}

async fn player_task(session: Arc<Session>, index: usize) {
    let Some(player) = session.players.get(index) else {
        return;
    };

    while session.is_running() && player.is_alive() {
        match session.step_player(index) {
            Some(MoveOutcome::ReachedPortal) => {
                info!("[Coordinator] player {} reached the portal in branch {}", index, session.branch_id);
                session.halt(HaltReason::PortalReached);
            }
            Some(MoveOutcome::ActorDestroyed) => {
                debug!("[Coordinator] player {} destroyed", index);
            }
            _ => {}
        }
        tick(session.tempo()).await;
    }

    if !session.any_player_alive() {
        session.halt(HaltReason::PlayersDestroyed);
    }
}

async fn adversary_task(session: Arc<Session>, index: usize) {
    while session.is_running() {
        if session.step_adversary(index) == Some(MoveOutcome::ActorDestroyed) && !session.any_player_alive() {
            info!("[Coordinator] adversary {} destroyed the last player in branch {}", index, session.branch_id);
            session.halt(HaltReason::PlayersDestroyed);
        }
        tick(session.tempo()).await;
    }
}

/// Runs the session until something halts it and every task has stopped.
pub async fn run_until_halt(session: Arc<Session>, surface: SharedSurface) -> HaltReason {
    session.resume();
    if !session.any_player_alive() {
        session.halt(HaltReason::PlayersDestroyed);
        return HaltReason::PlayersDestroyed;
    }

    debug!(
        "[Coordinator] branch {} running {}: players={} adversaries={} tempo={:?}",
        session.branch_id,
        session.level.name,
        session.players.len(),
        session.adversaries.len(),
        session.tempo()
    );

    let mut tasks = JoinSet::new();
    for index in 0..session.players.len() {
        tasks.spawn(player_task(Arc::clone(&session), index));
    }
    for index in 0..session.adversaries.len() {
        tasks.spawn(adversary_task(Arc::clone(&session), index));
    }
    tasks.spawn(control_task(Arc::clone(&session), surface.clone()));

    // Join barrier.
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            error!("[Coordinator] task of branch {} failed: {}", session.branch_id, err);
            session.halt(HaltReason::Quit);
        }
    }

    let reason = session.halt_reason().unwrap_or(HaltReason::Quit);
    surface
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
        .render(&render_frame(&session));
    debug!("[Coordinator] branch {} halted: {:?}", session.branch_id, reason);
    reason
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::game::level::{ActorDefinition, LevelBuilder, LevelDefinition};
    use crate::game::types::{CellContent, Command, Direction, Position};
    use crate::session::control::ScriptedSurface;
    use crate::session::messages::ControlInput;

    fn corridor(row: &str, player: Vec<Command>, adversary: Option<(usize, Vec<Command>)>) -> Arc<Session> {
        let layout = LevelDefinition {
            height: 1,
            width: row.len(),
            tempo_ms: 1,
            player_file: None,
            adversary_files: Vec::new(),
            rows: vec![row.to_string()],
        };
        let mut builder = LevelBuilder::new(&layout, "corridor");
        builder.add_player(Ok(ActorDefinition { cadence: 0, pos: Position::new(0, 0), commands: player }), 0);
        if let Some((x, commands)) = adversary {
            builder.add_adversary(Ok(ActorDefinition { cadence: 0, pos: Position::new(x, 0), commands }));
        }
        Arc::new(Session::from_snapshot(builder.build(), false))
    }

    fn idle_surface() -> SharedSurface {
        Arc::new(Mutex::new(ScriptedSurface::default()))
    }

    #[tokio::test]
    async fn test_portal_halts_every_task() {
        let session = corridor(" o@", vec![Command::Move(Direction::Right)], None);
        let reason = run_until_halt(Arc::clone(&session), idle_surface()).await;

        assert_eq!(reason, HaltReason::PortalReached);
        assert!(!session.is_running());
        assert_eq!(session.score(), 1);
        assert_eq!(session.players[0].state().pos, Position::new(2, 0));
        assert!(session.grid.inspect(Position::new(2, 0)).has_portal);
    }

    #[tokio::test]
    async fn test_adversary_kill_halts_session() {
        let session = corridor("   ", vec![Command::wait(50)], Some((2, vec![Command::Move(Direction::Left)])));
        let reason = run_until_halt(Arc::clone(&session), idle_surface()).await;

        assert_eq!(reason, HaltReason::PlayersDestroyed);
        assert!(!session.players[0].is_alive());
        assert_eq!(session.grid.peek(Position::new(0, 0)), CellContent::Adversary(0));
    }

    #[tokio::test]
    async fn test_quit_from_surface() {
        let session = corridor("   ", vec![Command::wait(1)], None);
        let surface: SharedSurface = Arc::new(Mutex::new(ScriptedSurface::new([None, None, Some(ControlInput::Quit)])));
        let reason = run_until_halt(Arc::clone(&session), surface).await;

        assert_eq!(reason, HaltReason::Quit);
        assert!(session.players[0].is_alive());
    }

    #[tokio::test]
    async fn test_session_without_players_is_lost() {
        let layout = LevelDefinition {
            height: 1,
            width: 2,
            tempo_ms: 1,
            player_file: None,
            adversary_files: Vec::new(),
            rows: vec!["  ".to_string()],
        };
        let session = Arc::new(Session::from_snapshot(LevelBuilder::new(&layout, "empty").build(), false));
        assert_eq!(run_until_halt(session, idle_surface()).await, HaltReason::PlayersDestroyed);
    }
}
