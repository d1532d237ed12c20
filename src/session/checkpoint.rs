//! Checkpoint branches.
//!
//! A checkpoint copies the halted session into a new branch that plays on
//! with its own tasks while the parent waits. A branch that dies is thrown
//! away and the parent resumes from where it stopped. A branch that reaches
//! a portal or quits hands its result up unchanged.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::oneshot;

use crate::error::CheckpointError;
use crate::game::state::{Session, SessionSnapshot};
use crate::session::control::SharedSurface;
use crate::session::coordinator::run_until_halt;
use crate::session::messages::{BranchOutcome, HaltReason};

/// What a finished branch reports to whoever started it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchExit {
    pub outcome: BranchOutcome,
    /// State of the branch that produced the outcome, read after its join barrier.
    pub final_state: SessionSnapshot,
}

pub type BranchFuture = Pin<Box<dyn Future<Output = BranchExit> + Send>>;

/// Plays `session` until it ends, forking on every checkpoint request.
pub fn run_branch(session: Arc<Session>, surface: SharedSurface) -> BranchFuture {
    Box::pin(async move {
        loop {
            let outcome = match run_until_halt(Arc::clone(&session), surface.clone()).await {
                HaltReason::PortalReached => BranchOutcome::AdvancedLevel,
                HaltReason::PlayersDestroyed => BranchOutcome::Died,
                HaltReason::Quit => BranchOutcome::Quit,
                HaltReason::CheckpointRequested => match fork(&session, surface.clone()).await {
                    Ok(exit) if exit.outcome == BranchOutcome::Died => {
                        info!("[Checkpoint] branch died, rolling back {}", session.branch_id);
                        continue;
                    }
                    Ok(exit) => {
                        debug!("[Checkpoint] {} adopts {:?} from its branch", session.branch_id, exit.outcome);
                        return exit;
                    }
                    Err(err) => {
                        warn!("[Checkpoint] request dropped in {}: {}", session.branch_id, err);
                        continue;
                    }
                },
            };
            return BranchExit { outcome, final_state: session.snapshot() };
        }
    })
}

/// Copies a halted session into a checkpoint branch and waits for its exit.
///
/// Must only be called after the join barrier of `session`. The parent is
/// left untouched, whatever the branch does.
pub async fn fork(session: &Session, surface: SharedSurface) -> Result<BranchExit, CheckpointError> {
    if session.is_checkpoint() {
        return Err(CheckpointError::Nested);
    }

    let bytes = session.snapshot().to_json()?;
    let branch = Arc::new(Session::from_snapshot(SessionSnapshot::from_json(&bytes)?, true));
    info!("[Checkpoint] branch {} forked from {}", branch.branch_id, session.branch_id);

    let (tx, rx) = oneshot::channel();
    tokio::spawn(async move {
        let exit = run_branch(branch, surface).await;
        if tx.send(exit).is_err() {
            warn!("[Checkpoint] parent gone before the branch finished");
        }
    });

    let exit = rx.await.map_err(|_| CheckpointError::BranchLost)?;
    info!("[Checkpoint] branch exited with code {}", exit.outcome.code());
    Ok(exit)
}
