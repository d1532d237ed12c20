//! Concurrent grid chase engine.
//!
//! Players and adversaries move on their own tasks over a grid whose cells
//! are locked in a fixed order. A running game can be checkpointed: the
//! session is copied into a branch that either dies (and is rolled back) or
//! ends the level for its parent.

pub mod config;
pub mod error;
pub mod game;
pub mod session;
