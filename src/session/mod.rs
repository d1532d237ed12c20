//! Running sessions: the actor tasks of one branch, the control surface,
//! checkpoint forks and level progression.

pub mod checkpoint;
pub mod control;
pub mod coordinator;
pub mod messages;
pub mod progression;
