//! Game entities module.
//!
//! This module organizes player and adversary state and the command
//! schedule both kinds of actor share.

pub mod adversary;
pub mod player;
pub mod schedule;

pub use adversary::*;
pub use player::*;
pub use schedule::*;
