pub mod types;
pub mod state;

pub mod entities;
pub mod grid;
pub mod level;
pub mod systems;
