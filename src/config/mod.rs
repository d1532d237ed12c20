/// Main configuration module.
/// 
/// Re-exports submodules for game, control surface and checkpoint configuration.
pub mod checkpoint;
pub mod control;
pub mod game;
