//! Grid store module.

pub mod grid;

pub use grid::*;
