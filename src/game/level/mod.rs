//! Level loading.
//!
//! Parses level and actor files, places actors on the board and falls back to
//! the built-in level whenever a file cannot be used.

pub mod catalog;
pub mod loader;
pub mod parser;

pub use catalog::*;
pub use loader::*;
pub use parser::*;
