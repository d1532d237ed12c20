//! Error types.
//!
//! Neither kind escapes the engine: load errors fall back to built-in
//! defaults and checkpoint errors drop the request.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("missing {0} directive")]
    MissingDirective(&'static str),
    #[error("{directive} expects {expected} value(s)")]
    TooFewTokens { directive: &'static str, expected: usize },
    #[error("invalid number {value:?} in {directive}")]
    BadNumber { directive: &'static str, value: String },
    #[error("grid dimensions {height}x{width} are not playable")]
    BadDimensions { height: usize, width: usize },
    #[error("position ({x}, {y}) is outside the grid or not free")]
    BadPosition { x: usize, y: usize },
}

#[derive(Debug, Error)]
pub enum CheckpointError {
    #[error("checkpoint requested from inside a checkpoint branch")]
    Nested,
    #[error("snapshot codec failed: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("snapshot holds {actual} cells for a {expected}-cell grid")]
    SnapshotMismatch { expected: usize, actual: usize },
    #[error("checkpoint branch ended without reporting an outcome")]
    BranchLost,
}
