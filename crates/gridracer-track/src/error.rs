//! Track errors

use std::path::PathBuf;

use thiserror::Error;

/// Failure to build a [`Track`](crate::Track) from a layout source.
///
/// Loading is all-or-nothing: whenever one of these is returned no track
/// was produced, so a previously loaded track stays in effect.
#[derive(Debug, Error)]
pub enum TrackLoadError {
    #[error("failed to read track file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed track layout: {0}")]
    Json(#[from] serde_json::Error),

    #[error("track layout has no cells")]
    Empty,

    #[error("track row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("start cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    StartOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("start cell ({row}, {col}) is a wall")]
    StartOnWall { row: usize, col: usize },
}

/// No drivable cell with a two-cell straight corridor was found.
///
/// Tracks without such a corridor cannot host a spawn and have to be fixed
/// when they are authored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("no spawn cell with a two-cell straight corridor found after {attempts} attempts")]
pub struct NoValidSpawnError {
    pub attempts: usize,
}
