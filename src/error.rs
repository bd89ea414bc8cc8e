use std::io;

use thiserror::Error;

use crate::grid::TileKind;

/// Failures while building a level.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("no path from start to exit on a {grid_size}x{grid_size} grid")]
    NoPath { grid_size: usize },
    #[error("could not place {kind:?} tile after {attempts} attempts")]
    HazardPlacement { kind: TileKind, attempts: usize },
    #[error("level {level} could not be built after {builds} attempts: {last}")]
    Exhausted {
        level: u32,
        builds: usize,
        #[source]
        last: Box<GenerationError>,
    },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("terminal i/o failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Generation(#[from] GenerationError),
}

pub type Result<T> = std::result::Result<T, Error>;
