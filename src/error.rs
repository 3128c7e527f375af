use crate::grid::GridCell;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExplorerError {
    /// No sequence of open streets connects the two points
    #[error("No valid street path from {start} to {end}: the destination is unreachable with the current blocked streets")]
    PathNotFound { start: GridCell, end: GridCell },

    #[error("Cells {a} and {b} are not adjacent, no street connects them")]
    InvalidEdge { a: GridCell, b: GridCell },

    #[error("Cannot start the animation while street blocking mode is active")]
    BlockingModeActive,

    #[error("Parse error: {0}")]
    Parse(String),
}

pub type ExplorerResult<T> = Result<T, ExplorerError>;
